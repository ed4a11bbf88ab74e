//! Command-line front end

use std::path::Path;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use crate::config::Config;
use crate::dataset::{PairRecords, Table};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::{anova, describe, pca, regression, ttest};

const AFTER_HELP: &str = "\
Input files have one header line and one record per line. Numeric fields are parsed as
decimal numbers, factor columns are read as labels.

To enable debug output, define the environment variable STATLAB_DEBUG.
";

fn file_arg() -> Arg<'static, 'static> {
    Arg::with_name("FILE")
        .help("Delimited text file with a header line")
        .required(true)
        .index(1)
}

fn factor_arg() -> Arg<'static, 'static> {
    Arg::with_name("factor")
        .long("factor")
        .takes_value(true)
        .value_name("COL")
        .required(true)
        .help("Column with the group labels")
}

fn response_arg() -> Arg<'static, 'static> {
    Arg::with_name("response")
        .long("response")
        .takes_value(true)
        .value_name("COL")
        .required(true)
        .help("Numeric column with the observations")
}

/// Definition of every subcommand and option
pub fn app() -> App<'static, 'static> {
    App::new("statlab")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classical statistics over delimited text datasets")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::VersionlessSubcommands)
        .arg(Arg::with_name("delimiter")
            .short("d")
            .long("delimiter")
            .takes_value(true)
            .global(true)
            .help("Field delimiter of the input, a single character or \\t. Default is ;"))
        .arg(Arg::with_name("precision")
            .long("precision")
            .takes_value(true)
            .global(true)
            .help("Decimal places of the reported statistics. Default is 2."))
        .arg(Arg::with_name("significance-level")
            .long("significance")
            .takes_value(true)
            .global(true)
            .help("p-values under this level are highlighted. Default is 0.05."))
        .arg(Arg::with_name("csv")
            .long("csv")
            .takes_value(true)
            .value_name("PATH")
            .global(true)
            .help("Also write the results to a CSV file"))
        .arg(Arg::with_name("json")
            .long("json")
            .global(true)
            .help("Print the results as a JSON document instead of text"))
        .arg(Arg::with_name("color")
            .short("c")
            .long("color")
            .alias("colour")
            .takes_value(true)
            .possible_values(&["auto", "always", "never"])
            .default_value("auto")
            .global(true)
            .help("Configure coloring of output. always = always colorize output, never = never colorize output, auto = colorize output if output is a tty."))
        .arg(Arg::with_name("quiet")
            .short("q")
            .long("quiet")
            .global(true)
            .help("Print only the main statistics"))
        .subcommand(SubCommand::with_name("regress")
            .about("Simple linear regression of one column on another")
            .arg(file_arg())
            .arg(Arg::with_name("x")
                .long("x")
                .takes_value(true)
                .value_name("COL")
                .requires("y")
                .help("Independent variable. Default is the first column."))
            .arg(Arg::with_name("y")
                .long("y")
                .takes_value(true)
                .value_name("COL")
                .requires("x")
                .help("Dependent variable. Default is the second column.")))
        .subcommand(SubCommand::with_name("describe")
            .about("Mean, median, standard deviation, variance, maximum and minimum of every column")
            .arg(file_arg()))
        .subcommand(SubCommand::with_name("anova")
            .about("One-way analysis of variance")
            .arg(file_arg())
            .arg(factor_arg())
            .arg(response_arg()))
        .subcommand(SubCommand::with_name("anova2")
            .about("Two-way analysis of variance with interaction")
            .arg(file_arg())
            .arg(factor_arg()
                .multiple(true)
                .number_of_values(1)
                .help("Column with the labels of one factor, given twice"))
            .arg(response_arg()))
        .subcommand(SubCommand::with_name("ttest")
            .about("Two-sample t-test with pooled variance between the two levels of a factor")
            .arg(file_arg())
            .arg(factor_arg())
            .arg(response_arg()))
        .subcommand(SubCommand::with_name("pca")
            .about("Principal component analysis of the numeric columns")
            .arg(file_arg())
            .arg(Arg::with_name("components")
                .short("n")
                .long("components")
                .takes_value(true)
                .value_name("N")
                .required(true)
                .help("Number of components to extract"))
            .arg(Arg::with_name("drop")
                .long("drop")
                .takes_value(true)
                .value_name("COL")
                .multiple(true)
                .number_of_values(1)
                .help("Column left out of the analysis, such as a class label. May be repeated.")))
        .after_help(AFTER_HELP)
}

fn title(path: &Path) -> String {
    path.file_name()
        .unwrap_or_else(|| path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

// Required arguments are enforced by clap
fn required<'a>(matches: &'a ArgMatches<'_>, name: &str) -> &'a str {
    matches.value_of(name).unwrap_or_default()
}

/// Runs the analysis selected by `matches`
pub fn run(matches: &ArgMatches<'_>) -> Result<()> {
    let (name, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        _ => return Ok(()),
    };

    let config = Config::default().configure_from_args(sub);
    let path = Path::new(sub.value_of_os("FILE").unwrap_or_default());
    let context = config.report_context(&title(path));
    let reports = config.reports();
    let delimiter = config.delimiter_byte();

    info!("Running {} on {:?}", name, path);

    match name {
        "regress" => {
            let (columns, samples) = match (sub.value_of("x"), sub.value_of("y")) {
                (Some(x), Some(y)) => {
                    let table = Table::from_path(path, delimiter)?;
                    ((x.to_owned(), y.to_owned()), table.pairs(x, y)?)
                }
                _ => {
                    let records = PairRecords::from_path(path, delimiter)?;
                    let (x, y) = records.columns();
                    let columns = (x.to_owned(), y.to_owned());
                    (columns, records.collect::<Result<Vec<_>>>()?)
                }
            };

            let result = regression::fit(&samples)?;
            reports.regression(&context, (&columns.0, &columns.1), &result);
        }
        "describe" => {
            let table = Table::from_path(path, delimiter)?;
            reports.describe(&context, &describe::describe(&table)?);
        }
        "anova" => {
            let table = Table::from_path(path, delimiter)?;
            let anova =
                anova::one_way_by(&table, required(sub, "factor"), required(sub, "response"))?;
            reports.one_way(&context, &anova);
        }
        "anova2" => {
            let factors: Vec<_> = sub.values_of("factor").into_iter().flatten().collect();
            let (a, b) = match factors.as_slice() {
                [a, b] => (*a, *b),
                _ => {
                    return Err(Error::InvalidParameter {
                        name: "factor",
                        value: factors.len() as f64,
                    })
                }
            };

            let table = Table::from_path(path, delimiter)?;
            let anova = anova::two_way_by(&table, a, b, required(sub, "response"))?;
            reports.two_way(&context, &anova);
        }
        "ttest" => {
            let table = Table::from_path(path, delimiter)?;
            let test =
                ttest::two_sample_by(&table, required(sub, "factor"), required(sub, "response"))?;
            reports.t_test(&context, &test);
        }
        "pca" => {
            let components = required(sub, "components");
            let components = components.parse::<usize>().map_err(|_| Error::InvalidParameter {
                name: "components",
                value: components.parse::<f64>().unwrap_or(f64::NAN),
            })?;
            let drop: Vec<_> = sub.values_of("drop").into_iter().flatten().collect();

            let table = Table::from_path(path, delimiter)?;
            let pcs = pca::pca_table(&table, components, &drop)?;
            reports.pca(&context, &pcs);
        }
        _ => unreachable!(),
    }

    Ok(())
}

/// Parses the process arguments and runs the analysis, returning the exit status
pub fn main() -> i32 {
    let matches = app().get_matches();

    match run(&matches) {
        Ok(()) => 0,
        Err(e) => {
            crate::error::log_error(&e);
            1
        }
    }
}
