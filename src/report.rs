use crate::anova::{AnovaRow, OneWayAnova, TwoWayAnova};
use crate::describe::ColumnSummary;
use crate::error::{Degeneracy, Result};
use crate::format;
use crate::pca::PrincipalComponents;
use crate::regression::LinearRegression;
use crate::ttest::TTest;
use anes::{Attribute, Color, ResetAttributes, SetAttribute, SetForegroundColor};
use csv::Writer;
use serde::Serialize;
use std::io::{stdout, Write};
use std::path::PathBuf;

pub struct ReportContext {
    /// Name of the analysed source
    pub title: String,
    /// Decimal places of rounded statistics
    pub precision: usize,
    pub significance_level: f64,
}
impl ReportContext {
    fn is_significant(&self, p_value: f64) -> bool {
        p_value < self.significance_level
    }
}

pub trait Report {
    fn regression(
        &self,
        _context: &ReportContext,
        _columns: (&str, &str),
        _result: &LinearRegression,
    ) {
    }
    fn describe(&self, _context: &ReportContext, _summaries: &[ColumnSummary]) {}
    fn one_way(&self, _context: &ReportContext, _anova: &OneWayAnova) {}
    fn two_way(&self, _context: &ReportContext, _anova: &TwoWayAnova) {}
    fn t_test(&self, _context: &ReportContext, _test: &TTest) {}
    fn pca(&self, _context: &ReportContext, _pcs: &PrincipalComponents) {}
}

pub struct Reports {
    pub(crate) cli_enabled: bool,
    pub(crate) cli: CliReport,
    pub(crate) json_enabled: bool,
    pub(crate) csv: Option<CsvReport>,
}
macro_rules! reports_impl {
    (fn $name:ident(&self, $($argn:ident: $argt:ty),*)) => {
        fn $name(&self, $($argn: $argt),* ) {
            if self.cli_enabled {
                self.cli.$name($($argn),*);
            }
            if self.json_enabled {
                JsonReport.$name($($argn),*);
            }
            if let Some(reporter) = &self.csv {
                reporter.$name($($argn),*);
            }
        }
    };
}

impl Report for Reports {
    reports_impl!(fn regression(
        &self,
        context: &ReportContext,
        columns: (&str, &str),
        result: &LinearRegression
    ));
    reports_impl!(fn describe(&self, context: &ReportContext, summaries: &[ColumnSummary]));
    reports_impl!(fn one_way(&self, context: &ReportContext, anova: &OneWayAnova));
    reports_impl!(fn two_way(&self, context: &ReportContext, anova: &TwoWayAnova));
    reports_impl!(fn t_test(&self, context: &ReportContext, test: &TTest));
    reports_impl!(fn pca(&self, context: &ReportContext, pcs: &PrincipalComponents));
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CliVerbosity {
    Quiet,
    Normal,
}

pub struct CliReport {
    pub enable_text_coloring: bool,
    pub verbosity: CliVerbosity,
}
impl CliReport {
    pub fn new(enable_text_coloring: bool, verbosity: CliVerbosity) -> CliReport {
        CliReport {
            enable_text_coloring,
            verbosity,
        }
    }

    fn with_color(&self, color: Color, s: &str) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetForegroundColor(color), s, ResetAttributes)
        } else {
            String::from(s)
        }
    }

    fn green(&self, s: &str) -> String {
        self.with_color(Color::DarkGreen, s)
    }

    fn yellow(&self, s: &str) -> String {
        self.with_color(Color::DarkYellow, s)
    }

    fn bold(&self, s: String) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetAttribute(Attribute::Bold), s, ResetAttributes)
        } else {
            s
        }
    }

    fn faint(&self, s: String) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetAttribute(Attribute::Faint), s, ResetAttributes)
        } else {
            s
        }
    }

    fn title(&self, context: &ReportContext, analysis: &str) {
        if self.verbosity != CliVerbosity::Quiet {
            println!("{}", self.green(&format!("{}: {}", context.title, analysis)));
        }
    }

    fn p_value(&self, context: &ReportContext, p: f64) -> String {
        let s = format::p_value(p);
        if context.is_significant(p) {
            self.bold(s)
        } else {
            self.faint(s)
        }
    }

    fn degeneracy(&self, degeneracy: Option<Degeneracy>) {
        if let (Some(degeneracy), CliVerbosity::Normal) = (degeneracy, self.verbosity) {
            println!("{}", self.yellow(&format!("Warning: {}", degeneracy)));
        }
    }

    fn anova_rows(&self, context: &ReportContext, rows: &[&AnovaRow]) {
        let width = rows
            .iter()
            .map(|row| row.source.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);
        let fixed = |x| format::fixed(x, context.precision);

        println!(
            "{:<width$}  {:>12}  {:>4}  {:>12}  {:>10}  {:>10}",
            "Source",
            "SS",
            "df",
            "MS",
            "F",
            "p-value",
            width = width
        );
        for row in rows {
            let (f, p) = match (row.f, row.p_value) {
                (Some(f), Some(p)) => (fixed(f), self.p_value(context, p)),
                _ => (String::new(), String::new()),
            };

            println!(
                "{:<width$}  {:>12}  {:>4}  {:>12}  {:>10}  {:>10}",
                row.source,
                fixed(row.ss),
                row.df,
                fixed(row.ms),
                f,
                p,
                width = width
            );
        }
    }
}
impl Report for CliReport {
    fn regression(&self, context: &ReportContext, columns: (&str, &str), r: &LinearRegression) {
        let fixed = |x| format::fixed(x, context.precision);

        self.title(context, "simple linear regression");
        println!(
            "{} = {} * {} {} {}",
            columns.1,
            self.bold(fixed(r.slope)),
            columns.0,
            if r.intercept < 0. { "-" } else { "+" },
            self.bold(fixed(r.intercept.abs()))
        );

        if self.verbosity == CliVerbosity::Normal {
            println!(
                "n = {}  mean x = {}  mean y = {}",
                r.n,
                fixed(r.x_bar),
                fixed(r.y_bar)
            );
            println!(
                "SSx = {}  SSy = {}  SSxy = {}",
                fixed(r.ss_x),
                fixed(r.ss_y),
                fixed(r.ss_xy)
            );
            println!(
                "SS_reg = {}  SS_res = {}  df = {}",
                fixed(r.ss_reg),
                fixed(r.ss_res),
                r.df
            );
        }

        println!(
            "F = {}  (p = {})",
            fixed(r.f),
            self.p_value(context, r.p_value_f)
        );
        println!(
            "t = {}  (p = {}, lower tail doubled = {})",
            fixed(r.t),
            self.p_value(context, r.p_value_t_two_sided),
            self.faint(format::fixed(r.p_value_t, 4))
        );
        println!("R² = {}", fixed(r.r_squared));
        self.degeneracy(r.degeneracy);
    }

    fn describe(&self, context: &ReportContext, summaries: &[ColumnSummary]) {
        let width = summaries
            .iter()
            .map(|s| s.name.chars().count())
            .max()
            .unwrap_or(0)
            .max(9);
        let fixed = |x| format::fixed(x, context.precision);

        self.title(context, "descriptive statistics");
        println!(
            "{:<width$}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
            "attribute",
            "mean",
            "median",
            "std dev",
            "variance",
            "max",
            "min",
            width = width
        );
        for s in summaries {
            println!(
                "{:<width$}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}  {:>10}",
                s.name,
                fixed(s.mean),
                fixed(s.median),
                fixed(s.std_dev),
                fixed(s.variance),
                fixed(s.max),
                fixed(s.min),
                width = width
            );
        }
    }

    fn one_way(&self, context: &ReportContext, anova: &OneWayAnova) {
        self.title(context, "one-way ANOVA");

        if self.verbosity == CliVerbosity::Normal {
            for group in &anova.groups {
                println!(
                    "  {}: n = {}, mean = {}",
                    group.label,
                    group.n,
                    format::fixed(group.mean, context.precision)
                );
            }
        }

        self.anova_rows(context, &anova.rows());
        self.degeneracy(anova.degeneracy);
    }

    fn two_way(&self, context: &ReportContext, anova: &TwoWayAnova) {
        self.title(context, "two-way ANOVA");
        self.anova_rows(context, &anova.rows());
        self.degeneracy(anova.degeneracy);
    }

    fn t_test(&self, context: &ReportContext, test: &TTest) {
        let fixed = |x| format::fixed(x, context.precision);

        self.title(context, "two-sample t-test, pooled variance");
        if self.verbosity == CliVerbosity::Normal {
            println!(
                "mean {} = {}  mean {} = {}  pooled variance = {}",
                test.labels.0,
                fixed(test.mean_a),
                test.labels.1,
                fixed(test.mean_b),
                fixed(test.pooled_variance)
            );
        }
        println!(
            "t = {}  df = {}  (p = {})",
            fixed(test.t),
            test.df,
            self.p_value(context, test.p_value)
        );
        self.degeneracy(test.degeneracy);
    }

    fn pca(&self, context: &ReportContext, pcs: &PrincipalComponents) {
        let fixed = |x| format::fixed(x, context.precision);
        let names = pcs.names();

        self.title(context, "principal component analysis");
        for (name, (variance, ratio)) in names
            .iter()
            .zip(pcs.explained_variance.iter().zip(&pcs.explained_variance_ratio))
        {
            println!(
                "{}: variance = {}  explained = {}%",
                name,
                fixed(*variance),
                self.bold(fixed(ratio * 100.))
            );
        }

        if self.verbosity == CliVerbosity::Quiet {
            return;
        }

        let width = pcs
            .features
            .iter()
            .map(|f| f.chars().count())
            .max()
            .unwrap_or(0)
            .max(7);
        print!("{:<width$}", "feature", width = width);
        for name in &names {
            print!("  {:>8}", name);
        }
        println!();
        for (j, feature) in pcs.features.iter().enumerate() {
            print!("{:<width$}", feature, width = width);
            for loading in pcs.loadings(j) {
                print!("  {:>8}", format::fixed(loading, context.precision.max(3)));
            }
            println!();
        }
    }
}

#[derive(Serialize)]
struct JsonDocument<'a, T: Serialize> {
    title: &'a str,
    analysis: &'static str,
    result: T,
}

#[derive(Serialize)]
struct RegressionColumns<'a> {
    x: &'a str,
    y: &'a str,
    #[serde(flatten)]
    fit: &'a LinearRegression,
}

/// Pretty JSON document on stdout
///
/// Infinite statistics are written as `null`.
pub struct JsonReport;
impl JsonReport {
    fn print<T: Serialize>(&self, context: &ReportContext, analysis: &'static str, result: T) {
        let document = JsonDocument {
            title: &context.title,
            analysis,
            result,
        };

        log_if_err!(self.write(&document));
    }

    fn write<T: Serialize>(&self, document: &T) -> Result<()> {
        let stdout = stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer_pretty(&mut handle, document)?;
        writeln!(handle).map_err(serde_json::Error::io)?;
        Ok(())
    }
}
impl Report for JsonReport {
    fn regression(&self, context: &ReportContext, columns: (&str, &str), r: &LinearRegression) {
        let result = RegressionColumns {
            x: columns.0,
            y: columns.1,
            fit: r,
        };
        self.print(context, "regression", result);
    }

    fn describe(&self, context: &ReportContext, summaries: &[ColumnSummary]) {
        self.print(context, "describe", summaries);
    }

    fn one_way(&self, context: &ReportContext, anova: &OneWayAnova) {
        self.print(context, "anova", anova);
    }

    fn two_way(&self, context: &ReportContext, anova: &TwoWayAnova) {
        self.print(context, "anova2", anova);
    }

    fn t_test(&self, context: &ReportContext, test: &TTest) {
        self.print(context, "ttest", test);
    }

    fn pca(&self, context: &ReportContext, pcs: &PrincipalComponents) {
        self.print(context, "pca", pcs);
    }
}

#[derive(Serialize)]
struct StatisticRow<'a> {
    statistic: &'a str,
    value: f64,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    attribute: &'a str,
    mean: f64,
    median: f64,
    #[serde(rename = "standard deviation")]
    std_dev: f64,
    variance: f64,
    maximum: f64,
    minimum: f64,
}

#[derive(Serialize)]
struct AnovaCsvRow<'a> {
    #[serde(rename = "")]
    source: &'a str,
    #[serde(rename = "Squared Sum")]
    ss: f64,
    #[serde(rename = "Mean-Squared Sum")]
    ms: f64,
    #[serde(rename = "Degrees of freedom")]
    df: usize,
    #[serde(rename = "f-factor")]
    f: Option<f64>,
    #[serde(rename = "p-value")]
    p_value: Option<f64>,
}

struct CsvReportWriter<W: Write> {
    writer: Writer<W>,
    precision: usize,
}
impl<W: Write> CsvReportWriter<W> {
    fn round(&self, x: f64) -> f64 {
        format::round(x, self.precision)
    }

    fn write_statistics(&mut self, statistics: &[(&str, f64)]) -> Result<()> {
        for &(statistic, value) in statistics {
            self.writer.serialize(StatisticRow { statistic, value })?;
        }
        Ok(())
    }

    fn write_regression(&mut self, r: &LinearRegression) -> Result<()> {
        // p-values are written unrounded
        self.write_statistics(&[
            ("n", r.n as f64),
            ("mean x", self.round(r.x_bar)),
            ("mean y", self.round(r.y_bar)),
            ("slope", self.round(r.slope)),
            ("intercept", self.round(r.intercept)),
            ("SSx", self.round(r.ss_x)),
            ("SSy", self.round(r.ss_y)),
            ("SSxy", self.round(r.ss_xy)),
            ("SS_reg", self.round(r.ss_reg)),
            ("SS_res", self.round(r.ss_res)),
            ("df", r.df as f64),
            ("F", self.round(r.f)),
            ("p-value F", r.p_value_f),
            ("t", self.round(r.t)),
            ("p-value t", r.p_value_t),
            ("p-value t two-sided", r.p_value_t_two_sided),
            ("R squared", self.round(r.r_squared)),
        ])
    }

    fn write_summaries(&mut self, summaries: &[ColumnSummary]) -> Result<()> {
        for s in summaries {
            let row = SummaryRow {
                attribute: &s.name,
                mean: self.round(s.mean),
                median: self.round(s.median),
                std_dev: self.round(s.std_dev),
                variance: self.round(s.variance),
                maximum: self.round(s.max),
                minimum: self.round(s.min),
            };
            self.writer.serialize(row)?;
        }
        Ok(())
    }

    fn write_anova(&mut self, rows: &[&AnovaRow]) -> Result<()> {
        for row in rows {
            let csv_row = AnovaCsvRow {
                source: &row.source,
                ss: self.round(row.ss),
                ms: self.round(row.ms),
                df: row.df,
                f: row.f.map(|f| self.round(f)),
                p_value: row.p_value,
            };
            self.writer.serialize(csv_row)?;
        }
        Ok(())
    }

    fn write_t_test(&mut self, test: &TTest) -> Result<()> {
        self.write_statistics(&[
            ("mean a", self.round(test.mean_a)),
            ("mean b", self.round(test.mean_b)),
            ("pooled variance", self.round(test.pooled_variance)),
            ("t", self.round(test.t)),
            ("df", test.df as f64),
            ("p-value", test.p_value),
        ])
    }

    /// One row per feature with its loading on every component, under an unnamed first
    /// column. Loadings are written unrounded.
    fn write_components(&mut self, pcs: &PrincipalComponents) -> Result<()> {
        let mut header = vec![String::new()];
        header.extend(pcs.names());
        self.writer.write_record(&header)?;

        for (j, feature) in pcs.features.iter().enumerate() {
            let mut record = vec![feature.clone()];
            record.extend(pcs.loadings(j).iter().map(f64::to_string));
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    fn flush(mut self) -> Result<()> {
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Writes the result of one analysis to a CSV file, replacing it
pub struct CsvReport {
    pub path: PathBuf,
}
impl CsvReport {
    pub fn new<P: Into<PathBuf>>(path: P) -> CsvReport {
        CsvReport { path: path.into() }
    }

    fn write_file<F>(&self, context: &ReportContext, write: F) -> Result<()>
    where
        F: FnOnce(&mut CsvReportWriter<std::fs::File>) -> Result<()>,
    {
        let writer = Writer::from_path(&self.path)?;
        let mut writer = CsvReportWriter {
            writer,
            precision: context.precision,
        };
        write(&mut writer)?;
        writer.flush()?;

        info!("Wrote {:?}", self.path);
        Ok(())
    }
}
impl Report for CsvReport {
    fn regression(&self, context: &ReportContext, _: (&str, &str), r: &LinearRegression) {
        log_if_err!(self.write_file(context, |w| w.write_regression(r)));
    }

    fn describe(&self, context: &ReportContext, summaries: &[ColumnSummary]) {
        log_if_err!(self.write_file(context, |w| w.write_summaries(summaries)));
    }

    fn one_way(&self, context: &ReportContext, anova: &OneWayAnova) {
        log_if_err!(self.write_file(context, |w| w.write_anova(&anova.rows())));
    }

    fn two_way(&self, context: &ReportContext, anova: &TwoWayAnova) {
        log_if_err!(self.write_file(context, |w| w.write_anova(&anova.rows())));
    }

    fn t_test(&self, context: &ReportContext, test: &TTest) {
        log_if_err!(self.write_file(context, |w| w.write_t_test(test)));
    }

    fn pca(&self, context: &ReportContext, pcs: &PrincipalComponents) {
        log_if_err!(self.write_file(context, |w| w.write_components(pcs)));
    }
}

#[cfg(test)]
mod test {
    use super::{CsvReport, Report, ReportContext};
    use crate::anova::one_way;
    use crate::describe::ColumnSummary;
    use crate::pca::pca;
    use crate::regression::fit;
    use std::fs;

    fn context() -> ReportContext {
        ReportContext {
            title: "test".to_owned(),
            precision: 2,
            significance_level: 0.05,
        }
    }

    #[test]
    fn significance() {
        let context = context();

        assert!(context.is_significant(0.01));
        assert!(!context.is_significant(0.05));
    }

    #[test]
    fn csv_summaries_are_rounded() {
        let dir = tempfile::tempdir().unwrap();
        let report = CsvReport::new(dir.path().join("out.csv"));
        let summary = ColumnSummary::new("alcohol", &[9.4, 9.8, 9.8, 10.5, 9.4]).unwrap();

        report.describe(&context(), &[summary]);

        let written = fs::read_to_string(&report.path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("attribute,mean,median,standard deviation,variance,maximum,minimum")
        );
        assert_eq!(lines.next(), Some("alcohol,9.78,9.8,0.45,0.2,10.5,9.4"));
    }

    #[test]
    fn csv_anova_layout() {
        let dir = tempfile::tempdir().unwrap();
        let report = CsvReport::new(dir.path().join("anova.csv"));
        let anova = one_way(&[
            ("a".to_owned(), vec![1., 2., 3.]),
            ("b".to_owned(), vec![3., 2., 1.]),
        ])
        .unwrap();

        report.one_way(&context(), &anova);

        let written = fs::read_to_string(&report.path).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(
            lines[0],
            ",Squared Sum,Mean-Squared Sum,Degrees of freedom,f-factor,p-value"
        );
        assert_eq!(lines[1], "Factor,0.0,0.0,1,0.0,1.0");
        assert_eq!(lines[2], "Residual,4.0,1.0,4,,");
    }

    #[test]
    fn csv_regression() {
        let dir = tempfile::tempdir().unwrap();
        let report = CsvReport::new(dir.path().join("regression.csv"));
        let r = fit(&[(1., 2.), (2., 4.), (3., 5.), (4., 4.), (5., 5.)]).unwrap();

        report.regression(&context(), ("x", "y"), &r);

        let written = fs::read_to_string(&report.path).unwrap();
        assert!(written.starts_with("statistic,value\n"));
        assert!(written.contains("slope,0.6\n"));
        assert!(written.contains("intercept,2.2\n"));
        assert!(written.contains("R squared,0.6\n"));
    }

    #[test]
    fn csv_components_per_feature() {
        let dir = tempfile::tempdir().unwrap();
        let report = CsvReport::new(dir.path().join("PCA_results.csv"));
        let pcs = pca(
            &[
                ("a".to_owned(), vec![1., 2., 3., 4.]),
                ("b".to_owned(), vec![2., 4., 6., 8.]),
            ],
            1,
        )
        .unwrap();

        report.pca(&context(), &pcs);

        let written = fs::read_to_string(&report.path).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ",PC-0");
        assert!(lines[1].starts_with("a,0.447"));
        assert!(lines[2].starts_with("b,0.894"));
    }

    #[test]
    fn unwritable_path_is_logged_not_fatal() {
        let report = CsvReport::new("/nonexistent/dir/out.csv");
        let summary = ColumnSummary::new("x", &[1., 2.]).unwrap();

        report.describe(&context(), &[summary]);
    }
}
