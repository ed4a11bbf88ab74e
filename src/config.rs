use std::path::PathBuf;

use clap::{value_t, ArgMatches};

use crate::report::{CliReport, CliVerbosity, CsvReport, ReportContext, Reports};

/// When to colour the text report
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ColorChoice {
    /// Only when stdout is a terminal
    Auto,
    Always,
    Never,
}

/// Analysis and output settings
///
/// Built from the defaults with the chained setters, then overridden from the command line:
///
/// ```
/// use statlab::Config;
///
/// let config = Config::default().delimiter(b',').precision(3);
/// assert_eq!(config.delimiter_byte(), b',');
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    delimiter: u8,
    precision: usize,
    significance_level: f64,
    csv_path: Option<PathBuf>,
    json: bool,
    color: ColorChoice,
    quiet: bool,
}

impl Default for Config {
    /// Semicolon delimited input, 2 decimal places, 5% significance, coloured text when
    /// stdout is a terminal
    fn default() -> Config {
        Config {
            delimiter: b';',
            precision: 2,
            significance_level: 0.05,
            csv_path: None,
            json: false,
            color: ColorChoice::Auto,
            quiet: false,
        }
    }
}

impl Config {
    /// Changes the field delimiter of the input
    ///
    /// # Panics
    ///
    /// Panics if the delimiter is not an ASCII character.
    #[must_use]
    pub fn delimiter(mut self, delimiter: u8) -> Config {
        assert!(delimiter.is_ascii());

        self.delimiter = delimiter;
        self
    }

    /// Changes the number of decimal places of the reported statistics
    #[must_use]
    pub fn precision(mut self, precision: usize) -> Config {
        assert!(precision <= 15);

        self.precision = precision;
        self
    }

    /// Changes the significance level under which p-values are highlighted
    ///
    /// # Panics
    ///
    /// Panics if the level is not in the `(0, 1)` range
    #[must_use]
    pub fn significance_level(mut self, sl: f64) -> Config {
        assert!(sl > 0.0 && sl < 1.0);

        self.significance_level = sl;
        self
    }

    /// Also writes the results to a CSV file at `path`
    #[must_use]
    pub fn csv_output<P: Into<PathBuf>>(mut self, path: P) -> Config {
        self.csv_path = Some(path.into());
        self
    }

    /// Replaces the text report by a JSON document on stdout
    #[must_use]
    pub fn json_output(mut self, enabled: bool) -> Config {
        self.json = enabled;
        self
    }

    #[must_use]
    pub fn color(mut self, color: ColorChoice) -> Config {
        self.color = color;
        self
    }

    /// Prints only the main statistics
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Config {
        self.quiet = quiet;
        self
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter
    }

    /// Overrides the settings given on the command line
    ///
    /// Invalid values print the error and exit with status 1.
    #[must_use]
    pub fn configure_from_args(mut self, matches: &ArgMatches<'_>) -> Config {
        if let Some(delimiter) = matches.value_of("delimiter") {
            let delimiter = match delimiter {
                "\\t" | "tab" => b'\t',
                s if s.len() == 1 && s.is_ascii() => s.as_bytes()[0],
                s => {
                    error!("Delimiter must be a single ASCII character, got {:?}", s);
                    std::process::exit(1);
                }
            };
            self = self.delimiter(delimiter);
        }

        if matches.is_present("precision") {
            let precision = value_t!(matches.value_of("precision"), usize).unwrap_or_else(|e| {
                println!("{}", e);
                std::process::exit(1)
            });
            if precision > 15 {
                error!("Precision must be at most 15 decimal places");
                std::process::exit(1);
            }
            self = self.precision(precision);
        }

        if matches.is_present("significance-level") {
            let sl = value_t!(matches.value_of("significance-level"), f64).unwrap_or_else(|e| {
                println!("{}", e);
                std::process::exit(1)
            });
            if sl <= 0.0 || sl >= 1.0 {
                error!("Significance level must be between 0 and 1 (exclusive)");
                std::process::exit(1);
            }
            self = self.significance_level(sl);
        }

        if let Some(path) = matches.value_of_os("csv") {
            self = self.csv_output(path);
        }
        if matches.is_present("json") {
            self = self.json_output(true);
        }
        if matches.is_present("quiet") {
            self = self.quiet(true);
        }

        match matches.value_of("color") {
            Some("always") => self = self.color(ColorChoice::Always),
            Some("never") => self = self.color(ColorChoice::Never),
            _ => {}
        }

        self
    }

    /// Settings shared by every report for the source `title`
    pub fn report_context(&self, title: &str) -> ReportContext {
        ReportContext {
            title: title.to_owned(),
            precision: self.precision,
            significance_level: self.significance_level,
        }
    }

    /// The enabled reports; text and JSON are exclusive on stdout
    pub fn reports(&self) -> Reports {
        let enable_text_coloring = match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => stdout_isatty(),
        };
        let verbosity = if self.quiet {
            CliVerbosity::Quiet
        } else {
            CliVerbosity::Normal
        };

        Reports {
            cli_enabled: !self.json,
            cli: CliReport::new(enable_text_coloring, verbosity),
            json_enabled: self.json,
            csv: self.csv_path.as_ref().map(CsvReport::new),
        }
    }
}

fn stdout_isatty() -> bool {
    atty::is(atty::Stream::Stdout)
}
