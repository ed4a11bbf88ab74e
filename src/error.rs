use csv::Error as CsvError;
use serde_json::Error as SerdeError;
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    AccessError {
        path: PathBuf,
        inner: io::Error,
    },
    CsvError(CsvError),
    SerdeError(SerdeError),
    /// Fewer observations than the statistic needs
    InsufficientSamples {
        required: usize,
        actual: usize,
    },
    /// An input variable has no variance, the statistic is undefined
    DegenerateInput(&'static str),
    NonFinite {
        index: usize,
    },
    InvalidParameter {
        name: &'static str,
        value: f64,
    },
    MissingColumn(String),
    Parse {
        column: String,
        line: u64,
        value: String,
    },
    EmptyCell {
        a: String,
        b: String,
    },
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AccessError { path, inner } => {
                write!(f, "Failed to access file {:?}: {}", path, inner)
            }
            Error::CsvError(inner) => write!(f, "CSV error: {}", inner),
            Error::SerdeError(inner) => write!(f, "Failed to serialize result: {}", inner),
            Error::InsufficientSamples { required, actual } => write!(
                f,
                "Insufficient samples: at least {} required, got {}",
                required, actual
            ),
            Error::DegenerateInput(reason) => write!(f, "Degenerate input: {}", reason),
            Error::NonFinite { index } => {
                write!(f, "Observation {} is not a finite number", index)
            }
            Error::InvalidParameter { name, value } => {
                write!(f, "Invalid value for parameter `{}`: {}", name, value)
            }
            Error::MissingColumn(name) => write!(f, "Column {:?} not found in header", name),
            Error::Parse {
                column,
                line,
                value,
            } => write!(
                f,
                "Line {}: value {:?} in column {:?} is not a number",
                line, value, column
            ),
            Error::EmptyCell { a, b } => {
                write!(f, "No observations for the combination ({}, {})", a, b)
            }
        }
    }
}
impl StdError for Error {
    fn description(&self) -> &str {
        match self {
            Error::AccessError { .. } => "AccessError",
            Error::CsvError(_) => "CsvError",
            Error::SerdeError(_) => "SerdeError",
            Error::InsufficientSamples { .. } => "InsufficientSamples",
            Error::DegenerateInput(_) => "DegenerateInput",
            Error::NonFinite { .. } => "NonFinite",
            Error::InvalidParameter { .. } => "InvalidParameter",
            Error::MissingColumn(_) => "MissingColumn",
            Error::Parse { .. } => "Parse",
            Error::EmptyCell { .. } => "EmptyCell",
        }
    }

    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::AccessError { inner, .. } => Some(inner),
            Error::CsvError(inner) => Some(inner),
            Error::SerdeError(inner) => Some(inner),
            _ => None,
        }
    }
}
impl From<CsvError> for Error {
    fn from(other: CsvError) -> Error {
        Error::CsvError(other)
    }
}
impl From<SerdeError> for Error {
    fn from(other: SerdeError) -> Error {
        Error::SerdeError(other)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

/// A boundary outcome that is statistically valid but makes a test statistic diverge.
///
/// Unlike `Error`, a degeneracy does not abort the analysis: the statistic is reported as
/// infinite and its p-value as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degeneracy {
    /// Zero residual (or within-group) variance
    PerfectFit,
}
impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degeneracy::PerfectFit => f.write_str("zero residual variance, statistic diverges"),
        }
    }
}

pub(crate) fn log_error(e: &Error) {
    error!("error: {}", e);
}
