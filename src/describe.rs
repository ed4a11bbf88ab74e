//! Column-wise descriptive statistics

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::dataset::Table;
use crate::error::{Error, Result};
use crate::stats::univariate::Sample;

/// Location and dispersion of one column
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (`n - 1` denominator)
    pub std_dev: f64,
    /// Sample variance (`n - 1` denominator)
    pub variance: f64,
    pub max: f64,
    pub min: f64,
}

impl ColumnSummary {
    /// # Errors
    ///
    /// At least two finite values are needed for the sample variance
    pub fn new(name: &str, values: &[f64]) -> Result<ColumnSummary> {
        if values.len() < 2 {
            return Err(Error::InsufficientSamples {
                required: 2,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFinite { index });
        }

        let sample = Sample::new(values);
        let mean = sample.mean();
        let variance = sample.var(Some(mean));

        Ok(ColumnSummary {
            name: name.to_owned(),
            n: values.len(),
            mean,
            median: sample.median(),
            std_dev: variance.sqrt(),
            variance,
            max: sample.max(),
            min: sample.min(),
        })
    }
}

/// Summarizes every column of `table`, in header order
///
/// Every column must be numeric.
pub fn describe(table: &Table) -> Result<Vec<ColumnSummary>> {
    let columns = table.numeric_columns()?;

    #[cfg(feature = "rayon")]
    let iter = columns.par_iter();
    #[cfg(not(feature = "rayon"))]
    let iter = columns.iter();

    iter.map(|(name, values)| ColumnSummary::new(name, values))
        .collect()
}
