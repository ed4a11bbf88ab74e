//! Two-sample Student's t-test with pooled variance

use crate::anova::group_by;
use crate::dataset::Table;
use crate::error::{Degeneracy, Error, Result};
use crate::stats::distribution::StudentT;
use crate::stats::univariate::Sample;

/// Outcome of a two-sample t-test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TTest {
    /// Labels of the two groups, empty when the samples were given directly
    pub labels: (String, String),
    pub mean_a: f64,
    pub mean_b: f64,
    /// `((n_a - 1) s_a² + (n_b - 1) s_b²) / (n_a + n_b - 2)`
    pub pooled_variance: f64,
    pub t: f64,
    /// `n_a + n_b - 2`
    pub df: usize,
    /// Two-sided, `2 * P(T > |t|)`
    pub p_value: f64,
    pub degeneracy: Option<Degeneracy>,
}

/// Tests whether the means of `a` and `b` differ, assuming equal variances
///
/// # Errors
///
/// - `InsufficientSamples` when a sample has less than two observations
/// - `NonFinite` for a `NaN` or infinite observation
/// - `DegenerateInput` when both samples are constant and equal
pub fn two_sample(a: &[f64], b: &[f64]) -> Result<TTest> {
    for sample in &[a, b] {
        if sample.len() < 2 {
            return Err(Error::InsufficientSamples {
                required: 2,
                actual: sample.len(),
            });
        }
        if let Some(index) = sample.iter().position(|v| !v.is_finite()) {
            return Err(Error::NonFinite { index });
        }
    }

    let (a, b) = (Sample::new(a), Sample::new(b));
    let (n_a, n_b) = (a.len(), b.len());
    let (mean_a, mean_b) = (a.mean(), b.mean());

    let df = n_a + n_b - 2;
    let pooled_variance =
        (a.sum_of_squares(Some(mean_a)) + b.sum_of_squares(Some(mean_b))) / df as f64;
    let diff = mean_a - mean_b;

    let (t, p_value, degeneracy) = if pooled_variance == 0. {
        if diff == 0. {
            return Err(Error::DegenerateInput(
                "both samples are constant and equal, the t statistic is undefined",
            ));
        }

        info!("Pooled variance is zero, the t statistic diverges");
        let t = if diff > 0. {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        (t, 0., Some(Degeneracy::PerfectFit))
    } else {
        let se = (pooled_variance * (1. / n_a as f64 + 1. / n_b as f64)).sqrt();
        let t = diff / se;

        (t, 2. * StudentT::new(df as f64)?.sf(t.abs()), None)
    };

    Ok(TTest {
        labels: (String::new(), String::new()),
        mean_a,
        mean_b,
        pooled_variance,
        t,
        df,
        p_value,
        degeneracy,
    })
}

/// t-test of the column `response` between the two levels of the column `factor`
///
/// # Errors
///
/// `InvalidParameter` when `factor` does not have exactly two levels
pub fn two_sample_by(table: &Table, factor: &str, response: &str) -> Result<TTest> {
    let labels = table.labels(factor)?;
    let values = table.column(response)?;

    let mut groups = group_by(&labels, &values);
    if groups.len() != 2 {
        return Err(Error::InvalidParameter {
            name: "levels",
            value: groups.len() as f64,
        });
    }

    let (label_b, b) = groups.pop().unwrap_or_default();
    let (label_a, a) = groups.pop().unwrap_or_default();

    let mut test = two_sample(&a, &b)?;
    test.labels = (label_a, label_b);

    Ok(test)
}
