//! Simple linear regression with significance tests for the slope and the overall fit
//!
//! The pipeline over `n` paired observations:
//!
//! 1. means `x̄`, `ȳ` and the centered sums of squares `SSx`, `SSy`, `SSxy`
//! 2. the least squares line: `m = SSxy / SSx`, `b = ȳ - m x̄`
//! 3. the variance decomposition around the line: `SS_reg = Σ(ŷᵢ - ȳ)²`,
//!    `SS_res = Σ(ŷᵢ - yᵢ)²`
//! 4. `F = SS_reg / (SS_res / df)` tested against `F(1, df)`, `df = n - 2`
//! 5. `t = m / sqrt(SS_res / df) * sqrt(SSx)` tested against Student's t with `df`
//! 6. `R² = SS_reg / (SS_reg + SS_res)`

use crate::error::{Degeneracy, Error, Result};
use crate::stats::bivariate::regression::{StraightLine, SumsOfSquares};
use crate::stats::bivariate::Data;
use crate::stats::distribution::{FisherSnedecor, StudentT};

/// Observations needed to leave one residual degree of freedom
pub const MIN_SAMPLES: usize = 3;

const OVERFLOW: &str = "the sums of squares overflow, rescale the data";

/// Every statistic of a simple linear regression
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Number of observations
    pub n: usize,
    /// Mean of the independent variable
    pub x_bar: f64,
    /// Mean of the dependent variable
    pub y_bar: f64,
    pub slope: f64,
    pub intercept: f64,
    pub ss_x: f64,
    pub ss_y: f64,
    pub ss_xy: f64,
    /// Variance explained by the line
    pub ss_reg: f64,
    /// Variance left in the residuals
    pub ss_res: f64,
    /// Residual degrees of freedom, `n - 2`
    pub df: usize,
    pub f: f64,
    /// Upper tail probability of `f` under `F(1, df)`
    pub p_value_f: f64,
    pub t: f64,
    /// `2 * P(T <= t)`
    ///
    /// This doubles the lower tail even for a positive `t`, so it is a proper two-sided
    /// p-value only when `t <= 0` and it exceeds 1 for any positive slope. Kept to reproduce
    /// legacy reports; use `p_value_t_two_sided` for inference.
    pub p_value_t: f64,
    /// `2 * P(T > |t|)`
    pub p_value_t_two_sided: f64,
    pub r_squared: f64,
    /// Set when the residuals vanish and `f`/`t` diverge
    pub degeneracy: Option<Degeneracy>,
}

impl LinearRegression {
    /// The fitted line `y = slope * x + intercept`
    pub fn line(&self) -> StraightLine<f64> {
        StraightLine {
            intercept: self.intercept,
            slope: self.slope,
        }
    }

    /// `SS_reg + SS_res`, equal to `ss_y` up to rounding
    pub fn ss_total(&self) -> f64 {
        self.ss_reg + self.ss_res
    }
}

/// Fits `y = m * x + b` by ordinary least squares and tests its significance
///
/// # Errors
///
/// - `InsufficientSamples` when there are fewer than 3 observations
/// - `NonFinite` when an observation is `NaN` or infinite
/// - `DegenerateInput` when every `x` (or every `y`) is the same value, or when the sums of
///   squares overflow
///
/// A perfect fit is not an error: `f` and `t` are reported as infinite, the p-values as 0 and
/// `degeneracy` is set.
pub fn fit(samples: &[(f64, f64)]) -> Result<LinearRegression> {
    let n = samples.len();
    if n < MIN_SAMPLES {
        return Err(Error::InsufficientSamples {
            required: MIN_SAMPLES,
            actual: n,
        });
    }
    if let Some(index) = samples
        .iter()
        .position(|&(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(Error::NonFinite { index });
    }

    let (xs, ys): (Vec<f64>, Vec<f64>) = samples.iter().cloned().unzip();
    let data = Data::new(&xs, &ys);

    let sums = SumsOfSquares::new(&data);
    if !(sums.ss_x.is_finite() && sums.ss_y.is_finite() && sums.ss_xy.is_finite()) {
        return Err(Error::DegenerateInput(OVERFLOW));
    }

    let line = StraightLine::from_sums(&sums).ok_or(Error::DegenerateInput(
        "the independent variable has zero variance, the slope is undefined",
    ))?;

    let fitted = line.fitted(&data);
    let ss_reg = crate::stats::sum_of_squares(&fitted, sums.y_bar);
    let ss_res = fitted
        .iter()
        .zip(&ys)
        .fold(0., |acc, (&y_hat, &y)| acc + (y_hat - y).powi(2));

    if !(line.slope.is_finite()
        && line.intercept.is_finite()
        && ss_reg.is_finite()
        && ss_res.is_finite())
    {
        return Err(Error::DegenerateInput(OVERFLOW));
    }
    if ss_reg + ss_res == 0. {
        return Err(Error::DegenerateInput(
            "the dependent variable has zero variance, the fit is undefined",
        ));
    }

    let df = n - 2;
    let df_f = df as f64;
    let f_dist = FisherSnedecor::new(1., df_f)?;
    let t_dist = StudentT::new(df_f)?;

    let (f, p_value_f, t, degeneracy) = if ss_res == 0. {
        info!("Residual sum of squares is zero, the F and t statistics diverge");

        let t = if line.slope > 0. {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };
        (f64::INFINITY, 0., t, Some(Degeneracy::PerfectFit))
    } else {
        let f = (ss_reg / 1.) / (ss_res / df_f);
        let t = (line.slope / (ss_res / df_f).sqrt()) * sums.ss_x.sqrt();
        if !(f.is_finite() && t.is_finite()) {
            return Err(Error::DegenerateInput(OVERFLOW));
        }

        (f, f_dist.sf(f), t, None)
    };

    let p_value_t = 2. * t_dist.cdf(t);
    let p_value_t_two_sided = 2. * t_dist.sf(t.abs());

    Ok(LinearRegression {
        n,
        x_bar: sums.x_bar,
        y_bar: sums.y_bar,
        slope: line.slope,
        intercept: line.intercept,
        ss_x: sums.ss_x,
        ss_y: sums.ss_y,
        ss_xy: sums.ss_xy,
        ss_reg,
        ss_res,
        df,
        f,
        p_value_f,
        t,
        p_value_t,
        p_value_t_two_sided,
        r_squared: ss_reg / (ss_reg + ss_res),
        degeneracy,
    })
}

#[cfg(test)]
mod test {
    use quickcheck::TestResult;

    use super::fit;
    use crate::error::{Degeneracy, Error};

    const CLOSED_FORM: [(f64, f64); 5] = [(1., 2.), (2., 4.), (3., 5.), (4., 4.), (5., 5.)];

    #[test]
    fn closed_form() {
        let r = fit(&CLOSED_FORM).unwrap();

        assert_eq!(r.n, 5);
        assert_eq!(r.df, 3);
        assert_relative_eq!(r.slope, 0.6, epsilon = 1e-12);
        assert_relative_eq!(r.intercept, 2.2, epsilon = 1e-12);
        assert_relative_eq!(r.ss_x, 10., epsilon = 1e-12);
        assert_relative_eq!(r.ss_y, 6., epsilon = 1e-12);
        assert_relative_eq!(r.ss_xy, 6., epsilon = 1e-12);
        assert_relative_eq!(r.ss_reg, 3.6, epsilon = 1e-12);
        assert_relative_eq!(r.ss_res, 2.4, epsilon = 1e-12);
        assert_relative_eq!(r.f, 4.5, epsilon = 1e-12);
        assert_relative_eq!(r.r_squared, 0.6, epsilon = 1e-12);
        // t² = F for a single predictor
        assert_relative_eq!(r.t * r.t, r.f, epsilon = 1e-12);
        assert_eq!(r.degeneracy, None);
    }

    #[test]
    fn p_values() {
        let r = fit(&CLOSED_FORM).unwrap();

        // F(1, 3) upper tail at 4.5, equal to the two-sided t p-value at sqrt(4.5)
        assert_relative_eq!(r.p_value_f, 0.124_027, epsilon = 1e-5);
        assert_relative_eq!(r.p_value_t_two_sided, r.p_value_f, epsilon = 1e-10);
        // Positive slope: the legacy p-value doubles the lower tail
        assert_relative_eq!(r.p_value_t, 2. - r.p_value_t_two_sided, epsilon = 1e-10);
        assert!(r.p_value_t > 1.);
    }

    #[test]
    fn negative_slope_legacy_p_value_is_two_sided() {
        let samples: Vec<_> = CLOSED_FORM.iter().map(|&(x, y)| (x, -y)).collect();
        let r = fit(&samples).unwrap();

        assert_relative_eq!(r.slope, -0.6, epsilon = 1e-12);
        assert_relative_eq!(r.p_value_t, r.p_value_t_two_sided, epsilon = 1e-12);
    }

    #[test]
    fn perfect_fit() {
        let r = fit(&[(0., 1.), (1., 3.), (2., 5.), (3., 7.)]).unwrap();

        assert_relative_eq!(r.slope, 2.);
        assert_relative_eq!(r.intercept, 1.);
        assert_eq!(r.ss_res, 0.);
        assert_relative_eq!(r.r_squared, 1.);
        assert_eq!(r.f, f64::INFINITY);
        assert_eq!(r.p_value_f, 0.);
        assert_eq!(r.t, f64::INFINITY);
        assert_eq!(r.p_value_t_two_sided, 0.);
        assert_eq!(r.degeneracy, Some(Degeneracy::PerfectFit));
    }

    #[test]
    fn fitted_values() {
        let r = fit(&CLOSED_FORM).unwrap();
        let line = r.line();

        assert_relative_eq!(line.predict(1.), 2.8, epsilon = 1e-12);
        assert_relative_eq!(line.predict(5.), 5.2, epsilon = 1e-12);
    }

    #[test]
    fn constant_x() {
        assert!(matches!(
            fit(&[(3., 1.), (3., 5.), (3., 9.)]),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn constant_y() {
        assert!(matches!(
            fit(&[(1., 4.), (2., 4.), (3., 4.)]),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn overflowing_sums_of_squares() {
        assert!(matches!(
            fit(&[(1e200, 1e200), (-1e200, -1e200), (0., 1.)]),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn large_but_representable() {
        let r = fit(&[(1e100, 2e100), (2e100, 4e100), (3e100, 5e100), (4e100, 4e100)]).unwrap();

        assert!(r.slope.is_finite());
        assert!(r.f.is_finite() && r.t.is_finite());
        assert!(r.r_squared >= 0. && r.r_squared <= 1.);
    }

    #[test]
    fn two_pairs() {
        assert!(matches!(
            fit(&[(1., 2.), (2., 4.)]),
            Err(Error::InsufficientSamples {
                required: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn non_finite() {
        assert!(matches!(
            fit(&[(1., 2.), (2., f64::NAN), (3., 1.)]),
            Err(Error::NonFinite { index: 1 })
        ));
    }

    #[test]
    fn deterministic() {
        let samples = [(0.5, 1.25), (1.75, 2.5), (3.1, 2.9), (4.2, 6.6), (5.3, 5.1)];

        assert_eq!(fit(&samples).unwrap(), fit(&samples).unwrap());
    }

    fn samples(points: &[(i16, i16)]) -> Option<Vec<(f64, f64)>> {
        if points.len() >= 3 {
            Some(
                points
                    .iter()
                    .map(|&(x, y)| (f64::from(x) / 8., f64::from(y) / 8.))
                    .collect(),
            )
        } else {
            None
        }
    }

    quickcheck! {
        fn variance_decomposition(points: Vec<(i16, i16)>) -> TestResult {
            let samples = match samples(&points) {
                Some(samples) => samples,
                None => return TestResult::discard(),
            };

            match fit(&samples) {
                Ok(r) => TestResult::from_bool(
                    relative_eq!(r.ss_total(), r.ss_y, epsilon = 1e-9, max_relative = 1e-9)
                ),
                Err(_) => TestResult::discard(),
            }
        }

        fn r_squared_bounds(points: Vec<(i16, i16)>) -> TestResult {
            let samples = match samples(&points) {
                Some(samples) => samples,
                None => return TestResult::discard(),
            };

            match fit(&samples) {
                Ok(r) => TestResult::from_bool(
                    r.r_squared >= 0. && (r.r_squared <= 1. || relative_eq!(r.r_squared, 1.))
                ),
                Err(_) => TestResult::discard(),
            }
        }
    }
}
