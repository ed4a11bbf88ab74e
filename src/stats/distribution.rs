//! Sampling distributions of the test statistics
//!
//! Both CDFs reduce to the regularized incomplete beta function:
//!
//! - Student's t with `ν` degrees of freedom: `P(T <= t) = 1 - ½ I_{ν/(ν+t²)}(ν/2, ½)` for
//!   `t > 0`, mirrored for `t < 0`
//! - Fisher-Snedecor F with `(d1, d2)` degrees of freedom:
//!   `P(F <= f) = I_{d1 f/(d1 f + d2)}(d1/2, d2/2)`

use crate::error::{Error, Result};
use crate::stats::special;

fn check_df(name: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Student's t distribution
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StudentT {
    nu: f64,
}

impl StudentT {
    /// Creates a t distribution with `nu` degrees of freedom
    ///
    /// # Errors
    ///
    /// `nu` must be positive and finite
    pub fn new(nu: f64) -> Result<StudentT> {
        Ok(StudentT {
            nu: check_df("nu", nu)?,
        })
    }

    /// `P(T <= t)`
    pub fn cdf(&self, t: f64) -> f64 {
        if t.is_nan() {
            return f64::NAN;
        }
        if t == 0.0 {
            return 0.5;
        }
        if t.is_infinite() {
            return if t > 0.0 { 1.0 } else { 0.0 };
        }

        let x = self.nu / (self.nu + t * t);
        let tail = 0.5 * special::regularized_beta(x, self.nu / 2.0, 0.5);

        if t > 0.0 {
            1.0 - tail
        } else {
            tail
        }
    }

    /// `P(T > t)`
    pub fn sf(&self, t: f64) -> f64 {
        // Symmetric around zero
        self.cdf(-t)
    }
}

/// Fisher-Snedecor F distribution
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FisherSnedecor {
    d1: f64,
    d2: f64,
}

impl FisherSnedecor {
    /// Creates an F distribution with `d1` numerator and `d2` denominator degrees of freedom
    ///
    /// # Errors
    ///
    /// Both degrees of freedom must be positive and finite
    pub fn new(d1: f64, d2: f64) -> Result<FisherSnedecor> {
        Ok(FisherSnedecor {
            d1: check_df("d1", d1)?,
            d2: check_df("d2", d2)?,
        })
    }

    /// `P(F <= f)`
    pub fn cdf(&self, f: f64) -> f64 {
        if f.is_nan() {
            return f64::NAN;
        }
        if f <= 0.0 {
            return 0.0;
        }
        if f.is_infinite() {
            return 1.0;
        }

        let x = self.d1 * f / (self.d1 * f + self.d2);
        special::regularized_beta(x, self.d1 / 2.0, self.d2 / 2.0)
    }

    /// `P(F > f)`
    ///
    /// Evaluated directly on the complementary incomplete beta, which keeps precision for very
    /// small upper tail probabilities where `1 - cdf(f)` would round to zero.
    pub fn sf(&self, f: f64) -> f64 {
        if f.is_nan() {
            return f64::NAN;
        }
        if f <= 0.0 {
            return 1.0;
        }
        if f.is_infinite() {
            return 0.0;
        }

        let x = self.d2 / (self.d1 * f + self.d2);
        special::regularized_beta(x, self.d2 / 2.0, self.d1 / 2.0)
    }
}

#[cfg(test)]
mod test {
    use super::{FisherSnedecor, StudentT};
    use crate::error::Error;

    #[test]
    fn t_cdf_is_symmetric() {
        let t = StudentT::new(7.0).unwrap();

        assert_eq!(t.cdf(0.0), 0.5);
        for &x in &[0.3, 1.0, 2.5, 6.0] {
            assert_relative_eq!(t.cdf(x) + t.cdf(-x), 1.0, epsilon = 1e-12);
            assert_relative_eq!(t.sf(x), t.cdf(-x));
        }
    }

    #[test]
    fn t_cdf_one_degree_of_freedom_is_cauchy() {
        let t = StudentT::new(1.0).unwrap();

        for &x in &[-3.0f64, -0.5, 0.7, 4.0] {
            let cauchy = 0.5 + x.atan() / std::f64::consts::PI;
            assert_relative_eq!(t.cdf(x), cauchy, epsilon = 1e-10);
        }
    }

    #[test]
    fn t_critical_values() {
        // Two-sided 5% critical values from the t table
        let cases = [(1.0, 12.706), (5.0, 2.571), (10.0, 2.228), (30.0, 2.042)];

        for &(nu, crit) in &cases {
            let t = StudentT::new(nu).unwrap();
            assert_relative_eq!(t.cdf(crit), 0.975, epsilon = 1e-3);
        }
    }

    #[test]
    fn t_infinite_arguments() {
        let t = StudentT::new(3.0).unwrap();

        assert_eq!(t.cdf(f64::INFINITY), 1.0);
        assert_eq!(t.cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn f_critical_values() {
        // Upper 5% points of the F table
        let cases = [(1.0, 3.0, 10.128), (1.0, 10.0, 4.965), (2.0, 12.0, 3.885), (3.0, 20.0, 3.098)];

        for &(d1, d2, crit) in &cases {
            let f = FisherSnedecor::new(d1, d2).unwrap();
            assert_relative_eq!(f.sf(crit), 0.05, epsilon = 1e-3);
            assert_relative_eq!(f.cdf(crit) + f.sf(crit), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn f_with_one_numerator_df_is_squared_t() {
        let f = FisherSnedecor::new(1.0, 8.0).unwrap();
        let t = StudentT::new(8.0).unwrap();
        let x: f64 = 1.7;

        assert_relative_eq!(f.sf(x * x), 2.0 * t.sf(x), epsilon = 1e-10);
    }

    #[test]
    fn f_support() {
        let f = FisherSnedecor::new(2.0, 5.0).unwrap();

        assert_eq!(f.cdf(-1.0), 0.0);
        assert_eq!(f.cdf(0.0), 0.0);
        assert_eq!(f.sf(f64::INFINITY), 0.0);
        assert_eq!(f.cdf(f64::INFINITY), 1.0);
    }

    #[test]
    fn rejects_invalid_degrees_of_freedom() {
        assert!(matches!(
            StudentT::new(0.0),
            Err(Error::InvalidParameter { name: "nu", .. })
        ));
        assert!(matches!(
            FisherSnedecor::new(1.0, f64::INFINITY),
            Err(Error::InvalidParameter { name: "d2", .. })
        ));
    }
}
