//! Regression analysis

use crate::stats::bivariate::Data;
use crate::stats::float::Float;

/// Means and centered sums of squares of a bivariate data set
#[derive(Clone, Copy, Debug)]
pub struct SumsOfSquares<A>
where
    A: Float,
{
    /// Mean of the `X` data
    pub x_bar: A,
    /// Mean of the `Y` data
    pub y_bar: A,
    /// `Σ(x̄ - xᵢ)²`
    pub ss_x: A,
    /// `Σ(ȳ - yᵢ)²`
    pub ss_y: A,
    /// `Σ(xᵢ - x̄)(yᵢ - ȳ)`
    pub ss_xy: A,
}

impl<A> SumsOfSquares<A>
where
    A: Float,
{
    /// - Time: `O(length)`
    pub fn new(data: &Data<'_, A, A>) -> SumsOfSquares<A> {
        let x_bar = data.x().mean();
        let y_bar = data.y().mean();

        let ss_xy = data
            .iter()
            .fold(A::cast(0), |acc, (&x, &y)| acc + (x - x_bar) * (y - y_bar));

        SumsOfSquares {
            x_bar,
            y_bar,
            ss_x: data.x().sum_of_squares(Some(x_bar)),
            ss_y: data.y().sum_of_squares(Some(y_bar)),
            ss_xy,
        }
    }
}

/// A straight line `y = m * x + b`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StraightLine<A>
where
    A: Float,
{
    /// The y-intercept of the line
    pub intercept: A,
    /// The slope of the line
    pub slope: A,
}

impl<A> StraightLine<A>
where
    A: Float,
{
    /// Least squares line through the centroid `(x̄, ȳ)` with slope `SSxy / SSx`
    ///
    /// Returns `None` when all the `X` values are equal, the slope is undefined then.
    pub fn from_sums(sums: &SumsOfSquares<A>) -> Option<StraightLine<A>> {
        if sums.ss_x == A::cast(0) {
            return None;
        }

        let slope = sums.ss_xy / sums.ss_x;
        let intercept = sums.y_bar - slope * sums.x_bar;

        Some(StraightLine { intercept, slope })
    }

    /// Evaluates the line at `x`
    pub fn predict(&self, x: A) -> A {
        self.slope * x + self.intercept
    }

    /// Returns the fitted value `ŷᵢ` of every `X` in the data set
    pub fn fitted(&self, data: &Data<'_, A, A>) -> Vec<A> {
        data.x().iter().map(|&x| self.predict(x)).collect()
    }
}

#[cfg(test)]
macro_rules! test {
    ($ty:ident) => {
        mod $ty {
            use quickcheck::TestResult;

            use crate::stats::bivariate::regression::{StraightLine, SumsOfSquares};
            use crate::stats::bivariate::Data;

            quickcheck! {
                fn residuals_sum_to_zero(size: usize, start: usize, offset: usize) -> TestResult {
                    if let Some(x) = crate::stats::test::vec::<$ty>(size, start) {
                        let y = crate::stats::test::vec::<$ty>(size + offset, start + offset).unwrap();
                        let data = Data::new(&x[start..], &y[start+offset..]);

                        match StraightLine::from_sums(&SumsOfSquares::new(&data)) {
                            Some(sl) => {
                                let residuals = sl
                                    .fitted(&data)
                                    .iter()
                                    .zip(data.y().iter())
                                    .fold(0., |acc, (&y_hat, &y)| acc + (y - y_hat));

                                TestResult::from_bool(
                                    relative_eq!(residuals, 0., epsilon = 1e-3)
                                )
                            }
                            None => TestResult::discard(),
                        }
                    } else {
                        TestResult::discard()
                    }
                }
            }
        }
    };
}
