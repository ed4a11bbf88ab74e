use std::{mem, ops};

use crate::stats::float::Float;
use crate::stats::univariate::Percentiles;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// A collection of data points drawn from a population
///
/// Invariants:
///
/// - The sample contains at least 2 data points
/// - The sample contains no `NaN`s
#[repr(transparent)]
pub struct Sample<A>([A]);

impl<A> Sample<A>
where
    A: Float,
{
    /// Creates a new sample from an existing slice
    ///
    /// # Panics
    ///
    /// Panics if `slice` contains any `NaN` or if `slice` has less than two elements
    #[allow(clippy::new_ret_no_self)]
    pub fn new(slice: &[A]) -> &Sample<A> {
        assert!(slice.len() > 1 && slice.iter().all(|x| !x.is_nan()));

        unsafe { mem::transmute(slice) }
    }

    /// Returns the biggest element in the sample
    ///
    /// - Time: `O(length)`
    pub fn max(&self) -> A {
        let mut elems = self.iter();

        match elems.next() {
            Some(&head) => elems.fold(head, |a, &b| a.max(b)),
            // NB `unreachable!` because `Sample` is guaranteed to have at least one data point
            None => unreachable!(),
        }
    }

    /// Returns the arithmetic average of the sample
    ///
    /// - Time: `O(length)`
    pub fn mean(&self) -> A {
        let n = self.len();

        self.sum() / A::cast(n)
    }

    /// Returns the 50th percentile of the sample
    ///
    /// - Time: `O(N log N) where N = length`
    /// - Memory: `O(length)`
    pub fn median(&self) -> A
    where
        usize: cast::From<A, Output = Result<usize, cast::Error>>,
    {
        self.percentiles().median()
    }

    /// Returns the smallest element in the sample
    ///
    /// - Time: `O(length)`
    pub fn min(&self) -> A {
        let mut elems = self.iter();

        match elems.next() {
            Some(&elem) => elems.fold(elem, |a, &b| a.min(b)),
            // NB `unreachable!` because `Sample` is guaranteed to have at least one data point
            None => unreachable!(),
        }
    }

    /// Returns a "view" into the percentiles of the sample
    ///
    /// This "view" makes consecutive computations of percentiles much faster (`O(1)`)
    ///
    /// - Time: `O(N log N) where N = length`
    /// - Memory: `O(length)`
    pub fn percentiles(&self) -> Percentiles<A>
    where
        usize: cast::From<A, Output = Result<usize, cast::Error>>,
    {
        use std::cmp::Ordering;

        // NB This function assumes that there are no `NaN`s in the sample
        fn cmp<T>(a: &T, b: &T) -> Ordering
        where
            T: PartialOrd,
        {
            match a.partial_cmp(b) {
                Some(o) => o,
                // Arbitrary way to handle NaNs that should never happen
                None => Ordering::Equal,
            }
        }

        let mut v = self.to_vec().into_boxed_slice();
        #[cfg(feature = "rayon")]
        v.par_sort_unstable_by(cmp);
        #[cfg(not(feature = "rayon"))]
        v.sort_unstable_by(cmp);

        Percentiles::from_sorted(v)
    }

    /// Returns the standard deviation of the sample
    ///
    /// The `mean` can be optionally passed along to speed up (2X) the computation
    ///
    /// - Time: `O(length)`
    pub fn std_dev(&self, mean: Option<A>) -> A {
        self.var(mean).sqrt()
    }

    /// Returns the sum of all the elements of the sample
    ///
    /// - Time: `O(length)`
    pub fn sum(&self) -> A {
        crate::stats::sum(self)
    }

    /// Returns the sum of the squared deviations around the mean
    ///
    /// The `mean` can be optionally passed along to speed up (2X) the computation
    ///
    /// - Time: `O(length)`
    pub fn sum_of_squares(&self, mean: Option<A>) -> A {
        let mean = mean.unwrap_or_else(|| self.mean());

        crate::stats::sum_of_squares(self, mean)
    }

    /// Returns the variance of the sample (`n - 1` denominator)
    ///
    /// The `mean` can be optionally passed along to speed up (2X) the computation
    ///
    /// - Time: `O(length)`
    pub fn var(&self, mean: Option<A>) -> A {
        self.sum_of_squares(mean) / A::cast(self.len() - 1)
    }
}

impl<A> ops::Deref for Sample<A> {
    type Target = [A];

    fn deref(&self) -> &[A] {
        &self.0
    }
}

#[cfg(test)]
macro_rules! test {
    ($ty:ident) => {
        mod $ty {
            use quickcheck::TestResult;

            use crate::stats::univariate::Sample;

            quickcheck! {
                fn min_mean_max(size: usize, start: usize) -> TestResult {
                    if let Some(v) = crate::stats::test::vec::<$ty>(size, start) {
                        let sample = Sample::new(&v[start..]);
                        let (min, mean, max) = (sample.min(), sample.mean(), sample.max());

                        TestResult::from_bool(
                            (min < mean || relative_eq!(min, mean)) &&
                                (mean < max || relative_eq!(mean, max))
                        )
                    } else {
                        TestResult::discard()
                    }
                }

                fn variance_is_non_negative(size: usize, start: usize) -> TestResult {
                    if let Some(v) = crate::stats::test::vec::<$ty>(size, start) {
                        let sample = Sample::new(&v[start..]);

                        TestResult::from_bool(sample.var(None) >= 0.)
                    } else {
                        TestResult::discard()
                    }
                }
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::Sample;

    test!(f32);
    test!(f64);

    #[test]
    fn sample_variance_uses_bessel_correction() {
        let sample = Sample::new(&[2., 4., 4., 4., 5., 5., 7., 9.]);

        assert_relative_eq!(sample.mean(), 5.);
        assert_relative_eq!(sample.sum_of_squares(None), 32.);
        assert_relative_eq!(sample.var(None), 32. / 7.);
        assert_relative_eq!(sample.std_dev(Some(5.)), (32f64 / 7.).sqrt());
    }

    #[test]
    fn median_min_max() {
        let sample = Sample::new(&[6.3, 1.5, 9.0, 2.25]);

        assert_relative_eq!(sample.median(), 4.275);
        assert_eq!(sample.min(), 1.5);
        assert_eq!(sample.max(), 9.0);
    }

    #[test]
    #[should_panic]
    fn rejects_single_point() {
        Sample::new(&[1.0f64]);
    }
}
