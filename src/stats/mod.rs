//! Statistics primitives shared by every analysis.
//!
//! The sample types are generic over the floating point type; the distributions and the
//! analyses built on top of them work in `f64`.


pub mod bivariate;
pub mod distribution;
pub mod eigen;
pub mod univariate;

mod float;
mod special;

pub use self::float::Float;

pub(crate) fn sum<A>(xs: &[A]) -> A
where
    A: Float,
{
    use std::ops::Add;

    xs.iter().cloned().fold(A::cast(0), Add::add)
}

/// Sum of the squared deviations of `xs` around `center`
pub(crate) fn sum_of_squares<A>(xs: &[A], center: A) -> A
where
    A: Float,
{
    xs.iter()
        .fold(A::cast(0), |acc, &x| acc + (center - x).powi(2))
}
