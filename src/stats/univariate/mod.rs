//! Univariate analysis

mod percentiles;
mod sample;

pub use self::percentiles::Percentiles;
pub use self::sample::Sample;
