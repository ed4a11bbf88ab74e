//! Classical statistics over small delimited datasets.
//!
//! ## Analyses
//! - Simple linear regression with F and t significance tests
//! - Descriptive statistics per column
//! - One-way and two-way (with interaction) analysis of variance
//! - Two-sample Student's t-test with pooled variance
//! - Principal component analysis of the numeric columns
//!
//! Every analysis is a pure function of its input. The `statlab` binary loads a dataset,
//! runs one analysis and prints the result as text, JSON or CSV.
//!
//! ```
//! let samples = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
//! let fit = statlab::regression::fit(&samples).unwrap();
//!
//! assert!((fit.slope - 0.6).abs() < 1e-12);
//! assert!((fit.intercept - 2.2).abs() < 1e-12);
//! ```

#![warn(bare_trait_objects)]
#![cfg_attr(
    feature = "cargo-clippy",
    allow(
        clippy::just_underscores_and_digits, // Used in the stats code
        clippy::many_single_char_names,      // Used in the stats code
    )
)]

#[cfg(test)]
#[macro_use]
extern crate approx;
#[cfg(test)]
#[macro_use]
extern crate quickcheck;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate serde_derive;

// Needs to be declared before other modules
// in order to be usable there.
#[macro_use]
mod macros_private;

pub mod anova;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod describe;
mod error;
mod format;
pub mod pca;
pub mod regression;
pub mod report;
pub mod stats;
pub mod ttest;

pub use crate::config::{ColorChoice, Config};
pub use crate::error::{Degeneracy, Error, Result};

lazy_static! {
    static ref DEBUG_ENABLED: bool = std::env::var_os("STATLAB_DEBUG").is_some();
}

fn debug_enabled() -> bool {
    *DEBUG_ENABLED
}
