//! # cs-core
//!
//! Shared building blocks for calostat: the error type, the 1D histogram used
//! by both analysis pipelines, Gaussian fit results, and the fitter trait that
//! keeps the response processor independent of a concrete minimizer.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::GaussianFitter;
pub use types::{GaussianFit, GaussianSeed, Histogram1D, UpperEdge};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
