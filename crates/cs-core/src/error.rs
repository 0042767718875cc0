//! Error types for calostat

use thiserror::Error;

/// calostat error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error (message only, the writer lives in a downstream crate)
    #[error("CSV error: {0}")]
    Csv(String),

    /// Columnar reader error
    #[error("ROOT error: {0}")]
    Root(String),

    /// Truth energy could not be derived from a file name
    #[error("Cannot deduce truth energy from: {0}")]
    TruthEnergy(String),

    /// File discovery matched nothing
    #[error("No input files matched pattern '{pattern}' in {dir}")]
    NoInputFiles {
        /// Directory that was scanned.
        dir: String,
        /// Wildcard pattern that was applied.
        pattern: String,
    },

    /// Named column is not present in the event source
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// No event survived the per-event selection
    #[error("No events survive selection for '{collection}' (truth {truth_gev} GeV)")]
    EmptySelection {
        /// Collection (branch) name.
        collection: String,
        /// Truth energy of the file being processed.
        truth_gev: f64,
    },

    /// Histogram has no usable content for the requested operation
    #[error("Degenerate histogram: {0}")]
    DegenerateHistogram(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
