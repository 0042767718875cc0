//! Error types for the TTree reader.

use thiserror::Error;

/// Errors raised while reading ROOT files.
#[derive(Error, Debug)]
pub enum RootError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the `root` magic bytes.
    #[error("not a ROOT file (bad magic)")]
    BadMagic,

    /// Attempted to read past the end of a buffer.
    #[error("buffer underflow at offset {offset}: need {need} bytes, have {have}")]
    BufferUnderflow {
        /// Read position.
        offset: usize,
        /// Bytes requested.
        need: usize,
        /// Bytes available.
        have: usize,
    },

    /// A compressed block could not be inflated.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Malformed streamer data.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// No TTree with this name.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// No branch with this name in the tree.
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    /// Branch payload does not match its declared type.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

/// Result alias for the reader.
pub type Result<T> = std::result::Result<T, RootError>;
