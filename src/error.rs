//! Error taxonomy for the simulator.
//!
//! Only the two fatal categories are represented here. Protocol
//! inconsistencies and malformed trace records are always recovered
//! locally (logged as warnings) and never surface as an [`LlcError`].

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type returned from `main` and from configuration
/// construction.
#[derive(Debug, Error)]
pub enum LlcError {
    /// A cache geometry or CLI value could not produce a valid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A caller misused a public API (e.g. an out-of-range way index).
    #[error("usage error: {0}")]
    Usage(String),

    /// The trace file could not be opened or read.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type LlcResult<T> = Result<T, LlcError>;
