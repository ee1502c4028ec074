//! Error types for the bmi_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bmi_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Weight, height or user id rejected before anything is computed or stored
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The database could not be opened, queried or written
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The database location could not be prepared
    #[error("Storage error: cannot create data directory {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored row failed validation when read back
    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Aggregation requested for a user with no records
    #[error("No records for user '{0}'")]
    NoData(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
