#![forbid(unsafe_code)]

//! Core domain model and business logic for BMI tracking.
//!
//! This crate provides:
//! - BMI computation and categorization
//! - Durable per-user record storage (SQLite)
//! - History statistics (mean/min/max)
//! - CSV export
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod engine;
pub mod store;
pub mod stats;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use engine::compute;
pub use store::{RecordStore, SqliteStore};
pub use stats::{summarize, summarize_records};
pub use export::{default_export_file_name, export_csv};
pub use config::Config;
