//! Error types for Trailmark operations.
//!
//! The pipeline stages themselves (extract, classify, synthesize,
//! normalize) are total and never fail. [`TrailmarkError`] covers the
//! I/O edges around them: fetching pages, reading and writing files,
//! decoding JSON, loading configuration, and per-record failures
//! reported by the batch driver.
//!
//! # Example
//!
//! ```rust
//! use trailmark_core::{TrailmarkError, Result};
//!
//! fn read_rows(json: &str) -> Result<Vec<trailmark_core::ListingRow>> {
//!     if json.trim().is_empty() {
//!         return Err(TrailmarkError::ConfigError("empty input".to_string()));
//!     }
//!     Ok(serde_json::from_str(json)?)
//! }
//! # assert!(read_rows("").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Trailmark.
#[derive(Error, Debug)]
pub enum TrailmarkError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, non-success statuses and other
    /// transport problems raised while fetching a walk page.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid CSS selector or otherwise unusable markup query.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File read/write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// JSON encode/decode errors for listing rows, records and checkpoints.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration errors.
    ///
    /// Returned when a batch configuration file is unreadable or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single record could not be turned into a walk.
    ///
    /// The batch driver logs this and moves on to the next input.
    #[error("Record {index} ({title}) failed: {reason}")]
    RecordFailed { index: usize, title: String, reason: String },
}

/// Result type alias for TrailmarkError.
pub type Result<T> = std::result::Result<T, TrailmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrailmarkError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_record_failed_error() {
        let err = TrailmarkError::RecordFailed { index: 7, title: "Neist Point".to_string(), reason: "boom".to_string() };
        let message = err.to_string();
        assert!(message.contains('7'));
        assert!(message.contains("Neist Point"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_timeout_error() {
        let err = TrailmarkError::Timeout { timeout: 15 };
        assert!(err.to_string().contains("15"));
    }

    #[test]
    fn test_json_error_conversion() {
        let err: TrailmarkError = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err().into();
        assert!(matches!(err, TrailmarkError::JsonError(_)));
    }
}
