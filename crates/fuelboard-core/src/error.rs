//! Error types for fuelboard-core
//!
//! The analytics engines are infallible; errors only come from the store
//! (file I/O, JSON) and from entry lookups.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for fuelboard operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    // ===================
    // Store Errors
    // ===================
    #[error("Entry not found: {id}")]
    EntryNotFound { id: String },

    #[error("Ambiguous ID prefix '{prefix}': matches {count} entries")]
    AmbiguousId { prefix: String, count: usize },

    #[error("Invalid entry: {message}")]
    InvalidEntry { message: String },
}

impl CoreError {
    /// Actionable hint for the user, if there is one
    pub fn suggestion(&self) -> Option<String> {
        match self {
            CoreError::FileRead { path, .. } => Some(format!(
                "Check permissions: chmod +r {}",
                path.display()
            )),
            CoreError::FileWrite { path, .. } => Some(format!(
                "Check that the directory is writable: {}",
                path.parent().unwrap_or(path.as_path()).display()
            )),
            CoreError::JsonParse { .. } => {
                Some("Validate JSON syntax with: jq . <file>".to_string())
            }
            CoreError::EntryNotFound { .. } => {
                Some("List entries with: fuelboard history".to_string())
            }
            CoreError::AmbiguousId { .. } => Some("Use a longer ID prefix".to_string()),
            CoreError::InvalidEntry { .. } => None,
        }
    }
}
