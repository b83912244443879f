//! Error types for the test environment
//!
//! Messages name the failing lifecycle stage so a suite log reads as a
//! trail of what ran and where it stopped.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test environment
#[derive(Error, Debug)]
pub enum Error {
    // === Action Errors ===
    #[error("{0}")]
    Action(String),

    // === Lifecycle Errors ===
    #[error("Setup action {index} failed: {source}")]
    SetupFailed {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    // === Configuration Errors ===
    #[error("Invalid {kind} filter '{pattern}': {source}")]
    InvalidFilter {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Context Errors ===
    #[error("Context cancelled")]
    Cancelled,

    #[error("Context deadline exceeded")]
    DeadlineExceeded,

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an action failure from any displayable message
    pub fn action(message: impl std::fmt::Display) -> Self {
        Self::Action(message.to_string())
    }

    /// Create an invalid filter error for the named filter kind
    pub fn invalid_filter(kind: &'static str, pattern: &str, source: regex::Error) -> Self {
        Self::InvalidFilter {
            kind,
            pattern: pattern.to_string(),
            source,
        }
    }

    /// Wrap the error of the `index`-th setup action
    pub fn setup_failed(index: usize, source: Error) -> Self {
        Self::SetupFailed {
            index,
            source: Box::new(source),
        }
    }
}
