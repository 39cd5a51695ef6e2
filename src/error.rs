// src/error.rs

//! Unified error handling for the digest application.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for digest operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Atom feed could not be parsed
    #[error("XML error: {0}")]
    Xml(String),

    /// Malformed configuration or topic filter
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted store exists but is not valid store data
    #[error("Corrupt store at {path}: {message}")]
    CorruptStore { path: String, message: String },

    /// Upstream search failed for a topic
    #[error("Upstream error for {topic}: {message}")]
    Upstream { topic: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a corrupt-store error for the given file.
    pub fn corrupt_store(path: &Path, message: impl fmt::Display) -> Self {
        Self::CorruptStore {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    /// Create an upstream error with topic context.
    pub fn upstream(topic: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Upstream {
            topic: topic.into(),
            message: message.to_string(),
        }
    }

    /// Create a feed parsing error.
    pub fn xml(message: impl fmt::Display) -> Self {
        Self::Xml(message.to_string())
    }
}
