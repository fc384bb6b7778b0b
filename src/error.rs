// SPDX-License-Identifier: MIT

//! Typed error handling for roundup-rs
//!
//! One top-level error for workflow runs plus focused error types for the
//! model, source and store seams. Model errors are recovered close to the
//! call site (every model-backed step has a deterministic fallback);
//! everything that reaches `RoundupError` aborts the run.

use thiserror::Error;

use crate::workflow::state::AgentKind;

/// Top-level error type for roundup-rs
#[derive(Debug, Error)]
pub enum RoundupError {
    /// A source fetch failed; the run cannot continue without the document
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The task store could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The run was cancelled by the caller
    #[error("Workflow cancelled")]
    Cancelled,

    /// Run preconditions violated (empty query, empty app id, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors (missing fields, bad values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors from the data sources behind the collector agents
#[derive(Debug, Error)]
#[error("Failed to fetch {kind} data: {message}")]
pub struct FetchError {
    pub kind: AgentKind,
    pub message: String,
}

/// Errors from the durable task store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store file could not be read
    #[error("Failed to read task store {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Store file could not be written
    #[error("Failed to write task store {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// API errors from the model service
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),

    /// No model is configured for this run
    #[error("No model available")]
    Unavailable,

    /// The call was cancelled before the model answered
    #[error("Model call cancelled")]
    Cancelled,
}

impl RoundupError {
    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl FetchError {
    pub fn new(kind: AgentKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl ModelError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}
