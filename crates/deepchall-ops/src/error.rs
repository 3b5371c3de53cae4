//! Error types for the operations layer.

use std::path::PathBuf;

use deepchall_backends::BackendError;
use deepchall_core::ShapeError;
use thiserror::Error;

/// Result type for operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur while configuring or running a benchmark.
#[derive(Debug, Error)]
pub enum OpsError {
    /// The run configuration is malformed.
    #[error("invalid configuration: {0}")]
    ConfigValidation(String),

    /// A configuration entry names a preset that is not registered.
    #[error("unknown {kind} preset '{name}'")]
    UnknownPreset { kind: &'static str, name: String },

    /// A model needs a parameter the run does not supply.
    #[error("net '{net}' does not support runs without '{param}'")]
    UnsupportedParameter { net: String, param: String },

    /// A parameter is missing or has the wrong type.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// A language's backend emits symbols outside the language alphabet.
    #[error("language '{lang}' declares {declared} symbols but its backend uses {backend}")]
    AlphabetMismatch {
        lang: String,
        declared: usize,
        backend: usize,
    },

    /// A run pair references a configured instance that does not exist.
    #[error("no configured {kind} instance named '{name}'")]
    UnknownInstance { kind: &'static str, name: String },

    /// Backend construction failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Language and backend shapes disagree.
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    /// Failed to read a configuration file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpsError {
    /// Create a config validation error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigValidation(message.into())
    }

    /// Create an invalid parameter error.
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported parameter error.
    pub fn unsupported(net: impl Into<String>, param: impl Into<String>) -> Self {
        Self::UnsupportedParameter {
            net: net.into(),
            param: param.into(),
        }
    }
}
