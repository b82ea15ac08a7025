// SPDX-FileCopyrightText: 2026 Hintly Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Hintly tutoring backend.

use thiserror::Error;

/// The primary error type used across all Hintly adapter traits and core operations.
#[derive(Debug, Error)]
pub enum HintlyError {
    /// Configuration errors (invalid TOML, missing credentials, unusable endpoints).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation service errors (API failure, malformed response, quota).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Frustration classifier errors. Callers treat these as non-fatal.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Missing or unknown credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller does not own the requested session.
    #[error("session {session_id} does not belong to the requesting user")]
    Forbidden { session_id: String },

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A concurrent writer modified the session since it was read.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl HintlyError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a classifier error without an underlying source.
    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
