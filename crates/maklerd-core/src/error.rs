// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Maklerd performance assistant.

use thiserror::Error;

/// The primary error type used across all Maklerd crates.
///
/// The taxonomy separates transient provider outages (worth retrying) from
/// permanent input errors and local resource problems, so callers can decide
/// whether to retry, reject, or surface the failure.
#[derive(Debug, Error)]
pub enum MaklerError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Assistant-platform errors (API failure, run failure, malformed event).
    ///
    /// `retryable` is true for transient conditions such as rate limits and
    /// upstream overload.
    #[error("provider error: {message}")]
    Provider {
        message: String,
        retryable: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller supplied input the system cannot act on (e.g. a broker id
    /// that is not numeric, a file extension outside the allowlist).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Local data errors (missing spreadsheet, missing column, malformed cell).
    #[error("data error: {message}")]
    Data {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Channel errors between the gateway and a session task (relay closed,
    /// stream already claimed).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MaklerError {
    /// Convenience constructor for a transient provider error.
    pub fn provider_transient(message: impl Into<String>) -> Self {
        MaklerError::Provider {
            message: message.into(),
            retryable: true,
            source: None,
        }
    }

    /// Convenience constructor for a permanent provider error.
    pub fn provider_permanent(message: impl Into<String>) -> Self {
        MaklerError::Provider {
            message: message.into(),
            retryable: false,
            source: None,
        }
    }

    /// Returns true when retrying the operation could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MaklerError::Provider {
                retryable: true,
                ..
            } | MaklerError::Timeout { .. }
        )
    }
}
