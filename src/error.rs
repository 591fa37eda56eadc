// src/error.rs

//! Unified error handling for the vacancy collector.

use std::fmt;

use thiserror::Error;

/// Result type alias for vacancy operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Raw vacancy data is not a JSON object
    #[error("Invalid vacancy record: expected a JSON object, got {0}")]
    InvalidRecord(String),

    /// Raw vacancy data has no usable `id`
    #[error("Vacancy record has no id")]
    MissingId,

    /// Salary currency has no entry in the rate table
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Remote API answered with a non-success status
    #[error("Fetch failed for {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    /// No stored vacancy with the given id
    #[error("Vacancy {0} not found in store")]
    NotFound(String),

    /// Nothing stored, so nothing to export
    #[error("Vacancy store is empty")]
    EmptyStore,

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create an invalid-record error describing what was received instead.
    pub fn invalid_record(received: impl fmt::Display) -> Self {
        Self::InvalidRecord(received.to_string())
    }

    /// Create a fetch error for a non-success response.
    pub fn fetch(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Fetch {
            url: url.into(),
            status: status.as_u16(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Fetch { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_message() {
        let err = AppError::fetch(
            "https://api.hh.ru/vacancies/1",
            reqwest::StatusCode::NOT_FOUND,
        );
        assert_eq!(
            err.to_string(),
            "Fetch failed for https://api.hh.ru/vacancies/1: HTTP 404"
        );
    }

    #[test]
    fn test_transient_statuses() {
        let server = AppError::fetch("u", reqwest::StatusCode::BAD_GATEWAY);
        let throttled = AppError::fetch("u", reqwest::StatusCode::TOO_MANY_REQUESTS);
        let missing = AppError::fetch("u", reqwest::StatusCode::NOT_FOUND);

        assert!(server.is_transient());
        assert!(throttled.is_transient());
        assert!(!missing.is_transient());
        assert!(!AppError::EmptyStore.is_transient());
    }
}
