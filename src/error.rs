//! Error types for the Denshikawa client.
//!
//! Uses `thiserror` for structured error definitions. `ApiError` is the
//! single error type crossing the network boundary; config and session
//! persistence have their own types.

use thiserror::Error;

/// Errors produced by API calls, from request validation through transport.
///
/// This type is `Clone` so that de-duplicated concurrent queries can all
/// observe the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Request payload or response body failed schema validation.
    /// Never retried and never silently coerced.
    #[error("validation failed{}: {message}", field_suffix(.field))]
    Validation {
        /// Failing field, when known. `None` for response shape mismatches.
        field: Option<String>,
        message: String,
    },

    /// Server rejected the request with a non-401 status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 401 that could not be resolved by a token refresh, or a second
    /// 401 on an already-retried request. The session has been cleared.
    #[error("authentication required")]
    Auth,

    /// Timeout or connectivity failure.
    #[error("network error: {0}")]
    Network(String),
}

fn field_suffix(field: &Option<String>) -> String {
    match field {
        Some(f) => format!(" for '{f}'"),
        None => String::new(),
    }
}

impl ApiError {
    /// Builds a response-shape validation error (no field attribution).
    pub fn bad_response(message: impl Into<String>) -> Self {
        ApiError::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Returns the HTTP status if this is an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when re-authentication is required to proceed.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors are not Clone, so capture them as text. Timeouts
        // and connection failures are all "network" from the caller's view.
        ApiError::Network(if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            err.to_string()
        })
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errs: validator::ValidationErrors) -> Self {
        // Report the first failing field; the request fails fast before
        // transmission either way.
        let (field, message) = errs
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value for '{field}'"));
                (Some(field.to_string()), message)
            })
            .unwrap_or((None, "invalid request payload".to_string()));
        ApiError::Validation { field, message }
    }
}

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Error type for the persisted session store.
///
/// Store failures never propagate past the session layer; they degrade
/// the session to in-memory-only operation for the process lifetime.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to read or write the session file
    #[error("Failed to access session store: {0}")]
    Io(#[from] std::io::Error),

    /// Session file contains invalid JSON
    #[error("Failed to parse session store: {0}")]
    Parse(#[from] serde_json::Error),

    /// No directory available to place the session file
    #[error("Could not determine data directory")]
    NoDataDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_field_scoped() {
        let err = ApiError::Validation {
            field: Some("email".to_string()),
            message: "Invalid email format".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "validation failed for 'email': Invalid email format"
        );
    }

    #[test]
    fn test_validation_error_global() {
        let err = ApiError::bad_response("missing field `total`");
        assert_eq!(err.to_string(), "validation failed: missing field `total`");
    }

    #[test]
    fn test_http_error_carries_status() {
        let err = ApiError::Http {
            status: 404,
            message: "manga not found".to_string(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_auth());
    }

    #[test]
    fn test_auth_error_detection() {
        assert!(ApiError::Auth.is_auth());
        assert_eq!(ApiError::Auth.status(), None);
    }

    #[test]
    fn test_errors_are_cloneable() {
        let err = ApiError::Network("connection reset".to_string());
        let copy = err.clone();
        assert_eq!(err, copy);
    }
}
