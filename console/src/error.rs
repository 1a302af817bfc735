//! Error handling for the Facility Ops Console
//!
//! Every failure ends up as a toast; [`AppError::user_message`] picks the
//! most specific text available for it.

use serde_json::Value;
use shared::{extract_error_message, ApiStatus, InvalidTransition};
use thiserror::Error;

use crate::store::StoreError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Transport errors
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}")]
    Status { status: u16, body: Option<Value> },

    // The server answered 2xx but flagged the request as failed
    #[error("Request rejected ({status:?})")]
    Rejected { status: ApiStatus, body: Value },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // A page action arrived in the wrong phase
    #[error(transparent)]
    InvalidState(#[from] InvalidTransition),

    // Local persistence
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    // Export
    #[error("CSV export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Machine-readable code, logged next to the message
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Status { .. } => "HTTP_ERROR",
            AppError::Rejected { .. } => "REQUEST_REJECTED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidResponse(_) => "INVALID_RESPONSE",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Text for the error toast: the server's own message when it sent one,
    /// otherwise this error's description.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Status { body, .. } => {
                extract_error_message(body.as_ref(), Some(&self.to_string()))
            }
            AppError::Rejected { body, .. } => extract_error_message(Some(body), None),
            other => extract_error_message(None, Some(&other.to_string())),
        }
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias for console operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::GENERIC_ERROR_MESSAGE;

    #[test]
    fn test_status_error_prefers_server_message() {
        let err = AppError::Status {
            status: 400,
            body: Some(json!({"message": "Supplier is inactive"})),
        };
        assert_eq!(err.user_message(), "Supplier is inactive");

        let err = AppError::Status {
            status: 502,
            body: None,
        };
        assert_eq!(err.user_message(), "Server responded with status 502");
    }

    #[test]
    fn test_rejected_without_message_is_generic() {
        let err = AppError::Rejected {
            status: ApiStatus::Failed,
            body: json!({"status": "failed"}),
        };
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.code(), "REQUEST_REJECTED");
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("purchase-orders/9".into());
        assert_eq!(err.user_message(), "Resource not found: purchase-orders/9");
    }
}
