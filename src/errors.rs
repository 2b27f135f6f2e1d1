use serde::{Deserialize, Serialize};

/// Error payload rendered by the CLI when a forecast request fails
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error category (e.g., "invalid_argument", "not_found")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

impl From<&ServiceError> for ErrorResponse {
    fn from(error: &ServiceError) -> Self {
        Self {
            error: error.error_code().to_string(),
            message: error.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error, Serialize)]
pub enum ServiceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Event error: {0}")]
    EventError(String),
}

impl ServiceError {
    /// Wraps a persistence failure so it reaches the caller unchanged.
    pub fn data_unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        ServiceError::DataUnavailable(format!("{}: {}", context, err))
    }

    /// Stable machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::DataUnavailable(_) => "data_unavailable",
            Self::EventError(_) => "internal_error",
        }
    }

    /// Returns the error message suitable for rendering to an operator.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::EventError(_) => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}
