//! Error types for backend API calls.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the device backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request was rejected as invalid, locally or by the server
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        /// Field name to messages.
        fields: BTreeMap<String, Vec<String>>,
    },

    /// The addressed resource does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Missing, expired or insufficient credentials
    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    /// Connection, timeout or transport failure
    #[error("Network error: {message}")]
    Network { message: String },

    /// Server returned a 5xx response
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("Unexpected response ({status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// 2xx response whose envelope reports `success: false`
    #[error("Request rejected: {message}")]
    Rejected { message: String },

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid base URL or path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Laravel-style error body: `{"message": "...", "errors": {"field": ["..."]}}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: BTreeMap<String, Vec<String>>,
}

impl ApiError {
    /// Stable identifier for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Unauthorized { .. } => "unauthorized",
            ApiError::Network { .. } => "network_error",
            ApiError::Server { .. } => "server_error",
            ApiError::UnexpectedStatus { .. } => "unexpected_status",
            ApiError::Rejected { .. } => "rejected",
            ApiError::Decode(_) => "decode_error",
            ApiError::InvalidUrl(_) => "invalid_url",
        }
    }

    /// Map a transport-level failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network {
                message: err.to_string(),
            }
        }
    }

    /// Map a non-success HTTP status and its body.
    pub fn from_status(status: StatusCode, body: &str, resource: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                let text = body.trim();
                if text.is_empty() {
                    status.canonical_reason().unwrap_or("request failed").to_string()
                } else {
                    text.to_string()
                }
            });

        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Validation {
                message,
                fields: parsed.errors,
            },
            StatusCode::NOT_FOUND => ApiError::NotFound {
                resource: resource.to_string(),
            },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized { message },
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                message,
            },
            s => ApiError::UnexpectedStatus {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Field-level messages for validation failures, `None` for other errors.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ApiError::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }
}
