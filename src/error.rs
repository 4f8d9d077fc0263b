//! Error types and handling for the `RouteGate` service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

use crate::http_client::{redact_error, redact_reqwest_error};

/// Main error type for the `RouteGate` service
#[derive(Error, Debug)]
pub enum RouteGateError {
    /// The client asked for a travel mode the upstream API does not know
    #[error(
        "Invalid travel mode: {mode}. Must be one of [DRIVE, WALK, BICYCLE, TRANSIT, TWO_WHEELER]"
    )]
    InvalidTravelMode { mode: String },

    /// Input validation errors
    #[error("{message}")]
    Validation { message: String },

    /// The Routes API answered with a non-2xx status
    #[error("Routes API returned status code {}", .status.as_u16())]
    Upstream { status: StatusCode, details: Value },

    /// DNS, connection and body decoding failures
    #[error("{message}")]
    Transport { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl RouteGateError {
    /// Create a new invalid travel mode error
    pub fn invalid_travel_mode<S: Into<String>>(mode: S) -> Self {
        Self::InvalidTravelMode { mode: mode.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream error from the status and parsed error body
    pub fn upstream(status: StatusCode, details: Value) -> Self {
        Self::Upstream { status, details }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// HTTP status reported to the caller for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteGateError::InvalidTravelMode { .. } | RouteGateError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            RouteGateError::Upstream { status, .. } => *status,
            RouteGateError::Transport { .. } | RouteGateError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body reported to the caller for this error
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            RouteGateError::Upstream { details, .. } => json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl From<reqwest_middleware::Error> for RouteGateError {
    fn from(err: reqwest_middleware::Error) -> Self {
        RouteGateError::transport(redact_error(err).to_string())
    }
}

impl From<reqwest::Error> for RouteGateError {
    fn from(err: reqwest::Error) -> Self {
        RouteGateError::transport(redact_reqwest_error(err).to_string())
    }
}

impl From<serde_json::Error> for RouteGateError {
    fn from(err: serde_json::Error) -> Self {
        RouteGateError::transport(err.to_string())
    }
}

impl IntoResponse for RouteGateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() && !matches!(self, RouteGateError::Upstream { .. }) {
            tracing::warn!(status = status.as_u16(), "Rejected request: {}", self);
        } else {
            tracing::error!(status = status.as_u16(), "Request failed: {}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
