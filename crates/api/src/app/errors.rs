use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use mailgate_clients::{BackendError, BackendResult, Code};

use crate::app::envelope::Envelope;
use crate::session::InvalidHeaderValue;

/// Message used for every 500 that does not come with a route default.
pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Handler-level error. Always renders as an [`Envelope`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or invalid client input, resolved locally.
    #[error("{0}")]
    BadRequest(String),

    /// Missing credentials, resolved locally.
    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    /// The client stopped sending the request body.
    #[error("{0}")]
    RequestTimeout(String),

    /// A backend call failed; translated by [`map_error`].
    #[error("backend call failed: {source}")]
    Backend {
        source: BackendError,
        default_message: &'static str,
    },

    /// Gateway-side failure. The detail is logged, never sent.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn backend(source: BackendError, default_message: &'static str) -> Self {
        Self::Backend {
            source,
            default_message,
        }
    }

    /// HTTP status and client-visible message.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            ApiError::RequestTimeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg.clone()),
            ApiError::Backend {
                source,
                default_message,
            } => map_error(source, default_message),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else if matches!(self, ApiError::Backend { .. }) {
            tracing::warn!(status = status.as_u16(), error = %self, "backend rejected request");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        Envelope::message(status, message).into_response()
    }
}

/// Message for a request whose body stalled past the read timeout.
pub const BODY_TIMEOUT_MESSAGE: &str = "request body timed out";

/// True when `err`, or anything in its source chain, is the body read timeout.
pub fn is_body_timeout(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<tower_http::timeout::TimeoutError>() {
            return true;
        }
        current = err.source();
    }
    false
}

impl From<InvalidHeaderValue> for ApiError {
    fn from(err: InvalidHeaderValue) -> Self {
        ApiError::Internal(format!("cannot encode header: {err}"))
    }
}

/// Translate a backend failure into an HTTP status and message.
///
/// Typed codes with a client-safe meaning keep the backend's message (or the
/// default when it is blank). Everything else is a 500 with `default_message`;
/// backend text is never echoed for those.
pub fn map_error(err: &BackendError, default_message: &str) -> (StatusCode, String) {
    let BackendError::Status { code, message } = err else {
        return (StatusCode::INTERNAL_SERVER_ERROR, default_message.to_string());
    };

    let status = match code {
        Code::Unauthenticated => StatusCode::UNAUTHORIZED,
        Code::InvalidArgument => StatusCode::BAD_REQUEST,
        Code::NotFound => StatusCode::NOT_FOUND,
        Code::PermissionDenied => StatusCode::FORBIDDEN,
        Code::AlreadyExists => StatusCode::CONFLICT,
        _ => return (StatusCode::INTERNAL_SERVER_ERROR, default_message.to_string()),
    };

    let message = if message.trim().is_empty() {
        default_message.to_string()
    } else {
        message.clone()
    };
    (status, message)
}

/// Attach a route's default message to a backend result.
pub trait BackendResultExt<T> {
    fn or_api_error(self, default_message: &'static str) -> Result<T, ApiError>;
}

impl<T> BackendResultExt<T> for BackendResult<T> {
    fn or_api_error(self, default_message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::backend(e, default_message))
    }
}
