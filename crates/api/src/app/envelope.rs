//! Uniform response body: `{status, message, body?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Every gateway response, success or failure, has this shape. `status`
/// mirrors the HTTP status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    pub status: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<T>,
}

impl<T> Envelope<T> {
    /// 200 with a body.
    pub fn ok(message: impl Into<String>, body: T) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            body: Some(body),
        }
    }
}

impl Envelope {
    /// Envelope without a body.
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            body: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
