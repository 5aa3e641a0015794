use axum::http::StatusCode;

use crate::app::envelope::Envelope;

pub async fn health() -> Envelope {
    Envelope::message(StatusCode::OK, "ok")
}

/// Envelope for paths no route matches.
pub async fn not_found() -> Envelope {
    Envelope::message(StatusCode::NOT_FOUND, "route not found")
}
