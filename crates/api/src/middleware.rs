use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::envelope::Envelope;
use crate::app::errors::ApiError;
use crate::context::{RequestId, SessionContext};
use crate::session::SessionManager;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest inbound request id that is reused as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Attach a [`RequestId`] to the request and echo it on the response.
pub async fn assign_request_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(RequestId::new)
        .unwrap_or_else(RequestId::generate);

    req.extensions_mut().insert(request_id.clone());

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Reject requests without an access token cookie; otherwise expose it to
/// handlers as a [`SessionContext`].
pub async fn require_session(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let token = SessionManager::access_token(req.headers())
        .ok_or_else(|| ApiError::unauthenticated("missing access token"))?;

    req.extensions_mut().insert(SessionContext::new(token));

    Ok(next.run(req).await)
}

/// Wrap framework-generated error responses (405, 408, oversized bodies) in an
/// envelope. JSON responses pass through untouched.
pub async fn ensure_envelope(res: Response) -> Response {
    let status = res.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return res;
    }

    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        return res;
    }

    let message = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_lowercase();
    let (mut parts, _) = res.into_parts();
    let mut wrapped = Envelope::message(status, message).into_response();
    // Keep headers such as `Allow` on a 405.
    parts.headers.remove(CONTENT_TYPE);
    parts.headers.remove(axum::http::header::CONTENT_LENGTH);
    for name in parts.headers.keys() {
        if wrapped.headers().contains_key(name) {
            continue;
        }
        for value in parts.headers.get_all(name) {
            wrapped.headers_mut().append(name.clone(), value.clone());
        }
    }
    wrapped
}
