use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use mailgate_clients::auth::{LogoutRequest, RefreshRequest};

use crate::app::dto::{LoginBody, RefreshedBody, SignupBody};
use crate::app::envelope::Envelope;
use crate::app::errors::{ApiError, BackendResultExt};
use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::context::RequestId;
use crate::session::SessionManager;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(body): ApiJson<LoginBody>,
) -> Result<Response, ApiError> {
    let req = body.into_request()?;
    let ctx = services.call_context(&request_id);
    tracing::debug!(request_id = %request_id, "auth.login");

    let tokens = ctx
        .run(services.auth.login(&ctx, req))
        .await
        .or_api_error("failed to login")?;

    let mut headers = HeaderMap::new();
    services.sessions.set_auth_cookies(&mut headers, &tokens)?;
    Ok((headers, Envelope::ok("login successful", tokens)).into_response())
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(body): ApiJson<SignupBody>,
) -> Result<Response, ApiError> {
    let req = body.into_request()?;
    let ctx = services.call_context(&request_id);
    tracing::debug!(request_id = %request_id, "auth.signup");

    let tokens = ctx
        .run(services.auth.signup(&ctx, req))
        .await
        .or_api_error("failed to sign up")?;

    let mut headers = HeaderMap::new();
    services.sessions.set_auth_cookies(&mut headers, &tokens)?;
    Ok((headers, Envelope::ok("signup successful", tokens)).into_response())
}

/// Exchange the refresh cookie for a new access token. The refresh cookie is
/// rewritten only when the auth service rotated it.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let refresh_token = SessionManager::refresh_token(&headers)
        .ok_or_else(|| ApiError::unauthenticated("missing refresh token"))?;
    let ctx = services.call_context(&request_id);
    tracing::debug!(request_id = %request_id, "auth.refresh");

    let refreshed = ctx
        .run(services.auth.refresh(&ctx, RefreshRequest { refresh_token }))
        .await
        .or_api_error("failed to refresh token")?;

    let mut out = HeaderMap::new();
    services.sessions.set_access_cookie(&mut out, &refreshed.access_token)?;
    if let Some(rotated) = refreshed.refresh_token.as_ref().filter(|t| !t.is_empty()) {
        services.sessions.set_refresh_cookie(&mut out, rotated)?;
    }

    let body = RefreshedBody {
        access_token: refreshed.access_token,
    };
    Ok((out, Envelope::ok("token refreshed", body)).into_response())
}

/// Revoke the refresh token upstream (when there is one) and clear both
/// cookies. Cookies are cleared even when the auth service fails.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Response {
    let mut cleared = HeaderMap::new();
    services.sessions.clear_auth_cookies(&mut cleared);

    let Some(refresh_token) = SessionManager::refresh_token(&headers) else {
        tracing::debug!(request_id = %request_id, "auth.logout without refresh cookie");
        return (cleared, Envelope::message(StatusCode::OK, "logout successful")).into_response();
    };

    let ctx = services.call_context(&request_id);
    tracing::debug!(request_id = %request_id, "auth.logout");

    let outcome = ctx
        .run(services.auth.logout(&ctx, LogoutRequest { refresh_token }))
        .await
        .or_api_error("failed to logout");

    match outcome {
        Ok(()) => (cleared, Envelope::message(StatusCode::OK, "logout successful")).into_response(),
        Err(err) => (cleared, err).into_response(),
    }
}
