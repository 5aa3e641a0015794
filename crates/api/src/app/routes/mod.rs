use axum::Router;

pub mod auth;
pub mod folders;
pub mod messages;
pub mod profile;
pub mod system;
pub mod uploads;

/// Routes reachable without a session.
pub fn public_router() -> Router {
    Router::new().nest("/auth", auth::router())
}

/// Routes that require the access token cookie.
pub fn protected_router(max_upload_bytes: usize) -> Router {
    Router::new()
        .nest("/user", profile::router(max_upload_bytes))
        .nest("/messages", messages::router(max_upload_bytes))
}
