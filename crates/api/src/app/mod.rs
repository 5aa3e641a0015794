//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: backend adapters and shared per-process state
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: client request/response shapes and their validation
//! - `envelope.rs` / `errors.rs`: the uniform response body and error mapping

use std::sync::Arc;

use axum::{middleware as mw, Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::middleware;

pub mod dto;
pub mod envelope;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::{AppServices, Backends};

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(config: &GatewayConfig, backends: Backends) -> Router {
    let services = Arc::new(AppServices::new(config, backends));

    // Protected routes: require the access token cookie.
    let protected = routes::protected_router(config.max_upload_bytes)
        .route_layer(mw::from_fn(middleware::require_session));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .fallback(routes::system::not_found)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(mw::from_fn(middleware::assign_request_id))
                .layer(TraceLayer::new_for_http())
                .layer(mw::map_response(middleware::ensure_envelope))
                .layer(TimeoutLayer::new(config.request_timeout))
                .layer(RequestBodyTimeoutLayer::new(config.read_timeout)),
        )
}
