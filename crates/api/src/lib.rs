//! HTTP gateway: routing, session cookies, and request/response mapping onto
//! the auth, profile and messages backends.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod server;
pub mod session;
