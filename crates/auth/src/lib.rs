//! `mailgate-auth` — transport-agnostic session model.
//!
//! Sessions are carried entirely by two opaque tokens issued by the auth
//! service. This crate knows their names and lifetimes; writing them to HTTP
//! cookies is the API layer's job.

pub mod policy;
pub mod tokens;

pub use policy::{
    SessionPolicy, SessionPolicyError, ACCESS_TOKEN_COOKIE, DEFAULT_ACCESS_TTL_SECS,
    DEFAULT_REFRESH_TTL_SECS, REFRESH_TOKEN_COOKIE,
};
pub use tokens::{AccessToken, RefreshToken, TokenPair};
