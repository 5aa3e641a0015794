//! Gateway configuration.
//!
//! Built once at startup and handed to the router; nothing here is global.

use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

use mailgate_auth::{SessionPolicy, SessionPolicyError, DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};
use mailgate_core::{AvatarUrlError, AvatarUrlNormalizer, DEFAULT_STORAGE_HOST};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_AUTH_URL: &str = "http://auth:50051";
pub const DEFAULT_PROFILE_URL: &str = "http://profile:50052";
pub const DEFAULT_MESSAGES_URL: &str = "http://messages:50053";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Session(#[from] SessionPolicyError),

    #[error(transparent)]
    StorageHost(#[from] AvatarUrlError),
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub auth_url: String,
    pub profile_url: String,
    pub messages_url: String,
    /// Host substituted for loopback hosts in object-storage URLs.
    pub avatars: AvatarUrlNormalizer,
    /// Upper bound for a whole request, enforced by a timeout layer.
    pub request_timeout: Duration,
    /// Deadline applied to each backend call; never longer than `request_timeout`.
    pub backend_timeout: Duration,
    /// Bound on receiving request headers, and on each stall while reading a body.
    pub read_timeout: Duration,
    /// A connection with no traffic for this long is closed.
    pub idle_timeout: Duration,
    /// Maximum size of a single uploaded file.
    pub max_upload_bytes: usize,
    pub session: SessionPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            messages_url: DEFAULT_MESSAGES_URL.to_string(),
            avatars: AvatarUrlNormalizer::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            backend_timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session: SessionPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (unset keys fall back to defaults).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = lookup("GATEWAY_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| invalid("GATEWAY_BIND_ADDR", e))?;

        let storage_host = lookup("OBJECT_STORAGE_HOST").unwrap_or_else(|| DEFAULT_STORAGE_HOST.to_string());

        let request_timeout = Duration::from_secs(parse_or(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);
        if request_timeout.is_zero() {
            return Err(invalid("REQUEST_TIMEOUT_SECS", "must be positive"));
        }
        let backend_timeout = Duration::from_secs(parse_or(
            &lookup,
            "BACKEND_TIMEOUT_SECS",
            DEFAULT_BACKEND_TIMEOUT_SECS,
        )?);
        if backend_timeout.is_zero() {
            return Err(invalid("BACKEND_TIMEOUT_SECS", "must be positive"));
        }

        let read_timeout = positive_secs(&lookup, "READ_TIMEOUT_SECS", DEFAULT_READ_TIMEOUT_SECS)?;
        let idle_timeout = positive_secs(&lookup, "IDLE_TIMEOUT_SECS", DEFAULT_IDLE_TIMEOUT_SECS)?;

        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if max_upload_bytes == 0 {
            return Err(invalid("MAX_UPLOAD_BYTES", "must be positive"));
        }

        let session = SessionPolicy::new(
            parse_or(&lookup, "ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TTL_SECS)?,
            parse_or(&lookup, "REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TTL_SECS)?,
        )?;

        Ok(Self {
            bind_addr,
            auth_url: lookup("AUTH_SERVICE_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            profile_url: lookup("PROFILE_SERVICE_URL").unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string()),
            messages_url: lookup("MESSAGES_SERVICE_URL").unwrap_or_else(|| DEFAULT_MESSAGES_URL.to_string()),
            avatars: AvatarUrlNormalizer::new(storage_host)?,
            request_timeout,
            backend_timeout: backend_timeout.min(request_timeout),
            read_timeout,
            idle_timeout,
            max_upload_bytes,
            session,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| invalid(var, e)),
        None => Ok(default),
    }
}

fn positive_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let secs = parse_or(lookup, var, default)?;
    if secs == 0 {
        return Err(invalid(var, "must be positive"));
    }
    Ok(Duration::from_secs(secs))
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}
