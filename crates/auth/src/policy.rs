use thiserror::Error;

/// Cookie carrying the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie carrying the long-lived refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// 15 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 15 * 60;

/// 7 days.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionPolicyError {
    #[error("token lifetimes must be positive (access={access}s, refresh={refresh}s)")]
    NonPositiveLifetime { access: i64, refresh: i64 },

    #[error("access token lifetime ({access}s) must be shorter than refresh token lifetime ({refresh}s)")]
    AccessOutlivesRefresh { access: i64, refresh: i64 },
}

/// Lifetimes of the two session tokens, in seconds.
///
/// Invariant: `0 < access_ttl < refresh_ttl`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl SessionPolicy {
    pub fn new(access_ttl_secs: i64, refresh_ttl_secs: i64) -> Result<Self, SessionPolicyError> {
        if access_ttl_secs <= 0 || refresh_ttl_secs <= 0 {
            return Err(SessionPolicyError::NonPositiveLifetime {
                access: access_ttl_secs,
                refresh: refresh_ttl_secs,
            });
        }
        if access_ttl_secs >= refresh_ttl_secs {
            return Err(SessionPolicyError::AccessOutlivesRefresh {
                access: access_ttl_secs,
                refresh: refresh_ttl_secs,
            });
        }
        Ok(Self {
            access_ttl_secs,
            refresh_ttl_secs,
        })
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cookie_lifetimes() {
        let p = SessionPolicy::default();
        assert_eq!(p.access_ttl_secs(), 900);
        assert_eq!(p.refresh_ttl_secs(), 604_800);
        assert_eq!(SessionPolicy::new(900, 604_800), Ok(p));
    }

    #[test]
    fn access_must_be_strictly_shorter() {
        assert!(matches!(
            SessionPolicy::new(600, 600),
            Err(SessionPolicyError::AccessOutlivesRefresh { .. })
        ));
        assert!(matches!(
            SessionPolicy::new(7200, 3600),
            Err(SessionPolicyError::AccessOutlivesRefresh { .. })
        ));
    }

    #[test]
    fn lifetimes_must_be_positive() {
        assert!(matches!(
            SessionPolicy::new(0, 3600),
            Err(SessionPolicyError::NonPositiveLifetime { .. })
        ));
        assert!(matches!(
            SessionPolicy::new(-5, 3600),
            Err(SessionPolicyError::NonPositiveLifetime { .. })
        ));
    }
}
