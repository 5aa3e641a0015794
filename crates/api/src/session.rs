//! Auth cookie lifecycle.
//!
//! Both cookies are `HttpOnly; Path=/; SameSite=Lax`. Lifetimes come from the
//! configured [`SessionPolicy`]; clearing writes an empty value with
//! `Max-Age=-1`.

use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use mailgate_auth::{
    AccessToken, RefreshToken, SessionPolicy, TokenPair, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};

pub use axum::http::header::InvalidHeaderValue;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct SessionManager {
    policy: SessionPolicy,
}

impl SessionManager {
    pub fn new(policy: SessionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Write both session cookies.
    pub fn set_auth_cookies(&self, headers: &mut HeaderMap, tokens: &TokenPair) -> Result<(), InvalidHeaderValue> {
        self.set_access_cookie(headers, &tokens.access_token)?;
        self.set_refresh_cookie(headers, &tokens.refresh_token)
    }

    pub fn set_access_cookie(&self, headers: &mut HeaderMap, token: &AccessToken) -> Result<(), InvalidHeaderValue> {
        let value = cookie(ACCESS_TOKEN_COOKIE, token.as_str(), self.policy.access_ttl_secs())?;
        headers.append(SET_COOKIE, value);
        Ok(())
    }

    pub fn set_refresh_cookie(&self, headers: &mut HeaderMap, token: &RefreshToken) -> Result<(), InvalidHeaderValue> {
        let value = cookie(REFRESH_TOKEN_COOKIE, token.as_str(), self.policy.refresh_ttl_secs())?;
        headers.append(SET_COOKIE, value);
        Ok(())
    }

    /// Expire both session cookies. Always succeeds.
    pub fn clear_auth_cookies(&self, headers: &mut HeaderMap) {
        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            if let Ok(value) = cookie(name, "", -1) {
                headers.append(SET_COOKIE, value);
            }
        }
    }

    /// Access token from the request cookies, if present and non-empty.
    pub fn access_token(headers: &HeaderMap) -> Option<AccessToken> {
        read_cookie(headers, ACCESS_TOKEN_COOKIE).map(AccessToken::new)
    }

    /// Refresh token from the request cookies, if present and non-empty.
    pub fn refresh_token(headers: &HeaderMap) -> Option<RefreshToken> {
        read_cookie(headers, REFRESH_TOKEN_COOKIE).map(RefreshToken::new)
    }
}

fn cookie(name: &str, value: &str, max_age: i64) -> Result<HeaderValue, InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax"
    ))
}

fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|v| !v.is_empty())
}
