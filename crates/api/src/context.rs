use mailgate_auth::AccessToken;

/// Correlation ID for a request.
///
/// Taken from the inbound `x-request-id` header when present, generated
/// otherwise, and forwarded to every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session context for a request on a protected route.
///
/// The access token is not validated here; the backend owning the resource
/// does that when the token is forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    access_token: AccessToken,
}

impl SessionContext {
    pub fn new(access_token: AccessToken) -> Self {
        Self { access_token }
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }
}
