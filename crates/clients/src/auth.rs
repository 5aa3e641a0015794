//! Auth service adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mailgate_auth::{AccessToken, RefreshToken, TokenPair};

use crate::context::CallContext;
use crate::error::BackendResult;
use crate::rpc::{Empty, RpcClient};

pub const SERVICE: &str = "auth.AuthService";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub gender: String,
    pub birthday: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: RefreshToken,
}

/// New access token; `refresh_token` is set only when the service rotated it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: RefreshToken,
}

/// Authentication backend contract.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, ctx: &CallContext, req: LoginRequest) -> BackendResult<TokenPair>;

    async fn signup(&self, ctx: &CallContext, req: SignupRequest) -> BackendResult<TokenPair>;

    async fn refresh(&self, ctx: &CallContext, req: RefreshRequest) -> BackendResult<RefreshResponse>;

    async fn logout(&self, ctx: &CallContext, req: LogoutRequest) -> BackendResult<()>;
}

/// [`AuthService`] over the JSON transport.
#[derive(Debug, Clone)]
pub struct HttpAuthClient {
    rpc: RpcClient,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>) -> BackendResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(base_url, SERVICE)?,
        })
    }
}

#[async_trait]
impl AuthService for HttpAuthClient {
    async fn login(&self, ctx: &CallContext, req: LoginRequest) -> BackendResult<TokenPair> {
        self.rpc.call(ctx, "Login", &req).await
    }

    async fn signup(&self, ctx: &CallContext, req: SignupRequest) -> BackendResult<TokenPair> {
        self.rpc.call(ctx, "Signup", &req).await
    }

    async fn refresh(&self, ctx: &CallContext, req: RefreshRequest) -> BackendResult<RefreshResponse> {
        self.rpc.call(ctx, "Refresh", &req).await
    }

    async fn logout(&self, ctx: &CallContext, req: LogoutRequest) -> BackendResult<()> {
        let _: Empty = self.rpc.call(ctx, "Logout", &req).await?;
        Ok(())
    }
}
