//! Profile service adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mailgate_core::{ProfileRecord, UploadDescriptor};

use crate::context::CallContext;
use crate::error::BackendResult;
use crate::rpc::{Empty, RpcClient};

pub const SERVICE: &str = "profile.ProfileService";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub surname: String,
    pub patronymic: String,
    pub gender: String,
    pub birthday: String,
}

/// User preferences owned by the profile service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub notifications_enabled: bool,
    pub language: String,
    pub theme: String,
    pub signature: String,
}

/// Final object-storage location of an uploaded avatar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAvatarResponse {
    pub avatar_path: String,
}

/// Profile backend contract. The profile owner is identified by the bearer
/// token carried in the [`CallContext`].
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// `Ok(None)` means the service answered without a profile record.
    async fn get_profile(&self, ctx: &CallContext) -> BackendResult<Option<ProfileRecord>>;

    async fn update_profile(&self, ctx: &CallContext, req: UpdateProfileRequest) -> BackendResult<Option<ProfileRecord>>;

    async fn get_settings(&self, ctx: &CallContext) -> BackendResult<UserSettings>;

    async fn upload_avatar(&self, ctx: &CallContext, upload: UploadDescriptor) -> BackendResult<UploadAvatarResponse>;
}

/// [`ProfileService`] over the JSON transport.
#[derive(Debug, Clone)]
pub struct HttpProfileClient {
    rpc: RpcClient,
}

impl HttpProfileClient {
    pub fn new(base_url: impl Into<String>) -> BackendResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(base_url, SERVICE)?,
        })
    }
}

#[async_trait]
impl ProfileService for HttpProfileClient {
    async fn get_profile(&self, ctx: &CallContext) -> BackendResult<Option<ProfileRecord>> {
        self.rpc.call(ctx, "GetProfile", &Empty {}).await
    }

    async fn update_profile(&self, ctx: &CallContext, req: UpdateProfileRequest) -> BackendResult<Option<ProfileRecord>> {
        self.rpc.call(ctx, "UpdateProfile", &req).await
    }

    async fn get_settings(&self, ctx: &CallContext) -> BackendResult<UserSettings> {
        self.rpc.call(ctx, "GetSettings", &Empty {}).await
    }

    async fn upload_avatar(&self, ctx: &CallContext, upload: UploadDescriptor) -> BackendResult<UploadAvatarResponse> {
        self.rpc.call_upload(ctx, "UploadAvatar", &upload).await
    }
}
