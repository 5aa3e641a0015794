use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Extension, Multipart},
    routing::{get, post},
    Router,
};

use mailgate_clients::profile::UserSettings;
use mailgate_core::{map_profile, ProfileView};

use crate::app::dto::{AvatarBody, UpdateProfileBody};
use crate::app::envelope::Envelope;
use crate::app::errors::{ApiError, BackendResultExt};
use crate::app::extract::ApiJson;
use crate::app::routes::uploads;
use crate::app::services::AppServices;
use crate::context::{RequestId, SessionContext};

/// Multipart form field carrying the avatar image.
pub const AVATAR_FIELD: &str = "avatar";

/// Headroom over the per-file limit for multipart boundaries and headers.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/settings", get(get_settings))
        .route(
            "/upload/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(max_upload_bytes + MULTIPART_OVERHEAD_BYTES)),
        )
}

fn profile_view(services: &AppServices, view: ProfileView) -> ProfileView {
    let avatar_path = services.display_avatar_path(&view.avatar_path);
    view.with_avatar_path(avatar_path)
}

pub async fn get_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
) -> Result<Envelope<ProfileView>, ApiError> {
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "profile.get");

    let record = ctx
        .run(services.profile.get_profile(&ctx))
        .await
        .or_api_error("failed to get profile")?;

    let view = profile_view(&services, map_profile(record.as_ref()));
    Ok(Envelope::ok("profile retrieved", view))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<UpdateProfileBody>,
) -> Result<Envelope<ProfileView>, ApiError> {
    let req = body.into_request()?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "profile.update");

    let record = ctx
        .run(services.profile.update_profile(&ctx, req))
        .await
        .or_api_error("failed to update profile")?;

    let view = profile_view(&services, map_profile(record.as_ref()));
    Ok(Envelope::ok("profile updated", view))
}

pub async fn get_settings(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
) -> Result<Envelope<UserSettings>, ApiError> {
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "profile.settings");

    let settings = ctx
        .run(services.profile.get_settings(&ctx))
        .await
        .or_api_error("failed to get settings")?;

    Ok(Envelope::ok("settings retrieved", settings))
}

/// Forward the `avatar` part to the profile service. The stored path it
/// returns must be a valid URL; anything else is a 500.
pub async fn upload_avatar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Envelope<AvatarBody>, ApiError> {
    let multipart = uploads::require_multipart(multipart)?;
    let upload = uploads::single_file(multipart, AVATAR_FIELD, services.max_upload_bytes()).await?;
    tracing::debug!(request_id = %request_id, size = upload.size, "profile.upload_avatar");

    let ctx = services.session_context(&request_id, &session);
    let stored = ctx
        .run(services.profile.upload_avatar(&ctx, upload))
        .await
        .or_api_error("failed to upload avatar")?;

    let avatar_path = services
        .avatars
        .normalize(&stored.avatar_path)
        .map_err(|e| ApiError::Internal(format!("profile service returned bad avatar path: {e}")))?;

    Ok(Envelope::ok("avatar uploaded", AvatarBody { avatar_path }))
}
