//! Folder routes. Clients name a folder by ID, display name or type tag;
//! every operation resolves that reference against the owner's folder list
//! before calling the messages service with a concrete ID.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{delete, get, post, put},
    Router,
};

use mailgate_clients::{
    messages::{CreateFolderRequest, FolderIdRequest, FolderList, FolderMessagesRequest, MessageList, MoveToFolderRequest, RenameFolderRequest},
    CallContext,
};
use mailgate_core::{resolve_folder_id, Folder};

use crate::app::dto::{self, CreateFolderBody, FolderPageQuery, FolderRefBody, MoveToFolderBody, RenameFolderBody};
use crate::app::envelope::Envelope;
use crate::app::errors::{ApiError, BackendResultExt};
use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::services::AppServices;
use crate::context::{RequestId, SessionContext};

pub const FOLDER_NOT_FOUND: &str = "folder not found";

pub fn router() -> Router {
    Router::new()
        .route("/folders", get(list_folders))
        .route("/create-folder", post(create_folder))
        .route("/get-folder", get(get_folder))
        .route("/rename-folder", put(rename_folder))
        .route("/delete-folder", delete(delete_folder))
        .route("/move-to-folder", post(move_to_folder))
}

/// Resolve a client folder reference to a folder ID, or 404.
async fn resolve_folder(
    services: &AppServices,
    ctx: &CallContext,
    reference: &str,
    default_message: &'static str,
) -> Result<String, ApiError> {
    dto::validate_id(reference, "folder")?;

    let FolderList { folders } = ctx
        .run(services.messages.list_folders(ctx))
        .await
        .or_api_error(default_message)?;

    resolve_folder_id(&folders, reference)
        .map(str::to_owned)
        .ok_or_else(|| ApiError::not_found(FOLDER_NOT_FOUND))
}

pub async fn list_folders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
) -> Result<Envelope<FolderList>, ApiError> {
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "folders.list");

    let list = ctx
        .run(services.messages.list_folders(&ctx))
        .await
        .or_api_error("failed to list folders")?;

    Ok(Envelope::ok("folders retrieved", list))
}

pub async fn create_folder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<CreateFolderBody>,
) -> Result<Envelope<Folder>, ApiError> {
    dto::validate_id(&body.folder_name, "folder_name")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "folders.create");

    let folder = ctx
        .run(services.messages.create_folder(
            &ctx,
            CreateFolderRequest {
                folder_name: body.folder_name,
            },
        ))
        .await
        .or_api_error("failed to create folder")?;

    Ok(Envelope::ok("folder created", folder))
}

pub async fn get_folder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiQuery(query): ApiQuery<FolderPageQuery>,
) -> Result<Envelope<MessageList>, ApiError> {
    let (reference, page) = query.into_parts()?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, folder = %reference, "folders.get");

    let folder_id = resolve_folder(&services, &ctx, &reference, "failed to get folder").await?;
    let list = ctx
        .run(services.messages.list_folder_messages(&ctx, FolderMessagesRequest { folder_id, page }))
        .await
        .or_api_error("failed to get folder")?;

    Ok(Envelope::ok("folder retrieved", list))
}

pub async fn rename_folder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<RenameFolderBody>,
) -> Result<Envelope<Folder>, ApiError> {
    dto::validate_id(&body.new_name, "new_name")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, folder = %body.folder, "folders.rename");

    let folder_id = resolve_folder(&services, &ctx, &body.folder, "failed to rename folder").await?;
    let folder = ctx
        .run(services.messages.rename_folder(
            &ctx,
            RenameFolderRequest {
                folder_id,
                folder_name: body.new_name,
            },
        ))
        .await
        .or_api_error("failed to rename folder")?;

    Ok(Envelope::ok("folder renamed", folder))
}

pub async fn delete_folder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<FolderRefBody>,
) -> Result<Envelope, ApiError> {
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, folder = %body.folder, "folders.delete");

    let folder_id = resolve_folder(&services, &ctx, &body.folder, "failed to delete folder").await?;
    ctx.run(services.messages.delete_folder(&ctx, FolderIdRequest { folder_id }))
        .await
        .or_api_error("failed to delete folder")?;

    Ok(Envelope::message(StatusCode::OK, "folder deleted"))
}

pub async fn move_to_folder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<MoveToFolderBody>,
) -> Result<Envelope, ApiError> {
    dto::validate_id(&body.message_id, "message_id")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, folder = %body.folder, "folders.move_message");

    let folder_id = resolve_folder(&services, &ctx, &body.folder, "failed to move message").await?;
    ctx.run(services.messages.move_to_folder(
        &ctx,
        MoveToFolderRequest {
            message_id: body.message_id,
            folder_id,
        },
    ))
    .await
    .or_api_error("failed to move message")?;

    Ok(Envelope::message(StatusCode::OK, "message moved"))
}
