use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Extension, Multipart, Path},
    http::StatusCode,
    routing::{get, post},
    Router,
};

use mailgate_clients::messages::{
    Draft, DraftIdRequest, Message, MessageIdRequest, MessageList, SentMessage, Thread, ThreadIdRequest,
};

use crate::app::dto::{
    self, AttachmentsBody, DraftIdBody, MessageIdBody, PageQuery, ReplyBody, SaveDraftBody, SendMessageBody,
};
use crate::app::envelope::Envelope;
use crate::app::errors::{ApiError, BackendResultExt};
use crate::app::extract::{ApiJson, ApiQuery};
use crate::app::routes::{folders, profile::MULTIPART_OVERHEAD_BYTES, uploads};
use crate::app::services::AppServices;
use crate::context::{RequestId, SessionContext};

/// Most files accepted by one attachment upload.
pub const MAX_ATTACHMENTS: usize = 10;

pub fn router(max_upload_bytes: usize) -> Router {
    let attachment_limit = max_upload_bytes
        .saturating_mul(MAX_ATTACHMENTS)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/inbox", get(list_inbox))
        .route("/thread/:id", get(get_thread))
        .route("/send", post(send_message))
        .route("/reply", post(reply))
        .route("/save-draft", post(save_draft))
        .route("/delete-draft", post(delete_draft))
        .route("/send-draft", post(send_draft))
        .route("/mark-as-spam", post(mark_as_spam))
        .route(
            "/upload-attachment",
            post(upload_attachment).layer(DefaultBodyLimit::max(attachment_limit)),
        )
        .route("/:id", get(get_message))
        .merge(folders::router())
}

pub async fn list_inbox(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Envelope<MessageList>, ApiError> {
    let page = query.into_page()?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, limit = page.limit, "messages.inbox");

    let list = ctx
        .run(services.messages.list_inbox(&ctx, page))
        .await
        .or_api_error("failed to get inbox")?;

    Ok(Envelope::ok("inbox retrieved", list))
}

pub async fn get_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    Path(message_id): Path<String>,
) -> Result<Envelope<Message>, ApiError> {
    dto::validate_id(&message_id, "message id")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "messages.get");

    let message = ctx
        .run(services.messages.get_message(&ctx, MessageIdRequest { message_id }))
        .await
        .or_api_error("failed to get message")?;

    Ok(Envelope::ok("message retrieved", message))
}

pub async fn get_thread(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    Path(thread_id): Path<String>,
) -> Result<Envelope<Thread>, ApiError> {
    dto::validate_id(&thread_id, "thread id")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "messages.thread");

    let thread = ctx
        .run(services.messages.get_thread(&ctx, ThreadIdRequest { thread_id }))
        .await
        .or_api_error("failed to get thread")?;

    Ok(Envelope::ok("thread retrieved", thread))
}

pub async fn send_message(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<SendMessageBody>,
) -> Result<Envelope<SentMessage>, ApiError> {
    let req = body.into_request()?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, receivers = req.receivers.len(), "messages.send");

    let sent = ctx
        .run(services.messages.send_message(&ctx, req))
        .await
        .or_api_error("failed to send message")?;

    Ok(Envelope::ok("message sent", sent))
}

pub async fn reply(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<ReplyBody>,
) -> Result<Envelope<SentMessage>, ApiError> {
    let req = body.into_request()?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "messages.reply");

    let sent = ctx
        .run(services.messages.reply(&ctx, req))
        .await
        .or_api_error("failed to reply to message")?;

    Ok(Envelope::ok("reply sent", sent))
}

pub async fn save_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<SaveDraftBody>,
) -> Result<Envelope<Draft>, ApiError> {
    let req = body.into_request();
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, new = req.draft_id.is_none(), "messages.save_draft");

    let draft = ctx
        .run(services.messages.save_draft(&ctx, req))
        .await
        .or_api_error("failed to save draft")?;

    Ok(Envelope::ok("draft saved", draft))
}

pub async fn delete_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<DraftIdBody>,
) -> Result<Envelope, ApiError> {
    dto::validate_id(&body.draft_id, "draft_id")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "messages.delete_draft");

    ctx.run(services.messages.delete_draft(&ctx, DraftIdRequest { draft_id: body.draft_id }))
        .await
        .or_api_error("failed to delete draft")?;

    Ok(Envelope::message(StatusCode::OK, "draft deleted"))
}

pub async fn send_draft(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<DraftIdBody>,
) -> Result<Envelope<SentMessage>, ApiError> {
    dto::validate_id(&body.draft_id, "draft_id")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "messages.send_draft");

    let sent = ctx
        .run(services.messages.send_draft(&ctx, DraftIdRequest { draft_id: body.draft_id }))
        .await
        .or_api_error("failed to send draft")?;

    Ok(Envelope::ok("draft sent", sent))
}

pub async fn mark_as_spam(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    ApiJson(body): ApiJson<MessageIdBody>,
) -> Result<Envelope, ApiError> {
    dto::validate_id(&body.message_id, "message_id")?;
    let ctx = services.session_context(&request_id, &session);
    tracing::debug!(request_id = %request_id, "messages.mark_as_spam");

    ctx.run(
        services
            .messages
            .mark_as_spam(&ctx, MessageIdRequest { message_id: body.message_id }),
    )
    .await
    .or_api_error("failed to mark message as spam")?;

    Ok(Envelope::message(StatusCode::OK, "message marked as spam"))
}

/// Forward every file part in order and return the normalized URLs.
///
/// Parts are validated before anything is sent, so a bad part fails the
/// whole request without a partial upload.
pub async fn upload_attachment(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request_id): Extension<RequestId>,
    Extension(session): Extension<SessionContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Envelope<AttachmentsBody>, ApiError> {
    let multipart = uploads::require_multipart(multipart)?;
    let files = uploads::all_files(multipart, services.max_upload_bytes(), MAX_ATTACHMENTS).await?;
    tracing::debug!(request_id = %request_id, files = files.len(), "messages.upload_attachment");

    let ctx = services.session_context(&request_id, &session);
    let mut urls = Vec::with_capacity(files.len());
    for file in files {
        let stored = ctx
            .run(services.messages.upload_attachment(&ctx, file))
            .await
            .or_api_error("failed to upload attachment")?;
        let url = services
            .avatars
            .normalize(&stored.url)
            .map_err(|e| ApiError::Internal(format!("messages service returned bad attachment url: {e}")))?;
        urls.push(url);
    }

    Ok(Envelope::ok("attachments uploaded", AttachmentsBody { urls }))
}
