//! Multipart extraction shared by the avatar and attachment routes.
//!
//! Every part is streamed chunk by chunk so an oversized file is rejected as
//! soon as it crosses the limit instead of after it is fully buffered.

use axum::extract::multipart::{Field, Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use bytes::BytesMut;

use mailgate_core::{CoreError, UploadDescriptor};

use crate::app::errors::{is_body_timeout, ApiError, BODY_TIMEOUT_MESSAGE};

/// Accept the extractor result, turning a wrong content type into a 400.
pub fn require_multipart(multipart: Result<Multipart, MultipartRejection>) -> Result<Multipart, ApiError> {
    multipart.map_err(|rejection| {
        ApiError::bad_request(format!("expected multipart/form-data body: {}", rejection.body_text()))
    })
}

/// The part named `field_name`. Other parts are skipped.
pub async fn single_file(
    mut multipart: Multipart,
    field_name: &str,
    max_bytes: usize,
) -> Result<UploadDescriptor, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some(field_name) {
            return read_file(field, max_bytes).await;
        }
    }
    Err(ApiError::bad_request(format!("{field_name} file is required")))
}

/// Every file part (a part with a filename), in request order.
///
/// Fails with a 400 as soon as part `max_files + 1` starts, before it is read.
pub async fn all_files(
    mut multipart: Multipart,
    max_bytes: usize,
    max_files: usize,
) -> Result<Vec<UploadDescriptor>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.file_name().is_none() {
            continue;
        }
        if files.len() == max_files {
            return Err(ApiError::bad_request(format!("at most {max_files} files per upload")));
        }
        files.push(read_file(field, max_bytes).await?);
    }
    if files.is_empty() {
        return Err(ApiError::bad_request("at least one file is required"));
    }
    Ok(files)
}

async fn read_file(mut field: Field<'_>, max_bytes: usize) -> Result<UploadDescriptor, ApiError> {
    let filename = field.file_name().map(str::to_owned);
    let content_type = field.content_type().map(str::to_owned);

    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "file exceeds the maximum upload size of {max_bytes} bytes"
            )));
        }
        buf.extend_from_slice(&chunk);
    }

    UploadDescriptor::new(filename.as_deref(), content_type.as_deref(), buf.freeze()).map_err(|e| match e {
        CoreError::Validation(msg) => ApiError::bad_request(msg),
        other => ApiError::bad_request(other.to_string()),
    })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if is_body_timeout(&err) {
        ApiError::RequestTimeout(BODY_TIMEOUT_MESSAGE.to_string())
    } else if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge("request body too large".to_string())
    } else {
        ApiError::bad_request(format!("unreadable multipart body: {}", err.body_text()))
    }
}
