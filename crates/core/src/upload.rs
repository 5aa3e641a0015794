//! Uploaded file descriptors.

use bytes::Bytes;

use crate::error::{CoreError, CoreResult};

/// Content type assumed when the client did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file extracted from a multipart body, ready to be forwarded upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadDescriptor {
    pub filename: String,
    pub content_type: String,
    pub size: u64,
    pub data: Bytes,
}

impl UploadDescriptor {
    /// Build a descriptor, rejecting empty payloads.
    pub fn new(
        filename: Option<&str>,
        content_type: Option<&str>,
        data: Bytes,
    ) -> CoreResult<Self> {
        if data.is_empty() {
            return Err(CoreError::validation("uploaded file is empty"));
        }

        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        Ok(Self {
            filename: filename.unwrap_or_default().to_string(),
            content_type: content_type.to_string(),
            size: data.len() as u64,
            data,
        })
    }
}
