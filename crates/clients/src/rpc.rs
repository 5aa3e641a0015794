//! JSON-over-HTTP transport shared by the backend adapters.
//!
//! Every backend method is `POST {base}/{service}/{Method}` with a JSON body
//! (or a multipart body for uploads). A non-2xx answer carries
//! `{"code": "...", "message": "..."}`, which becomes a typed
//! [`BackendError::Status`].

use std::time::Duration;

use reqwest::{multipart, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use mailgate_core::UploadDescriptor;

use crate::context::CallContext;
use crate::error::{BackendError, BackendResult, Code};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Request/response placeholder for methods without a payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Error payload returned by a backend.
#[derive(Debug, Deserialize)]
struct RpcStatus {
    code: String,
    #[serde(default)]
    message: String,
}

/// Pooled client for one backend service.
///
/// Cheap to clone; clones share the connection pool and are safe to use
/// from concurrent requests.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base_url: String,
    service: &'static str,
}

impl RpcClient {
    pub fn new(base_url: impl Into<String>, service: &'static str) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            service,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.service, method)
    }

    /// Invoke `method` with a JSON request.
    pub async fn call<Req, Resp>(&self, ctx: &CallContext, method: &str, req: &Req) -> BackendResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let builder = self.http.post(self.endpoint(method)).json(req);
        self.send(ctx, method, builder).await
    }

    /// Invoke `method` with an uploaded file as a multipart body.
    pub async fn call_upload<Resp>(
        &self,
        ctx: &CallContext,
        method: &str,
        upload: &UploadDescriptor,
    ) -> BackendResult<Resp>
    where
        Resp: DeserializeOwned,
    {
        // `Bytes` clones share the buffer; the payload is not copied.
        let part = multipart::Part::stream_with_length(upload.data.clone(), upload.size)
            .file_name(upload.filename.clone())
            .mime_str(&upload.content_type)
            .map_err(|e| BackendError::Transport(format!("invalid content type: {e}")))?;

        let form = multipart::Form::new()
            .text("filename", upload.filename.clone())
            .text("content_type", upload.content_type.clone())
            .text("size", upload.size.to_string())
            .part("file", part);

        let builder = self.http.post(self.endpoint(method)).multipart(form);
        self.send(ctx, method, builder).await
    }

    async fn send<Resp>(&self, ctx: &CallContext, method: &str, builder: RequestBuilder) -> BackendResult<Resp>
    where
        Resp: DeserializeOwned,
    {
        let mut builder = builder.timeout(ctx.remaining());
        if let Some(token) = ctx.bearer() {
            builder = builder.bearer_auth(token.as_str());
        }
        if let Some(request_id) = ctx.request_id() {
            builder = builder.header("x-request-id", request_id);
        }

        tracing::debug!(service = self.service, method, "backend call");

        ctx.run(async move {
            let res = builder.send().await?;
            let status = res.status();

            if status.is_success() {
                return res
                    .json::<Resp>()
                    .await
                    .map_err(|e| BackendError::Decode(e.to_string()));
            }

            let body = res.bytes().await?;
            Err(match serde_json::from_slice::<RpcStatus>(&body) {
                Ok(s) => BackendError::status(Code::parse(&s.code), s.message),
                Err(_) => BackendError::Transport(format!(
                    "{}/{} answered HTTP {} without a status payload",
                    self.service, method, status
                )),
            })
        })
        .await
    }
}
