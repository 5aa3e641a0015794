//! Per-call context passed to every backend adapter method.

use std::{future::Future, time::Duration};

use tokio::time::Instant;

use mailgate_auth::AccessToken;

use crate::error::{BackendError, BackendResult};

/// Deadline and credentials for one backend call.
///
/// Cancellation needs no explicit token: when the inbound request is dropped,
/// the future awaiting the call is dropped with it and the call is aborted.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Instant,
    bearer: Option<AccessToken>,
    request_id: Option<String>,
}

impl CallContext {
    /// Context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            bearer: None,
            request_id: None,
        }
    }

    pub fn with_bearer(mut self, token: AccessToken) -> Self {
        self.bearer = Some(token);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn bearer(&self) -> Option<&AccessToken> {
        self.bearer.as_ref()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Time left before the deadline (zero once it has passed).
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Drive `fut` to completion or fail with `DeadlineExceeded`.
    pub async fn run<F, T>(&self, fut: F) -> BackendResult<T>
    where
        F: Future<Output = BackendResult<T>>,
    {
        match tokio::time::timeout_at(self.deadline, fut).await {
            Ok(res) => res,
            Err(_) => Err(BackendError::DeadlineExceeded),
        }
    }
}
