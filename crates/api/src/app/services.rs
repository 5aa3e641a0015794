//! Backend wiring shared by all handlers.

use std::{sync::Arc, time::Duration};

use mailgate_clients::{
    AuthService, BackendResult, CallContext, HttpAuthClient, HttpMessagesClient, HttpProfileClient,
    MessagesService, ProfileService,
};
use mailgate_core::AvatarUrlNormalizer;

use crate::config::GatewayConfig;
use crate::context::{RequestId, SessionContext};
use crate::session::SessionManager;

/// The three backend adapters the gateway dispatches to.
#[derive(Clone)]
pub struct Backends {
    pub auth: Arc<dyn AuthService>,
    pub profile: Arc<dyn ProfileService>,
    pub messages: Arc<dyn MessagesService>,
}

impl Backends {
    /// Production adapters speaking to the URLs in `config`.
    pub fn connect(config: &GatewayConfig) -> BackendResult<Self> {
        Ok(Self {
            auth: Arc::new(HttpAuthClient::new(&config.auth_url)?),
            profile: Arc::new(HttpProfileClient::new(&config.profile_url)?),
            messages: Arc::new(HttpMessagesClient::new(&config.messages_url)?),
        })
    }
}

/// Immutable per-process state handed to every handler.
///
/// The adapters are pooled and safe for concurrent use; nothing here is
/// mutated after startup.
pub struct AppServices {
    pub auth: Arc<dyn AuthService>,
    pub profile: Arc<dyn ProfileService>,
    pub messages: Arc<dyn MessagesService>,
    pub sessions: SessionManager,
    pub avatars: AvatarUrlNormalizer,
    backend_timeout: Duration,
    max_upload_bytes: usize,
}

impl AppServices {
    pub fn new(config: &GatewayConfig, backends: Backends) -> Self {
        Self {
            auth: backends.auth,
            profile: backends.profile,
            messages: backends.messages,
            sessions: SessionManager::new(config.session),
            avatars: config.avatars.clone(),
            backend_timeout: config.backend_timeout.min(config.request_timeout),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Context for an anonymous backend call.
    pub fn call_context(&self, request_id: &RequestId) -> CallContext {
        CallContext::with_timeout(self.backend_timeout).with_request_id(request_id.as_str())
    }

    /// Context for a call made on behalf of the session owner.
    pub fn session_context(&self, request_id: &RequestId, session: &SessionContext) -> CallContext {
        self.call_context(request_id)
            .with_bearer(session.access_token().clone())
    }

    /// Normalize an avatar URL for the response without failing it.
    ///
    /// Empty paths stay empty; unparsable ones are returned raw and logged.
    pub fn display_avatar_path(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        match self.avatars.normalize(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(avatar_path = raw, error = %e, "leaving avatar path unnormalized");
                raw.to_string()
            }
        }
    }
}
