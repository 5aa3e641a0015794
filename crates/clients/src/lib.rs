//! `mailgate-clients` — backend client adapters.
//!
//! One narrow async trait per backend service (auth, profile, messages). The
//! gateway only ever talks to these traits, so handlers can be exercised
//! against in-memory fakes. The `Http*Client` types are the production
//! implementations and speak JSON over HTTP to the services.

pub mod auth;
pub mod context;
pub mod error;
pub mod messages;
pub mod profile;
pub mod rpc;

pub use auth::{AuthService, HttpAuthClient};
pub use context::CallContext;
pub use error::{BackendError, BackendResult, Code};
pub use messages::{HttpMessagesClient, MessagesService};
pub use profile::{HttpProfileClient, ProfileService};
pub use rpc::{Empty, RpcClient};
