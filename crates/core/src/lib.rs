//! `mailgate-core` — pure value types and transformations used by the gateway.
//!
//! Nothing in this crate performs IO or knows about HTTP; every function here is
//! deterministic and safe to call from any request handler.

pub mod avatar;
pub mod error;
pub mod folder;
pub mod profile;
pub mod upload;

pub use avatar::{normalize_avatar_url, AvatarUrlNormalizer, DEFAULT_STORAGE_HOST};
pub use error::{AvatarUrlError, CoreError};
pub use folder::{resolve_folder_id, Folder, FolderType};
pub use profile::{map_profile, ProfileRecord, ProfileView, DEFAULT_ROLE};
pub use upload::UploadDescriptor;
