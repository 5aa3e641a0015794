use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailgate_auth::AccessToken;
use mailgate_clients::{
    auth::{LoginRequest, SignupRequest},
    messages::{PageRequest, ReplyRequest, SaveDraftRequest, SendMessageRequest},
    profile::UpdateProfileRequest,
};

use crate::app::errors::ApiError;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub username: String,
    pub password: String,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
    pub gender: String,
    #[serde(alias = "birthday")]
    pub date_of_birth: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
    pub gender: String,
    #[serde(alias = "birthday")]
    pub date_of_birth: String,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub receivers: Vec<String>,
    #[serde(default)]
    pub topic: String,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
    pub message_id: String,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderBody {
    pub folder_name: String,
}

/// `folder` may be a folder ID, display name or type tag.
#[derive(Debug, Deserialize)]
pub struct RenameFolderBody {
    pub folder: String,
    pub new_name: String,
}

#[derive(Debug, Deserialize)]
pub struct FolderRefBody {
    pub folder: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveDraftBody {
    #[serde(default)]
    pub draft_id: Option<String>,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub receivers: Vec<String>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DraftIdBody {
    pub draft_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageIdBody {
    pub message_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MoveToFolderBody {
    pub message_id: String,
    pub folder: String,
}

/// Keyset pagination parameters (`?limit=&last_message_id=&last_timestamp=`).
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub last_message_id: Option<String>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// `?folder=` plus keyset pagination.
#[derive(Debug, Deserialize)]
pub struct FolderPageQuery {
    pub folder: String,
    pub limit: Option<u32>,
    pub last_message_id: Option<String>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RefreshedBody {
    pub access_token: AccessToken,
}

#[derive(Debug, Serialize)]
pub struct AvatarBody {
    pub avatar_path: String,
}

#[derive(Debug, Serialize)]
pub struct AttachmentsBody {
    pub urls: Vec<String>,
}

// -------------------------
// Validation + mapping to backend requests
// -------------------------

fn require(value: &str, field: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(())
}

fn require_receivers(receivers: &[String]) -> Result<(), ApiError> {
    if receivers.is_empty() || receivers.iter().any(|r| r.trim().is_empty()) {
        return Err(ApiError::bad_request("at least one non-empty receiver is required"));
    }
    Ok(())
}

impl LoginBody {
    pub fn into_request(self) -> Result<LoginRequest, ApiError> {
        require(&self.username, "username")?;
        require(&self.password, "password")?;
        Ok(LoginRequest {
            username: self.username,
            password: self.password,
        })
    }
}

impl SignupBody {
    pub fn into_request(self) -> Result<SignupRequest, ApiError> {
        require(&self.username, "username")?;
        require(&self.password, "password")?;
        require(&self.name, "name")?;
        require(&self.surname, "surname")?;
        Ok(SignupRequest {
            username: self.username,
            password: self.password,
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            gender: self.gender,
            birthday: self.date_of_birth,
        })
    }
}

impl UpdateProfileBody {
    pub fn into_request(self) -> Result<UpdateProfileRequest, ApiError> {
        require(&self.name, "name")?;
        require(&self.surname, "surname")?;
        Ok(UpdateProfileRequest {
            name: self.name,
            surname: self.surname,
            patronymic: self.patronymic,
            gender: self.gender,
            birthday: self.date_of_birth,
        })
    }
}

impl SendMessageBody {
    pub fn into_request(self) -> Result<SendMessageRequest, ApiError> {
        require_receivers(&self.receivers)?;
        require(&self.text, "text")?;
        Ok(SendMessageRequest {
            receivers: self.receivers,
            topic: self.topic,
            text: self.text,
            attachments: self.attachments,
        })
    }
}

impl ReplyBody {
    pub fn into_request(self) -> Result<ReplyRequest, ApiError> {
        require(&self.message_id, "message_id")?;
        require(&self.text, "text")?;
        Ok(ReplyRequest {
            parent_message_id: self.message_id,
            text: self.text,
            attachments: self.attachments,
        })
    }
}

impl SaveDraftBody {
    pub fn into_request(self) -> SaveDraftRequest {
        SaveDraftRequest {
            draft_id: self.draft_id.filter(|id| !id.is_empty()),
            thread_id: self.thread_id.filter(|id| !id.is_empty()),
            receivers: self.receivers,
            topic: self.topic,
            text: self.text,
        }
    }
}

pub fn validate_id(value: &str, field: &str) -> Result<(), ApiError> {
    require(value, field)
}

fn page_request(
    limit: Option<u32>,
    last_message_id: Option<String>,
    last_timestamp: Option<DateTime<Utc>>,
) -> Result<PageRequest, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }

    let last_message_id = last_message_id.filter(|id| !id.is_empty());
    if last_message_id.is_some() != last_timestamp.is_some() {
        return Err(ApiError::bad_request(
            "last_message_id and last_timestamp must be given together",
        ));
    }

    Ok(PageRequest {
        limit,
        last_message_id,
        last_timestamp,
    })
}

impl PageQuery {
    pub fn into_page(self) -> Result<PageRequest, ApiError> {
        page_request(self.limit, self.last_message_id, self.last_timestamp)
    }
}

impl FolderPageQuery {
    /// Split into the folder reference and the page request.
    pub fn into_parts(self) -> Result<(String, PageRequest), ApiError> {
        require(&self.folder, "folder")?;
        let page = page_request(self.limit, self.last_message_id, self.last_timestamp)?;
        Ok((self.folder, page))
    }
}
