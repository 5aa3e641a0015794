//! Messages service adapter.
//!
//! Message, draft and thread types are forwarded as-is; the gateway does not
//! interpret them beyond renaming fields at the HTTP boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mailgate_core::{Folder, UploadDescriptor};

use crate::context::CallContext;
use crate::error::BackendResult;
use crate::rpc::{Empty, RpcClient};

pub const SERVICE: &str = "messages.MessagesService";

/// Keyset page request: the page after the message identified by
/// (`last_timestamp`, `last_message_id`), newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub message_id: String,
    #[serde(default)]
    pub thread_id: String,
    pub sender: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<MessageSummary>,
    /// Present when another page exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<PageCursor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub last_message_id: String,
    pub last_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: String,
    #[serde(default)]
    pub thread_id: String,
    pub sender: String,
    #[serde(default)]
    pub receivers: Vec<String>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub thread_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageIdRequest {
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadIdRequest {
    pub thread_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub receivers: Vec<String>,
    pub topic: String,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub parent_message_id: String,
    pub text: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub message_id: String,
    #[serde(default)]
    pub thread_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderList {
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    pub folder_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMessagesRequest {
    pub folder_id: String,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameFolderRequest {
    pub folder_id: String,
    pub folder_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderIdRequest {
    pub folder_id: String,
}

/// Create (`draft_id == None`) or overwrite a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveDraftRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub receivers: Vec<String>,
    pub topic: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub draft_id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub receivers: Vec<String>,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftIdRequest {
    pub draft_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveToFolderRequest {
    pub message_id: String,
    pub folder_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAttachmentResponse {
    pub url: String,
}

/// Messages backend contract. The mailbox owner is identified by the bearer
/// token carried in the [`CallContext`].
#[async_trait]
pub trait MessagesService: Send + Sync {
    async fn list_inbox(&self, ctx: &CallContext, page: PageRequest) -> BackendResult<MessageList>;

    async fn get_message(&self, ctx: &CallContext, req: MessageIdRequest) -> BackendResult<Message>;

    async fn get_thread(&self, ctx: &CallContext, req: ThreadIdRequest) -> BackendResult<Thread>;

    async fn send_message(&self, ctx: &CallContext, req: SendMessageRequest) -> BackendResult<SentMessage>;

    async fn reply(&self, ctx: &CallContext, req: ReplyRequest) -> BackendResult<SentMessage>;

    async fn list_folders(&self, ctx: &CallContext) -> BackendResult<FolderList>;

    async fn create_folder(&self, ctx: &CallContext, req: CreateFolderRequest) -> BackendResult<Folder>;

    async fn list_folder_messages(&self, ctx: &CallContext, req: FolderMessagesRequest) -> BackendResult<MessageList>;

    async fn rename_folder(&self, ctx: &CallContext, req: RenameFolderRequest) -> BackendResult<Folder>;

    async fn delete_folder(&self, ctx: &CallContext, req: FolderIdRequest) -> BackendResult<()>;

    async fn save_draft(&self, ctx: &CallContext, req: SaveDraftRequest) -> BackendResult<Draft>;

    async fn delete_draft(&self, ctx: &CallContext, req: DraftIdRequest) -> BackendResult<()>;

    async fn send_draft(&self, ctx: &CallContext, req: DraftIdRequest) -> BackendResult<SentMessage>;

    async fn mark_as_spam(&self, ctx: &CallContext, req: MessageIdRequest) -> BackendResult<()>;

    async fn move_to_folder(&self, ctx: &CallContext, req: MoveToFolderRequest) -> BackendResult<()>;

    async fn upload_attachment(&self, ctx: &CallContext, upload: UploadDescriptor) -> BackendResult<UploadAttachmentResponse>;
}

/// [`MessagesService`] over the JSON transport.
#[derive(Debug, Clone)]
pub struct HttpMessagesClient {
    rpc: RpcClient,
}

impl HttpMessagesClient {
    pub fn new(base_url: impl Into<String>) -> BackendResult<Self> {
        Ok(Self {
            rpc: RpcClient::new(base_url, SERVICE)?,
        })
    }

    async fn call_unit<Req: Serialize + Sync>(&self, ctx: &CallContext, method: &str, req: &Req) -> BackendResult<()> {
        let _: Empty = self.rpc.call(ctx, method, req).await?;
        Ok(())
    }
}

#[async_trait]
impl MessagesService for HttpMessagesClient {
    async fn list_inbox(&self, ctx: &CallContext, page: PageRequest) -> BackendResult<MessageList> {
        self.rpc.call(ctx, "ListInbox", &page).await
    }

    async fn get_message(&self, ctx: &CallContext, req: MessageIdRequest) -> BackendResult<Message> {
        self.rpc.call(ctx, "GetMessage", &req).await
    }

    async fn get_thread(&self, ctx: &CallContext, req: ThreadIdRequest) -> BackendResult<Thread> {
        self.rpc.call(ctx, "GetThread", &req).await
    }

    async fn send_message(&self, ctx: &CallContext, req: SendMessageRequest) -> BackendResult<SentMessage> {
        self.rpc.call(ctx, "SendMessage", &req).await
    }

    async fn reply(&self, ctx: &CallContext, req: ReplyRequest) -> BackendResult<SentMessage> {
        self.rpc.call(ctx, "ReplyToMessage", &req).await
    }

    async fn list_folders(&self, ctx: &CallContext) -> BackendResult<FolderList> {
        self.rpc.call(ctx, "ListFolders", &Empty {}).await
    }

    async fn create_folder(&self, ctx: &CallContext, req: CreateFolderRequest) -> BackendResult<Folder> {
        self.rpc.call(ctx, "CreateFolder", &req).await
    }

    async fn list_folder_messages(&self, ctx: &CallContext, req: FolderMessagesRequest) -> BackendResult<MessageList> {
        self.rpc.call(ctx, "ListFolderMessages", &req).await
    }

    async fn rename_folder(&self, ctx: &CallContext, req: RenameFolderRequest) -> BackendResult<Folder> {
        self.rpc.call(ctx, "RenameFolder", &req).await
    }

    async fn delete_folder(&self, ctx: &CallContext, req: FolderIdRequest) -> BackendResult<()> {
        self.call_unit(ctx, "DeleteFolder", &req).await
    }

    async fn save_draft(&self, ctx: &CallContext, req: SaveDraftRequest) -> BackendResult<Draft> {
        self.rpc.call(ctx, "SaveDraft", &req).await
    }

    async fn delete_draft(&self, ctx: &CallContext, req: DraftIdRequest) -> BackendResult<()> {
        self.call_unit(ctx, "DeleteDraft", &req).await
    }

    async fn send_draft(&self, ctx: &CallContext, req: DraftIdRequest) -> BackendResult<SentMessage> {
        self.rpc.call(ctx, "SendDraft", &req).await
    }

    async fn mark_as_spam(&self, ctx: &CallContext, req: MessageIdRequest) -> BackendResult<()> {
        self.call_unit(ctx, "MarkAsSpam", &req).await
    }

    async fn move_to_folder(&self, ctx: &CallContext, req: MoveToFolderRequest) -> BackendResult<()> {
        self.call_unit(ctx, "MoveToFolder", &req).await
    }

    async fn upload_attachment(&self, ctx: &CallContext, upload: UploadDescriptor) -> BackendResult<UploadAttachmentResponse> {
        self.rpc.call_upload(ctx, "UploadAttachment", &upload).await
    }
}
