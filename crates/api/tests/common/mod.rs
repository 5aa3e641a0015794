//! In-memory backends for black-box tests.
//!
//! Each fake counts its calls so tests can assert that locally rejected
//! requests never reach a backend. A scripted failure, when set, is returned
//! by every method of that fake.

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use mailgate_api::app::{build_app, Backends};
use mailgate_api::config::GatewayConfig;
use mailgate_api::server::{self, ConnectionLimits};
use mailgate_auth::{AccessToken, RefreshToken, TokenPair};
use mailgate_clients::{
    auth::{LoginRequest, LogoutRequest, RefreshRequest, RefreshResponse, SignupRequest},
    messages::{
        CreateFolderRequest, Draft, DraftIdRequest, FolderIdRequest, FolderList, FolderMessagesRequest, Message,
        MessageIdRequest, MessageList, MessageSummary, MoveToFolderRequest, PageRequest, RenameFolderRequest,
        ReplyRequest, SaveDraftRequest, SendMessageRequest, SentMessage, Thread, ThreadIdRequest,
        UploadAttachmentResponse,
    },
    profile::{UpdateProfileRequest, UploadAvatarResponse, UserSettings},
    AuthService, BackendError, BackendResult, CallContext, MessagesService, ProfileService,
};
use mailgate_core::{Folder, FolderType, ProfileRecord, UploadDescriptor};

#[derive(Default)]
struct Script {
    calls: AtomicUsize,
    fail: Mutex<Option<BackendError>>,
    bearers: Mutex<Vec<Option<String>>>,
}

impl Script {
    fn enter(&self, ctx: &CallContext) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bearers
            .lock()
            .unwrap()
            .push(ctx.bearer().map(|t| t.as_str().to_string()));
        match self.fail.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// -------------------------
// Auth
// -------------------------

#[derive(Default)]
pub struct FakeAuth {
    script: Script,
    /// Latency added to every call.
    pub delay: Mutex<Option<Duration>>,
    pub rotate_refresh: AtomicBool,
    pub logouts: Mutex<Vec<String>>,
    /// Set when a delayed login starts waiting.
    pub login_started: AtomicBool,
    /// Set when a delayed login future is dropped before it finished.
    pub login_cancelled: Arc<AtomicBool>,
}

/// Marks `flag` if dropped before `finish`.
struct InFlight {
    flag: Arc<AtomicBool>,
    done: bool,
}

impl InFlight {
    fn finish(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.done {
            self.flag.store(true, Ordering::SeqCst);
        }
    }
}

impl FakeAuth {
    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: BackendError) {
        *self.script.fail.lock().unwrap() = Some(err);
    }
}

pub fn issued_tokens() -> TokenPair {
    TokenPair {
        access_token: AccessToken::new("access-1"),
        refresh_token: RefreshToken::new("refresh-1"),
    }
}

#[async_trait]
impl AuthService for FakeAuth {
    async fn login(&self, ctx: &CallContext, _req: LoginRequest) -> BackendResult<TokenPair> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            let guard = InFlight {
                flag: self.login_cancelled.clone(),
                done: false,
            };
            self.login_started.store(true, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            guard.finish();
        }
        self.script.enter(ctx)?;
        Ok(issued_tokens())
    }

    async fn signup(&self, ctx: &CallContext, _req: SignupRequest) -> BackendResult<TokenPair> {
        self.script.enter(ctx)?;
        Ok(issued_tokens())
    }

    async fn refresh(&self, ctx: &CallContext, _req: RefreshRequest) -> BackendResult<RefreshResponse> {
        self.script.enter(ctx)?;
        let refresh_token = self
            .rotate_refresh
            .load(Ordering::SeqCst)
            .then(|| RefreshToken::new("refresh-2"));
        Ok(RefreshResponse {
            access_token: AccessToken::new("access-2"),
            refresh_token,
        })
    }

    async fn logout(&self, ctx: &CallContext, req: LogoutRequest) -> BackendResult<()> {
        self.script.enter(ctx)?;
        self.logouts.lock().unwrap().push(req.refresh_token.into_inner());
        Ok(())
    }
}

// -------------------------
// Profile
// -------------------------

#[derive(Default)]
pub struct FakeProfile {
    script: Script,
    pub record: Mutex<Option<ProfileRecord>>,
    pub stored_avatar_path: Mutex<String>,
    pub uploads: Mutex<Vec<UploadDescriptor>>,
}

impl FakeProfile {
    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: BackendError) {
        *self.script.fail.lock().unwrap() = Some(err);
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.script.bearers.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProfileService for FakeProfile {
    async fn get_profile(&self, ctx: &CallContext) -> BackendResult<Option<ProfileRecord>> {
        self.script.enter(ctx)?;
        Ok(self.record.lock().unwrap().clone())
    }

    async fn update_profile(&self, ctx: &CallContext, req: UpdateProfileRequest) -> BackendResult<Option<ProfileRecord>> {
        self.script.enter(ctx)?;
        let mut record = self.record.lock().unwrap();
        let updated = ProfileRecord {
            name: req.name,
            surname: req.surname,
            patronymic: req.patronymic,
            gender: req.gender,
            birthday: req.birthday,
            ..record.clone().unwrap_or_default()
        };
        *record = Some(updated.clone());
        Ok(Some(updated))
    }

    async fn get_settings(&self, ctx: &CallContext) -> BackendResult<UserSettings> {
        self.script.enter(ctx)?;
        Ok(UserSettings {
            notifications_enabled: true,
            language: "en".into(),
            theme: "dark".into(),
            signature: String::new(),
        })
    }

    async fn upload_avatar(&self, ctx: &CallContext, upload: UploadDescriptor) -> BackendResult<UploadAvatarResponse> {
        self.script.enter(ctx)?;
        self.uploads.lock().unwrap().push(upload);
        Ok(UploadAvatarResponse {
            avatar_path: self.stored_avatar_path.lock().unwrap().clone(),
        })
    }
}

// -------------------------
// Messages
// -------------------------

pub struct FakeMessages {
    script: Script,
    pub folders: Mutex<Vec<Folder>>,
    pub moved: Mutex<Vec<MoveToFolderRequest>>,
    pub deleted_folders: Mutex<Vec<String>>,
    pub pages: Mutex<Vec<PageRequest>>,
    pub attachments: Mutex<Vec<UploadDescriptor>>,
}

impl Default for FakeMessages {
    fn default() -> Self {
        Self {
            script: Script::default(),
            folders: Mutex::new(default_folders()),
            moved: Mutex::default(),
            deleted_folders: Mutex::default(),
            pages: Mutex::default(),
            attachments: Mutex::default(),
        }
    }
}

pub fn default_folders() -> Vec<Folder> {
    vec![
        Folder {
            folder_id: "f-inbox".into(),
            folder_name: "Inbox".into(),
            folder_type: FolderType::Inbox,
        },
        Folder {
            folder_id: "f-spam".into(),
            folder_name: "Spam".into(),
            folder_type: FolderType::Spam,
        },
        Folder {
            folder_id: "f-work".into(),
            folder_name: "Work".into(),
            folder_type: FolderType::Custom,
        },
    ]
}

impl FakeMessages {
    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, err: BackendError) {
        *self.script.fail.lock().unwrap() = Some(err);
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.script.bearers.lock().unwrap().clone()
    }
}

fn summary(id: &str) -> MessageSummary {
    MessageSummary {
        message_id: id.into(),
        thread_id: "t-1".into(),
        sender: "alice@mail.example".into(),
        topic: "hello".into(),
        snippet: "hi there".into(),
        is_read: false,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

fn message(id: &str) -> Message {
    Message {
        message_id: id.into(),
        thread_id: "t-1".into(),
        sender: "alice@mail.example".into(),
        receivers: vec!["bob@mail.example".into()],
        topic: "hello".into(),
        text: "hi there".into(),
        attachments: vec![],
        is_read: true,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

fn sent() -> SentMessage {
    SentMessage {
        message_id: "m-new".into(),
        thread_id: "t-new".into(),
    }
}

#[async_trait]
impl MessagesService for FakeMessages {
    async fn list_inbox(&self, ctx: &CallContext, page: PageRequest) -> BackendResult<MessageList> {
        self.script.enter(ctx)?;
        self.pages.lock().unwrap().push(page);
        Ok(MessageList {
            messages: vec![summary("m-1"), summary("m-2")],
            next_cursor: None,
        })
    }

    async fn get_message(&self, ctx: &CallContext, req: MessageIdRequest) -> BackendResult<Message> {
        self.script.enter(ctx)?;
        Ok(message(&req.message_id))
    }

    async fn get_thread(&self, ctx: &CallContext, req: ThreadIdRequest) -> BackendResult<Thread> {
        self.script.enter(ctx)?;
        Ok(Thread {
            thread_id: req.thread_id,
            messages: vec![message("m-1")],
        })
    }

    async fn send_message(&self, ctx: &CallContext, _req: SendMessageRequest) -> BackendResult<SentMessage> {
        self.script.enter(ctx)?;
        Ok(sent())
    }

    async fn reply(&self, ctx: &CallContext, _req: ReplyRequest) -> BackendResult<SentMessage> {
        self.script.enter(ctx)?;
        Ok(sent())
    }

    async fn list_folders(&self, ctx: &CallContext) -> BackendResult<FolderList> {
        self.script.enter(ctx)?;
        Ok(FolderList {
            folders: self.folders.lock().unwrap().clone(),
        })
    }

    async fn create_folder(&self, ctx: &CallContext, req: CreateFolderRequest) -> BackendResult<Folder> {
        self.script.enter(ctx)?;
        let folder = Folder {
            folder_id: format!("f-{}", req.folder_name.to_lowercase()),
            folder_name: req.folder_name,
            folder_type: FolderType::Custom,
        };
        self.folders.lock().unwrap().push(folder.clone());
        Ok(folder)
    }

    async fn list_folder_messages(&self, ctx: &CallContext, req: FolderMessagesRequest) -> BackendResult<MessageList> {
        self.script.enter(ctx)?;
        self.pages.lock().unwrap().push(req.page);
        Ok(MessageList {
            messages: vec![summary(&format!("{}-m-1", req.folder_id))],
            next_cursor: None,
        })
    }

    async fn rename_folder(&self, ctx: &CallContext, req: RenameFolderRequest) -> BackendResult<Folder> {
        self.script.enter(ctx)?;
        Ok(Folder {
            folder_id: req.folder_id,
            folder_name: req.folder_name,
            folder_type: FolderType::Custom,
        })
    }

    async fn delete_folder(&self, ctx: &CallContext, req: FolderIdRequest) -> BackendResult<()> {
        self.script.enter(ctx)?;
        self.deleted_folders.lock().unwrap().push(req.folder_id);
        Ok(())
    }

    async fn save_draft(&self, ctx: &CallContext, req: SaveDraftRequest) -> BackendResult<Draft> {
        self.script.enter(ctx)?;
        Ok(Draft {
            draft_id: req.draft_id.unwrap_or_else(|| "d-new".into()),
            thread_id: req.thread_id.unwrap_or_default(),
            receivers: req.receivers,
            topic: req.topic,
            text: req.text,
            updated_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap(),
        })
    }

    async fn delete_draft(&self, ctx: &CallContext, _req: DraftIdRequest) -> BackendResult<()> {
        self.script.enter(ctx)
    }

    async fn send_draft(&self, ctx: &CallContext, _req: DraftIdRequest) -> BackendResult<SentMessage> {
        self.script.enter(ctx)?;
        Ok(sent())
    }

    async fn mark_as_spam(&self, ctx: &CallContext, _req: MessageIdRequest) -> BackendResult<()> {
        self.script.enter(ctx)
    }

    async fn move_to_folder(&self, ctx: &CallContext, req: MoveToFolderRequest) -> BackendResult<()> {
        self.script.enter(ctx)?;
        self.moved.lock().unwrap().push(req);
        Ok(())
    }

    async fn upload_attachment(&self, ctx: &CallContext, upload: UploadDescriptor) -> BackendResult<UploadAttachmentResponse> {
        self.script.enter(ctx)?;
        let url = format!("http://localhost:9000/attachments/{}", upload.filename);
        self.attachments.lock().unwrap().push(upload);
        Ok(UploadAttachmentResponse { url })
    }
}

// -------------------------
// Server
// -------------------------

#[derive(Clone, Default)]
pub struct Fakes {
    pub auth: Arc<FakeAuth>,
    pub profile: Arc<FakeProfile>,
    pub messages: Arc<FakeMessages>,
}

impl Fakes {
    pub fn backends(&self) -> Backends {
        Backends {
            auth: self.auth.clone(),
            profile: self.profile.clone(),
            messages: self.messages.clone(),
        }
    }

    pub fn total_calls(&self) -> usize {
        self.auth.calls() + self.profile.calls() + self.messages.calls()
    }
}

pub struct TestServer {
    pub base_url: String,
    pub fakes: Fakes,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(GatewayConfig::default()).await
    }

    pub async fn spawn_with(config: GatewayConfig) -> Self {
        let fakes = Fakes::default();
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = build_app(&config, fakes.backends());
        let limits = ConnectionLimits::from(&config);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            server::serve(listener, app, limits, std::future::pending())
                .await
                .unwrap();
        });

        Self {
            base_url,
            fakes,
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `host:port` for raw socket tests.
    pub fn addr(&self) -> &str {
        self.base_url.trim_start_matches("http://")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Cookie header for an authenticated session.
pub const SESSION_COOKIE: &str = "access_token=access-1; refresh_token=refresh-1";

pub fn set_cookies(res: &reqwest::Response) -> Vec<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
