//! Fixtures shared by unit and handler tests

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::cache::ListingCache;
use crate::features::files::events::{file_event_channel, FileEventReceiver};
use crate::features::files::models::{
    FileRecord, ListingScope, NewFileRecord, ProcessedMessage, SortKey,
};
use crate::features::files::repositories::{FileRecordRepository, MessageRepository};
use crate::features::files::services::{FileService, UploadLimits};
use crate::features::files::workers::{FileProcessor, ProcessingOutcome};
use crate::features::users::{User, UserRepository, UserRole};
use crate::modules::notifier::Notifier;
use crate::modules::storage::{FileStore, LocalFileStore, StoredFile};
use crate::shared::constants::DEFAULT_ALLOWED_EXTENSIONS;

pub const TEST_JWT_SECRET: &str = "test-secret-for-unit-tests";

#[derive(Serialize)]
struct TestClaims<'a> {
    sub: &'a str,
    email: &'a str,
    exp: u64,
}

/// Sign an HS256 token the way the identity provider would
pub fn issue_token(email: &str) -> String {
    let claims = TestClaims {
        sub: "test-sub",
        email,
        exp: (Utc::now().timestamp() + 3600) as u64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// Attach a fixed caller identity to every request, in place of token checks
pub fn with_identity(router: Router, email: &str) -> Router {
    let identity = AuthenticatedUser {
        sub: "test-sub".to_string(),
        email: email.to_string(),
    };

    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let identity = identity.clone();
            async move {
                request.extensions_mut().insert(identity);
                next.run(request).await
            }
        },
    ))
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    files: BTreeMap<i64, FileRecord>,
    messages: BTreeMap<i64, ProcessedMessage>,
    next_id: i64,
    fail_commit: bool,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory stand-in for every repository
#[derive(Default)]
pub struct InMemoryRecords {
    tables: Mutex<Tables>,
}

impl InMemoryRecords {
    pub fn add_user(&self, email: &str, first_name: &str, role: UserRole) -> User {
        let mut tables = self.tables.lock().unwrap();
        let user = User {
            id: tables.next_id(),
            email: email.to_string(),
            first_name: first_name.to_string(),
            role,
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    /// Make the next `complete_processing` calls fail without writing
    pub fn fail_commit(&self, fail: bool) {
        self.tables.lock().unwrap().fail_commit = fail;
    }

    pub fn file(&self, id: i64) -> Option<FileRecord> {
        self.tables.lock().unwrap().files.get(&id).cloned()
    }

    pub fn last_file_id(&self) -> Option<i64> {
        self.tables.lock().unwrap().files.keys().next_back().copied()
    }

    pub fn file_count(&self) -> usize {
        self.tables.lock().unwrap().files.len()
    }

    pub fn messages_of(&self, file_id: i64) -> Vec<String> {
        self.tables
            .lock()
            .unwrap()
            .messages
            .values()
            .filter(|m| m.processed_file_id == file_id)
            .map(|m| m.message.clone())
            .collect()
    }
}

#[async_trait]
impl FileRecordRepository for InMemoryRecords {
    async fn insert(&self, new_file: NewFileRecord) -> Result<FileRecord> {
        let mut tables = self.tables.lock().unwrap();
        let file = FileRecord {
            id: tables.next_id(),
            user_id: new_file.user_id,
            original_file_name: new_file.original_file_name,
            system_file_name: new_file.system_file_name,
            file_size: new_file.file_size,
            upload_date: Utc::now(),
            processed: false,
        };
        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        Ok(self.file(id))
    }

    async fn list(
        &self,
        scope: ListingScope,
        _sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<FileRecord>, i64)> {
        let tables = self.tables.lock().unwrap();
        let visible: Vec<FileRecord> = tables
            .files
            .values()
            .filter(|f| match scope {
                ListingScope::All => true,
                ListingScope::Owner(user_id) => f.user_id == user_id,
            })
            .cloned()
            .collect();

        let total = visible.len() as i64;
        let page = visible
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn complete_processing(
        &self,
        file_id: i64,
        processed: bool,
        messages: &[String],
    ) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        if tables.fail_commit {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }

        if !tables.files.contains_key(&file_id) {
            return Err(AppError::NotFound(format!("File {} not found", file_id)));
        }

        for message in messages {
            let id = tables.next_id();
            tables.messages.insert(
                id,
                ProcessedMessage {
                    id,
                    message: message.clone(),
                    processed_file_id: file_id,
                },
            );
        }

        if let Some(file) = tables.files.get_mut(&file_id) {
            file.processed = processed;
        }

        Ok(messages.len() as u64)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().unwrap();
        if tables.files.remove(&id).is_none() {
            return Ok(false);
        }
        tables.messages.retain(|_, m| m.processed_file_id != id);
        Ok(true)
    }
}

#[async_trait]
impl MessageRepository for InMemoryRecords {
    async fn find_by_file(&self, file_id: i64) -> Result<Vec<ProcessedMessage>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .messages
            .values()
            .filter(|m| m.processed_file_id == file_id)
            .cloned()
            .collect())
    }

    async fn count_by_file(&self, file_id: i64) -> Result<i64> {
        Ok(self.messages_of(file_id).len() as i64)
    }

    async fn delete_by_file(&self, file_id: i64) -> Result<u64> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.messages.len();
        tables.messages.retain(|_, m| m.processed_file_id != file_id);
        Ok((before - tables.messages.len()) as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryRecords {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().unwrap().users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_admins(&self) -> Result<Vec<User>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| u.is_admin())
            .cloned()
            .collect())
    }
}

/// Notifier that keeps every (address, message) pair it was given
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Reject every delivery from now on
    pub fn fail(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, address: &str, message: &str) -> Result<()> {
        if *self.failing.lock().unwrap() {
            return Err(AppError::ExternalServiceError(
                "mail relay unavailable".to_string(),
            ));
        }
        self.sent
            .lock()
            .unwrap()
            .push((address.to_string(), message.to_string()));
        Ok(())
    }
}

/// File store whose disk is always full
pub struct BrokenFileStore;

#[async_trait]
impl FileStore for BrokenFileStore {
    async fn save(&self, _data: &[u8], _extension: &str) -> Result<StoredFile> {
        Err(AppError::Storage("No space left on device".to_string()))
    }

    async fn read(&self, _system_file_name: &str) -> Result<Vec<u8>> {
        Err(AppError::Storage("No space left on device".to_string()))
    }

    async fn delete(&self, _system_file_name: &str) -> Result<bool> {
        Err(AppError::Storage("No space left on device".to_string()))
    }
}

/// Service, processor and their fakes wired together
pub struct TestContext {
    pub service: Arc<FileService>,
    pub processor: Arc<FileProcessor>,
    pub records: Arc<InMemoryRecords>,
    pub notifier: Arc<RecordingNotifier>,
    pub events: FileEventReceiver,
    upload_dir: TempDir,
}

impl TestContext {
    pub const MAX_FILE_SIZE: usize = 64 * 1024;

    pub async fn new() -> Self {
        let upload_dir = TempDir::new().unwrap();
        let store = LocalFileStore::new(upload_dir.path()).await.unwrap();
        Self::build(upload_dir, Arc::new(store))
    }

    pub async fn with_file_store(store: Arc<dyn FileStore>) -> Self {
        Self::build(TempDir::new().unwrap(), store)
    }

    fn build(upload_dir: TempDir, store: Arc<dyn FileStore>) -> Self {
        let records = Arc::new(InMemoryRecords::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let cache = Arc::new(ListingCache::new());
        let (sender, events) = file_event_channel();

        let limits = UploadLimits {
            max_file_size: Self::MAX_FILE_SIZE,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        };

        let service = Arc::new(FileService::new(
            records.clone(),
            records.clone(),
            records.clone(),
            Arc::clone(&store),
            Arc::clone(&cache),
            sender,
            limits,
        ));

        let processor = Arc::new(FileProcessor::new(
            records.clone(),
            records.clone(),
            records.clone(),
            store,
            cache,
            notifier.clone(),
            2,
        ));

        Self {
            service,
            processor,
            records,
            notifier,
            events,
            upload_dir,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    pub async fn standard_user(&self, email: &str) -> User {
        self.standard_user_named(email, "Test").await
    }

    pub async fn standard_user_named(&self, email: &str, first_name: &str) -> User {
        self.records.add_user(email, first_name, UserRole::Standard)
    }

    pub async fn admin_user(&self, email: &str) -> User {
        self.records.add_user(email, "Admin", UserRole::Admin)
    }

    /// Upload `content` as `user` and return the new file id
    pub async fn upload(&self, user: &User, file_name: &str, content: &str) -> i64 {
        self.service
            .upload(user, content.as_bytes().to_vec(), file_name)
            .await
            .unwrap();
        self.records.last_file_id().unwrap()
    }

    /// Run every queued upload through the processor, in order
    pub async fn process_pending(&mut self) -> Vec<ProcessingOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            outcomes.push(self.processor.process(event.file).await.unwrap());
        }
        outcomes
    }

    /// Hand the upload queue to a caller that runs the processor loop
    pub fn take_receiver(&mut self) -> FileEventReceiver {
        std::mem::replace(&mut self.events, file_event_channel().1)
    }
}
