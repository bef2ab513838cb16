use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::cache::{ListingCache, ListingKey, ListingPage};
use crate::features::files::dtos::{FileRecordSummaryDto, MessageDto};
use crate::features::files::events::{FileEventSender, FileUploadedEvent};
use crate::features::files::models::{FileRecord, ListingScope, NewFileRecord, SortKey};
use crate::features::files::repositories::{FileRecordRepository, MessageRepository};
use crate::features::users::{User, UserRepository, UserRole};
use crate::modules::storage::{file_extension, readable_file_size, FileStore};
use crate::shared::types::PaginationQuery;

/// Size and type limits applied to uploads
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size: usize,
    pub allowed_extensions: Vec<String>,
}

impl From<&StorageConfig> for UploadLimits {
    fn from(config: &StorageConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }
}

/// Request-side operations on uploaded files.
///
/// Parsing never happens here: uploads are handed to the background
/// processor through the event queue.
pub struct FileService {
    files: Arc<dyn FileRecordRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn FileStore>,
    cache: Arc<ListingCache>,
    events: FileEventSender,
    limits: UploadLimits,
}

impl FileService {
    pub fn new(
        files: Arc<dyn FileRecordRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn FileStore>,
        cache: Arc<ListingCache>,
        events: FileEventSender,
        limits: UploadLimits,
    ) -> Self {
        Self {
            files,
            messages,
            users,
            store,
            cache,
            events,
            limits,
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.limits.max_file_size
    }

    /// Load the stored user behind a token identity
    pub async fn resolve_user(&self, identity: &AuthenticatedUser) -> Result<User> {
        self.users
            .find_by_email(&identity.email)
            .await?
            .ok_or_else(|| AppError::InvalidUser("Invalid user".to_string()))
    }

    /// Check an upload against the limits and return its lowercase extension
    pub fn validate_upload(&self, file_name: &str, data: &[u8]) -> Result<String> {
        if file_name.trim().is_empty() {
            return Err(AppError::InvalidUpload("File name is required".to_string()));
        }

        if data.is_empty() {
            return Err(AppError::InvalidUpload(format!("{} is empty", file_name)));
        }

        if data.len() > self.limits.max_file_size {
            return Err(AppError::InvalidUpload(format!(
                "File too large. Maximum size is {} bytes ({})",
                self.limits.max_file_size,
                readable_file_size(self.limits.max_file_size as u64)
            )));
        }

        let extension = file_extension(file_name).ok_or_else(|| {
            AppError::InvalidUpload(format!("{} has no file extension", file_name))
        })?;

        if !self.limits.allowed_extensions.contains(&extension) {
            return Err(AppError::InvalidUpload(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                extension,
                self.limits.allowed_extensions.join(", ")
            )));
        }

        Ok(extension)
    }

    /// Store an upload, record it and queue it for processing
    ///
    /// Returns the confirmation text as soon as the record is committed; the
    /// content is parsed later by the file processor.
    pub async fn upload(&self, user: &User, data: Vec<u8>, file_name: &str) -> Result<String> {
        // Browsers may send a full client-side path
        let original_file_name = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name)
            .trim()
            .to_string();

        let extension = self.validate_upload(&original_file_name, &data)?;

        let stored = self.store.save(&data, &extension).await?;
        debug!(
            "Upload '{}' stored as '{}'",
            original_file_name, stored.system_file_name
        );

        let new_file = NewFileRecord {
            user_id: user.id,
            original_file_name: original_file_name.clone(),
            system_file_name: stored.system_file_name.clone(),
            file_size: readable_file_size(stored.size),
        };

        let file = match self.files.insert(new_file).await {
            Ok(file) => file,
            Err(e) => {
                if let Err(cleanup) = self.store.delete(&stored.system_file_name).await {
                    warn!(
                        "Failed to remove '{}' after insert error: {}",
                        stored.system_file_name, cleanup
                    );
                }
                return Err(e);
            }
        };

        info!(
            "File uploaded: id={}, name={}, size={}, user={}",
            file.id, file.original_file_name, file.file_size, user.id
        );

        let file_id = file.id;
        if self.events.send(FileUploadedEvent { file }).is_err() {
            error!(
                "File processor queue is closed; file {} will not be processed",
                file_id
            );
        }

        Ok(format!(
            "{} File is uploaded and processing started.",
            original_file_name
        ))
    }

    /// One page of file summaries visible to `user`, served from cache when possible
    pub async fn list(&self, user: &User, query: &PaginationQuery) -> Result<Arc<ListingPage>> {
        let key = ListingKey {
            user_id: user.id,
            page: query.page(),
            page_size: query.limit(),
        };

        if let Some(cached) = self.cache.get(&key).await {
            debug!("Listing cache hit for {:?}", key);
            return Ok(cached);
        }

        let generation = self.cache.generation();
        let sort = SortKey::parse(query.sort.as_deref());
        let scope = match user.role {
            UserRole::Admin => ListingScope::All,
            UserRole::Standard => ListingScope::Owner(user.id),
        };

        let (records, total) = self
            .files
            .list(scope, sort, query.offset(), query.limit())
            .await?;

        let page = ListingPage {
            items: records.into_iter().map(FileRecordSummaryDto::from).collect(),
            total,
        };

        Ok(self.cache.insert(key, page, generation).await)
    }

    /// Summary of a single file visible to `user`
    pub async fn get(&self, user: &User, file_id: i64) -> Result<FileRecordSummaryDto> {
        let file = self.find_visible(user, file_id).await?;
        Ok(file.into())
    }

    /// Messages extracted from a file visible to `user`
    pub async fn messages(&self, user: &User, file_id: i64) -> Result<Vec<MessageDto>> {
        let file = self.find_visible(user, file_id).await?;
        let messages = self.messages.find_by_file(file.id).await?;
        Ok(messages.into_iter().map(MessageDto::from).collect())
    }

    /// Delete a file, its messages and its stored content
    pub async fn delete(&self, file_id: i64) -> Result<String> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Process file not found".to_string()))?;

        let removed_messages = self.messages.delete_by_file(file.id).await?;

        if !self.store.delete(&file.system_file_name).await? {
            warn!(
                "Stored content '{}' of file {} was already missing",
                file.system_file_name, file.id
            );
        }

        if !self.files.delete(file.id).await? {
            return Err(AppError::NotFound("Process file not found".to_string()));
        }

        self.cache.invalidate_all().await;

        info!(
            "File deleted: id={}, messages_removed={}",
            file.id, removed_messages
        );

        Ok("Process file deleted successfully".to_string())
    }

    async fn find_visible(&self, user: &User, file_id: i64) -> Result<FileRecord> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Process file not found".to_string()))?;

        if user.is_admin() || file.user_id == user.id {
            Ok(file)
        } else {
            Err(AppError::NotFound("Process file not found".to_string()))
        }
    }
}
