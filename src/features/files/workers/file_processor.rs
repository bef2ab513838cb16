//! Background worker that parses uploaded files
//!
//! Events arrive over the upload queue. Each file is handled in its own task,
//! with a semaphore bounding how many are parsed at once.

use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::core::error::{AppError, Result};
use crate::features::files::cache::ListingCache;
use crate::features::files::events::{FileEventReceiver, FileUploadedEvent};
use crate::features::files::models::{invalid_content_message, FileRecord};
use crate::features::files::repositories::{FileRecordRepository, MessageRepository};
use crate::features::users::UserRepository;
use crate::modules::notifier::Notifier;
use crate::modules::parser::{ContentParser, ParseError};
use crate::modules::storage::{file_extension, FileStore};

/// Result of handling one uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingOutcome {
    /// Content parsed; one message stored per unit
    Processed { messages: u64 },
    /// Content could not be parsed; the invalid-content message was stored
    Invalid,
    /// Nothing done, the file already has messages
    Skipped,
}

pub struct FileProcessor {
    files: Arc<dyn FileRecordRepository>,
    messages: Arc<dyn MessageRepository>,
    users: Arc<dyn UserRepository>,
    store: Arc<dyn FileStore>,
    cache: Arc<ListingCache>,
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
}

impl FileProcessor {
    pub fn new(
        files: Arc<dyn FileRecordRepository>,
        messages: Arc<dyn MessageRepository>,
        users: Arc<dyn UserRepository>,
        store: Arc<dyn FileStore>,
        cache: Arc<ListingCache>,
        notifier: Arc<dyn Notifier>,
        concurrency: usize,
    ) -> Self {
        Self {
            files,
            messages,
            users,
            store,
            cache,
            notifier,
            concurrency: concurrency.max(1),
        }
    }

    /// Consume upload events until every sender is dropped
    pub async fn run(self: Arc<Self>, mut receiver: FileEventReceiver) {
        tracing::info!(
            "File processor started: {} files in parallel",
            self.concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        while let Some(FileUploadedEvent { file }) = receiver.recv().await {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };

            let processor = Arc::clone(&self);
            tokio::spawn(async move {
                let _permit = permit;
                let file_id = file.id;
                match processor.process(file).await {
                    Ok(outcome) => {
                        tracing::debug!("File {} finished: {:?}", file_id, outcome)
                    }
                    Err(e) => tracing::error!("Processing of file {} failed: {}", file_id, e),
                }
            });
        }

        tracing::info!("File processor stopped: upload queue closed");
    }

    /// Parse one file, store the outcome and notify the interested users
    pub async fn process(&self, file: FileRecord) -> Result<ProcessingOutcome> {
        let existing = self.messages.count_by_file(file.id).await?;
        if existing > 0 {
            tracing::warn!(
                "File {} already has {} messages, skipping",
                file.id,
                existing
            );
            return Ok(ProcessingOutcome::Skipped);
        }

        let (processed, messages) = match self.extract(&file).await {
            Ok(units) => (true, units),
            Err(e) => {
                tracing::warn!(
                    "File {} ('{}') has invalid content: {}",
                    file.id,
                    file.original_file_name,
                    e
                );
                (false, vec![invalid_content_message(&file.original_file_name)])
            }
        };

        let stored = self
            .files
            .complete_processing(file.id, processed, &messages)
            .await
            .inspect_err(|e| {
                tracing::error!("Failed to store outcome of file {}: {}", file.id, e)
            })?;

        self.cache.invalidate_all().await;

        tracing::info!(
            "File processed: id={}, name={}, messages={}, valid={}",
            file.id,
            file.original_file_name,
            stored,
            processed
        );

        self.notify_completion(&file).await;

        if processed {
            Ok(ProcessingOutcome::Processed { messages: stored })
        } else {
            Ok(ProcessingOutcome::Invalid)
        }
    }

    async fn extract(&self, file: &FileRecord) -> std::result::Result<Vec<String>, ExtractError> {
        let extension = file_extension(&file.system_file_name)
            .ok_or_else(|| ParseError::UnsupportedFormat(file.system_file_name.clone()))?;

        let data = self.store.read(&file.system_file_name).await?;

        // Workbook decoding is CPU bound
        let units = tokio::task::spawn_blocking(move || ContentParser::parse(&data, &extension))
            .await
            .map_err(|e| AppError::Internal(format!("Parser task failed: {}", e)))??;

        Ok(units)
    }

    async fn notify_completion(&self, file: &FileRecord) {
        let owner = match self.users.find_by_id(file.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tracing::warn!("Owner {} of file {} no longer exists", file.user_id, file.id);
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to load owner of file {}: {}", file.id, e);
                return;
            }
        };

        let owner_message = format!(
            "Hi, {}, your {} file has been processed.",
            owner.first_name, file.original_file_name
        );
        if let Err(e) = self.notifier.notify(&owner.email, &owner_message).await {
            tracing::warn!("Failed to notify owner of file {}: {}", file.id, e);
        }

        let admins = match self.users.find_admins().await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!("Failed to load admins for file {}: {}", file.id, e);
                return;
            }
        };

        let admin_message = format!(
            "File {} uploaded by {} has been processed.",
            file.original_file_name, owner.email
        );
        for admin in admins {
            if let Err(e) = self.notifier.notify(&admin.email, &admin_message).await {
                tracing::warn!("Failed to notify admin {}: {}", admin.id, e);
            }
        }
    }
}

/// Anything that turns a file into the invalid-content outcome
#[derive(Debug, thiserror::Error)]
enum ExtractError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    App(#[from] AppError),
}
