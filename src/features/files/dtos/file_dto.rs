use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::files::models::{FileRecord, ProcessedMessage};

/// Upload file request DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// File record as shown in listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileRecordSummaryDto {
    pub id: i64,
    /// Name the file was uploaded with
    pub original_file_name: String,
    /// Human-readable size, e.g. "1.5 KB"
    pub file_size: String,
    pub upload_date: DateTime<Utc>,
    /// True once the content was parsed successfully
    pub processed: bool,
}

impl From<FileRecord> for FileRecordSummaryDto {
    fn from(file: FileRecord) -> Self {
        Self {
            id: file.id,
            original_file_name: file.original_file_name,
            file_size: file.file_size,
            upload_date: file.upload_date,
            processed: file.processed,
        }
    }
}

/// One extracted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub id: i64,
    pub message: String,
}

impl From<ProcessedMessage> for MessageDto {
    fn from(message: ProcessedMessage) -> Self {
        Self {
            id: message.id,
            message: message.message,
        }
    }
}
