use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for uploaded files
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FileRecord {
    pub id: i64,
    pub user_id: i64,
    pub original_file_name: String,
    pub system_file_name: String,
    /// Human-readable size, e.g. "1.5 KB"
    pub file_size: String,
    pub upload_date: DateTime<Utc>,
    pub processed: bool,
}

/// Values for inserting a freshly uploaded file
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub user_id: i64,
    pub original_file_name: String,
    pub system_file_name: String,
    pub file_size: String,
}
