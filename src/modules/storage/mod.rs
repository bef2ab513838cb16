//! Storage module for uploaded file content
//!
//! Raw bytes live outside the database, keyed by a system-assigned file name
//! that never reuses the uploader's original name.

mod local_store;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use local_store::LocalFileStore;

/// Result of writing an upload to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Generated name the content is stored under (e.g. `"<uuid>.csv"`)
    pub system_file_name: String,
    /// Number of bytes written
    pub size: u64,
}

/// Backend that holds raw uploaded bytes
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `data` under a freshly generated name ending in `extension`
    async fn save(&self, data: &[u8], extension: &str) -> Result<StoredFile, AppError>;

    /// Read back the content stored under `system_file_name`
    async fn read(&self, system_file_name: &str) -> Result<Vec<u8>, AppError>;

    /// Remove stored content. Returns `false` when nothing was stored under that name.
    async fn delete(&self, system_file_name: &str) -> Result<bool, AppError>;
}

/// Format a byte count the way file listings show it (`"512 B"`, `"1.5 KB"`, `"2 MB"`)
pub fn readable_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.1}", size);
    let rounded = rounded.strip_suffix(".0").unwrap_or(&rounded);
    format!("{} {}", rounded, UNITS[unit])
}

/// Lowercase extension of a file name, if it has one
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
