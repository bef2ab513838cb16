use tokio::sync::mpsc;

use crate::features::files::models::FileRecord;

/// Published once per upload, after the file record is committed
#[derive(Debug, Clone)]
pub struct FileUploadedEvent {
    pub file: FileRecord,
}

pub type FileEventSender = mpsc::UnboundedSender<FileUploadedEvent>;
pub type FileEventReceiver = mpsc::UnboundedReceiver<FileUploadedEvent>;

/// Queue connecting the upload path to the background processor
pub fn file_event_channel() -> (FileEventSender, FileEventReceiver) {
    mpsc::unbounded_channel()
}
