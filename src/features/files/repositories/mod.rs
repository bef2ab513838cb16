mod file_repository;

pub use file_repository::{FileRecordRepository, MessageRepository, PgFileRepository};
