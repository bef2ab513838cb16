mod file_dto;

pub use file_dto::{FileRecordSummaryDto, MessageDto, UploadFileDto};
