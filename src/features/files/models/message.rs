use sqlx::FromRow;

/// One unit of text extracted from a file
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProcessedMessage {
    pub id: i64,
    pub message: String,
    pub processed_file_id: i64,
}

/// Message stored when a file cannot be parsed
pub fn invalid_content_message(original_file_name: &str) -> String {
    format!("{} File has Invalid Content.", original_file_name)
}
