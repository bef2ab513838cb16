mod file;
mod listing;
mod message;

pub use file::{FileRecord, NewFileRecord};
pub use listing::{ListingScope, SortKey};
pub use message::{invalid_content_message, ProcessedMessage};
