mod file_processor;

pub use file_processor::{FileProcessor, ProcessingOutcome};
