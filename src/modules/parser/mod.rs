//! Content parser for uploaded files
//!
//! Turns raw bytes into an ordered list of text units, one per line, row or
//! array item depending on the format. Parsing is all-or-nothing: any error
//! discards whatever was extracted so far.

mod delimited;
mod document;
mod spreadsheet;
mod text;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed content: {0}")]
    Malformed(String),

    #[error("File has no extractable content")]
    Empty,
}

/// Formats the parser understands, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// Plain text, one unit per non-blank line
    Lines,
    /// Comma separated values with a header row
    Csv,
    /// JSON document whose top level is an array
    JsonArray,
    /// Excel / OpenDocument workbook
    Spreadsheet,
}

impl ContentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "txt" | "log" => Some(Self::Lines),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::JsonArray),
            "xlsx" | "xls" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

pub struct ContentParser;

impl ContentParser {
    /// Extract text units from `data`, dispatching on `extension`
    pub fn parse(data: &[u8], extension: &str) -> Result<Vec<String>, ParseError> {
        let format = ContentFormat::from_extension(extension)
            .ok_or_else(|| ParseError::UnsupportedFormat(extension.to_string()))?;

        let units = match format {
            ContentFormat::Lines => text::parse_lines(data)?,
            ContentFormat::Csv => delimited::parse_csv(data)?,
            ContentFormat::JsonArray => document::parse_json_array(data)?,
            ContentFormat::Spreadsheet => spreadsheet::parse_workbook(data)?,
        };

        if units.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(units)
    }
}
