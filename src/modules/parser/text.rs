use super::ParseError;

const UTF8_BOM: &str = "\u{feff}";

/// Decode strict UTF-8 (a leading BOM is dropped)
pub(super) fn decode_utf8(data: &[u8]) -> Result<&str, ParseError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| ParseError::Malformed(format!("invalid UTF-8: {}", e)))?;
    Ok(text.strip_prefix(UTF8_BOM).unwrap_or(text))
}

/// One unit per non-blank line, trimmed
pub(super) fn parse_lines(data: &[u8]) -> Result<Vec<String>, ParseError> {
    let text = decode_utf8(data)?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
