use calamine::{Data, Reader};
use std::io::Cursor;

use super::ParseError;

/// One unit per non-empty row across all sheets, in workbook order
pub(super) fn parse_workbook(data: &[u8]) -> Result<Vec<String>, ParseError> {
    let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(data))
        .map_err(|e| ParseError::Malformed(format!("unreadable workbook: {}", e)))?;

    let mut units = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            ParseError::Malformed(format!("unreadable sheet '{}': {}", sheet_name, e))
        })?;

        for row in range.rows() {
            let cells: Vec<String> = row.iter().filter_map(cell_text).collect();
            if !cells.is_empty() {
                units.push(cells.join(", "));
            }
        }
    }

    Ok(units)
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    };

    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            parse_workbook(b"definitely not a zip archive"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("  ".to_string())), None);
        assert_eq!(cell_text(&Data::String(" x ".to_string())).as_deref(), Some("x"));
        assert_eq!(cell_text(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(cell_text(&Data::Bool(true)).as_deref(), Some("true"));
    }
}
