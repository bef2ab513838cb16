use serde_json::Value;

use super::ParseError;

/// One unit per element of a top-level JSON array.
///
/// String elements are taken verbatim, anything else is re-serialized
/// compactly. Blank strings are skipped.
pub(super) fn parse_json_array(data: &[u8]) -> Result<Vec<String>, ParseError> {
    let document: Value = serde_json::from_slice(data)
        .map_err(|e| ParseError::Malformed(format!("invalid JSON: {}", e)))?;

    let Value::Array(items) = document else {
        return Err(ParseError::Malformed(
            "expected a JSON array at the top level".to_string(),
        ));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_items() {
        let data = br#"["hello", {"level":"warn"}, 42, ""]"#;
        let units = parse_json_array(data).unwrap();
        assert_eq!(units, vec!["hello", r#"{"level":"warn"}"#, "42"]);
    }

    #[test]
    fn test_object_root_is_malformed() {
        assert!(matches!(
            parse_json_array(br#"{"messages": []}"#),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        assert!(matches!(
            parse_json_array(br#"["one", "two""#),
            Err(ParseError::Malformed(_))
        ));
    }
}
