use super::ParseError;

/// One unit per data row, rendered as `header: value` pairs.
///
/// Rows must have as many fields as the header; ragged rows and invalid
/// UTF-8 fail the whole file.
pub(super) fn parse_csv(data: &[u8]) -> Result<Vec<String>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| ParseError::Malformed(format!("unreadable CSV header: {}", e)))?
        .clone();

    let mut units = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| ParseError::Malformed(format!("CSV row {}: {}", index + 1, e)))?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let unit = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| {
                if header.is_empty() {
                    value.to_string()
                } else {
                    format!("{}: {}", header, value)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        units.push(unit);
    }

    Ok(units)
}
