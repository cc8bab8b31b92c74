//! Delimited text encoding of the search history
//!
//! Records are joined with RS (U+001E); the fields of a record (expression,
//! type code, timestamp) are joined with FS (U+001F). Nothing is escaped:
//! `encode` leaves out any item whose expression contains either separator,
//! and a stored record that does not split into exactly three fields is
//! dropped on decode.

use super::{HistoryError, SearchHistoryItem};
use crate::core::types::ValueType;
use tracing::debug;

/// Record separator
pub const RECORD_SEPARATOR: char = '\u{1E}';
/// Field separator
pub const FIELD_SEPARATOR: char = '\u{1F}';

/// Whether an expression would break the record framing
pub fn contains_separator(expression: &str) -> bool {
    expression.contains(&[RECORD_SEPARATOR, FIELD_SEPARATOR][..])
}

/// Serializes items in order, skipping expressions that contain a separator
pub fn encode(items: &[SearchHistoryItem]) -> String {
    let mut out = String::new();
    for item in items {
        if contains_separator(&item.expression) {
            debug!(expression = ?item.expression, "history record not encodable, skipped");
            continue;
        }
        if !out.is_empty() {
            out.push(RECORD_SEPARATOR);
        }
        out.push_str(&encode_record(item));
    }
    out
}

/// Serializes a single record
pub fn encode_record(item: &SearchHistoryItem) -> String {
    format!(
        "{}{FS}{}{FS}{}",
        item.expression,
        item.value_type.code(),
        item.timestamp,
        FS = FIELD_SEPARATOR
    )
}

/// Parses a single record
pub fn decode_record(record: &str) -> Result<SearchHistoryItem, HistoryError> {
    let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
    let [expression, code, timestamp] = fields.as_slice() else {
        return Err(HistoryError::MalformedRecord(format!(
            "expected 3 fields, found {}",
            fields.len()
        )));
    };

    if expression.trim().is_empty() {
        return Err(HistoryError::MalformedRecord("blank expression".into()));
    }
    let value_type = ValueType::from_code(code)
        .ok_or_else(|| HistoryError::MalformedRecord(format!("unknown type code {:?}", code)))?;
    let timestamp = timestamp
        .parse::<i64>()
        .map_err(|e| HistoryError::MalformedRecord(format!("bad timestamp: {}", e)))?;

    Ok(SearchHistoryItem {
        expression: expression.to_string(),
        value_type,
        timestamp,
    })
}

/// Best-effort parse: malformed records are skipped, the rest are kept
pub fn decode(blob: &str) -> Vec<SearchHistoryItem> {
    if blob.trim().is_empty() {
        return Vec::new();
    }

    blob.split(RECORD_SEPARATOR)
        .filter_map(|record| match decode_record(record) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(error = %e, "history record dropped");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(expression: &str, value_type: ValueType, timestamp: i64) -> SearchHistoryItem {
        SearchHistoryItem {
            expression: expression.to_string(),
            value_type,
            timestamp,
        }
    }

    #[test]
    fn test_encode_layout() {
        let blob = encode(&[item("100", ValueType::Dword, 5), item("1.5", ValueType::Float, 3)]);
        assert_eq!(blob, "100\u{1F}D\u{1F}5\u{1E}1.5\u{1F}F\u{1F}3");
    }

    #[test]
    fn test_round_trip() {
        let items = vec![
            item("100~200", ValueType::Dword, 1_700_000_000_123),
            item("12;34;56::64", ValueType::Qword, 1_700_000_000_000),
            item("-3.5", ValueType::Double, -1),
        ];
        assert_eq!(decode(&encode(&items)), items);
    }

    #[test]
    fn test_blank_blob() {
        assert!(decode("").is_empty());
        assert!(decode("   \n").is_empty());
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let blob = [
            "ok\u{1F}D\u{1F}1",
            "too\u{1F}few",
            "bad\u{1F}Z\u{1F}2",
            "bad\u{1F}D\u{1F}later",
            " \u{1F}D\u{1F}3",
            "also ok\u{1F}B\u{1F}4",
        ]
        .join("\u{1E}");

        assert_eq!(
            decode(&blob),
            vec![item("ok", ValueType::Dword, 1), item("also ok", ValueType::Byte, 4)]
        );
    }

    #[test]
    fn test_embedded_separator_only_loses_that_record() {
        let items = vec![
            item("a\u{1F}b", ValueType::Dword, 2),
            item("fine", ValueType::Word, 1),
        ];
        assert_eq!(decode(&encode(&items)), vec![item("fine", ValueType::Word, 1)]);
    }

    #[test]
    fn test_record_separator_cannot_inject_records() {
        let items = vec![
            item("a\u{1E}b\u{1F}Q\u{1F}9", ValueType::Dword, 2),
            item("ok", ValueType::Byte, 1),
        ];
        let blob = encode(&items);

        assert_eq!(blob, "ok\u{1F}B\u{1F}1");
        assert_eq!(decode(&blob), vec![item("ok", ValueType::Byte, 1)]);
        assert!(contains_separator("x\u{1E}"));
        assert!(!contains_separator("0x1F"));
    }

    #[test]
    fn test_decode_record_errors() {
        assert!(matches!(
            decode_record("x\u{1F}D"),
            Err(HistoryError::MalformedRecord(_))
        ));
        assert!(decode_record("x\u{1F}D\u{1F}1\u{1F}extra").is_err());
    }
}
