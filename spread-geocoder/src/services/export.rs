//! Output serialization
//!
//! Pretty-printed JSON with 4-space indentation, canonical field order.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::models::LocationRecord;

/// File name offered for download
pub const DOWNLOAD_FILE_NAME: &str = "updated_locations.json";

/// Serialize records for download
pub fn to_pretty_json(records: &[LocationRecord]) -> serde_json::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(records.len() * 512);
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FIELD_NAMES;

    #[test]
    fn test_four_space_indentation() {
        let records = vec![LocationRecord {
            id: "1".into(),
            name: "Acme".into(),
            ..LocationRecord::default()
        }];
        let text = String::from_utf8(to_pretty_json(&records).unwrap()).unwrap();

        assert!(text.starts_with("[\n    {\n        \"id\": \"1\",\n        \"name\": \"Acme\","));
        assert!(text.ends_with("\n    }\n]"));
    }

    #[test]
    fn test_every_record_has_canonical_keys() {
        let records = vec![LocationRecord::default(), LocationRecord::default()];
        let text = String::from_utf8(to_pretty_json(&records).unwrap()).unwrap();
        for name in FIELD_NAMES {
            assert_eq!(text.matches(&format!("\"{}\":", name)).count(), 2);
        }
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(to_pretty_json(&[]).unwrap(), b"[]");
    }
}
