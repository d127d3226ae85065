//! Document serializer
//!
//! Renders records as one JSON object keyed `"1"`, `"2"`, ... in record
//! order. The whole document is serialized in a single pass, so an empty
//! record list produces `{}`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::Record;

/// Borrowed view of records as an index-keyed document
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    records: &'a [Record],
}

impl<'a> Document<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for (i, record) in self.records.iter().enumerate() {
            map.serialize_entry(&document_key(i), record)?;
        }
        map.end()
    }
}

/// Document key for the record at `index` (0-based).
pub fn document_key(index: usize) -> String {
    (index + 1).to_string()
}

/// Serialize records as a document string.
pub fn serialize_document(records: &[Record], pretty: bool) -> Result<String, serde_json::Error> {
    let document = Document::new(records);
    if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Scalar;
    use serde_json::{Map, Value};

    fn person(name: &str, age: i32, active: bool) -> Record {
        Record::new(vec![
            ("Name".into(), Scalar::String(name.into())),
            ("Age".into(), Scalar::Int(age)),
            ("Active".into(), Scalar::Bool(active)),
        ])
    }

    #[test]
    fn test_empty_document_is_valid_object() {
        let json = serialize_document(&[], false).unwrap();
        assert_eq!(json, "{}");
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.as_object().unwrap().is_empty());
    }

    #[test]
    fn test_compact_shape() {
        let json = serialize_document(&[person("Alice", 30, true)], false).unwrap();
        assert_eq!(json, r#"{"1":{"Name":"Alice","Age":30,"Active":true}}"#);
    }

    #[test]
    fn test_keys_sequential_and_ordered() {
        let records: Vec<Record> = (0..12)
            .map(|i| person(&format!("P{}", i), i, i % 2 == 0))
            .collect();
        let json = serialize_document(&records, false).unwrap();

        let parsed: Map<String, Value> = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
        let expected: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
        assert_eq!(keys, expected.iter().map(String::as_str).collect::<Vec<_>>());

        assert_eq!(parsed["10"]["Name"], "P9");
        assert_eq!(parsed["10"]["Age"], 9);
        assert_eq!(parsed["10"]["Active"], false);
        let fields: Vec<&str> = parsed["1"].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(fields, ["Name", "Age", "Active"]);
    }

    #[test]
    fn test_strings_are_escaped() {
        let record = Record::new(vec![("Quote".into(), Scalar::String("say \"hi\"\n".into()))]);
        let json = serialize_document(&[record], false).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["1"]["Quote"], "say \"hi\"\n");
    }

    #[test]
    fn test_float_widening() {
        let record = Record::new(vec![("Speed".into(), Scalar::Float(1.5))]);
        let json = serialize_document(&[record], false).unwrap();
        let parsed: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["1"]["Speed"].as_f64(), Some(1.5));
    }

    #[test]
    fn test_pretty_output_parses_same() {
        let records = vec![person("Alice", 30, true)];
        let compact: Value = serde_json::from_str(&serialize_document(&records, false).unwrap()).unwrap();
        let pretty_text = serialize_document(&records, true).unwrap();
        assert!(pretty_text.contains('\n'));
        let pretty: Value = serde_json::from_str(&pretty_text).unwrap();
        assert_eq!(compact, pretty);
    }
}
