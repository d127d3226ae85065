//! JSON Schema validation for serialized documents.
//!
//! A document is an object keyed `"1".."N"` whose values are flat objects
//! of scalars. The embedded schema (`schemas/document.json`, draft 7)
//! checks the shape; [`validate_document`] additionally checks that keys
//! are contiguous and in order.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sheetgen::validate_document;
//!
//! let doc = json!({ "1": { "Name": "Alice", "Age": 30 } });
//! assert!(validate_document(&doc).is_ok());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static DOCUMENT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/document.json"))
        .expect("Invalid embedded schema")
});

/// Validate `data` against a JSON schema.
///
/// Returns every error message when invalid.
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a document's shape and key sequence.
pub fn validate_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&DOCUMENT_SCHEMA, data)?;

    let mut errors = Vec::new();
    if let Some(entries) = data.as_object() {
        for (i, key) in entries.keys().enumerate() {
            let expected = (i + 1).to_string();
            if *key != expected {
                errors.push(format!(
                    "key '{}' at position {} breaks the sequence (expected '{}')",
                    key,
                    i + 1,
                    expected
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick check against the document rules.
pub fn is_valid_document(data: &Value) -> bool {
    validate_document(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_document() {
        let doc = json!({
            "1": { "Name": "Alice", "Age": 30, "Speed": 1.5, "Active": true },
            "2": { "Name": "Bob", "Age": 25, "Speed": 0.0, "Active": false, "Born": null }
        });
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn test_empty_document_valid() {
        assert!(is_valid_document(&json!({})));
    }

    #[test]
    fn test_nested_values_rejected() {
        let doc = json!({ "1": { "Tags": ["a", "b"] } });
        let errors = validate_document(&doc).unwrap_err();
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_non_index_key_rejected() {
        let doc = json!({ "first": { "Name": "Alice" } });
        assert!(!is_valid_document(&doc));
    }

    #[test]
    fn test_gap_in_sequence_rejected() {
        let doc: Value = serde_json::from_str(r#"{"1":{"A":1},"3":{"A":2}}"#).unwrap();
        let errors = validate_document(&doc).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("'3'"));
    }

    #[test]
    fn test_out_of_order_rejected() {
        let doc: Value = serde_json::from_str(r#"{"2":{"A":1},"1":{"A":2}}"#).unwrap();
        assert!(!is_valid_document(&doc));
    }

    #[test]
    fn test_root_array_rejected() {
        assert!(!is_valid_document(&json!([{ "Name": "Alice" }])));
    }
}
