//! Model-class generator.
//!
//! Reads a serialized document back as a generic ordered mapping, infers
//! property types from the first record and renders a C# data-holder
//! class (Newtonsoft.Json) with a static `LoadData()` loader.
//!
//! # Type mapping
//!
//! | JSON value            | C# property |
//! |-----------------------|-------------|
//! | integer (i64 range)   | `int`       |
//! | string                | `string`    |
//! | boolean               | `bool`      |
//! | floating point        | `double`    |
//! | anything else         | skipped     |
//!
//! JSON has no character type, so one-character strings are plain
//! `string` properties.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{GenerateError, GenerateResult};
use crate::logs::{log_warning, log_warning_indent};
use crate::models::{ClassField, ClassSpec, Diagnostic, FieldType, SchemaPolicy};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

static INVALID_IDENTIFIER_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid identifier regex"));

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Members every generated class declares besides its properties
const RESERVED_MEMBERS: &[&str] = &["JsonFilePath", "LoadData"];

/// Class spec plus the non-fatal issues found while inferring it
#[derive(Debug, Clone)]
pub struct InferredClass {
    pub spec: ClassSpec,
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// Identifiers
// =============================================================================

/// Whether `name` is usable as-is as a C# identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !CSHARP_KEYWORDS.contains(&name)
}

/// Turn arbitrary text into a C# identifier.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut name = INVALID_IDENTIFIER_CHARS
        .replace_all(raw.trim(), "_")
        .into_owned();

    if name.is_empty() {
        name.push('_');
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if CSHARP_KEYWORDS.contains(&name.as_str()) {
        name.insert(0, '@');
    }
    name
}

/// Property names for `json_names`, unique and clear of the class members.
fn property_names<'a>(class_name: &str, json_names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut taken: HashSet<String> = RESERVED_MEMBERS.iter().map(|s| s.to_string()).collect();
    taken.insert(class_name.trim_start_matches('@').to_string());

    json_names
        .map(|json_name| {
            let base = sanitize_identifier(json_name);
            let mut candidate = base.clone();
            if taken.contains(candidate.trim_start_matches('@')) {
                candidate = format!("{}_", base.trim_start_matches('@'));
            }
            let mut n = 2;
            while taken.contains(candidate.trim_start_matches('@')) {
                candidate = format!("{}_{}", base.trim_start_matches('@'), n);
                n += 1;
            }
            taken.insert(candidate.trim_start_matches('@').to_string());
            candidate
        })
        .collect()
}

// =============================================================================
// Inference
// =============================================================================

/// Field type of a JSON value, `None` when unsupported.
pub fn classify(value: &Value) -> Option<FieldType> {
    match value {
        Value::String(_) => Some(FieldType::String),
        Value::Bool(_) => Some(FieldType::Bool),
        Value::Number(n) if n.is_i64() => Some(FieldType::Int),
        Value::Number(n) if n.is_f64() => Some(FieldType::Double),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "int",
        Value::Number(n) if n.is_f64() => "double",
        Value::Number(_) => "unsigned 64-bit integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse document text into its ordered records.
fn parse_records(document_json: &str) -> GenerateResult<Vec<(String, Map<String, Value>)>> {
    let root: Value = serde_json::from_str(document_json)?;
    let entries = match root {
        Value::Object(entries) => entries,
        other => {
            return Err(GenerateError::InvalidDocument(format!(
                "expected an object at the root, found {}",
                json_type_name(&other)
            )))
        }
    };

    entries
        .into_iter()
        .map(|(key, value)| match value {
            Value::Object(record) => Ok((key, record)),
            other => Err(GenerateError::InvalidDocument(format!(
                "record '{}' is {}, expected an object",
                key,
                json_type_name(&other)
            ))),
        })
        .collect()
}

/// Infer a class spec from a serialized document.
///
/// With [`SchemaPolicy::FirstRecord`] only the first record is inspected.
/// With [`SchemaPolicy::Strict`] every record must have the same fields with
/// the same JSON types as the first one. An integer under a `double` field is
/// a mismatch; `null` is accepted anywhere.
pub fn infer_class_spec(
    class_name: &str,
    document_json: &str,
    json_path: &str,
    policy: SchemaPolicy,
) -> GenerateResult<InferredClass> {
    let records = parse_records(document_json)?;
    let (_, first) = records.first().ok_or(GenerateError::EmptyDocument)?;

    let class_name = sanitize_identifier(class_name);
    let mut diagnostics = Vec::new();
    let mut typed: Vec<(&str, FieldType)> = Vec::new();

    for (name, value) in first {
        match classify(value) {
            Some(field_type) => typed.push((name.as_str(), field_type)),
            None => diagnostics.push(
                Diagnostic::new(format!(
                    "Unsupported data type for column {} ({})",
                    name,
                    json_type_name(value)
                ))
                .with_column(name.as_str()),
            ),
        }
    }

    if policy == SchemaPolicy::Strict {
        check_homogeneous(&records, first)?;
    }

    let names = property_names(&class_name, typed.iter().map(|(n, _)| *n));
    let fields = typed
        .into_iter()
        .zip(names)
        .map(|((json_name, field_type), property_name)| ClassField {
            json_name: json_name.to_string(),
            property_name,
            field_type,
        })
        .collect();

    if !diagnostics.is_empty() {
        log_warning(format!("{} field(s) skipped in class {}", diagnostics.len(), class_name));
        for diag in &diagnostics {
            log_warning_indent(diag.to_string(), 1);
        }
    }

    Ok(InferredClass {
        spec: ClassSpec {
            class_name,
            json_path: json_path.to_string(),
            fields,
        },
        diagnostics,
    })
}

fn check_homogeneous(
    records: &[(String, Map<String, Value>)],
    first: &Map<String, Value>,
) -> GenerateResult<()> {
    for (key, record) in records.iter().skip(1) {
        for (field, expected) in first {
            let expected_type = classify(expected);
            match record.get(field) {
                None => {
                    return Err(GenerateError::SchemaMismatch {
                        record: key.clone(),
                        field: field.clone(),
                        expected: json_type_name(expected).to_string(),
                        found: "missing".to_string(),
                    })
                }
                Some(Value::Null) => {}
                Some(value) => {
                    if expected_type.is_some() && classify(value) != expected_type {
                        return Err(GenerateError::SchemaMismatch {
                            record: key.clone(),
                            field: field.clone(),
                            expected: json_type_name(expected).to_string(),
                            found: json_type_name(value).to_string(),
                        });
                    }
                }
            }
        }

        if let Some((extra, value)) = record.iter().find(|(name, _)| !first.contains_key(*name)) {
            return Err(GenerateError::SchemaMismatch {
                record: key.clone(),
                field: extra.clone(),
                expected: "absent".to_string(),
                found: json_type_name(value).to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Rendering
// =============================================================================

/// Escape text for a regular C# string literal, which cannot span lines.
fn escape_cs_string(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            // U+0085 (a control char), U+2028 and U+2029 also end a C# line
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                escaped.push_str(&format!("\\u{:04x}", c as u32))
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Render the C# source of a model class.
pub fn render_class(spec: &ClassSpec) -> String {
    let name = &spec.class_name;
    let mut lines: Vec<String> = vec![
        "using System;".into(),
        "using System.Collections.Generic;".into(),
        "using System.IO;".into(),
        "using Newtonsoft.Json;".into(),
        "using UnityEngine;".into(),
        String::new(),
        "[Serializable]".into(),
        format!("public class {}", name),
        "{".into(),
    ];

    for field in &spec.fields {
        if field.is_renamed() {
            lines.push(format!("    [JsonProperty(\"{}\")]", escape_cs_string(&field.json_name)));
        }
        lines.push(format!(
            "    public {} {} {{ get; set; }}",
            field.field_type.cs_type(),
            field.property_name
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "    public static string JsonFilePath => \"{}\";",
        escape_cs_string(&spec.json_path)
    ));
    lines.push(String::new());
    lines.extend([
        format!("    public static Dictionary<string,{}> LoadData()", name),
        "    {".into(),
        "        if (File.Exists(JsonFilePath))".into(),
        "        {".into(),
        "            string jsonString = File.ReadAllText(JsonFilePath);".into(),
        format!(
            "            Dictionary<string, {0}> data = JsonConvert.DeserializeObject<Dictionary<string, {0}>>(jsonString);",
            name
        ),
        "            return data;".into(),
        "        }".into(),
        "        else".into(),
        "        {".into(),
        "            Debug.LogError(\"JSON file not found at: \" + JsonFilePath);".into(),
        "            return null;".into(),
        "        }".into(),
        "    }".into(),
        "}".into(),
    ]);

    let mut source = lines.join("\n");
    source.push('\n');
    source
}

/// Infer and render in one step.
pub fn generate_class(
    class_name: &str,
    document_json: &str,
    json_path: &str,
    policy: SchemaPolicy,
) -> GenerateResult<(String, InferredClass)> {
    let inferred = infer_class_spec(class_name, document_json, json_path, policy)?;
    let source = render_class(&inferred.spec);
    Ok((source, inferred))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEOPLE: &str = r#"{"1":{"Name":"Alice","Age":30,"Active":true},"2":{"Name":"Bob","Age":25,"Active":false}}"#;

    fn infer(doc: &str) -> InferredClass {
        infer_class_spec("People", doc, "/project/Assets/People.json", SchemaPolicy::FirstRecord)
            .unwrap()
    }

    fn field_summary(spec: &ClassSpec) -> Vec<(String, FieldType)> {
        spec.fields
            .iter()
            .map(|f| (f.property_name.clone(), f.field_type))
            .collect()
    }

    #[test]
    fn test_infers_fields_in_order() {
        let inferred = infer(PEOPLE);
        assert_eq!(
            field_summary(&inferred.spec),
            vec![
                ("Name".to_string(), FieldType::String),
                ("Age".to_string(), FieldType::Int),
                ("Active".to_string(), FieldType::Bool),
            ]
        );
        assert!(inferred.diagnostics.is_empty());
    }

    #[test]
    fn test_float_maps_to_double() {
        let inferred = infer(r#"{"1":{"Speed":1.5,"Whole":3.0}}"#);
        assert_eq!(inferred.spec.fields[0].field_type, FieldType::Double);
        assert_eq!(inferred.spec.fields[1].field_type, FieldType::Double);
    }

    #[test]
    fn test_single_character_maps_to_string() {
        let inferred = infer(r#"{"1":{"Grade":"A"}}"#);
        assert_eq!(inferred.spec.fields[0].field_type, FieldType::String);
    }

    #[test]
    fn test_unsupported_fields_skipped() {
        let inferred = infer(r#"{"1":{"Name":"x","Born":null,"Tags":["a"]}}"#);
        assert_eq!(inferred.spec.fields.len(), 1);
        assert_eq!(inferred.diagnostics.len(), 2);
        assert_eq!(inferred.diagnostics[0].column.as_deref(), Some("Born"));
        assert!(inferred.diagnostics[1].message.contains("array"));
    }

    #[test]
    fn test_first_record_wins() {
        let inferred = infer(r#"{"1":{"Score":1},"2":{"Score":"high"}}"#);
        assert_eq!(inferred.spec.fields[0].field_type, FieldType::Int);
    }

    #[test]
    fn test_strict_rejects_type_mismatch() {
        let result = infer_class_spec(
            "Scores",
            r#"{"1":{"Score":1},"2":{"Score":"high"}}"#,
            "/tmp/x.json",
            SchemaPolicy::Strict,
        );
        match result {
            Err(GenerateError::SchemaMismatch { record, field, expected, found }) => {
                assert_eq!(record, "2");
                assert_eq!(field, "Score");
                assert_eq!(expected, "int");
                assert_eq!(found, "string");
            }
            other => panic!("expected schema mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_rejects_missing_and_extra_fields() {
        let missing = infer_class_spec(
            "T",
            r#"{"1":{"A":1,"B":2},"2":{"A":1}}"#,
            "/tmp/x.json",
            SchemaPolicy::Strict,
        );
        assert!(matches!(missing, Err(GenerateError::SchemaMismatch { ref found, .. }) if found == "missing"));

        let extra = infer_class_spec(
            "T",
            r#"{"1":{"A":1},"2":{"A":1,"C":true}}"#,
            "/tmp/x.json",
            SchemaPolicy::Strict,
        );
        assert!(matches!(extra, Err(GenerateError::SchemaMismatch { ref field, .. }) if field == "C"));
    }

    #[test]
    fn test_strict_accepts_homogeneous_and_nulls() {
        let result = infer_class_spec(
            "T",
            r#"{"1":{"A":1,"B":"x"},"2":{"A":2,"B":null}}"#,
            "/tmp/x.json",
            SchemaPolicy::Strict,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_document() {
        let result = infer_class_spec("T", "{}", "/tmp/x.json", SchemaPolicy::FirstRecord);
        assert!(matches!(result, Err(GenerateError::EmptyDocument)));
    }

    #[test]
    fn test_invalid_documents() {
        let array = infer_class_spec("T", "[1,2]", "/tmp/x.json", SchemaPolicy::FirstRecord);
        assert!(matches!(array, Err(GenerateError::InvalidDocument(_))));

        let scalar_record = infer_class_spec("T", r#"{"1":5}"#, "/tmp/x.json", SchemaPolicy::FirstRecord);
        assert!(matches!(scalar_record, Err(GenerateError::InvalidDocument(_))));

        let broken = infer_class_spec("T", "{", "/tmp/x.json", SchemaPolicy::FirstRecord);
        assert!(matches!(broken, Err(GenerateError::Json(_))));
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Name"), "Name");
        assert_eq!(sanitize_identifier("First Name"), "First_Name");
        assert_eq!(sanitize_identifier("2nd"), "_2nd");
        assert_eq!(sanitize_identifier("class"), "@class");
        assert_eq!(sanitize_identifier(""), "_");
        assert_eq!(sanitize_identifier("hp-max%"), "hp_max_");
        assert!(is_valid_identifier("Item_1"));
        assert!(!is_valid_identifier("int"));
        assert!(!is_valid_identifier("a b"));
    }

    #[test]
    fn test_property_name_collisions() {
        let inferred = infer_class_spec(
            "Item",
            r#"{"1":{"Item":"x","a b":1,"a_b":2,"LoadData":true}}"#,
            "/tmp/x.json",
            SchemaPolicy::FirstRecord,
        )
        .unwrap();
        let names: Vec<&str> = inferred.spec.fields.iter().map(|f| f.property_name.as_str()).collect();
        assert_eq!(names, ["Item_", "a_b", "a_b_", "LoadData_"]);
        assert!(inferred.spec.fields.iter().all(|f| f.is_renamed()));
    }

    #[test]
    fn test_render_class() {
        let inferred = infer(PEOPLE);
        let source = render_class(&inferred.spec);

        assert!(source.starts_with("using System;\n"));
        assert!(source.contains("[Serializable]\npublic class People\n{"));
        assert!(source.contains(
            "    public string Name { get; set; }\n    public int Age { get; set; }\n    public bool Active { get; set; }\n"
        ));
        assert!(source.contains("public static string JsonFilePath => \"/project/Assets/People.json\";"));
        assert!(source.contains("public static Dictionary<string,People> LoadData()"));
        assert!(source.contains("JsonConvert.DeserializeObject<Dictionary<string, People>>(jsonString)"));
        assert!(source.contains("if (File.Exists(JsonFilePath))"));
        assert!(source.contains("return null;"));
        assert!(!source.contains("JsonProperty"));
    }

    #[test]
    fn test_render_escapes_path_and_renamed_keys() {
        let spec = ClassSpec {
            class_name: "Items".into(),
            json_path: r#"C:\Game\Assets\"Items".json"#.into(),
            fields: vec![ClassField {
                json_name: "Display Name".into(),
                property_name: "Display_Name".into(),
                field_type: FieldType::String,
            }],
        };
        let source = render_class(&spec);
        assert!(source.contains(r#"JsonFilePath => "C:\\Game\\Assets\\\"Items\".json";"#));
        assert!(source.contains("    [JsonProperty(\"Display Name\")]\n    public string Display_Name { get; set; }"));
    }

    #[test]
    fn test_escape_cs_string() {
        assert_eq!(escape_cs_string(r#"a\"b""#), r#"a\\\"b\""#);
        assert_eq!(escape_cs_string("a\tb\r\n"), r"a\tb\r\n");
        assert_eq!(escape_cs_string("bell\u{7}"), r"bell\u0007");
        assert_eq!(escape_cs_string("x\u{2028}y"), r"x\u2028y");
        assert_eq!(escape_cs_string("Épée"), "Épée");
    }

    #[test]
    fn test_multiline_header_stays_on_one_line() {
        let (source, inferred) = generate_class(
            "Items",
            "{\"1\":{\"Max\\nHP\":10}}",
            "/tmp/Items.json",
            SchemaPolicy::FirstRecord,
        )
        .unwrap();

        assert_eq!(inferred.spec.fields[0].property_name, "Max_HP");
        assert!(source.contains(r#"    [JsonProperty("Max\nHP")]"#));
        for line in source.lines().filter(|l| l.contains("JsonProperty")) {
            assert!(line.ends_with("\")]"), "literal split across lines: {:?}", line);
        }
    }

    #[test]
    fn test_strict_rejects_int_under_double() {
        let result = infer_class_spec(
            "T",
            r#"{"1":{"Speed":1.5},"2":{"Speed":2}}"#,
            "/tmp/x.json",
            SchemaPolicy::Strict,
        );
        assert!(matches!(result, Err(GenerateError::SchemaMismatch { ref found, .. }) if found == "int"));
    }

    #[test]
    fn test_generate_class_sanitizes_name() {
        let (source, inferred) =
            generate_class("enemy stats", PEOPLE, "/tmp/e.json", SchemaPolicy::FirstRecord).unwrap();
        assert_eq!(inferred.spec.class_name, "enemy_stats");
        assert!(source.contains("public class enemy_stats"));
    }
}
