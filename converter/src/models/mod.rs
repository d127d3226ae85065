//! Domain models for the sheetgen pipeline.
//!
//! - [`Grid`] - Raw rows of cell text (headers, type tags, data)
//! - [`TypeTag`] / [`ColumnTypes`] - Declared column types
//! - [`Scalar`] / [`Record`] - One decoded data row
//! - [`FieldType`] / [`ClassField`] / [`ClassSpec`] - Generated class shape
//! - [`Diagnostic`] - Non-fatal problem reported by a stage

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Grid
// =============================================================================

/// Raw tabular data as read from the first sheet.
///
/// Row 0 holds field names, row 1 holds type tags, the rest is data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, taken from the header row.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn type_tags(&self) -> Option<&[String]> {
        self.rows.get(1).map(Vec::as_slice)
    }

    /// Data rows (everything after the type-tag row).
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(2..).unwrap_or(&[])
    }

    /// Cell text, empty when the row is shorter than the header.
    pub fn cell(row: &[String], column: usize) -> &str {
        row.get(column).map(String::as_str).unwrap_or("")
    }
}

// =============================================================================
// Type Tags
// =============================================================================

/// Declared scalar type of a column (second grid row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Int,
    Float,
    Bool,
}

impl TypeTag {
    pub const ALL: [TypeTag; 4] = [TypeTag::String, TypeTag::Int, TypeTag::Float, TypeTag::Bool];

    /// Parse a type-tag cell. Tags are case-sensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim() {
            "string" => Some(TypeTag::String),
            "int" => Some(TypeTag::Int),
            "float" => Some(TypeTag::Float),
            "bool" => Some(TypeTag::Bool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Bool => "bool",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Per-column resolved type tags.
///
/// `None` marks a column whose tag was not recognised; its values stay
/// [`Scalar::Unset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTypes(Vec<Option<TypeTag>>);

impl ColumnTypes {
    pub fn new(tags: Vec<Option<TypeTag>>) -> Self {
        Self(tags)
    }

    pub fn get(&self, column: usize) -> Option<TypeTag> {
        self.0.get(column).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Records
// =============================================================================

/// A decoded cell value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    String(String),
    Int(i32),
    Float(f32),
    Bool(bool),
    /// Column type unknown; serialized as `null`.
    Unset,
}

/// One decoded data row, fields in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new(fields: Vec<(String, Scalar)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Scalar)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Generated Class
// =============================================================================

/// Property type of a generated class field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    String,
    Bool,
    Double,
}

impl FieldType {
    /// C# keyword used in the generated property.
    pub fn cs_type(&self) -> &'static str {
        match self {
            FieldType::Int => "int",
            FieldType::String => "string",
            FieldType::Bool => "bool",
            FieldType::Double => "double",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.cs_type())
    }
}

/// One property of the generated class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassField {
    /// Key in the JSON document
    pub json_name: String,
    /// C# property identifier
    pub property_name: String,
    pub field_type: FieldType,
}

impl ClassField {
    /// Whether the property needs a `[JsonProperty]` mapping.
    pub fn is_renamed(&self) -> bool {
        self.property_name.trim_start_matches('@') != self.json_name
    }
}

/// Everything needed to render a model class.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSpec {
    pub class_name: String,
    /// Absolute path of the JSON document, embedded in the class
    pub json_path: String,
    pub fields: Vec<ClassField>,
}

/// How field types are inferred across records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// The first record defines every field type.
    #[default]
    FirstRecord,
    /// Every record must agree with the first one.
    Strict,
}

// =============================================================================
// Diagnostics
// =============================================================================

/// A non-fatal problem found while converting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Grid row (0-based) when row-specific
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            row: None,
            column: None,
            message: message.into(),
        }
    }

    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, &self.column) {
            (Some(row), Some(col)) => write!(f, "Row {}, column '{}': {}", row, col, self.message),
            (None, Some(col)) => write!(f, "Column '{}': {}", col, self.message),
            (Some(row), None) => write!(f, "Row {}: {}", row, self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}
