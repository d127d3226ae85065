//! Error types for the sheetgen conversion pipeline.
//!
//! Each stage has its own error enum:
//!
//! - [`LoadError`] - Reading a workbook or CSV file into a grid
//! - [`DecodeError`] - Turning grid rows into typed records
//! - [`GenerateError`] - Inferring and rendering the model class
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Conversion is automatic via `From` implementations, so `?` works
//! across stage boundaries.
//!
//! Non-fatal problems (unknown type tags, unsupported field types) are not
//! errors; they are collected as [`crate::models::Diagnostic`] values.

use thiserror::Error;

// =============================================================================
// Loading Errors
// =============================================================================

/// Errors while loading a tabular file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook could not be opened or parsed.
    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// Invalid CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook has no worksheet.
    #[error("Workbook contains no sheet")]
    NoSheet,

    /// Nothing to read.
    #[error("File is empty")]
    EmptyFile,
}

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while decoding grid rows into records.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Header and type-tag rows are required.
    #[error("Expected a header row and a type row, found {found} row(s)")]
    MissingHeaderRows { found: usize },

    /// Two columns share a header name.
    #[error("Duplicate column header: {0}")]
    DuplicateHeader(String),
}

// =============================================================================
// Generation Errors
// =============================================================================

/// Errors while inferring or rendering a model class.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Document text is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but not an index-to-record mapping.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// No record to infer fields from.
    #[error("Document has no records")]
    EmptyDocument,

    /// A record disagrees with the first record (strict policy only).
    #[error("Record {record}, field '{field}': expected {expected}, found {found}")]
    SchemaMismatch {
        record: String,
        field: String,
        expected: String,
        found: String,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loading error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Decoding error.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Class generation error.
    #[error("Generate error: {0}")]
    Generate(#[from] GenerateError),

    /// Writing an artifact failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the document failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input path has no usable file name.
    #[error("Cannot derive an output name from '{0}'")]
    InvalidName(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for generation operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // LoadError -> PipelineError
        let load_err = LoadError::EmptyFile;
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // DecodeError -> PipelineError
        let decode_err = DecodeError::DuplicateHeader("Name".into());
        let pipeline_err: PipelineError = decode_err.into();
        assert!(pipeline_err.to_string().contains("Name"));
    }

    #[test]
    fn test_schema_mismatch_format() {
        let err = GenerateError::SchemaMismatch {
            record: "3".into(),
            field: "Age".into(),
            expected: "int".into(),
            found: "string".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Record 3"));
        assert!(msg.contains("'Age'"));
        assert!(msg.contains("expected int"));
    }
}
