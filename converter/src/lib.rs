//! # sheetgen - Spreadsheet to JSON with generated model classes
//!
//! sheetgen reads the first sheet of a workbook (or a CSV file) whose first
//! row names the fields and whose second row declares their types, writes
//! the data rows as a JSON document keyed `"1".."N"`, and generates a C#
//! model class that loads that document back at runtime.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Workbook   │────▶│   Decoder   │────▶│ Serializer  │────▶│  Class Gen  │
//! │ (xlsx/csv)  │     │ (type tags) │     │ ("1".."N")  │     │   (C# src)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetgen::{convert, ConvertOptions, ConverterConfig, FsHost, OverwritePolicy};
//! use std::path::Path;
//!
//! let mut host = FsHost::new(OverwritePolicy::Always);
//! let outcome = convert(
//!     Path::new("Enemies.xlsx"),
//!     &ConverterConfig::default(),
//!     &ConvertOptions::default(),
//!     &mut host,
//! ).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Stage error types
//! - [`models`] - Grid, records, class spec
//! - [`parser`] - Workbook and CSV loading
//! - [`transform`] - Decoder, serializer, pipeline
//! - [`codegen`] - Model-class inference and rendering
//! - [`validation`] - Document schema validation
//! - [`host`] - Project collaborators (folders, overwrite prompt, refresh)
//! - [`config`] - Output locations
//! - [`logs`] - Log broadcaster and JSON-lines capture

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Loading
pub mod parser;

// Decoding, serialization, pipeline
pub mod transform;

// Code generation
pub mod codegen;

// Validation
pub mod validation;

// Collaborators
pub mod host;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{DecodeError, GenerateError, LoadError, PipelineError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ClassField, ClassSpec, ColumnTypes, Diagnostic, FieldType, Grid, Record, Scalar,
    SchemaPolicy, TypeTag,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use parser::{load_file, load_grid, LoadedGrid, SourceFormat, SourceInfo};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    convert, decode_file, decode_grid, decode_rows, generate_from_document,
    resolve_column_types, resolve_json_file_name, serialize_document, ConversionReport,
    ConvertOptions, ConvertOutcome, DecodedRows, Document,
};

// =============================================================================
// Re-exports - Codegen / Validation
// =============================================================================

pub use codegen::{
    generate_class, infer_class_spec, render_class, sanitize_identifier, InferredClass,
};
pub use validation::{is_valid_document, validate_document};

// =============================================================================
// Re-exports - Host / Config
// =============================================================================

pub use config::ConverterConfig;
pub use host::{FsHost, OverwritePolicy, ProjectHost};
