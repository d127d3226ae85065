//! High-level conversion pipeline.
//!
//! Combines every stage: loading, decoding, serializing, class generation
//! and writing both artifacts through a [`ProjectHost`].
//!
//! # Example
//!
//! ```rust,ignore
//! use sheetgen::{convert, ConvertOptions, ConverterConfig, FsHost, OverwritePolicy};
//! use std::path::Path;
//!
//! let mut host = FsHost::new(OverwritePolicy::Ask);
//! let outcome = convert(
//!     Path::new("Items.xlsx"),
//!     &ConverterConfig::from_env(),
//!     &ConvertOptions::default(),
//!     &mut host,
//! )?;
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::decoder::{decode_grid, DecodedRows};
use super::serializer::serialize_document;
use crate::codegen::{generate_class, InferredClass};
use crate::config::ConverterConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::host::ProjectHost;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{ClassField, Diagnostic, SchemaPolicy};
use crate::parser::{load_file, SourceInfo};

/// Options for one conversion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// JSON file name; defaults to the input file stem
    pub name: Option<String>,
    /// Field type inference policy
    pub policy: SchemaPolicy,
    /// Indent the JSON document
    pub pretty: bool,
}

/// Summary of a completed conversion
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub input: PathBuf,
    pub source: SourceInfo,
    pub json_path: PathBuf,
    pub script_path: PathBuf,
    pub class_name: String,
    pub record_count: usize,
    pub fields: Vec<ClassField>,
    /// Decoder and generator diagnostics, in that order
    pub diagnostics: Vec<Diagnostic>,
    /// RFC 3339 timestamp
    pub converted_at: String,
}

/// How a conversion ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConvertOutcome {
    Completed(ConversionReport),
    /// Overwrite refused; nothing was written
    Declined { script_path: PathBuf },
}

/// JSON file name from an explicit name or the input file stem.
///
/// `.json` is appended when missing. A blank name counts as absent. Names
/// with path separators are rejected so the document stays in the JSON
/// directory.
pub fn resolve_json_file_name(name: Option<&str>, input: &Path) -> PipelineResult<String> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) if n.contains(['/', '\\']) => Err(PipelineError::InvalidName(n.to_string())),
        Some(n) if n.ends_with(".json") => Ok(n.to_string()),
        Some(n) => Ok(format!("{}.json", n)),
        None => input
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .map(|s| format!("{}.json", s))
            .ok_or_else(|| PipelineError::InvalidName(input.display().to_string())),
    }
}

/// Absolute form of `path` without `.` components.
fn absolute(path: &Path) -> io::Result<PathBuf> {
    let full = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(full
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Load and decode a workbook without writing anything.
pub fn decode_file(input: &Path) -> PipelineResult<DecodedRows> {
    log_info(format!("📖 Reading {}", input.display()));
    let loaded = load_file(input)?;
    log_success(format!("Read {} rows", loaded.grid.row_count()));
    let decoded = decode_grid(&loaded.grid)?;
    log_success(decoded.summary());
    Ok(decoded)
}

/// Render a model class for a document already on disk.
///
/// The class embeds the document's absolute path. The class name defaults
/// to the document file stem.
pub fn generate_from_document(
    document: &Path,
    class_name: Option<&str>,
    policy: SchemaPolicy,
) -> PipelineResult<(String, InferredClass)> {
    let json = fs::read_to_string(document)?;
    let json_path = absolute(document)?;
    let name = match class_name {
        Some(n) => n.to_string(),
        None => document
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| PipelineError::InvalidName(document.display().to_string()))?,
    };

    Ok(generate_class(&name, &json, &json_path.to_string_lossy(), policy)?)
}

/// Convert a workbook into a JSON document and a model class.
///
/// Steps:
/// 1. Load the first sheet and decode typed records
/// 2. Serialize the document
/// 3. Infer and render the class (before any write)
/// 4. Ask the host before replacing an existing class file
/// 5. Write the JSON, write the class, refresh the host
pub fn convert(
    input: &Path,
    config: &ConverterConfig,
    options: &ConvertOptions,
    host: &mut dyn ProjectHost,
) -> PipelineResult<ConvertOutcome> {
    // Step 1: Load + decode
    log_info(format!("📖 Reading {}", input.display()));
    let loaded = load_file(input)?;
    log_success(format!("Read {} rows", loaded.grid.row_count()));
    if let Some(headers) = loaded.grid.headers() {
        log_info(format!("📋 {} columns:", headers.len()));
        for (i, col) in headers.iter().enumerate() {
            log_info_indent(format!("[{:2}] {}", i + 1, col), 1);
        }
    }

    let decoded = decode_grid(&loaded.grid)?;
    log_success(decoded.summary());

    // Step 2: Serialize
    let json = serialize_document(&decoded.records, options.pretty)?;

    // Step 3: Generate
    let json_name = resolve_json_file_name(options.name.as_deref(), input)?;
    let stem = Path::new(&json_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PipelineError::InvalidName(json_name.clone()))?
        .to_string();
    let json_dir = config.json_output_dir();
    let json_path = absolute(&json_dir.join(&json_name))?;

    log_info(format!("🛠️  Generating class from {}", json_name));
    let (source, inferred) =
        generate_class(&stem, &json, &json_path.to_string_lossy(), options.policy)?;
    let class_name = inferred.spec.class_name.clone();

    let scripts_dir = config.scripts_output_dir();
    let script_path = scripts_dir.join(format!("{}.cs", class_name.trim_start_matches('@')));

    // Step 4: Collision check
    if script_path.exists() && !host.confirm_overwrite(&script_path) {
        log_warning("Please change the name of the model script to be generated.");
        return Ok(ConvertOutcome::Declined { script_path });
    }

    // Step 5: Write
    host.ensure_dir(&json_dir)?;
    fs::write(&json_path, &json)?;
    log_success(format!("💾 JSON written to {}", json_path.display()));

    host.ensure_dir(&scripts_dir)?;
    fs::write(&script_path, &source)?;
    log_success(format!("💾 Class {} written to {}", class_name, script_path.display()));

    host.refresh_assets();

    let mut diagnostics = decoded.diagnostics;
    diagnostics.extend(inferred.diagnostics);

    Ok(ConvertOutcome::Completed(ConversionReport {
        input: input.to_path_buf(),
        source: loaded.info,
        json_path,
        script_path,
        class_name,
        record_count: decoded.records.len(),
        fields: inferred.spec.fields,
        diagnostics,
        converted_at: chrono::Utc::now().to_rfc3339(),
    }))
}
