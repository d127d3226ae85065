//! Row typed-decoder
//!
//! Turns grid data rows into [`Record`]s using the type tags in row 1.
//! Conversions fail open: unparseable numbers become `0`, unparseable
//! booleans become `false`, and nothing is reported for them.

use std::collections::HashSet;

use crate::error::{DecodeError, DecodeResult};
use crate::logs::{log_warning, log_warning_indent};
use crate::models::{ColumnTypes, Diagnostic, Grid, Record, Scalar, TypeTag};

/// Output of decoding a grid
#[derive(Debug, Clone, Default)]
pub struct DecodedRows {
    pub records: Vec<Record>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodedRows {
    pub fn summary(&self) -> String {
        format!(
            "Decoded: {} records, {} diagnostics",
            self.records.len(),
            self.diagnostics.len()
        )
    }
}

/// Resolve the type-tag row into an explicit per-column table.
///
/// Unknown tags yield a diagnostic and a `None` entry.
pub fn resolve_column_types(grid: &Grid) -> (ColumnTypes, Vec<Diagnostic>) {
    let headers = grid.headers().unwrap_or(&[]);
    let tags = grid.type_tags().unwrap_or(&[]);
    let mut diagnostics = Vec::new();

    let resolved = (0..grid.width())
        .map(|col| {
            let raw = Grid::cell(tags, col);
            let tag = TypeTag::parse(raw);
            if tag.is_none() {
                let header = Grid::cell(headers, col);
                diagnostics.push(
                    Diagnostic::new(format!("Invalid data type: '{}'", raw))
                        .with_row(1)
                        .with_column(header),
                );
            }
            tag
        })
        .collect();

    (ColumnTypes::new(resolved), diagnostics)
}

/// Decode every data row of `grid` with the given column types.
pub fn decode_rows(grid: &Grid, types: &ColumnTypes) -> DecodeResult<DecodedRows> {
    if grid.row_count() < 2 {
        return Err(DecodeError::MissingHeaderRows { found: grid.row_count() });
    }

    let headers = grid.headers().unwrap_or(&[]);
    let mut result = DecodedRows::default();

    // Columns that take part in records: (index, header)
    let mut columns = Vec::with_capacity(headers.len());
    let mut seen = HashSet::new();
    for (col, header) in headers.iter().enumerate() {
        if header.trim().is_empty() {
            result.diagnostics.push(
                Diagnostic::new(format!("Column {} has no header, skipped", col + 1)).with_row(0),
            );
            continue;
        }
        if !seen.insert(header.as_str()) {
            return Err(DecodeError::DuplicateHeader(header.clone()));
        }
        columns.push((col, header));
    }

    for row in grid.data_rows() {
        let fields = columns
            .iter()
            .map(|&(col, header)| {
                let value = match types.get(col) {
                    Some(tag) => convert(tag, Grid::cell(row, col)),
                    None => Scalar::Unset,
                };
                (header.clone(), value)
            })
            .collect();
        result.records.push(Record::new(fields));
    }

    Ok(result)
}

/// Resolve column types and decode all rows, merging diagnostics.
pub fn decode_grid(grid: &Grid) -> DecodeResult<DecodedRows> {
    let (types, mut diagnostics) = resolve_column_types(grid);
    let mut decoded = decode_rows(grid, &types)?;
    diagnostics.append(&mut decoded.diagnostics);
    decoded.diagnostics = diagnostics;

    if !decoded.diagnostics.is_empty() {
        log_warning(format!("{} column issue(s) while decoding", decoded.diagnostics.len()));
        for diag in &decoded.diagnostics {
            log_warning_indent(diag.to_string(), 1);
        }
    }

    Ok(decoded)
}

/// Convert one cell's text according to its tag.
pub fn convert(tag: TypeTag, text: &str) -> Scalar {
    match tag {
        TypeTag::String => Scalar::String(text.to_string()),
        TypeTag::Int => Scalar::Int(parse_int(text)),
        TypeTag::Float => Scalar::Float(parse_float(text)),
        TypeTag::Bool => Scalar::Bool(parse_bool(text)),
    }
}

/// Best-effort integer parse; `0` on failure or overflow.
pub fn parse_int(text: &str) -> i32 {
    text.trim().parse().unwrap_or(0)
}

/// Best-effort float parse; `0.0` on failure or non-finite input.
pub fn parse_float(text: &str) -> f32 {
    match text.trim().parse::<f32>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Case-insensitive `true`/`false`; anything else is `false`.
pub fn parse_bool(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("true")
}
