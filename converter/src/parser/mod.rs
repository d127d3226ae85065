//! Tabular loader: workbook or CSV file to [`Grid`].
//!
//! Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are read with calamine,
//! first sheet only. CSV-like files go through encoding and delimiter
//! auto-detection first. No row/column consistency checks happen here.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::Grid;

/// Kind of file a grid was loaded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Workbook,
    Csv,
}

/// Metadata about the loaded source
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub format: SourceFormat,
    /// First sheet name (workbooks only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Detected encoding (CSV only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Detected delimiter (CSV only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

/// A grid plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedGrid {
    pub grid: Grid,
    pub info: SourceInfo,
}

/// Load the first sheet of `path` into a grid.
pub fn load_grid<P: AsRef<Path>>(path: P) -> LoadResult<Grid> {
    load_file(path).map(|loaded| loaded.grid)
}

/// Load `path` into a grid, keeping source metadata.
pub fn load_file<P: AsRef<Path>>(path: P) -> LoadResult<LoadedGrid> {
    let path = path.as_ref();
    if is_csv_path(path) {
        let bytes = std::fs::read(path)?;
        parse_csv_bytes(&bytes)
    } else {
        load_workbook(path)
    }
}

fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "csv" | "tsv" | "txt"))
        .unwrap_or(false)
}

// =============================================================================
// Workbooks
// =============================================================================

fn load_workbook(path: &Path) -> LoadResult<LoadedGrid> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook.sheet_names().first().cloned();
    let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoSheet)??;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(LoadedGrid {
        grid: Grid::new(rows),
        info: SourceInfo {
            format: SourceFormat::Workbook,
            sheet,
            encoding: None,
            delimiter: None,
        },
    })
}

/// Text form of a workbook cell.
///
/// Numbers print without a trailing `.0`. Date cells print as
/// `YYYY-MM-DD`, with ` HH:MM:SS` when the time is not midnight.
/// Durations keep their serial value.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) => s.clone(),
        Data::DateTime(dt) if !dt.is_duration() => match dt.as_datetime() {
            Some(value) => format_datetime(value),
            None => cell.to_string(),
        },
        other => other.to_string(),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    if value.num_seconds_from_midnight() == 0 {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// =============================================================================
// CSV
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding.
///
/// Unknown encodings fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV bytes with encoding and delimiter auto-detection.
pub fn parse_csv_bytes(bytes: &[u8]) -> LoadResult<LoadedGrid> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);
    let grid = parse_csv_str(&content, delimiter)?;

    Ok(LoadedGrid {
        grid,
        info: SourceInfo {
            format: SourceFormat::Csv,
            sheet: None,
            encoding: Some(encoding),
            delimiter: Some(delimiter),
        },
    })
}

/// Parse CSV text into a grid. Every line is a row; none is a header.
pub fn parse_csv_str(content: &str, delimiter: char) -> LoadResult<Grid> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    if rows.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    Ok(Grid::new(rows))
}

/// Two-sheet workbook: "Items" (headers, type tags, two data rows) first,
/// then an unrelated "Notes" sheet.
#[cfg(test)]
pub(crate) fn write_items_workbook(path: &Path) {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();

    let items = workbook.add_worksheet();
    items.set_name("Items").unwrap();
    for (col, (header, tag)) in [("Name", "string"), ("Count", "int"), ("Rare", "bool"), ("Weight", "float")]
        .iter()
        .enumerate()
    {
        items.write_string(0, col as u16, *header).unwrap();
        items.write_string(1, col as u16, *tag).unwrap();
    }
    items.write_string(2, 0, "Sword").unwrap();
    items.write_number(2, 1, 5.0).unwrap();
    items.write_boolean(2, 2, true).unwrap();
    items.write_number(2, 3, 2.5).unwrap();
    items.write_string(3, 0, "Shield").unwrap();
    items.write_number(3, 1, 1.0).unwrap();
    items.write_boolean(3, 2, false).unwrap();
    items.write_number(3, 3, 7.0).unwrap();

    let notes = workbook.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "Not part of the data").unwrap();

    workbook.save(path).unwrap();
}
