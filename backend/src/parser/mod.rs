//! Tabular decoder: spreadsheet or delimited text into ordered records.
//!
//! The first row of the first sheet is the header row. Each following
//! non-blank row becomes a [`RawRecord`] keyed by header name. No
//! schema-specific logic here.
//!
//! Delimited text gets encoding and delimiter auto-detection; workbooks
//! (xlsx, xlsm, xlsb, xls, ods) are read with `calamine`.

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::path::Path;

use crate::error::{DecodeError, DecodeResult};
use crate::models::RawRecord;

/// Header used for blank header cells.
const EMPTY_HEADER: &str = "__EMPTY";

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Container format of an uploaded file.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Delimited,
    Workbook,
}

/// Decoded table with metadata
#[derive(Debug, Clone, Serialize)]
pub struct DecodedTable {
    /// Column headers, in file order (the keys of every record)
    pub headers: Vec<String>,
    /// One record per non-blank data row
    pub records: Vec<RawRecord>,
    /// Detected container format
    pub format: TableFormat,
    /// Detected encoding (delimited text only)
    pub encoding: Option<String>,
    /// Detected delimiter (delimited text only)
    pub delimiter: Option<char>,
}

/// Decode an uploaded blob into headers and records.
///
/// The file name, when known, picks the format by extension; otherwise the
/// leading bytes are sniffed.
///
/// # Example
/// ```ignore
/// let table = decode(b"code;name\nM101;Math", Some("subjects.csv"))?;
/// assert_eq!(table.headers, vec!["code", "name"]);
/// assert_eq!(table.records[0]["code"], "M101");
/// ```
pub fn decode(bytes: &[u8], file_name: Option<&str>) -> DecodeResult<DecodedTable> {
    match detect_format(bytes, file_name) {
        TableFormat::Workbook => decode_workbook(bytes),
        TableFormat::Delimited => decode_delimited(bytes),
    }
}

/// Read a file from disk and decode it.
pub fn decode_file<P: AsRef<Path>>(path: P) -> DecodeResult<DecodedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let name = path.file_name().and_then(|n| n.to_str());
    decode(&bytes, name)
}

/// Pick the container format from the extension, falling back to magic bytes.
pub fn detect_format(bytes: &[u8], file_name: Option<&str>) -> TableFormat {
    let extension = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    if let Some(ext) = extension.as_deref() {
        if WORKBOOK_EXTENSIONS.contains(&ext) {
            return TableFormat::Workbook;
        }
        if DELIMITED_EXTENSIONS.contains(&ext) {
            return TableFormat::Delimited;
        }
    }

    // ZIP container (xlsx, ods) or OLE compound file (xls)
    if bytes.starts_with(b"PK\x03\x04") || bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        TableFormat::Workbook
    } else {
        TableFormat::Delimited
    }
}

// =============================================================================
// Delimited text
// =============================================================================

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> DecodeResult<String> {
    let content = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => return Err(DecodeError::Encoding(format!("unknown encoding '{}'", other))),
        },
    };

    Ok(content)
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ';';
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

fn decode_delimited(bytes: &[u8]) -> DecodeResult<DecodedTable> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    if content.contains('\0') {
        return Err(DecodeError::UnsupportedFormat(
            "binary content that is not a known workbook".to_string(),
        ));
    }
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = detect_delimiter(content);
    parse_delimited(content, delimiter, encoding)
}

/// Parse delimited text with an explicit delimiter.
///
/// Missing trailing cells become `""`, extra cells are ignored and
/// blank rows are skipped.
pub fn parse_delimited(content: &str, delimiter: char, encoding: String) -> DecodeResult<DecodedTable> {
    let delimiter_byte = u8::try_from(delimiter)
        .map_err(|_| DecodeError::Malformed(format!("delimiter '{}' is not ASCII", delimiter)))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut rows = reader.records();

    let header_row = rows
        .next()
        .ok_or(DecodeError::EmptyFile)?
        .map_err(|e| DecodeError::Malformed(format!("header: {}", e)))?;
    let headers = unique_headers(header_row.iter());

    let mut records = Vec::new();
    for (row_idx, row) in rows.enumerate() {
        let line_num = row_idx + 2; // +1 for 0-index, +1 for header
        let row = row.map_err(|e| DecodeError::Malformed(format!("line {}: {}", line_num, e)))?;

        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let record: RawRecord = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = row.get(i).unwrap_or("");
                (header.clone(), Value::String(cell.to_string()))
            })
            .collect();
        records.push(record);
    }

    if records.is_empty() {
        return Err(DecodeError::EmptyFile);
    }

    Ok(DecodedTable {
        headers,
        records,
        format: TableFormat::Delimited,
        encoding: Some(encoding),
        delimiter: Some(delimiter),
    })
}

// =============================================================================
// Workbooks
// =============================================================================

fn decode_workbook(bytes: &[u8]) -> DecodeResult<DecodedTable> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DecodeError::Workbook(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DecodeError::NoSheet)?
        .map_err(|e| DecodeError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(DecodeError::EmptyFile)?;
    let headers = unique_headers(header_row.iter().map(|cell| cell.to_string()));

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(is_blank_cell) {
            continue;
        }

        let record: RawRecord = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let value = row.get(i).map(cell_value).unwrap_or(Value::Null);
                (header.clone(), value)
            })
            .collect();
        records.push(record);
    }

    if records.is_empty() {
        return Err(DecodeError::EmptyFile);
    }

    Ok(DecodedTable {
        headers,
        records,
        format: TableFormat::Workbook,
        encoding: None,
        delimiter: None,
    })
}

fn is_blank_cell(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Convert a workbook cell to a raw JSON value.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_value(*f),
        other => Value::String(other.to_string()),
    }
}

/// Integral floats become integers so `101.0` reads as `101`.
fn float_value(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

// =============================================================================
// Headers
// =============================================================================

/// Trim header cells, name blank ones `__EMPTY` and suffix repeats with `_1`, `_2`, ...
fn unique_headers<I, S>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for cell in cells {
        let base = match cell.as_ref().trim() {
            "" => EMPTY_HEADER.to_string(),
            name => name.to_string(),
        };

        let mut name = base.clone();
        let counter = counters.entry(base.clone()).or_insert(0);
        while used.contains(&name) {
            *counter += 1;
            name = format!("{}_{}", base, counter);
        }

        used.insert(name.clone());
        headers.push(name);
    }

    headers
}
