//! Validation engine: per-cell verdicts over the current draft records.
//!
//! Two rules are checked:
//!
//! ## Missing mandatory value
//! A required field is flagged at a row when its value is absent, `null`
//! or the empty string.
//!
//! ## Duplicate identifier
//! A field is an identifier when its key (case-insensitive) contains one of
//! [`IDENTIFIER_TOKENS`]. For every identifier field, rows are bucketed by
//! trimmed value text; each bucket holding more than one row flags all of
//! its rows. Blank values are never flagged as duplicates.
//!
//! The report is rebuilt from scratch on every change. Findings never
//! block a commit.
//!
//! This module also checks import definitions against their embedded JSON
//! Schema (see [`check_definition`]).

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{DraftRecord, DraftValue, Schema};

/// Key fragments marking a field as an identifier.
pub const IDENTIFIER_TOKENS: &[&str] = &["code", "reg_no", "id", "email"];

/// Verdict for one (row, field) cell.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CellVerdict {
    /// Required value is absent or empty.
    pub missing: bool,
    /// Identifier value shared with another row.
    pub duplicate: bool,
}

impl CellVerdict {
    pub fn has_violation(&self) -> bool {
        self.missing || self.duplicate
    }
}

/// Overall status of a row.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Ok,
    Error,
}

/// Aggregate counts of a report.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub rows: usize,
    pub error_rows: usize,
    pub missing: usize,
    pub duplicates: usize,
}

/// Verdicts for every cell of a draft record sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    keys: Vec<String>,
    /// `cells[row][field position in schema]`
    cells: Vec<Vec<CellVerdict>>,
}

impl ValidationReport {
    /// Verdict for a cell; unknown rows or keys read as clean.
    pub fn verdict(&self, row: usize, key: &str) -> CellVerdict {
        self.keys
            .iter()
            .position(|k| k == key)
            .and_then(|col| self.cells.get(row).and_then(|r| r.get(col)))
            .copied()
            .unwrap_or_default()
    }

    /// Verdicts of one row in schema order.
    pub fn row(&self, row: usize) -> &[CellVerdict] {
        self.cells.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn row_status(&self, row: usize) -> RowStatus {
        if self.row(row).iter().any(CellVerdict::has_violation) {
            RowStatus::Error
        } else {
            RowStatus::Ok
        }
    }

    /// Indices of rows with at least one violation.
    pub fn error_rows(&self) -> Vec<usize> {
        (0..self.cells.len())
            .filter(|&row| self.row_status(row) == RowStatus::Error)
            .collect()
    }

    /// Flagged cells as `(row, key, verdict)`, row-major.
    pub fn violations(&self) -> Vec<(usize, &str, CellVerdict)> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(row, verdicts)| {
                verdicts
                    .iter()
                    .zip(&self.keys)
                    .filter(|(v, _)| v.has_violation())
                    .map(move |(v, key)| (row, key.as_str(), *v))
            })
            .collect()
    }

    pub fn summary(&self) -> ValidationSummary {
        let all = self.cells.iter().flatten();
        ValidationSummary {
            rows: self.cells.len(),
            error_rows: self.error_rows().len(),
            missing: all.clone().filter(|v| v.missing).count(),
            duplicates: all.filter(|v| v.duplicate).count(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.cells.iter().flatten().all(|v| !v.has_violation())
    }
}

/// Compute verdicts for every (row, field) pair.
pub fn validate(records: &[DraftRecord], schema: &Schema) -> ValidationReport {
    let keys: Vec<String> = schema.iter().map(|f| f.key.clone()).collect();
    let mut cells: Vec<Vec<CellVerdict>> = records
        .iter()
        .map(|record| {
            schema
                .iter()
                .map(|field| CellVerdict {
                    missing: field.required && is_missing(record.get(&field.key)),
                    duplicate: false,
                })
                .collect()
        })
        .collect();

    for (col, field) in schema.iter().enumerate() {
        if !is_identifier_field(&field.key) {
            continue;
        }
        for rows in duplicate_index(records, &field.key).values() {
            if rows.len() > 1 {
                for &row in rows {
                    cells[row][col].duplicate = true;
                }
            }
        }
    }

    ValidationReport { keys, cells }
}

/// Whether a field key marks an identifier.
pub fn is_identifier_field(key: &str) -> bool {
    let key = key.to_lowercase();
    IDENTIFIER_TOKENS.iter().any(|token| key.contains(token))
}

/// Absent, `null` or empty string.
pub fn is_missing(value: &DraftValue) -> bool {
    match value {
        DraftValue::Absent => true,
        DraftValue::Scalar(Value::Null) => true,
        DraftValue::Scalar(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Trimmed value text → rows holding it. Blank values are left out.
pub fn duplicate_index(records: &[DraftRecord], key: &str) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (row, record) in records.iter().enumerate() {
        if let Some(text) = identity_text(record.get(key)) {
            index.entry(text).or_default().push(row);
        }
    }
    index
}

fn identity_text(value: &DraftValue) -> Option<String> {
    let text = match value {
        DraftValue::Absent => return None,
        DraftValue::List(items) => items.join(","),
        other => other.display_text(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// Definition checking
// =============================================================================

/// Check a JSON document against a JSON Schema (draft 7).
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with one message per violation
pub fn check_definition(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid definition schema: {}", e)])?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldSpec, FieldType};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("code", "Code").required(),
            FieldSpec::new("name", "Name").required(),
            FieldSpec::new("email", "Email"),
            FieldSpec::new("active", "Active").with_type(FieldType::Boolean),
        ])
        .unwrap()
    }

    fn draft(code: DraftValue, name: &str, email: &str) -> DraftRecord {
        let mut record = DraftRecord::new();
        record.set("code", code);
        record.set("name", DraftValue::Scalar(json!(name)));
        record.set("email", DraftValue::Scalar(json!(email)));
        record.set("active", DraftValue::Boolean(false));
        record
    }

    fn text(s: &str) -> DraftValue {
        DraftValue::Scalar(json!(s))
    }

    #[test]
    fn test_identifier_fields() {
        assert!(is_identifier_field("code"));
        assert!(is_identifier_field("Subject_Code"));
        assert!(is_identifier_field("student_reg_no"));
        assert!(is_identifier_field("ID"));
        assert!(is_identifier_field("email"));
        assert!(!is_identifier_field("name"));
        assert!(!is_identifier_field("regno"));
    }

    #[test]
    fn test_duplicates_flag_all_and_only_sharing_rows() {
        let records = vec![
            draft(text("X"), "a", ""),
            draft(text(" X "), "b", ""),
            draft(text("Y"), "c", ""),
            draft(text("X"), "d", ""),
        ];
        let report = validate(&records, &schema());

        assert!(report.verdict(0, "code").duplicate);
        assert!(report.verdict(1, "code").duplicate);
        assert!(!report.verdict(2, "code").duplicate);
        assert!(report.verdict(3, "code").duplicate);
        // name is not an identifier, blank emails are exempt
        assert!(!report.verdict(0, "name").duplicate);
        assert!(!report.verdict(0, "email").duplicate);
    }

    #[test]
    fn test_lone_value_never_duplicate() {
        let records = vec![draft(text("X"), "a", "a@x.org"), draft(text("Z"), "b", "b@x.org")];
        let report = validate(&records, &schema());
        assert!(report.is_clean());
        assert_eq!(report.error_rows(), Vec::<usize>::new());
    }

    #[test]
    fn test_missing_mandatory() {
        let records = vec![
            draft(text(""), "a", ""),
            draft(DraftValue::Scalar(Value::Null), "b", ""),
            draft(DraftValue::Absent, "c", ""),
            draft(text("K1"), "d", ""),
        ];
        let report = validate(&records, &schema());

        for row in 0..3 {
            let verdict = report.verdict(row, "code");
            assert!(verdict.missing, "row {}", row);
            assert!(!verdict.duplicate, "row {}", row);
        }
        assert!(!report.verdict(3, "code").missing);
        // optional fields are never missing
        assert!(!report.verdict(0, "email").missing);
    }

    #[test]
    fn test_booleans_and_lists_not_missing() {
        assert!(!is_missing(&DraftValue::Boolean(false)));
        assert!(!is_missing(&DraftValue::List(vec![])));
        assert!(!is_missing(&DraftValue::Scalar(json!(0))));
    }

    #[test]
    fn test_cross_field_values_not_compared() {
        let records = vec![draft(text("same"), "a", ""), draft(text("other"), "b", "same")];
        let report = validate(&records, &schema());
        assert!(report.is_clean());
    }

    #[test]
    fn test_numbers_compared_by_text() {
        let records = vec![
            draft(DraftValue::Scalar(json!(101)), "a", ""),
            draft(text("101"), "b", ""),
        ];
        let report = validate(&records, &schema());
        assert!(report.verdict(0, "code").duplicate);
        assert!(report.verdict(1, "code").duplicate);
    }

    #[test]
    fn test_row_status_and_summary() {
        let records = vec![
            draft(text("A"), "a", "dup@x.org"),
            draft(text(""), "b", "dup@x.org"),
            draft(text("C"), "c", ""),
        ];
        let report = validate(&records, &schema());

        assert_eq!(report.row_status(0), RowStatus::Error);
        assert_eq!(report.row_status(1), RowStatus::Error);
        assert_eq!(report.row_status(2), RowStatus::Ok);
        assert_eq!(
            report.summary(),
            ValidationSummary { rows: 3, error_rows: 2, missing: 1, duplicates: 2 }
        );
        assert_eq!(report.violations().len(), 3);
    }

    #[test]
    fn test_idempotent() {
        let records = vec![draft(text("A"), "", ""), draft(text("A"), "b", "")];
        let first = validate(&records, &schema());
        assert_eq!(validate(&records, &schema()), first);
    }

    #[test]
    fn test_check_definition() {
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(check_definition(&schema, &json!({ "name": "test" })).is_ok());
        let errors = check_definition(&schema, &json!({ "age": 42 })).unwrap_err();
        assert!(!errors.is_empty());
    }
}
