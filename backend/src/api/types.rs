//! REST API types for the review client.
//!
//! Everything the client renders comes from [`SessionView`], a camelCase
//! snapshot of one [`ImportSession`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::FieldSpec;
use crate::review::EditCursor;
use crate::session::{ImportSession, Phase};
use crate::validation::{RowStatus, ValidationSummary};

/// Body of `PUT /api/sessions/{id}/mapping`. A `null` or empty column unmaps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRequest {
    pub key: String,
    #[serde(default)]
    pub column: Option<String>,
}

/// Snapshot of a session for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub phase: Phase,
    /// Commit in flight
    pub busy: bool,
    /// Decode in flight
    pub decoding: bool,
    pub source_name: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub headers: Vec<String>,
    pub mapping: Vec<MappingRow>,
    pub can_proceed: bool,
    pub missing_required: Vec<String>,
    pub rows: Vec<RowView>,
    pub cursor: Option<EditCursor>,
    pub summary: Option<ValidationSummary>,
    pub last_error: Option<String>,
}

/// One field of the mapping table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRow {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub column: Option<String>,
}

/// One draft record of the review grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub index: usize,
    pub status: RowStatus,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub key: String,
    pub value: Value,
    pub display: String,
    pub missing: bool,
    pub duplicate: bool,
}

impl From<&ImportSession> for SessionView {
    fn from(session: &ImportSession) -> Self {
        let schema = session.schema();

        let mapping = schema
            .iter()
            .map(|field| MappingRow {
                key: field.key.clone(),
                label: field.label.clone(),
                required: field.required,
                column: session.mapping().get(&field.key).map(String::from),
            })
            .collect();

        let rows = session
            .grid()
            .map(|grid| {
                let report = grid.report();
                grid.records()
                    .iter()
                    .enumerate()
                    .map(|(index, record)| RowView {
                        index,
                        status: report.row_status(index),
                        cells: schema
                            .iter()
                            .map(|field| {
                                let value = record.get(&field.key);
                                let verdict = report.verdict(index, &field.key);
                                CellView {
                                    key: field.key.clone(),
                                    value: value.to_json(),
                                    display: value.display_text(),
                                    missing: verdict.missing,
                                    duplicate: verdict.duplicate,
                                }
                            })
                            .collect(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        SessionView {
            id: session.id(),
            title: session.title().to_string(),
            created_at: session.created_at(),
            phase: session.phase(),
            busy: session.is_busy(),
            decoding: session.is_decoding(),
            source_name: session.source_name().map(String::from),
            fields: schema.fields().to_vec(),
            headers: session.headers().to_vec(),
            mapping,
            can_proceed: session.can_proceed(),
            missing_required: session.missing_required(),
            rows,
            cursor: session.grid().and_then(|g| g.cursor().cloned()),
            summary: session.report().map(|r| r.summary()),
            last_error: session.last_error().map(String::from),
        }
    }
}

/// Reply to a successful finalize.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub session_id: Uuid,
    pub committed: usize,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Schema;

    fn session() -> ImportSession {
        let schema = Schema::new(vec![
            FieldSpec::new("code", "Code").required(),
            FieldSpec::new("name", "Name").required(),
        ])
        .unwrap();
        ImportSession::new("Subjects", schema)
    }

    #[test]
    fn test_view_in_map_phase() {
        let mut session = session();
        session.upload(b"Code,Title\nM1,Math", Some("s.csv")).unwrap();
        let json = serde_json::to_value(SessionView::from(&session)).unwrap();

        assert_eq!(json["phase"], "map");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["sourceName"], "s.csv");
        assert_eq!(json["canProceed"], false);
        assert_eq!(json["missingRequired"], json!(["name"]));
        assert_eq!(json["mapping"][0], json!({"key": "code", "label": "Code", "required": true, "column": "Code"}));
        assert_eq!(json["mapping"][1]["column"], Value::Null);
        assert_eq!(json["rows"], json!([]));
        assert_eq!(json["summary"], Value::Null);
    }

    #[test]
    fn test_view_in_preview_phase() {
        let mut session = session();
        session.upload(b"code,name\n,Bio\nC1,Chem", None).unwrap();
        session.proceed().unwrap();
        let json = serde_json::to_value(SessionView::from(&session)).unwrap();

        assert_eq!(json["phase"], "preview");
        assert_eq!(json["rows"][0]["status"], "error");
        assert_eq!(
            json["rows"][0]["cells"][0],
            json!({"key": "code", "value": "", "display": "", "missing": true, "duplicate": false})
        );
        assert_eq!(json["rows"][1]["status"], "ok");
        assert_eq!(json["summary"]["errorRows"], 1);
        assert_eq!(json["cursor"], Value::Null);
    }

    #[test]
    fn test_mapping_request_column_optional() {
        let req: MappingRequest = serde_json::from_str(r#"{"key": "code"}"#).unwrap();
        assert!(req.column.is_none());
    }

    #[test]
    fn test_error_response() {
        let json = error_response("Session not found: x");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Session not found: x");
    }
}
