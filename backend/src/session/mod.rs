//! Session controller: the upload → map → preview workflow.
//!
//! ```text
//! ┌────────┐ decode ok ┌─────┐ proceed ┌─────────┐ finalize ok ┌────────┐
//! │ upload │──────────▶│ map │────────▶│ preview │────────────▶│ closed │
//! └────────┘           └─────┘         └─────────┘             └────────┘
//!      ▲                  │ reset           │ reset
//!      └──────────────────┴─────────────────┘
//! ```
//!
//! An [`ImportSession`] exclusively owns every piece of import state. The
//! caller supplies a [`Schema`] up front and receives the final records
//! once, through a [`CommitSink`], when the operator finalizes.
//!
//! Decoding and committing are the two asynchronous steps. Each comes as a
//! `begin_*` / `finish_*` pair so an owner can release its lock while the
//! work runs; the `decoding` and `busy` flags reject a second decode or a
//! double finalize in the meantime. [`ImportSession::upload`] and
//! [`ImportSession::finalize`] wrap the pairs for single-owner callers.
//!
//! Validation findings never block finalize.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::commit::CommitSink;
use crate::error::{CommitResult, DecodeResult, SessionError, SessionResult};
use crate::matcher::suggest_mapping;
use crate::models::{ColumnMapping, ImportDefinition, PlainRecord, RawRecord, Schema};
use crate::parser::{decode, DecodedTable};
use crate::review::{GridEvent, ReviewGrid};
use crate::transform::transform;
use crate::validation::ValidationReport;

/// Workflow phase of a session.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Upload,
    Map,
    Preview,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Upload => "upload",
            Phase::Map => "map",
            Phase::Preview => "preview",
            Phase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// State of one import, from file selection to commit.
#[derive(Debug)]
pub struct ImportSession {
    id: Uuid,
    title: String,
    created_at: DateTime<Utc>,
    schema: Arc<Schema>,
    phase: Phase,
    source_name: Option<String>,
    headers: Vec<String>,
    raw_records: Vec<RawRecord>,
    mapping: ColumnMapping,
    grid: Option<ReviewGrid>,
    decoding: bool,
    busy: bool,
    last_error: Option<String>,
}

impl ImportSession {
    pub fn new(title: impl Into<String>, schema: Schema) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at: Utc::now(),
            schema: Arc::new(schema),
            phase: Phase::Upload,
            source_name: None,
            headers: Vec::new(),
            raw_records: Vec::new(),
            mapping: ColumnMapping::new(),
            grid: None,
            decoding: false,
            busy: false,
            last_error: None,
        };
        log_info(format!(
            "📋 Import \"{}\" opened ({} fields)",
            session.title,
            session.schema.len()
        ));
        session
    }

    pub fn from_definition(definition: ImportDefinition) -> Self {
        Self::new(definition.title, definition.fields)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn raw_records(&self) -> &[RawRecord] {
        &self.raw_records
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn grid(&self) -> Option<&ReviewGrid> {
        self.grid.as_ref()
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.grid.as_ref().map(ReviewGrid::report)
    }

    pub fn is_decoding(&self) -> bool {
        self.decoding
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Last surfaced failure (decode or commit), cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // -------------------------------------------------------------------------
    // Upload phase
    // -------------------------------------------------------------------------

    /// Decode a file and move to the map phase.
    pub fn upload(&mut self, bytes: &[u8], file_name: Option<&str>) -> SessionResult<()> {
        self.begin_decode()?;
        let result = decode(bytes, file_name);
        self.finish_decode(file_name, result)
    }

    /// Mark a decode as outstanding.
    pub fn begin_decode(&mut self) -> SessionResult<()> {
        self.ensure_phase(Phase::Upload)?;
        if self.decoding {
            return Err(SessionError::Busy);
        }
        self.decoding = true;
        Ok(())
    }

    /// Store a decode result. On failure the session stays in upload.
    pub fn finish_decode(
        &mut self,
        file_name: Option<&str>,
        result: DecodeResult<DecodedTable>,
    ) -> SessionResult<()> {
        self.decoding = false;
        self.ensure_phase(Phase::Upload)?;

        let table = match result {
            Ok(table) => table,
            Err(e) => {
                log_error(format!(
                    "Could not read {}: {}",
                    file_name.unwrap_or("file"),
                    e
                ));
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        log_success(format!(
            "📖 Read {} rows, {} columns",
            table.records.len(),
            table.headers.len()
        ));

        self.mapping = suggest_mapping(&table.headers, &self.schema);
        for field in self.schema.iter() {
            match self.mapping.get(&field.key) {
                Some(column) => log_info_indent(format!("{} → {}", column, field.key), 1),
                None => log_info_indent(format!("(unmapped) → {}", field.key), 1),
            }
        }

        self.source_name = file_name.map(String::from);
        self.headers = table.headers;
        self.raw_records = table.records;
        self.last_error = None;
        self.phase = Phase::Map;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Map phase
    // -------------------------------------------------------------------------

    /// Map a field to a column; `None` or an empty name unmaps it.
    pub fn set_mapping(&mut self, key: &str, column: Option<&str>) -> SessionResult<()> {
        self.ensure_phase(Phase::Map)?;
        if self.schema.field(key).is_none() {
            return Err(SessionError::UnknownField(key.to_string()));
        }

        match column.filter(|c| !c.is_empty()) {
            None => self.mapping.unset(key),
            Some(column) => {
                if !self.headers.iter().any(|h| h == column) {
                    return Err(SessionError::UnknownColumn(column.to_string()));
                }
                self.mapping.set(key, column);
            }
        }
        Ok(())
    }

    /// Required fields still unmapped, in schema order.
    pub fn missing_required(&self) -> Vec<String> {
        self.mapping.missing_required(&self.schema)
    }

    pub fn can_proceed(&self) -> bool {
        self.phase == Phase::Map && self.missing_required().is_empty()
    }

    /// Freeze the mapping, transform and validate.
    pub fn proceed(&mut self) -> SessionResult<()> {
        self.ensure_phase(Phase::Map)?;
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(SessionError::MappingIncomplete { missing });
        }

        log_info("⚙️  Transforming records...");
        let drafts = transform(&self.schema, &self.mapping, &self.raw_records);
        let grid = ReviewGrid::new(Arc::clone(&self.schema), drafts);

        let summary = grid.report().summary();
        if summary.error_rows == 0 {
            log_success(format!("All {} rows valid", summary.rows));
        } else {
            log_warning(format!(
                "{} of {} rows flagged ({} missing, {} duplicate)",
                summary.error_rows, summary.rows, summary.missing, summary.duplicates
            ));
        }

        self.grid = Some(grid);
        self.phase = Phase::Preview;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Preview phase
    // -------------------------------------------------------------------------

    /// Forward an operator event to the review grid.
    pub fn edit(&mut self, event: GridEvent) -> SessionResult<()> {
        self.editable_grid()?.apply(event)?;
        Ok(())
    }

    /// Focus, type and confirm one cell. Returns whether the value changed.
    pub fn edit_cell(&mut self, row: usize, key: &str, text: &str) -> SessionResult<bool> {
        Ok(self.editable_grid()?.edit_cell(row, key, text)?)
    }

    /// Mark a commit as outstanding and hand out the records to persist.
    ///
    /// A pending cell edit is committed first.
    pub fn begin_finalize(&mut self) -> SessionResult<Vec<PlainRecord>> {
        let grid = self.editable_grid()?;
        if grid.cursor().is_some() {
            grid.commit_edit()?;
        }
        let records = grid.to_plain_records();

        self.busy = true;
        log_info(format!("🚀 Committing {} records...", records.len()));
        Ok(records)
    }

    /// Record the outcome of a commit. Success closes the session; failure
    /// keeps it in preview with drafts intact.
    pub fn finish_finalize(&mut self, result: CommitResult<()>) -> SessionResult<()> {
        self.busy = false;

        if self.phase == Phase::Closed {
            return result.map_err(SessionError::from);
        }

        match result {
            Ok(()) => {
                log_success(format!("✅ Import \"{}\" committed", self.title));
                self.last_error = None;
                self.phase = Phase::Closed;
                Ok(())
            }
            Err(e) => {
                log_error(format!("Commit failed: {}", e));
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    /// Commit through a sink. Returns the number of records committed.
    pub async fn finalize(&mut self, sink: &dyn CommitSink) -> SessionResult<usize> {
        let records = self.begin_finalize()?;
        let count = records.len();
        let result = sink.commit(records).await;
        self.finish_finalize(result)?;
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Any phase
    // -------------------------------------------------------------------------

    /// Discard everything but the schema and start over at upload.
    ///
    /// Only from map or preview.
    pub fn reset(&mut self) -> SessionResult<()> {
        if !matches!(self.phase, Phase::Map | Phase::Preview) {
            return Err(SessionError::WrongPhase {
                expected: Phase::Map,
                actual: self.phase,
            });
        }
        if self.busy || self.decoding {
            return Err(SessionError::Busy);
        }

        self.source_name = None;
        self.headers.clear();
        self.raw_records.clear();
        self.mapping = ColumnMapping::new();
        self.grid = None;
        self.last_error = None;
        self.phase = Phase::Upload;
        log_info("🔄 Import reset");
        Ok(())
    }

    /// End the session from any phase.
    pub fn cancel(&mut self) {
        if let Some(grid) = self.grid.as_mut() {
            grid.cancel_edit();
        }
        if self.phase != Phase::Closed {
            log_info(format!("🚫 Import \"{}\" cancelled", self.title));
        }
        self.phase = Phase::Closed;
    }

    fn ensure_phase(&self, expected: Phase) -> SessionResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn editable_grid(&mut self) -> SessionResult<&mut ReviewGrid> {
        self.ensure_phase(Phase::Preview)?;
        if self.busy {
            return Err(SessionError::Busy);
        }
        self.grid.as_mut().ok_or(SessionError::WrongPhase {
            expected: Phase::Preview,
            actual: Phase::Map,
        })
    }
}
