//! # Tabload - schema-driven tabular import
//!
//! Tabload turns an uploaded spreadsheet (CSV or Excel workbook) into
//! records shaped by a caller-supplied field schema. An operator maps
//! columns to fields, reviews validation findings cell by cell, edits
//! values in place and commits the whole batch at once.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────┐   ┌───────────┐   ┌────────────┐   ┌────────┐
//! │ CSV / XLSX │──▶│ Decoder │──▶│  Matcher  │──▶│ Transform  │──▶│ Review │──▶ Sink
//! │  (bytes)   │   │(auto-enc)│  │ (mapping) │   │ + Validate │   │ (edit) │
//! └────────────┘   └─────────┘   └───────────┘   └────────────┘   └────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabload::{FieldSpec, ImportSession, JsonFileSink, Schema};
//!
//! #[tokio::main]
//! async fn main() {
//!     let schema = Schema::new(vec![
//!         FieldSpec::new("code", "Code").required(),
//!         FieldSpec::new("name", "Name").required(),
//!     ]).unwrap();
//!
//!     let mut session = ImportSession::new("Subjects", schema);
//!     session.upload(b"code,name\nM101,Math", Some("subjects.csv")).unwrap();
//!     session.proceed().unwrap();
//!     session.finalize(&JsonFileSink::new("subjects.json")).await.unwrap();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Schema, mapping and record types
//! - [`parser`] - CSV / workbook decoding with auto-detection
//! - [`matcher`] - Header → field mapping suggestions
//! - [`transform`] - Type coercion of mapped records
//! - [`validation`] - Missing / duplicate verdicts
//! - [`review`] - Editable review grid
//! - [`session`] - Import workflow state machine
//! - [`commit`] - Commit sinks
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Pipeline
pub mod parser;
pub mod matcher;
pub mod transform;
pub mod validation;
pub mod review;

// Workflow
pub mod session;
pub mod commit;

pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CommitError, DecodeError, GridError, SchemaError, ServerError, SessionError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ColumnMapping, DraftRecord, DraftValue, FieldSpec, FieldType, ImportDefinition,
    PlainRecord, RawRecord, Schema,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use parser::{decode, decode_file, DecodedTable, TableFormat};
pub use matcher::suggest_mapping;
pub use transform::transform;
pub use validation::{validate, CellVerdict, RowStatus, ValidationReport, ValidationSummary};
pub use review::{GridEvent, ReviewGrid};

// =============================================================================
// Re-exports - Workflow
// =============================================================================

pub use session::{ImportSession, Phase};
pub use commit::{CommitSink, DirectorySink, HttpCommitSink, JsonFileSink};
pub use config::AppConfig;

pub use api::server;
