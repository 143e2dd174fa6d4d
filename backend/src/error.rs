//! Error types for the Tabload import pipeline.
//!
//! One error enum per layer:
//!
//! - [`DecodeError`] - file decoding errors (upload phase)
//! - [`SchemaError`] - invalid import definitions
//! - [`GridError`] - review grid edit errors
//! - [`CommitError`] - commit sink rejections
//! - [`SessionError`] - session controller errors (wraps the above)
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Row-level data-quality findings (missing mandatory values, duplicate
//! identifiers) are not errors. They live in
//! [`crate::validation::ValidationReport`] and never block a commit.

use thiserror::Error;

use crate::session::Phase;

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while decoding an uploaded file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The blob is not a format the decoder understands.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Text could not be decoded.
    #[error("Failed to decode text: {0}")]
    Encoding(String),

    /// Delimited text could not be parsed.
    #[error("Invalid delimited file: {0}")]
    Malformed(String),

    /// Workbook could not be opened or read.
    #[error("Invalid workbook: {0}")]
    Workbook(String),

    /// Workbook has no worksheet.
    #[error("Workbook contains no sheet")]
    NoSheet,

    /// Table yielded zero records.
    #[error("File contains no data rows")]
    EmptyFile,
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors in a caller-supplied import definition.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Definition does not match the embedded definition schema.
    #[error("Invalid import definition: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// Two fields share a key.
    #[error("Duplicate field key: {0}")]
    DuplicateKey(String),

    /// JSON error.
    #[error("Definition JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("Definition IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Review Grid Errors
// =============================================================================

/// Errors while editing the review grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// Row index past the end of the grid.
    #[error("Row {row} out of range ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    /// Field key not in the schema.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Input or commit without a cell in edit mode.
    #[error("No cell is being edited")]
    NoActiveEdit,
}

// =============================================================================
// Commit Errors
// =============================================================================

/// Errors from a commit sink.
#[derive(Debug, Error)]
pub enum CommitError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Remote store answered with a non-success status.
    #[error("Commit rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The sink stopped before reporting an outcome.
    #[error("Commit aborted: {0}")]
    Aborted(String),

    /// IO error.
    #[error("Commit IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("Commit JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Session Errors
// =============================================================================

/// Errors from the session controller.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Decoding failed; the session stays in the upload phase.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Grid edit failed.
    #[error("Edit error: {0}")]
    Grid(#[from] GridError),

    /// Commit sink rejected the records; drafts are kept.
    #[error("Commit error: {0}")]
    Commit(#[from] CommitError),

    /// Operation not allowed in the current phase.
    #[error("Operation requires phase '{expected}', session is in '{actual}'")]
    WrongPhase { expected: Phase, actual: Phase },

    /// A decode or commit is already outstanding.
    #[error("Session is busy")]
    Busy,

    /// Required fields are still unmapped.
    #[error("Required fields not mapped: {}", .missing.join(", "))]
    MappingIncomplete { missing: Vec<String> },

    /// Mapping targets a field key not in the schema.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Mapping targets a column not in the file.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No session with that id.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Invalid import definition.
    #[error("Definition error: {0}")]
    Schema(#[from] SchemaError),

    /// Session refused the operation.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for definition loading.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for grid edits.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for commit sinks.
pub type CommitResult<T> = Result<T, CommitError>;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
