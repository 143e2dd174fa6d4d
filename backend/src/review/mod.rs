//! Interactive review grid.
//!
//! Holds the draft records, their current [`ValidationReport`] and the
//! editing cursor. At most one cell is in edit mode; focusing another cell
//! commits the active edit first, as leaving focus does. Every committed
//! edit re-coerces the typed text with the field's type and rebuilds the
//! report.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{GridError, GridResult};
use crate::models::{DraftRecord, DraftValue, PlainRecord, Schema};
use crate::transform::coerce_input;
use crate::validation::{validate, ValidationReport};

/// The cell in edit mode and its pending text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EditCursor {
    pub row: usize,
    pub key: String,
    pub buffer: String,
}

/// Operator input on the grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridEvent {
    /// Enter edit mode on a cell.
    Focus { row: usize, key: String },
    /// Replace the pending text.
    Input { text: String },
    /// Explicit confirm key.
    Confirm,
    /// Focus left the input.
    Blur,
    /// Explicit cancel key; data unchanged.
    Cancel,
}

/// Draft records under review.
#[derive(Debug, Clone)]
pub struct ReviewGrid {
    schema: Arc<Schema>,
    records: Vec<DraftRecord>,
    report: ValidationReport,
    cursor: Option<EditCursor>,
}

impl ReviewGrid {
    pub fn new(schema: Arc<Schema>, records: Vec<DraftRecord>) -> Self {
        let report = validate(&records, &schema);
        Self {
            schema,
            records,
            report,
            cursor: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[DraftRecord] {
        &self.records
    }

    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    pub fn cursor(&self) -> Option<&EditCursor> {
        self.cursor.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn cell(&self, row: usize, key: &str) -> GridResult<&DraftValue> {
        self.check_cell(row, key)?;
        Ok(self.records[row].get(key))
    }

    /// Apply one operator event.
    pub fn apply(&mut self, event: GridEvent) -> GridResult<()> {
        match event {
            GridEvent::Focus { row, key } => self.begin_edit(row, &key),
            GridEvent::Input { text } => self.set_input(text),
            GridEvent::Confirm | GridEvent::Blur => self.commit_edit().map(|_| ()),
            GridEvent::Cancel => {
                self.cancel_edit();
                Ok(())
            }
        }
    }

    /// Enter edit mode on a cell, seeding the buffer with its display text.
    pub fn begin_edit(&mut self, row: usize, key: &str) -> GridResult<()> {
        self.check_cell(row, key)?;

        if let Some(active) = &self.cursor {
            if active.row == row && active.key == key {
                return Ok(());
            }
            self.commit_edit()?;
        }

        let buffer = self.records[row].get(key).display_text();
        self.cursor = Some(EditCursor {
            row,
            key: key.to_string(),
            buffer,
        });
        Ok(())
    }

    pub fn set_input(&mut self, text: impl Into<String>) -> GridResult<()> {
        let cursor = self.cursor.as_mut().ok_or(GridError::NoActiveEdit)?;
        cursor.buffer = text.into();
        Ok(())
    }

    /// Write the buffer back into the draft and revalidate.
    ///
    /// Returns whether the cell value changed.
    pub fn commit_edit(&mut self) -> GridResult<bool> {
        let cursor = self.cursor.take().ok_or(GridError::NoActiveEdit)?;
        let field = self
            .schema
            .field(&cursor.key)
            .ok_or_else(|| GridError::UnknownField(cursor.key.clone()))?;

        let record = &mut self.records[cursor.row];
        let current = record.get(&cursor.key);

        // Untouched text keeps the committed value and its JSON type.
        if cursor.buffer == current.display_text() {
            return Ok(false);
        }

        let value = coerce_input(field.field_type, &cursor.buffer);
        if current == &value {
            return Ok(false);
        }

        record.set(cursor.key, value);
        self.revalidate();
        Ok(true)
    }

    /// Leave edit mode without touching data.
    pub fn cancel_edit(&mut self) {
        self.cursor = None;
    }

    /// Focus, type and confirm in one step.
    pub fn edit_cell(&mut self, row: usize, key: &str, text: impl Into<String>) -> GridResult<bool> {
        self.begin_edit(row, key)?;
        self.set_input(text)?;
        self.commit_edit()
    }

    /// Rebuild the report from the current records.
    pub fn revalidate(&mut self) {
        self.report = validate(&self.records, &self.schema);
    }

    /// Records in their plain commit form.
    pub fn to_plain_records(&self) -> Vec<PlainRecord> {
        self.records.iter().map(|r| r.to_plain(&self.schema)).collect()
    }

    fn check_cell(&self, row: usize, key: &str) -> GridResult<()> {
        if row >= self.records.len() {
            return Err(GridError::RowOutOfRange {
                row,
                len: self.records.len(),
            });
        }
        if self.schema.field(key).is_none() {
            return Err(GridError::UnknownField(key.to_string()));
        }
        Ok(())
    }
}
