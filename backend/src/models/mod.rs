//! Domain models for the Tabload import pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`FieldSpec`] / [`FieldType`] - One target field of the caller's schema
//! - [`Schema`] - Ordered, key-unique list of fields
//! - [`ImportDefinition`] - Wire/disk form of the caller's construction contract
//! - [`RawRecord`] - One decoded row (column name → raw cell)
//! - [`ColumnMapping`] - Field key → chosen column
//! - [`DraftValue`] / [`DraftRecord`] - Transformed, editable output rows

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};

/// One decoded row: column name → raw cell value, in file order.
pub type RawRecord = Map<String, Value>;

/// A plain record handed to a commit sink.
pub type PlainRecord = Map<String, Value>;

// =============================================================================
// Field Specification
// =============================================================================

/// Declared coercion type of a target field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Raw value passed through unchanged.
    #[default]
    Scalar,
    /// Comma-delimited list of strings.
    List,
    /// Yes/no style flag.
    #[serde(alias = "boolean-like", alias = "boolean_like")]
    Boolean,
}

/// One target field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Unique identifier within the schema.
    pub key: String,
    /// Display name.
    pub label: String,
    /// Whether a value is mandatory.
    #[serde(default)]
    pub required: bool,
    /// Coercion type.
    #[serde(default, rename = "type")]
    pub field_type: FieldType,
    /// Optional help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    /// Optional scalar field.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            required: false,
            field_type: FieldType::Scalar,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Ordered sequence of fields with unique keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Vec<FieldSpec>", into = "Vec<FieldSpec>")]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Build a schema, rejecting duplicate keys.
    pub fn new(fields: Vec<FieldSpec>) -> SchemaResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(SchemaError::DuplicateKey(field.key.clone()));
            }
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.key == key)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<FieldSpec>> for Schema {
    type Error = SchemaError;

    fn try_from(fields: Vec<FieldSpec>) -> Result<Self, Self::Error> {
        Schema::new(fields)
    }
}

impl From<Schema> for Vec<FieldSpec> {
    fn from(schema: Schema) -> Self {
        schema.fields
    }
}

// =============================================================================
// Import Definition
// =============================================================================

static DEFINITION_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/import-definition.json"))
        .expect("Invalid embedded definition schema")
});

/// Caller-supplied description of one import: a title and a target schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportDefinition {
    pub title: String,
    pub fields: Schema,
}

impl ImportDefinition {
    /// Parse a definition, checking it against the embedded definition schema.
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Same as [`ImportDefinition::from_json`] for an already parsed value.
    pub fn from_value(value: Value) -> SchemaResult<Self> {
        crate::validation::check_definition(&DEFINITION_SCHEMA, &value)
            .map_err(SchemaError::Invalid)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Load a definition file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

// =============================================================================
// Column Mapping
// =============================================================================

/// Field key → source column name. Fields without an entry are unmapped.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, String>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a field to a column. An empty column name unmaps the field.
    pub fn set(&mut self, key: impl Into<String>, column: impl Into<String>) {
        let key = key.into();
        let column = column.into();
        if column.is_empty() {
            self.entries.remove(&key);
        } else {
            self.entries.insert(key, column);
        }
    }

    pub fn unset(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_mapped(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys of required fields that have no column yet, in schema order.
    pub fn missing_required(&self, schema: &Schema) -> Vec<String> {
        schema
            .required_fields()
            .filter(|f| !self.is_mapped(&f.key))
            .map(|f| f.key.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Draft Values
// =============================================================================

/// A transformed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftValue {
    /// No value (unmapped field, missing column, empty scalar cell).
    Absent,
    /// Raw value passed through.
    Scalar(Value),
    /// Ordered list of strings.
    List(Vec<String>),
    /// Flag.
    Boolean(bool),
}

impl DraftValue {
    /// Plain JSON form used by the commit contract.
    pub fn to_json(&self) -> Value {
        match self {
            DraftValue::Absent => Value::Null,
            DraftValue::Scalar(v) => v.clone(),
            DraftValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            DraftValue::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Text shown in the grid and used to seed the edit buffer.
    pub fn display_text(&self) -> String {
        match self {
            DraftValue::Absent => String::new(),
            DraftValue::Scalar(v) => scalar_text(v),
            DraftValue::List(items) => items.join(", "),
            DraftValue::Boolean(b) => b.to_string(),
        }
    }
}

impl Serialize for DraftValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Text of a raw JSON scalar: strings verbatim, null empty, others as JSON.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One transformed row: field key → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DraftRecord {
    values: HashMap<String, DraftValue>,
}

impl DraftRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field; fields never written read as [`DraftValue::Absent`].
    pub fn get(&self, key: &str) -> &DraftValue {
        self.values.get(key).unwrap_or(&DraftValue::Absent)
    }

    pub fn set(&mut self, key: impl Into<String>, value: DraftValue) {
        self.values.insert(key.into(), value);
    }

    /// Plain JSON object in schema order.
    pub fn to_plain(&self, schema: &Schema) -> PlainRecord {
        schema
            .iter()
            .map(|f| (f.key.clone(), self.get(&f.key).to_json()))
            .collect()
    }
}

impl FromIterator<(String, DraftValue)> for DraftRecord {
    fn from_iter<I: IntoIterator<Item = (String, DraftValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
