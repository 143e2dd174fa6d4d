//! Transform engine: raw records into typed draft records.
//!
//! For each field the mapped column's raw value is selected and coerced
//! according to the field's [`FieldType`]:
//!
//! | Type      | Raw input                         | Draft value                          |
//! |-----------|-----------------------------------|--------------------------------------|
//! | `scalar`  | anything                          | passed through, `null` → absent      |
//! | `list`    | array                             | elements as strings                  |
//! | `list`    | string                            | split on `,`, trimmed, empties dropped |
//! | `list`    | anything else                     | empty list                           |
//! | `boolean` | text in `yes`/`true`/`y`/`1`      | `true`                               |
//! | `boolean` | anything else, absent, empty      | `false`                              |
//!
//! Malformed input degrades to empty/false, never to an error; fixing data
//! is the job of the review grid.

use serde_json::Value;

use crate::models::{scalar_text, ColumnMapping, DraftRecord, DraftValue, FieldType, RawRecord, Schema};

/// Tokens read as `true` by boolean fields (after trim + lower-case).
pub const AFFIRMATIVE_TOKENS: &[&str] = &["yes", "true", "y", "1"];

/// Transform raw records into draft records, one per input row, in order.
///
/// # Example
/// ```ignore
/// let drafts = transform(&schema, &mapping, &table.records);
/// assert_eq!(drafts.len(), table.records.len());
/// ```
pub fn transform(schema: &Schema, mapping: &ColumnMapping, records: &[RawRecord]) -> Vec<DraftRecord> {
    records
        .iter()
        .map(|record| transform_record(schema, mapping, record))
        .collect()
}

/// Transform a single raw record.
pub fn transform_record(schema: &Schema, mapping: &ColumnMapping, record: &RawRecord) -> DraftRecord {
    schema
        .iter()
        .map(|field| {
            let raw = mapping.get(&field.key).and_then(|column| record.get(column));
            (field.key.clone(), coerce(field.field_type, raw))
        })
        .collect()
}

/// Coerce a raw cell (or its absence) to a draft value.
pub fn coerce(field_type: FieldType, raw: Option<&Value>) -> DraftValue {
    match field_type {
        FieldType::Scalar => match raw {
            None | Some(Value::Null) => DraftValue::Absent,
            Some(v) => DraftValue::Scalar(v.clone()),
        },
        FieldType::List => DraftValue::List(match raw {
            Some(Value::Array(items)) => items.iter().map(scalar_text).collect(),
            Some(Value::String(s)) => split_list(s),
            _ => Vec::new(),
        }),
        FieldType::Boolean => {
            DraftValue::Boolean(raw.map(|v| is_affirmative(&scalar_text(v))).unwrap_or(false))
        }
    }
}

/// Coerce operator-typed text with the same policy as file input.
pub fn coerce_input(field_type: FieldType, text: &str) -> DraftValue {
    match field_type {
        FieldType::Scalar => DraftValue::Scalar(Value::String(text.to_string())),
        FieldType::List => DraftValue::List(split_list(text)),
        FieldType::Boolean => DraftValue::Boolean(is_affirmative(text)),
    }
}

/// Split on commas, trim segments and drop empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Whether text is one of [`AFFIRMATIVE_TOKENS`].
pub fn is_affirmative(value: &str) -> bool {
    let token = value.trim().to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&token.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldSpec;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn schema() -> Schema {
        Schema::new(vec![
            FieldSpec::new("code", "Code").required(),
            FieldSpec::new("combos", "Combinations").with_type(FieldType::List),
            FieldSpec::new("active", "Active").with_type(FieldType::Boolean),
            FieldSpec::new("note", "Note"),
        ])
        .unwrap()
    }

    fn full_mapping() -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        mapping.set("code", "Code");
        mapping.set("combos", "Combos");
        mapping.set("active", "Active");
        mapping
    }

    #[test]
    fn test_list_split_and_trim() {
        let drafts = transform(
            &schema(),
            &full_mapping(),
            &[record(json!({"Code": "M101", "Combos": "A, B ,C", "Active": "Y"}))],
        );
        assert_eq!(
            drafts[0].get("combos"),
            &DraftValue::List(vec!["A".into(), "B".into(), "C".into()])
        );
    }

    #[test]
    fn test_list_drops_empty_segments_and_non_strings() {
        assert_eq!(
            coerce(FieldType::List, Some(&json!(" , A,,B, "))),
            DraftValue::List(vec!["A".into(), "B".into()])
        );
        assert_eq!(
            coerce(FieldType::List, Some(&json!(["x", 2]))),
            DraftValue::List(vec!["x".into(), "2".into()])
        );
        assert_eq!(coerce(FieldType::List, Some(&json!(42))), DraftValue::List(vec![]));
        assert_eq!(coerce(FieldType::List, None), DraftValue::List(vec![]));
    }

    #[test]
    fn test_boolean_tokens() {
        let cases = [
            (json!("Y"), true),
            (json!(" yes "), true),
            (json!("TRUE"), true),
            (json!("1"), true),
            (json!(1), true),
            (json!(true), true),
            (json!("no"), false),
            (json!(""), false),
            (json!("maybe"), false),
            (json!(0), false),
            (Value::Null, false),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                coerce(FieldType::Boolean, Some(&raw)),
                DraftValue::Boolean(expected),
                "raw value {:?}",
                raw
            );
        }
        assert_eq!(coerce(FieldType::Boolean, None), DraftValue::Boolean(false));
    }

    #[test]
    fn test_scalar_passthrough() {
        assert_eq!(coerce(FieldType::Scalar, Some(&json!(" M101 "))), DraftValue::Scalar(json!(" M101 ")));
        assert_eq!(coerce(FieldType::Scalar, Some(&json!(3))), DraftValue::Scalar(json!(3)));
        assert_eq!(coerce(FieldType::Scalar, Some(&json!(""))), DraftValue::Scalar(json!("")));
        assert_eq!(coerce(FieldType::Scalar, Some(&Value::Null)), DraftValue::Absent);
        assert_eq!(coerce(FieldType::Scalar, None), DraftValue::Absent);
    }

    #[test]
    fn test_unmapped_and_missing_column() {
        let mut mapping = full_mapping();
        mapping.set("note", "Remarks");
        let drafts = transform(&schema(), &mapping, &[record(json!({"Code": "M101"}))]);

        // "note" is mapped to a column the row does not have
        assert_eq!(drafts[0].get("note"), &DraftValue::Absent);
        assert_eq!(drafts[0].get("active"), &DraftValue::Boolean(false));
        assert_eq!(drafts[0].get("combos"), &DraftValue::List(vec![]));
    }

    #[test]
    fn test_order_preserved_and_pure() {
        let records = vec![
            record(json!({"Code": "A", "Active": "no"})),
            record(json!({"Code": "B", "Active": "yes"})),
            record(json!({"Code": "C"})),
        ];
        let first = transform(&schema(), &full_mapping(), &records);
        let second = transform(&schema(), &full_mapping(), &records);

        assert_eq!(first, second);
        let codes: Vec<String> = first.iter().map(|d| d.get("code").display_text()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_coerce_input() {
        assert_eq!(coerce_input(FieldType::Scalar, "B101"), DraftValue::Scalar(json!("B101")));
        assert_eq!(
            coerce_input(FieldType::List, "x, y"),
            DraftValue::List(vec!["x".into(), "y".into()])
        );
        assert_eq!(coerce_input(FieldType::Boolean, "True"), DraftValue::Boolean(true));
        assert_eq!(coerce_input(FieldType::Boolean, "off"), DraftValue::Boolean(false));
    }
}
