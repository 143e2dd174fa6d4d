//! Schema matcher: propose an initial header → field mapping.
//!
//! Headers, labels and keys are compared after [`normalize`]. A header
//! matches a field when it equals the normalized label, equals the
//! normalized key, or contains the normalized key. The first matching
//! header in file order wins. Fields without a match stay unmapped for the
//! operator to fill in.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ColumnMapping, FieldSpec, Schema};

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]").expect("Invalid normalization pattern"));

/// Lower-case and strip every non-alphanumeric character.
///
/// ```ignore
/// assert_eq!(normalize("Reg. No"), "regno");
/// assert_eq!(normalize("subject_code"), "subjectcode");
/// ```
pub fn normalize(value: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&value.to_lowercase(), "")
        .into_owned()
}

/// Whether a normalized header matches a field.
pub fn header_matches(normalized_header: &str, field: &FieldSpec) -> bool {
    if normalized_header.is_empty() {
        return false;
    }

    let label = normalize(&field.label);
    let key = normalize(&field.key);

    (!label.is_empty() && normalized_header == label)
        || (!key.is_empty() && (normalized_header == key || normalized_header.contains(&key)))
}

/// Propose a mapping for every field that some header matches.
pub fn suggest_mapping(headers: &[String], schema: &Schema) -> ColumnMapping {
    let normalized: Vec<String> = headers.iter().map(|h| normalize(h)).collect();
    let mut mapping = ColumnMapping::new();

    for field in schema.iter() {
        let found = headers
            .iter()
            .zip(&normalized)
            .find(|(_, norm)| header_matches(norm, field));

        if let Some((header, _)) = found {
            mapping.set(field.key.clone(), header.clone());
        }
    }

    mapping
}
