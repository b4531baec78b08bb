//! Core row shapes flowing through the pipeline.
//!
//! A decoded upload produces [`RosterFileRow`]s (raw column name → raw cell
//! text). The mapper projects those into [`CanonicalRow`]s, the validator wraps
//! each in a [`RowValidationResult`], and the commit stage turns clean rows
//! into [`PersistedStudent`] records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::{FIELDS, Field};

/// Opaque identifier correlating a decoded row with its validated result.
/// Stable across re-mapping of the same upload, fresh on every re-upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(Uuid);

impl RowId {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One non-empty data row exactly as it appeared in the uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterFileRow {
    pub id: RowId,
    cells: BTreeMap<String, String>,
}

impl RosterFileRow {
    pub fn new(cells: BTreeMap<String, String>) -> Self {
        Self {
            id: RowId::fresh(),
            cells,
        }
    }

    /// Raw cell text under `column`, or `None` when this row is shorter than
    /// the header (ragged files).
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|value| value.trim().is_empty())
    }
}

/// A row projected onto the eleven canonical fields. Every field is present;
/// unmapped or missing source cells become empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub id: RowId,
    values: BTreeMap<Field, String>,
}

impl CanonicalRow {
    pub fn new(id: RowId) -> Self {
        let values = FIELDS.into_iter().map(|f| (f, String::new())).collect();
        Self { id, values }
    }

    pub fn get(&self, field: Field) -> &str {
        self.values
            .get(&field)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }
}

/// Validator output for one row. Rows are never dropped: a clean row simply
/// carries an empty violation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowValidationResult {
    pub row: CanonicalRow,
    violations: Vec<String>,
    pub duplicate_of: Option<RowId>,
}

impl RowValidationResult {
    pub fn clean(row: CanonicalRow) -> Self {
        Self {
            row,
            violations: Vec::new(),
            duplicate_of: None,
        }
    }

    /// Appends a violation, keeping the list an ordered set of distinct
    /// messages.
    pub fn push_violation(&mut self, message: impl Into<String>) {
        let message = message.into();
        if !self.violations.contains(&message) {
            self.violations.push(message);
        }
    }

    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// The committed student entity. `class` and `section` are repurposed from the
/// roster's department and year-of-study columns; `biometric_id` mirrors the
/// student identifier for attendance-device linkage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStudent {
    pub id: Uuid,
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub class: String,
    pub section: String,
    pub phone_number: String,
    pub parent_number: String,
    pub biometric_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_row_starts_with_all_fields_empty() {
        let row = CanonicalRow::new(RowId::fresh());
        for field in FIELDS {
            assert_eq!(row.get(field), "");
        }
    }

    #[test]
    fn push_violation_deduplicates_but_preserves_order() {
        let mut result = RowValidationResult::clean(CanonicalRow::new(RowId::fresh()));
        result.push_violation("name is required");
        result.push_violation("email is not a valid address");
        result.push_violation("name is required");
        assert_eq!(
            result.violations(),
            ["name is required", "email is not a valid address"]
        );
    }

    #[test]
    fn blank_row_detection_ignores_whitespace() {
        let mut cells = BTreeMap::new();
        cells.insert("Name".to_string(), "   ".to_string());
        cells.insert("Email".to_string(), String::new());
        assert!(RosterFileRow::new(cells).is_blank());
    }
}
