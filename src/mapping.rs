//! Field-to-column mapping: the heuristic initial guess and the projection of
//! raw rows into canonical rows.
//!
//! A [`FieldMapping`] is total: all eleven canonical fields resolve to some
//! column, defaulting to the file's first column when nothing matches. The
//! projection always runs against the original decoded rows, so re-mapping is
//! a full recomputation and never compounds earlier transformations.

use std::collections::BTreeMap;

use anyhow::{Result, ensure};
use log::debug;
use serde::Serialize;

use crate::data::{CanonicalRow, RosterFileRow};
use crate::fields::{FIELDS, Field};

/// Substring pairings tried when a column name matches neither the field key
/// nor its display label.
const SPECIAL_PAIRINGS: &[(Field, &str)] = &[
    (Field::StudentId, "id"),
    (Field::PhoneNumber, "phone"),
    (Field::Email, "email"),
    (Field::Name, "name"),
];

/// Total assignment of every canonical field to one raw column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<Field, String>,
}

impl FieldMapping {
    /// Heuristic initial guess, run once when a file is decoded. For each
    /// field, the first column whose lower-cased name contains the field's
    /// normalized key, its display label, or a special pairing token wins;
    /// otherwise the first column is assigned.
    pub fn guess(columns: &[String]) -> Result<Self> {
        ensure!(
            !columns.is_empty(),
            "Cannot build a field mapping without columns"
        );
        let mut entries = BTreeMap::new();
        for field in FIELDS {
            let column = columns
                .iter()
                .find(|column| column_matches_field(column, field))
                .unwrap_or(&columns[0]);
            debug!("Guessed column {column:?} for field '{field}'");
            entries.insert(field, column.clone());
        }
        Ok(Self { entries })
    }

    pub fn column_for(&self, field: Field) -> &str {
        // Construction keeps the map total over FIELDS.
        self.entries
            .get(&field)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Replaces the column assigned to one field. Callers re-project the
    /// original rows afterwards; the mapping itself carries no row state.
    pub fn assign(&mut self, field: Field, column: impl Into<String>) {
        self.entries.insert(field, column.into());
    }

    pub fn entries(&self) -> impl Iterator<Item = (Field, &str)> {
        self.entries
            .iter()
            .map(|(field, column)| (*field, column.as_str()))
    }
}

fn column_matches_field(column: &str, field: Field) -> bool {
    // Columns get the same underscore-to-space normalization as field keys so
    // `Year_Of_Study` and `Year Of Study` both match.
    let lowered = column.to_lowercase().replace('_', " ");
    if lowered.contains(&field.normalized()) || lowered.contains(&field.label().to_lowercase()) {
        return true;
    }
    SPECIAL_PAIRINGS
        .iter()
        .any(|(paired, token)| *paired == field && lowered.contains(token))
}

/// Projects every raw row into canonical shape under `mapping`, preserving
/// input order and row ids. Cells absent from a row become empty strings.
pub fn apply(mapping: &FieldMapping, rows: &[RosterFileRow]) -> Vec<CanonicalRow> {
    rows.iter()
        .map(|raw| {
            let mut row = CanonicalRow::new(raw.id);
            for field in FIELDS {
                let value = raw
                    .cell(mapping.column_for(field))
                    .map(str::trim)
                    .unwrap_or_default();
                row.set(field, value);
            }
            row
        })
        .collect()
}
