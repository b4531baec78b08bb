//! Commit stage: clean validated rows become [`PersistedStudent`] records and
//! are upserted into a [`StudentStore`] keyed by student identifier.
//!
//! Rows with violations count as failures without being touched. Store errors
//! on individual rows are logged and counted, never retried; the batch is not
//! transactional and later rows still get their chance.

use anyhow::Result;
use log::{info, warn};
use uuid::Uuid;

use crate::data::{PersistedStudent, RowValidationResult};
use crate::fields::Field;
use crate::store::StudentStore;

/// Per-batch commit tally. `success_count + failure_count` always equals the
/// input row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CommitOutcome {
    pub success_count: usize,
    pub failure_count: usize,
}

/// Splits a full name on whitespace runs: first token becomes the first name,
/// the remainder joined with single spaces becomes the last name.
pub fn split_full_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Upserts every clean row into the store. Idempotent: a second commit of the
/// same batch only takes the update branch and changes nothing.
pub fn commit_rows(
    results: &[RowValidationResult],
    store: &mut dyn StudentStore,
) -> Result<CommitOutcome> {
    let mut success_count = 0;
    for result in results {
        if !result.is_clean() {
            continue;
        }
        match upsert_row(result, store) {
            Ok(()) => success_count += 1,
            Err(err) => {
                warn!(
                    "Failed to persist student '{}': {err:#}",
                    result.row.get(Field::StudentId)
                );
            }
        }
    }
    let outcome = CommitOutcome {
        success_count,
        failure_count: results.len() - success_count,
    };
    info!(
        "Committed {} of {} row(s) ({} failed)",
        outcome.success_count,
        results.len(),
        outcome.failure_count
    );
    Ok(outcome)
}

fn upsert_row(result: &RowValidationResult, store: &mut dyn StudentStore) -> Result<()> {
    let row = &result.row;
    let student_id = row.get(Field::StudentId).trim().to_string();
    let (first_name, last_name) = split_full_name(row.get(Field::Name));

    let mut student = PersistedStudent {
        id: Uuid::new_v4(),
        student_id: student_id.clone(),
        first_name,
        last_name,
        // Deliberate repurposing carried over from the portal: department
        // fills the class slot, year of study the section slot.
        class: row.get(Field::Department).trim().to_string(),
        section: row.get(Field::YearOfStudy).trim().to_string(),
        phone_number: row.get(Field::PhoneNumber).trim().to_string(),
        parent_number: row.get(Field::ParentNumber).trim().to_string(),
        biometric_id: student_id.clone(),
    };

    match store.find_by_student_id(&student_id)? {
        Some(existing) => {
            student.id = existing.id;
            store.update(student)
        }
        None => store.insert(student),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CanonicalRow, RowId};
    use crate::store::MemoryStore;
    use crate::validate::validate_rows;

    fn row(student_id: &str, name: &str) -> CanonicalRow {
        let mut row = CanonicalRow::new(RowId::fresh());
        row.set(Field::StudentId, student_id);
        row.set(Field::Name, name);
        row.set(Field::Gender, "F");
        row.set(Field::Department, "CSE");
        row.set(Field::YearOfStudy, "2");
        row.set(Field::Cgpa, "8.4");
        row.set(Field::Email, "x@college.edu");
        row.set(Field::PhoneNumber, "9876543210");
        row.set(Field::ParentNumber, "9123456780");
        row.set(Field::City, "Pune");
        row.set(Field::AttendancePercentage, "92");
        row
    }

    #[test]
    fn name_split_handles_multi_token_and_mononym() {
        assert_eq!(
            split_full_name("Bob Johnson Smith"),
            ("Bob".to_string(), "Johnson Smith".to_string())
        );
        assert_eq!(split_full_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(
            split_full_name("  Ann   Mary  Lee "),
            ("Ann".to_string(), "Mary Lee".to_string())
        );
    }

    #[test]
    fn dirty_rows_count_as_failures_and_stay_unpersisted() {
        let rows = vec![row("STU001", "Alice Ray"), row("", "No Id")];
        let results = validate_rows(&rows);
        let mut store = MemoryStore::new();

        let outcome = commit_rows(&results, &mut store).unwrap();
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn committing_twice_is_idempotent() {
        let rows = vec![row("STU001", "Alice Ray"), row("STU002", "Bob Johnson Smith")];
        let results = validate_rows(&rows);
        let mut store = MemoryStore::new();

        commit_rows(&results, &mut store).unwrap();
        let first_pass = store.all().unwrap();

        let outcome = commit_rows(&results, &mut store).unwrap();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(store.all().unwrap(), first_pass);
    }

    #[test]
    fn upsert_preserves_the_existing_opaque_id() {
        let mut store = MemoryStore::new();
        let results = validate_rows(&[row("STU001", "Alice Ray")]);
        commit_rows(&results, &mut store).unwrap();
        let original = store.find_by_student_id("STU001").unwrap().unwrap();

        let renamed = validate_rows(&[row("STU001", "Alice Day")]);
        commit_rows(&renamed, &mut store).unwrap();
        let updated = store.find_by_student_id("STU001").unwrap().unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.last_name, "Day");
        assert_eq!(updated.biometric_id, "STU001");
    }

    #[test]
    fn duplicate_rows_fail_while_the_first_occurrence_commits() {
        let rows = vec![row("STU001", "Alice Ray"), row("STU001", "Alice Ray")];
        let results = validate_rows(&rows);
        let mut store = MemoryStore::new();

        let outcome = commit_rows(&results, &mut store).unwrap();
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(store.len(), 1);
    }
}
