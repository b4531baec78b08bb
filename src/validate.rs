//! Row validation: per-field rules plus the cross-row duplicate scan.
//!
//! Validation never drops, reorders, or mutates rows and never fails the
//! batch; every input row comes back wrapped in a [`RowValidationResult`]
//! whose violation list is empty exactly when the row is clean. The duplicate
//! scan runs first-seen-wins: the earliest holder of a student id is never
//! marked, later repeats point back at it.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::data::{CanonicalRow, RowId, RowValidationResult};
use crate::fields::{FIELDS, Field};

const PHONE_DIGITS: usize = 10;
const CGPA_RANGE: (f64, f64) = (0.0, 10.0);
const ATTENDANCE_RANGE: (f64, f64) = (0.0, 100.0);

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.\S+$").expect("valid email pattern"))
}

/// Validates every row and runs the duplicate scan. Deterministic: identical
/// input always yields identical violations and duplicate markers.
pub fn validate_rows(rows: &[CanonicalRow]) -> Vec<RowValidationResult> {
    let mut results: Vec<RowValidationResult> = rows
        .iter()
        .map(|row| validate_row(row.clone()))
        .collect();
    mark_duplicates(&mut results);
    let dirty = results.iter().filter(|result| !result.is_clean()).count();
    debug!("Validated {} row(s), {dirty} with violations", results.len());
    results
}

/// Per-row checks only; the duplicate scan needs the whole batch and lives in
/// [`validate_rows`].
pub fn validate_row(row: CanonicalRow) -> RowValidationResult {
    let mut result = RowValidationResult::clean(row);

    for field in FIELDS {
        if result.row.get(field).trim().is_empty() {
            result.push_violation(format!("{} is required", field.normalized()));
        }
    }

    check_phone(&mut result, Field::PhoneNumber);
    check_phone(&mut result, Field::ParentNumber);
    check_email(&mut result);
    check_range(&mut result, Field::Cgpa, CGPA_RANGE);
    check_range(&mut result, Field::AttendancePercentage, ATTENDANCE_RANGE);

    result
}

fn check_phone(result: &mut RowValidationResult, field: Field) {
    let value = result.row.get(field).trim().to_string();
    if value.is_empty() {
        return;
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits != PHONE_DIGITS {
        result.push_violation(format!(
            "{} must contain exactly {PHONE_DIGITS} digits",
            field.normalized()
        ));
    }
}

fn check_email(result: &mut RowValidationResult) {
    let value = result.row.get(Field::Email).trim().to_string();
    if !value.is_empty() && !email_pattern().is_match(&value) {
        result.push_violation("email is not a valid address".to_string());
    }
}

fn check_range(result: &mut RowValidationResult, field: Field, (min, max): (f64, f64)) {
    let value = result.row.get(field).trim().to_string();
    if value.is_empty() {
        return;
    }
    let in_range = value
        .parse::<f64>()
        .is_ok_and(|parsed| parsed >= min && parsed <= max);
    if !in_range {
        result.push_violation(format!(
            "{} must be a number between {min} and {max}",
            field.normalized()
        ));
    }
}

/// First-seen-wins duplicate scan over student ids. Empty ids are skipped
/// here; the required-field check already covers them.
fn mark_duplicates(results: &mut [RowValidationResult]) {
    let mut first_seen: HashMap<String, RowId> = HashMap::new();
    for result in results.iter_mut() {
        let student_id = result.row.get(Field::StudentId).trim().to_string();
        if student_id.is_empty() {
            continue;
        }
        match first_seen.get(&student_id) {
            Some(original) => {
                result.duplicate_of = Some(*original);
                result.push_violation(format!("duplicate student id '{student_id}'"));
            }
            None => {
                first_seen.insert(student_id, result.row.id);
            }
        }
    }
}
