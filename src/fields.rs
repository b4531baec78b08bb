//! The canonical roster field set.
//!
//! Every uploaded roster, whatever its column headings, is projected onto these
//! eleven fields. The set is fixed: the mapper, validator, and commit stage all
//! iterate [`FIELDS`] rather than discovering fields at runtime.

use std::{fmt, str::FromStr};

use heck::ToTitleCase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    StudentId,
    Name,
    Gender,
    Department,
    YearOfStudy,
    Cgpa,
    Email,
    PhoneNumber,
    ParentNumber,
    City,
    AttendancePercentage,
}

pub const FIELDS: [Field; 11] = [
    Field::StudentId,
    Field::Name,
    Field::Gender,
    Field::Department,
    Field::YearOfStudy,
    Field::Cgpa,
    Field::Email,
    Field::PhoneNumber,
    Field::ParentNumber,
    Field::City,
    Field::AttendancePercentage,
];

impl Field {
    /// Stable snake_case key, used in JSON output and `--map` overrides.
    pub fn key(self) -> &'static str {
        match self {
            Field::StudentId => "student_id",
            Field::Name => "name",
            Field::Gender => "gender",
            Field::Department => "department",
            Field::YearOfStudy => "year_of_study",
            Field::Cgpa => "cgpa",
            Field::Email => "email",
            Field::PhoneNumber => "phone_number",
            Field::ParentNumber => "parent_number",
            Field::City => "city",
            Field::AttendancePercentage => "attendance_percentage",
        }
    }

    /// Human-readable label, also the header used by the sample template file.
    pub fn label(self) -> String {
        match self {
            Field::StudentId => "Student ID".to_string(),
            Field::Cgpa => "CGPA".to_string(),
            other => other.key().to_title_case(),
        }
    }

    /// Key with underscores replaced by spaces, for violation messages and
    /// header matching.
    pub fn normalized(self) -> String {
        self.key().replace('_', " ")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let token = value.trim().to_ascii_lowercase();
        FIELDS
            .into_iter()
            .find(|field| field.key() == token)
            .ok_or_else(|| {
                let known = FIELDS
                    .into_iter()
                    .map(Field::key)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Unknown roster field '{value}' (expected one of: {known})")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_set_has_eleven_entries_with_distinct_keys() {
        let mut keys = FIELDS.map(Field::key).to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 11);
    }

    #[test]
    fn labels_title_case_with_acronym_overrides() {
        assert_eq!(Field::StudentId.label(), "Student ID");
        assert_eq!(Field::Cgpa.label(), "CGPA");
        assert_eq!(Field::YearOfStudy.label(), "Year Of Study");
        assert_eq!(Field::AttendancePercentage.label(), "Attendance Percentage");
    }

    #[test]
    fn from_str_accepts_keys_and_rejects_unknowns() {
        assert_eq!("phone_number".parse::<Field>().unwrap(), Field::PhoneNumber);
        assert_eq!(" Student_ID ".parse::<Field>().unwrap(), Field::StudentId);
        assert!("roll_number".parse::<Field>().is_err());
    }
}
