//! Library-level properties of the ingestion pipeline: idempotent remapping,
//! validator totality, and the first-seen duplicate invariant.

use std::collections::BTreeMap;

use proptest::prelude::*;
use roster_ingest::data::RosterFileRow;
use roster_ingest::fields::Field;
use roster_ingest::mapping::{self, FieldMapping};
use roster_ingest::validate::validate_rows;

const COLUMNS: [&str; 4] = ["Student_ID", "Name", "Phone_Number", "City"];

fn columns() -> Vec<String> {
    COLUMNS.iter().map(|c| c.to_string()).collect()
}

fn raw_row(cells: &[String]) -> RosterFileRow {
    let mapped: BTreeMap<String, String> = COLUMNS
        .iter()
        .zip(cells)
        .map(|(column, cell)| (column.to_string(), cell.clone()))
        .collect();
    RosterFileRow::new(mapped)
}

fn cell_strategy() -> impl Strategy<Value = String> {
    "[ -~]{0,12}"
}

fn rows_strategy() -> impl Strategy<Value = Vec<RosterFileRow>> {
    proptest::collection::vec(
        proptest::collection::vec(cell_strategy(), COLUMNS.len()),
        0..20,
    )
    .prop_map(|rows| rows.iter().map(|cells| raw_row(cells)).collect())
}

proptest! {
    #[test]
    fn remapping_the_same_rows_is_idempotent(rows in rows_strategy()) {
        let mapping = FieldMapping::guess(&columns()).unwrap();
        let first = mapping::apply(&mapping, &rows);
        let second = mapping::apply(&mapping, &rows);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn validator_returns_one_result_per_row_in_order(rows in rows_strategy()) {
        let mapping = FieldMapping::guess(&columns()).unwrap();
        let canonical = mapping::apply(&mapping, &rows);
        let results = validate_rows(&canonical);
        prop_assert_eq!(results.len(), canonical.len());
        for (row, result) in canonical.iter().zip(&results) {
            prop_assert_eq!(row.id, result.row.id);
        }
    }

    #[test]
    fn duplicates_always_point_at_the_first_holder(
        ids in proptest::collection::vec("STU00[0-3]", 1..20)
    ) {
        let rows: Vec<RosterFileRow> = ids
            .iter()
            .map(|id| raw_row(&[
                id.clone(),
                "Alice Ray".to_string(),
                "9876543210".to_string(),
                "Pune".to_string(),
            ]))
            .collect();
        let mapping = FieldMapping::guess(&columns()).unwrap();
        let results = validate_rows(&mapping::apply(&mapping, &rows));

        for (index, result) in results.iter().enumerate() {
            let student_id = result.row.get(Field::StudentId);
            let first_index = results
                .iter()
                .position(|r| r.row.get(Field::StudentId) == student_id)
                .unwrap();
            if first_index == index {
                // First occurrence is never marked as a duplicate.
                prop_assert_eq!(result.duplicate_of, None);
            } else {
                prop_assert_eq!(result.duplicate_of, Some(results[first_index].row.id));
            }
        }
    }
}
