use indexmap::IndexMap;
use time::Date;

use super::UpdateRecord;

/// One calendar-month partition of the timeline, labelled "March 2024".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGroup<'a> {
    pub label: String,
    pub records: Vec<&'a UpdateRecord>,
}

/// Partitions already-filtered records by calendar month and year.
///
/// Record order within a group follows the input, and groups appear in
/// first-seen order rather than being re-sorted. The store hands us
/// date-ordered records, so first-seen is chronological in practice.
pub fn group_by_month<'a>(records: &[&'a UpdateRecord]) -> Vec<MonthGroup<'a>> {
    let mut groups: IndexMap<(i32, u8), MonthGroup<'a>> = IndexMap::new();
    for &record in records {
        let key = (record.date.year(), u8::from(record.date.month()));
        groups
            .entry(key)
            .or_insert_with(|| MonthGroup {
                label: month_label(record.date),
                records: Vec::new(),
            })
            .records
            .push(record);
    }
    groups.into_values().collect()
}

fn month_label(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}
