use std::collections::BTreeSet;

use time::macros::format_description;
use time::{Date, Duration};

use super::UpdateRecord;

/// A Sunday-aligned 7-day window derived from the record dates, keyed by its
/// start date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekBucket {
    pub start: Date,
    pub end: Date,
    pub label: String,
}

impl WeekBucket {
    /// Builds the bucket whose window begins on `start`. Callers pass a
    /// Sunday; see [`week_start`].
    pub fn from_start(start: Date) -> Self {
        let end = start.checked_add(Duration::days(6)).unwrap_or(start);
        Self {
            label: week_label(start, end),
            start,
            end,
        }
    }

    /// The bucket containing `date`.
    pub fn containing(date: Date) -> Self {
        Self::from_start(week_start(date))
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The Sunday on or before the given date.
pub fn week_start(date: Date) -> Date {
    let offset = i64::from(date.weekday().number_days_from_sunday());
    date.checked_sub(Duration::days(offset)).unwrap_or(date)
}

/// Union of every record's category tags, deduplicated and sorted ascending.
pub fn derive_categories(records: &[UpdateRecord]) -> Vec<String> {
    let mut categories = BTreeSet::new();
    for record in records {
        for category in &record.categories {
            categories.insert(category.clone());
        }
    }
    categories.into_iter().collect()
}

/// Distinct week windows covering the record dates, most recent first.
pub fn derive_week_buckets(records: &[UpdateRecord]) -> Vec<WeekBucket> {
    let mut starts = BTreeSet::new();
    for record in records {
        starts.insert(week_start(record.date));
    }
    starts
        .into_iter()
        .rev()
        .map(WeekBucket::from_start)
        .collect()
}

fn week_label(start: Date, end: Date) -> String {
    let month_day = format_description!("[month repr:short] [day padding:none]");
    let lhs = start
        .format(&month_day)
        .unwrap_or_else(|_| start.to_string());
    let rhs = end.format(&month_day).unwrap_or_else(|_| end.to_string());
    if start.year() == end.year() {
        format!("{lhs} - {rhs}, {}", end.year())
    } else {
        format!("{lhs}, {} - {rhs}, {}", start.year(), end.year())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::super::Status;
    use super::*;

    fn record(id: &str, categories: &[&str], day: Date) -> UpdateRecord {
        UpdateRecord {
            id: id.to_string(),
            title: String::new(),
            description: String::new(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            status: Status::Ga,
            date: day,
            link: None,
        }
    }

    #[test]
    fn categories_are_deduplicated_and_sorted() {
        let records = vec![
            record("1", &["Databases", "Compute"], date!(2024 - 03 - 05)),
            record("2", &["Compute", "AI"], date!(2024 - 03 - 06)),
        ];
        assert_eq!(derive_categories(&records), vec!["AI", "Compute", "Databases"]);
    }

    #[test]
    fn categories_of_empty_input_are_empty() {
        assert!(derive_categories(&[]).is_empty());
    }

    #[test]
    fn week_start_snaps_back_to_sunday() {
        // 2024-03-05 is a Tuesday.
        assert_eq!(week_start(date!(2024 - 03 - 05)), date!(2024 - 03 - 03));
        // Sundays are their own start.
        assert_eq!(week_start(date!(2024 - 03 - 03)), date!(2024 - 03 - 03));
        // Saturdays close the window.
        assert_eq!(week_start(date!(2024 - 03 - 09)), date!(2024 - 03 - 03));
    }

    #[test]
    fn buckets_are_deduplicated_and_sorted_descending() {
        let records = vec![
            record("1", &["Compute"], date!(2024 - 03 - 05)),
            record("2", &["Compute"], date!(2024 - 03 - 12)),
            record("3", &["Compute"], date!(2024 - 03 - 07)),
        ];
        let buckets = derive_week_buckets(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].start, date!(2024 - 03 - 10));
        assert_eq!(buckets[1].start, date!(2024 - 03 - 03));
        assert_eq!(buckets[1].end, date!(2024 - 03 - 09));
    }

    #[test]
    fn every_record_date_falls_in_exactly_one_bucket() {
        let records = vec![
            record("1", &["Compute"], date!(2024 - 02 - 29)),
            record("2", &["Compute"], date!(2024 - 03 - 03)),
            record("3", &["Compute"], date!(2024 - 03 - 09)),
            record("4", &["Compute"], date!(2024 - 03 - 31)),
        ];
        let buckets = derive_week_buckets(&records);
        for record in &records {
            let hits = buckets.iter().filter(|b| b.contains(record.date)).count();
            assert_eq!(hits, 1, "date {} hit {hits} buckets", record.date);
        }
    }

    #[test]
    fn label_shows_the_year_once_within_a_year() {
        let bucket = WeekBucket::from_start(date!(2024 - 03 - 03));
        assert_eq!(bucket.label, "Mar 3 - Mar 9, 2024");
    }

    #[test]
    fn label_shows_both_years_across_a_boundary() {
        let bucket = WeekBucket::containing(date!(2025 - 01 - 01));
        assert_eq!(bucket.start, date!(2024 - 12 - 29));
        assert_eq!(bucket.label, "Dec 29, 2024 - Jan 4, 2025");
    }
}
