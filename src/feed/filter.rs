use time::Date;

use super::derive::WeekBucket;
use super::UpdateRecord;

/// Week axis of the criteria: everything, or one derived bucket keyed by its
/// Sunday start. A `Week` key must reference a bucket actually derived from
/// the current collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekFilter {
    #[default]
    All,
    Week(Date),
}

/// Live filter criteria. The default value matches every record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub search_text: String,
    pub category: Option<String>,
    pub week: WeekFilter,
}

impl FilterCriteria {
    pub fn is_default(&self) -> bool {
        self.search_text.is_empty() && self.category.is_none() && self.week == WeekFilter::All
    }

    /// Number of non-default axes; display only.
    pub fn active_count(&self) -> usize {
        usize::from(!self.search_text.is_empty())
            + usize::from(self.category.is_some())
            + usize::from(self.week != WeekFilter::All)
    }

    /// Conjunctive match across the search, category, and week axes.
    pub fn matches(&self, record: &UpdateRecord) -> bool {
        self.matches_search(record) && self.matches_category(record) && self.matches_week(record)
    }

    fn matches_search(&self, record: &UpdateRecord) -> bool {
        if self.search_text.is_empty() {
            return true;
        }
        let needle = self.search_text.to_lowercase();
        record.title.to_lowercase().contains(&needle)
            || record.description.to_lowercase().contains(&needle)
    }

    fn matches_category(&self, record: &UpdateRecord) -> bool {
        match &self.category {
            Some(category) => record.categories.iter().any(|c| c == category),
            None => true,
        }
    }

    fn matches_week(&self, record: &UpdateRecord) -> bool {
        match self.week {
            WeekFilter::All => true,
            WeekFilter::Week(start) => WeekBucket::from_start(start).contains(record.date),
        }
    }
}

/// Order-preserving conjunctive filter. Pure, so it is safe to re-run on
/// every keystroke or filter change.
pub fn filter<'a>(records: &'a [UpdateRecord], criteria: &FilterCriteria) -> Vec<&'a UpdateRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::super::Status;
    use super::*;

    fn fixture() -> Vec<UpdateRecord> {
        vec![
            UpdateRecord {
                id: "1".to_string(),
                title: "Azure Kubernetes Service update".to_string(),
                description: "Cluster autoscaling improvements".to_string(),
                categories: vec!["Containers".to_string()],
                status: Status::Ga,
                date: date!(2024 - 03 - 05),
                link: None,
            },
            UpdateRecord {
                id: "2".to_string(),
                title: "Cosmos DB preview".to_string(),
                description: "New consistency levels".to_string(),
                categories: vec!["Databases".to_string()],
                status: Status::Preview,
                date: date!(2024 - 03 - 12),
                link: Some("https://example.net/cosmos".to_string()),
            },
        ]
    }

    #[test]
    fn default_criteria_are_the_identity() {
        let records = fixture();
        let out = filter(&records, &FilterCriteria::default());
        let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let records = fixture();
        let upper = FilterCriteria {
            search_text: "COSMOS".to_string(),
            ..FilterCriteria::default()
        };
        let lower = FilterCriteria {
            search_text: "cosmos".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(filter(&records, &upper), filter(&records, &lower));
        assert_eq!(filter(&records, &lower)[0].id, "2");

        let by_description = FilterCriteria {
            search_text: "autoscaling".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(filter(&records, &by_description)[0].id, "1");
    }

    #[test]
    fn category_axis_is_single_select() {
        let records = fixture();
        let criteria = FilterCriteria {
            category: Some("Databases".to_string()),
            ..FilterCriteria::default()
        };
        let out = filter(&records, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "2");
    }

    #[test]
    fn week_axis_uses_the_inclusive_bucket_range() {
        let records = fixture();
        // Week of Sunday 2024-03-03 covers the 5th but not the 12th.
        let criteria = FilterCriteria {
            week: WeekFilter::Week(date!(2024 - 03 - 03)),
            ..FilterCriteria::default()
        };
        let out = filter(&records, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "1");
    }

    #[test]
    fn axes_combine_conjunctively() {
        let records = fixture();
        let criteria = FilterCriteria {
            search_text: "preview".to_string(),
            category: Some("Databases".to_string()),
            week: WeekFilter::Week(date!(2024 - 03 - 10)),
        };
        assert_eq!(filter(&records, &criteria).len(), 1);

        // Same search and week, wrong category: no match.
        let mismatched = FilterCriteria {
            category: Some("Containers".to_string()),
            ..criteria
        };
        assert!(filter(&records, &mismatched).is_empty());
    }

    #[test]
    fn active_count_tracks_non_default_axes() {
        let mut criteria = FilterCriteria::default();
        assert!(criteria.is_default());
        assert_eq!(criteria.active_count(), 0);

        criteria.search_text = "x".to_string();
        criteria.category = Some("Compute".to_string());
        assert_eq!(criteria.active_count(), 2);

        criteria.week = WeekFilter::Week(date!(2024 - 03 - 03));
        assert_eq!(criteria.active_count(), 3);
        assert!(!criteria.is_default());
    }
}
