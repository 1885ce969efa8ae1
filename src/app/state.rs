use crate::feed::{
    derive_categories, derive_week_buckets, group_by_month, FilterCriteria, MonthGroup,
    RecordStore, UpdateRecord, WeekBucket, WeekFilter,
};
use crate::prefs::ViewMode;

/// Why nothing is visible, so the UI can render the right empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The store itself has no records.
    NoData,
    /// Records exist but the active criteria exclude all of them; the UI
    /// offers clear-filters for this case.
    FiltersTooNarrow,
}

/// Flat dashboard state: the record store, the live filter criteria, the
/// active view, and list selection for the terminal front end.
///
/// The category list, week buckets, and visible subset are derived views of
/// the store. They are recomputed whenever the store or criteria change and
/// never mutated on their own.
#[derive(Debug, Clone)]
pub struct DashboardState {
    store: RecordStore,
    categories: Vec<String>,
    weeks: Vec<WeekBucket>,
    visible: Vec<usize>,
    pub view: ViewMode,
    pub criteria: FilterCriteria,
    pub filters_open: bool,
    pub search_active: bool,
    pub selected: usize,
    pub status_message: Option<String>,
}

impl DashboardState {
    pub fn new(store: RecordStore, view: ViewMode) -> Self {
        let categories = derive_categories(store.records());
        let weeks = derive_week_buckets(store.records());
        let visible = (0..store.len()).collect();
        Self {
            store,
            categories,
            weeks,
            visible,
            view,
            criteria: FilterCriteria::default(),
            filters_open: false,
            search_active: false,
            selected: 0,
            status_message: None,
        }
    }

    /// Swaps in a fresh record collection and rederives everything.
    ///
    /// A week key that no longer maps to a derived bucket is dropped, since
    /// criteria may only reference buckets of the current collection.
    pub fn replace_store(&mut self, store: RecordStore) {
        self.store = store;
        self.categories = derive_categories(self.store.records());
        self.weeks = derive_week_buckets(self.store.records());
        if let WeekFilter::Week(start) = self.criteria.week {
            if !self.weeks.iter().any(|bucket| bucket.start == start) {
                self.criteria.week = WeekFilter::All;
            }
        }
        if let Some(category) = &self.criteria.category {
            if !self.categories.contains(category) {
                self.criteria.category = None;
            }
        }
        self.refilter();
        self.selected = 0;
        self.normalize_selection();
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn week_buckets(&self) -> &[WeekBucket] {
        &self.weeks
    }

    pub fn visible_records(&self) -> Vec<&UpdateRecord> {
        self.visible
            .iter()
            .filter_map(|&index| self.store.get(index))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn selected_record(&self) -> Option<&UpdateRecord> {
        self.visible
            .get(self.selected)
            .and_then(|&index| self.store.get(index))
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if !self.visible.is_empty() {
            None
        } else if self.store.is_empty() {
            Some(EmptyReason::NoData)
        } else {
            Some(EmptyReason::FiltersTooNarrow)
        }
    }

    /// Month partitions of the visible records, timeline mode only.
    pub fn month_groups(&self) -> Vec<MonthGroup<'_>> {
        group_by_month(&self.visible_records())
    }

    pub fn toggle_view(&mut self) -> ViewMode {
        self.view = self.view.toggled();
        self.view
    }

    pub fn toggle_filters_panel(&mut self) {
        self.filters_open = !self.filters_open;
    }

    pub fn active_filter_count(&self) -> usize {
        self.criteria.active_count()
    }

    /// Resets all three filter axes to their defaults in one transition.
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.refilter();
    }

    pub fn begin_search(&mut self) {
        self.search_active = true;
    }

    pub fn finish_search(&mut self) {
        self.search_active = false;
    }

    pub fn cancel_search(&mut self) {
        self.search_active = false;
        if !self.criteria.search_text.is_empty() {
            self.criteria.search_text.clear();
            self.refilter();
        }
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.criteria.search_text.push(ch);
        self.refilter();
    }

    pub fn pop_search_char(&mut self) {
        if self.criteria.search_text.pop().is_some() {
            self.refilter();
        }
    }

    /// Steps the category axis through none -> each tag -> none again.
    pub fn cycle_category(&mut self, step: isize) {
        if self.categories.is_empty() {
            return;
        }
        let slots = self.categories.len() as isize + 1;
        let current = match &self.criteria.category {
            None => 0,
            Some(category) => self
                .categories
                .iter()
                .position(|c| c == category)
                .map(|i| i as isize + 1)
                .unwrap_or(0),
        };
        let next = (current + step).rem_euclid(slots);
        self.criteria.category = if next == 0 {
            None
        } else {
            Some(self.categories[(next - 1) as usize].clone())
        };
        self.refilter();
    }

    /// Steps the week axis through all -> each bucket -> all again.
    pub fn cycle_week(&mut self, step: isize) {
        if self.weeks.is_empty() {
            return;
        }
        let slots = self.weeks.len() as isize + 1;
        let current = match self.criteria.week {
            WeekFilter::All => 0,
            WeekFilter::Week(start) => self
                .weeks
                .iter()
                .position(|bucket| bucket.start == start)
                .map(|i| i as isize + 1)
                .unwrap_or(0),
        };
        let next = (current + step).rem_euclid(slots);
        self.criteria.week = if next == 0 {
            WeekFilter::All
        } else {
            WeekFilter::Week(self.weeks[(next - 1) as usize].start)
        };
        self.refilter();
    }

    /// Label of the bucket the week axis currently points at.
    pub fn week_filter_label(&self) -> Option<&str> {
        match self.criteria.week {
            WeekFilter::All => None,
            WeekFilter::Week(start) => self
                .weeks
                .iter()
                .find(|bucket| bucket.start == start)
                .map(|bucket| bucket.label.as_str()),
        }
    }

    /// Short summaries of each active axis, for the header.
    pub fn filter_chips(&self) -> Vec<String> {
        let mut chips = Vec::new();
        if !self.criteria.search_text.is_empty() {
            chips.push(format!("search:{}", self.criteria.search_text));
        }
        if let Some(category) = &self.criteria.category {
            chips.push(format!("category:{category}"));
        }
        if let Some(label) = self.week_filter_label() {
            chips.push(format!("week:{label}"));
        }
        chips
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let next = (self.selected as isize + delta).clamp(0, len - 1);
        self.selected = next as usize;
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    fn refilter(&mut self) {
        self.visible = self
            .store
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| self.criteria.matches(record))
            .map(|(index, _)| index)
            .collect();
        self.normalize_selection();
    }

    fn normalize_selection(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use time::macros::date;
    use time::Date;

    use crate::feed::Status;

    use super::*;

    fn record(id: &str, title: &str, category: &str, day: Date) -> UpdateRecord {
        UpdateRecord {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            categories: vec![category.to_string()],
            status: Status::Ga,
            date: day,
            link: None,
        }
    }

    fn fixture_state() -> DashboardState {
        let store = RecordStore::new(vec![
            record("1", "Kubernetes update", "Containers", date!(2024 - 03 - 05)),
            record("2", "Cosmos DB preview", "Databases", date!(2024 - 03 - 12)),
            record("3", "Functions runtime", "Compute", date!(2024 - 04 - 02)),
        ]);
        DashboardState::new(store, ViewMode::Grid)
    }

    #[test]
    fn starts_with_everything_visible() {
        let state = fixture_state();
        assert_eq!(state.visible_len(), 3);
        assert_eq!(state.empty_reason(), None);
        assert_eq!(state.active_filter_count(), 0);
    }

    #[test]
    fn search_keystrokes_refilter_immediately() {
        let mut state = fixture_state();
        state.begin_search();
        for ch in "cosmos".chars() {
            state.push_search_char(ch);
        }
        assert_eq!(state.visible_len(), 1);
        assert_eq!(state.selected_record().map(|r| r.id.as_str()), Some("2"));

        state.pop_search_char();
        assert_eq!(state.criteria.search_text, "cosmo");
        state.cancel_search();
        assert_eq!(state.visible_len(), 3);
    }

    #[test]
    fn clear_filters_is_one_atomic_transition() {
        let mut state = fixture_state();
        state.criteria.search_text = "x".to_string();
        state.cycle_category(1);
        state.cycle_week(1);
        assert!(state.active_filter_count() >= 2);

        state.clear_filters();
        assert!(state.criteria.is_default());
        assert_eq!(state.active_filter_count(), 0);
        assert_eq!(state.visible_len(), 3);
    }

    #[test]
    fn category_cycle_wraps_back_to_none() {
        let mut state = fixture_state();
        // Sorted tags: Compute, Containers, Databases.
        state.cycle_category(1);
        assert_eq!(state.criteria.category.as_deref(), Some("Compute"));
        state.cycle_category(1);
        assert_eq!(state.criteria.category.as_deref(), Some("Containers"));
        state.cycle_category(2);
        assert_eq!(state.criteria.category, None);
        state.cycle_category(-1);
        assert_eq!(state.criteria.category.as_deref(), Some("Databases"));
    }

    #[test]
    fn week_cycle_walks_derived_buckets_newest_first() {
        let mut state = fixture_state();
        state.cycle_week(1);
        assert_eq!(state.criteria.week, WeekFilter::Week(date!(2024 - 03 - 31)));
        state.cycle_week(1);
        assert_eq!(state.criteria.week, WeekFilter::Week(date!(2024 - 03 - 10)));
        assert!(state.week_filter_label().is_some());
        state.cycle_week(2);
        assert_eq!(state.criteria.week, WeekFilter::All);
    }

    #[test]
    fn empty_reasons_distinguish_no_data_from_narrow_filters() {
        let empty = DashboardState::new(RecordStore::default(), ViewMode::Grid);
        assert_matches!(empty.empty_reason(), Some(EmptyReason::NoData));

        let mut state = fixture_state();
        state.criteria.search_text = "no such thing".to_string();
        state.push_search_char('!');
        assert_matches!(state.empty_reason(), Some(EmptyReason::FiltersTooNarrow));
    }

    #[test]
    fn replacing_the_store_drops_stale_filter_keys() {
        let mut state = fixture_state();
        state.cycle_week(1);
        state.cycle_category(1);
        assert!(state.criteria.category.is_some());

        state.replace_store(RecordStore::new(vec![record(
            "9",
            "Networking update",
            "Networking",
            date!(2024 - 06 - 03),
        )]));
        assert_eq!(state.criteria.week, WeekFilter::All);
        assert_eq!(state.criteria.category, None);
        assert_eq!(state.visible_len(), 1);
    }

    #[test]
    fn timeline_groups_follow_store_order() {
        let mut state = fixture_state();
        state.view = ViewMode::Timeline;
        let groups = state.month_groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "March 2024");
        assert_eq!(groups[1].label, "April 2024");
        let total: usize = groups.iter().map(|g| g.records.len()).sum();
        assert_eq!(total, state.visible_len());
    }

    #[test]
    fn filter_chips_cover_all_active_axes() {
        let mut state = fixture_state();
        assert!(state.filter_chips().is_empty());
        for ch in "db".chars() {
            state.push_search_char(ch);
        }
        state.cycle_category(3); // Databases
        state.cycle_week(2); // week of Mar 10
        let chips = state.filter_chips();
        assert_eq!(chips.len(), 3);
        assert_eq!(chips[0], "search:db");
        assert_eq!(chips[1], "category:Databases");
        assert!(chips[2].starts_with("week:"), "got {}", chips[2]);
    }
}
