use anyhow::{bail, Context, Result};
use clap::Args;
use time::{format_description, Date};

use crate::app::App;
use crate::feed::{
    derive_categories, derive_week_buckets, filter, week_start, FilterCriteria, RecordStore,
    WeekFilter,
};

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Free-text search over titles and descriptions
    #[arg()]
    pub query: Vec<String>,
    /// Only show updates carrying this category tag
    #[arg(long)]
    pub category: Option<String>,
    /// Only show updates from the week containing this date (YYYY-MM-DD),
    /// or "all"
    #[arg(long)]
    pub week: Option<String>,
    /// Limit the number of results printed
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn list_updates(store: &RecordStore, args: ListArgs) -> Result<()> {
    let criteria = FilterCriteria {
        search_text: args.query.join(" "),
        category: args.category,
        week: parse_week_arg(store, args.week.as_deref())?,
    };

    let matches = filter(store.records(), &criteria);
    if matches.is_empty() {
        if store.is_empty() {
            println!("No updates loaded.");
        } else {
            println!("No updates match the given filters.");
        }
        return Ok(());
    }

    for record in matches.iter().take(args.limit) {
        println!(
            "{}  {:<10}  {}  [{}]",
            record.date,
            record.status.to_string(),
            record.title,
            record.categories.join(", ")
        );
    }
    if matches.len() > args.limit {
        println!("… and {} more", matches.len() - args.limit);
    }
    Ok(())
}

pub fn list_categories(store: &RecordStore) -> Result<()> {
    for category in derive_categories(store.records()) {
        println!("{category}");
    }
    Ok(())
}

pub fn list_weeks(store: &RecordStore) -> Result<()> {
    for bucket in derive_week_buckets(store.records()) {
        println!("{}  {}", bucket.start, bucket.label);
    }
    Ok(())
}

/// Maps a `--week` argument onto a derived bucket key. Any date inside the
/// week is accepted; it snaps to the containing Sunday.
fn parse_week_arg(store: &RecordStore, week: Option<&str>) -> Result<WeekFilter> {
    let Some(raw) = week else {
        return Ok(WeekFilter::All);
    };
    if raw.eq_ignore_ascii_case("all") {
        return Ok(WeekFilter::All);
    }

    let format = format_description::parse("[year]-[month]-[day]")
        .context("building week date format")?;
    let date = Date::parse(raw, &format)
        .with_context(|| format!("parsing week date '{raw}' (expected YYYY-MM-DD)"))?;
    let start = week_start(date);

    let buckets = derive_week_buckets(store.records());
    if !buckets.iter().any(|bucket| bucket.start == start) {
        bail!(
            "no updates in the week starting {start}; run `pulsetui weeks` to see derived weeks"
        );
    }
    Ok(WeekFilter::Week(start))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::feed::{Status, UpdateRecord};

    use super::*;

    fn store() -> RecordStore {
        RecordStore::new(vec![UpdateRecord {
            id: "1".to_string(),
            title: "Cosmos DB preview".to_string(),
            description: String::new(),
            categories: vec!["Databases".to_string()],
            status: Status::Preview,
            date: date!(2024 - 03 - 12),
            link: None,
        }])
    }

    #[test]
    fn week_arg_defaults_to_all() {
        let store = store();
        assert_eq!(parse_week_arg(&store, None).expect("none"), WeekFilter::All);
        assert_eq!(
            parse_week_arg(&store, Some("all")).expect("sentinel"),
            WeekFilter::All
        );
    }

    #[test]
    fn week_arg_snaps_to_the_containing_sunday() {
        let store = store();
        let parsed = parse_week_arg(&store, Some("2024-03-12")).expect("valid week");
        assert_eq!(parsed, WeekFilter::Week(date!(2024 - 03 - 10)));
    }

    #[test]
    fn week_arg_must_reference_a_derived_bucket() {
        let store = store();
        let err = parse_week_arg(&store, Some("2020-01-01")).expect_err("stale week");
        assert!(err.to_string().contains("no updates in the week"));
    }

    #[test]
    fn malformed_week_dates_are_rejected() {
        let store = store();
        assert!(parse_week_arg(&store, Some("last-tuesday")).is_err());
    }
}
