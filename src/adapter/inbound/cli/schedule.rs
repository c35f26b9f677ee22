//! Season calendar listing.

use chrono::{DateTime, Utc};
use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::ConfigArg;
use crate::adapter::inbound::cli::{load_config, output};
use crate::domain::ScheduleCatalog;
use crate::error::Result;

#[derive(Tabled)]
struct RoundRow {
    #[tabled(rename = "Round")]
    round: u32,
    #[tabled(rename = "Event")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Start (UTC)")]
    start: String,
    #[tabled(rename = "")]
    marker: &'static str,
}

/// Marker for the row `lookup_next(now)` would pick.
const NEXT_MARKER: &str = "next";

fn rows(catalog: &ScheduleCatalog, now: DateTime<Utc>) -> Vec<RoundRow> {
    let next = catalog.lookup_next(now).id();
    catalog
        .all()
        .iter()
        .map(|event| RoundRow {
            round: event.id().get(),
            name: event.name().to_string(),
            location: event.location().to_string(),
            start: event.starts_at().format("%Y-%m-%d %H:%M").to_string(),
            marker: if event.id() == next { NEXT_MARKER } else { "" },
        })
        .collect()
}

/// Print the configured calendar.
pub fn execute(args: &ConfigArg) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let catalog = config.catalog()?;
    let now = Utc::now();

    if output::is_json() {
        let next = catalog.lookup_next(now).id();
        output::json_output(json!({
            "command": "schedule",
            "next": next.get(),
            "rounds": catalog.all(),
        }));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Season calendar");
    output::lines(&Table::new(rows(&catalog, now)).to_string());

    let next = catalog.lookup_next(now);
    if next.has_started(now) {
        output::note("Season over; the last round stays selected.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain as fixtures;
    use chrono::Duration;

    #[test]
    fn marks_the_next_round() {
        let now = fixtures::round_nine_start() - Duration::hours(1);
        let rows = rows(&fixtures::catalog(), now);

        assert_eq!(rows.len(), 3);
        let marked: Vec<u32> = rows
            .iter()
            .filter(|row| row.marker == NEXT_MARKER)
            .map(|row| row.round)
            .collect();
        assert_eq!(marked, vec![9]);
        assert_eq!(rows[1].start, "2025-06-15 14:00");
    }

    #[test]
    fn marks_the_last_round_after_the_season() {
        let now = fixtures::round_nine_start() + Duration::days(30);
        let rows = rows(&fixtures::catalog(), now);
        assert_eq!(rows[2].marker, NEXT_MARKER);
    }

    #[test]
    fn table_has_named_columns() {
        let rendered = Table::new(rows(&fixtures::catalog(), fixtures::round_nine_start())).to_string();
        assert!(rendered.contains("Start (UTC)"));
        assert!(rendered.contains("Spanish Grand Prix"));
    }
}
