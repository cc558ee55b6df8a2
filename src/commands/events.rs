//! `events` subcommand

use chrono::{NaiveDate, Utc};
use crossterm::style::Color;

use crate::api::models::Event;
use crate::api::ApiClient;
use crate::cli::{EventSort, EventsArgs};
use crate::commands::print_table;
use crate::constants::level;
use crate::error::AppError;
use crate::report::{sort_rows, SortValue, Table};
use crate::timing::{date_only, parse_date};

pub async fn run(client: &ApiClient, args: &EventsArgs, tsv: bool) -> Result<(), AppError> {
    let mut events = fetch_scope(client, args).await?;

    if let Some(term) = &args.search {
        let needle = term.to_lowercase();
        events.retain(|e| matches_search(e, &needle));
    }
    if args.completed {
        let today = Utc::now().date_naive();
        events.retain(|e| parse_date(&e.end_date).is_some_and(|end| end < today));
    }

    match args.sort {
        EventSort::Startdate => sort_rows(&mut events, |e| SortValue::text(e.start_key())),
        EventSort::Event => sort_rows(&mut events, |e| SortValue::text(&e.description)),
        EventSort::Country => sort_rows(&mut events, |e| SortValue::text(&e.nat)),
    }

    if events.is_empty() {
        return Err(AppError::no_results("no events matched"));
    }

    print_table(&build_table(&events, Utc::now().date_naive()), tsv);
    Ok(())
}

/// Dims events already over, highlights the one running today.
fn event_color(event: &Event, today: NaiveDate) -> Option<Color> {
    let start = parse_date(event.start_key())?;
    let end = parse_date(&event.end_date).unwrap_or(start);
    if end < today {
        Some(Color::DarkGrey)
    } else if start <= today {
        Some(Color::Green)
    } else {
        None
    }
}

async fn fetch_scope(client: &ApiClient, args: &EventsArgs) -> Result<Vec<Event>, AppError> {
    match args.season.as_deref() {
        Some("all") => {
            let seasons = client.fetch_seasons().await?;
            let mut events = Vec::new();
            for season in &seasons {
                if let Some(id) = season.season_id.as_deref() {
                    events.extend(client.fetch_events(id, args.level).await?);
                }
            }
            Ok(events)
        }
        Some(id) => client.fetch_events(id, args.level).await,
        None => {
            let season_id = client.current_season_id().await?;
            client.fetch_events(&season_id, args.level).await
        }
    }
}

fn matches_search(event: &Event, needle: &str) -> bool {
    [
        &event.description,
        &event.short_description,
        &event.organizer,
        &event.nat,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

fn build_table(events: &[Event], today: NaiveDate) -> Table {
    let mut table = Table::new(vec![
        "EventId".into(),
        "Start".into(),
        "End".into(),
        "Location".into(),
        "Nat".into(),
        "Level".into(),
    ]);
    for event in events {
        table.push_colored_row(
            vec![
                event.event_id.clone().unwrap_or_default(),
                date_only(event.start_key()).to_string(),
                date_only(&event.end_date).to_string(),
                event.location().to_string(),
                event.nat.clone(),
                level::label(event.level),
            ],
            event_color(event, today),
        );
    }
    table
}
