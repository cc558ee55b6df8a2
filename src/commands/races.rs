//! `races` subcommand

use crate::api::models::Race;
use crate::api::ApiClient;
use crate::cli::RacesArgs;
use crate::commands::{print_table, resolve_season};
use crate::error::AppError;
use crate::report::{sort_rows, SortValue, Table};
use crate::timing::format_start_datetime;

pub async fn run(client: &ApiClient, args: &RacesArgs, tsv: bool) -> Result<(), AppError> {
    let mut races = match &args.event {
        Some(event_id) => client.fetch_races(event_id).await?,
        None => {
            let season_id = resolve_season(client, args.season.as_deref()).await?;
            let events = client.fetch_events(&season_id, args.level).await?;
            let mut all = Vec::new();
            for event in &events {
                if let Some(id) = event.event_id.as_deref() {
                    all.extend(client.fetch_races(id).await?);
                }
            }
            all
        }
    };

    if let Some(discipline) = args.discipline {
        races.retain(|r| r.discipline_id.eq_ignore_ascii_case(discipline.code()));
    }
    sort_rows(&mut races, |r| SortValue::text(r.start_key()));

    if races.is_empty() {
        return Err(AppError::no_results("no races matched"));
    }

    print_table(&build_table(&races), tsv);
    Ok(())
}

fn discipline_label(code: &str) -> &str {
    match code {
        "SP" => "Sprint",
        "PU" => "Pursuit",
        "IN" => "Individual",
        "MS" => "Mass Start",
        "RL" => "Relay",
        "SR" => "Single Mixed Relay",
        other => other,
    }
}

fn build_table(races: &[Race]) -> Table {
    let mut table = Table::new(vec![
        "RaceId".into(),
        "Start".into(),
        "Race".into(),
        "Discipline".into(),
        "Cat".into(),
    ]);
    for race in races {
        table.push_row(vec![
            race.race_id.clone().unwrap_or_default(),
            format_start_datetime(race.start_key()),
            race.label().to_string(),
            discipline_label(&race.discipline_id).to_string(),
            race.cat_id.clone(),
        ]);
    }
    table
}
