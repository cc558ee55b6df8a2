//! `cumulate` subcommand: per-athlete totals accumulated over a season's
//! individual races.

use std::collections::HashMap;

use tracing::debug;

use crate::api::has_completed_results;
use crate::api::models::RaceResultsResponse;
use crate::api::ApiClient;
use crate::cli::{CumulateArgs, CumulateKind};
use crate::commands::results::{analytic_map, base_time_seconds, lookup, result_seconds};
use crate::commands::shooting::top_cup_athletes;
use crate::commands::{print_table, resolve_season};
use crate::constants::{analytic, category, discipline, level};
use crate::error::AppError;
use crate::report::{apply_limit, Table};
use crate::shooting::{parse_stage_misses, shooting_totals};
use crate::timing::{format_pct, format_seconds, parse_time_seconds};

/// One athlete's running totals. Which fields are filled depends on the kind.
#[derive(Debug, Clone, Default)]
struct CumulateEntry {
    name: String,
    nat: String,
    races: u32,
    total_secs: f64,
    misses: u32,
    prone_misses: u32,
    standing_misses: u32,
    shots: u32,
    places_gained: i64,
}

/// The analytic slices one race contributes, fetched up front so the
/// accumulation itself stays synchronous.
#[derive(Debug, Default)]
struct RaceSlices {
    ski: HashMap<String, String>,
    course: HashMap<String, String>,
    range: HashMap<String, String>,
    shooting: HashMap<String, String>,
}

pub async fn run(client: &ApiClient, args: &CumulateArgs, tsv: bool) -> Result<(), AppError> {
    let cat = if args.men { category::MEN } else { category::WOMEN };
    // Remontada only makes sense where the start order is a prior result.
    let disc_filter: Option<&str> = match args.kind {
        CumulateKind::Remontada => Some("PU"),
        _ => args.discipline.map(|d| d.code()),
    };

    let (race_ids, scope_label) = collect_scope(client, args).await?;
    if race_ids.is_empty() {
        return Err(AppError::no_results("no races in scope"));
    }

    let mut entries: HashMap<String, CumulateEntry> = HashMap::new();
    let mut races_used = 0u32;
    for race_id in &race_ids {
        let payload = match client.fetch_results(race_id).await {
            Ok(p) => p,
            Err(e) if e.is_not_found() => {
                debug!("skipping race {race_id} without results");
                continue;
            }
            Err(e) => return Err(e),
        };
        if !race_in_scope(&payload, cat, disc_filter) {
            continue;
        }
        let slices = fetch_slices(client, race_id, args.kind).await;
        accumulate_race(&mut entries, &payload, args.kind, &slices);
        races_used += 1;
    }

    let mut rows: Vec<CumulateEntry> = entries.into_values().collect();
    // Time and miss totals only compare between athletes who started every
    // race in scope; penalty and remontada keep partial tallies.
    if !matches!(args.kind, CumulateKind::Penalty | CumulateKind::Remontada) {
        rows.retain(|e| e.races == races_used);
    }
    if rows.is_empty() {
        return Err(AppError::no_results("no athletes completed the races in scope"));
    }

    if let Some(top) = args.top.filter(|n| *n > 0) {
        let keep = top_cup_athletes(client, cat, top).await?;
        if !keep.is_empty() {
            rows.retain(|e| keep.contains(&e.name));
        }
    }

    sort_entries(&mut rows, args.kind);
    apply_limit(&mut rows, args.limit);

    let gender = if args.men { "men" } else { "women" };
    println!(
        "# Cumulative {} - {scope_label} ({gender}, {races_used} races)",
        kind_label(args.kind)
    );
    print_table(&build_table(&rows, args.kind), tsv);
    Ok(())
}

fn kind_label(kind: CumulateKind) -> &'static str {
    match kind {
        CumulateKind::Course => "course time",
        CumulateKind::Ski => "ski time",
        CumulateKind::Range => "range time",
        CumulateKind::Shooting => "shooting time",
        CumulateKind::Penalty => "penalty time",
        CumulateKind::Miss => "misses",
        CumulateKind::Remontada => "places gained",
    }
}

async fn collect_scope(
    client: &ApiClient,
    args: &CumulateArgs,
) -> Result<(Vec<String>, String), AppError> {
    if let Some(event_id) = &args.event {
        let races = client.fetch_races(event_id).await?;
        let ids = races.iter().filter_map(|r| r.race_id.clone()).collect();
        return Ok((ids, event_id.clone()));
    }
    let season_id = resolve_season(client, args.season.as_deref()).await?;
    let events = client.fetch_events(&season_id, level::WORLD_CUP).await?;
    let mut ids = Vec::new();
    for event in &events {
        if let Some(event_id) = event.event_id.as_deref() {
            ids.extend(
                client
                    .fetch_races(event_id)
                    .await?
                    .iter()
                    .filter_map(|r| r.race_id.clone()),
            );
        }
    }
    Ok((ids, format!("season {season_id}")))
}

fn race_in_scope(payload: &RaceResultsResponse, cat: &str, disc_filter: Option<&str>) -> bool {
    let disc = payload.discipline().to_uppercase();
    if !discipline::INDIVIDUAL.contains(&disc.as_str()) {
        return false;
    }
    if disc_filter.is_some_and(|wanted| wanted != disc) {
        return false;
    }
    let race_cat = payload
        .competition
        .as_ref()
        .map(|c| c.cat_id.to_uppercase())
        .unwrap_or_default();
    if !race_cat.is_empty() && race_cat != cat {
        return false;
    }
    has_completed_results(&payload.results)
}

/// Fetches only the analytic slices the kind reads. The ski slice keeps the
/// plain course totals as a fallback for races without a published ski time.
async fn fetch_slices(client: &ApiClient, race_id: &str, kind: CumulateKind) -> RaceSlices {
    let mut slices = RaceSlices::default();
    match kind {
        CumulateKind::Ski => {
            slices.ski = analytic_map(client, race_id, analytic::SKI_TOTAL).await;
            slices.course = analytic_map(client, race_id, analytic::COURSE_TOTAL).await;
        }
        CumulateKind::Range => {
            slices.range = analytic_map(client, race_id, analytic::RANGE_TOTAL).await;
        }
        CumulateKind::Shooting => {
            slices.shooting = analytic_map(client, race_id, analytic::SHOOTING_TOTAL).await;
        }
        CumulateKind::Penalty => {
            slices.ski = analytic_map(client, race_id, analytic::SKI_TOTAL).await;
            slices.course = analytic_map(client, race_id, analytic::COURSE_TOTAL).await;
            slices.range = analytic_map(client, race_id, analytic::RANGE_TOTAL).await;
        }
        CumulateKind::Course | CumulateKind::Miss | CumulateKind::Remontada => {}
    }
    slices
}

fn accumulate_race(
    entries: &mut HashMap<String, CumulateEntry>,
    payload: &RaceResultsResponse,
    kind: CumulateKind,
    slices: &RaceSlices,
) {
    let disc = payload.discipline().to_uppercase();
    let results = payload.individual_results();
    let base_secs = base_time_seconds(results.iter().copied());

    for res in results {
        if res.is_dns() {
            continue;
        }
        let key = res
            .ibu_id
            .clone()
            .unwrap_or_else(|| res.display_name().to_string());
        if key.is_empty() {
            continue;
        }

        let stage_misses = res
            .shootings
            .as_deref()
            .or(res.shooting_total.as_deref())
            .map(parse_stage_misses)
            .unwrap_or_default();
        let (misses, prone, standing) = shooting_totals(&stage_misses);

        let ski_secs = || {
            lookup(&slices.ski, res)
                .or_else(|| lookup(&slices.course, res))
                .or_else(|| res.total_course_time.clone())
                .and_then(|t| parse_time_seconds(&t))
        };
        let range_secs = || {
            lookup(&slices.range, res)
                .or_else(|| res.total_range_time.clone())
                .and_then(|t| parse_time_seconds(&t))
        };

        let secs: Option<f64> = match kind {
            CumulateKind::Course => res
                .finish_time()
                .and_then(|raw| result_seconds(raw, base_secs)),
            CumulateKind::Ski => ski_secs(),
            CumulateKind::Range => range_secs(),
            CumulateKind::Shooting => lookup(&slices.shooting, res)
                .or_else(|| res.total_shooting_time.clone())
                .and_then(|t| parse_time_seconds(&t)),
            CumulateKind::Penalty => {
                if disc == "IN" {
                    Some(f64::from(misses) * 60.0)
                } else {
                    penalty_secs(
                        res.finish_time()
                            .and_then(|raw| result_seconds(raw, base_secs)),
                        ski_secs(),
                        range_secs(),
                    )
                }
            }
            CumulateKind::Miss | CumulateKind::Remontada => Some(0.0),
        };

        if kind == CumulateKind::Remontada {
            // Non-finishers and placeholder ranks would distort the gain.
            if res.irm.is_some() {
                continue;
            }
            let (Some(start), Some(rank)) = (
                res.start_order.as_deref().and_then(|s| s.trim().parse::<i64>().ok()),
                res.rank_number().map(i64::from),
            ) else {
                continue;
            };
            if rank > 500 {
                continue;
            }
            let entry = entry_for(entries, key, res.display_name(), &res.nat);
            entry.places_gained += start - rank;
            entry.races += 1;
            continue;
        }

        let Some(secs) = secs else {
            continue;
        };
        let entry = entry_for(entries, key, res.display_name(), &res.nat);
        entry.total_secs += secs;
        entry.misses += misses;
        entry.prone_misses += prone;
        entry.standing_misses += standing;
        entry.shots += discipline::shots(&disc);
        entry.races += 1;
    }
}

fn entry_for<'a>(
    entries: &'a mut HashMap<String, CumulateEntry>,
    key: String,
    name: &str,
    nat: &str,
) -> &'a mut CumulateEntry {
    entries.entry(key).or_insert_with(|| CumulateEntry {
        name: name.to_string(),
        nat: nat.to_string(),
        ..CumulateEntry::default()
    })
}

fn penalty_secs(result: Option<f64>, ski: Option<f64>, range: Option<f64>) -> Option<f64> {
    let secs = result? - ski? - range?;
    if secs >= 0.0 { Some(secs) } else { None }
}

fn sort_entries(rows: &mut [CumulateEntry], kind: CumulateKind) {
    match kind {
        CumulateKind::Miss => rows.sort_by(|a, b| {
            a.misses
                .cmp(&b.misses)
                .then_with(|| a.name.cmp(&b.name))
        }),
        CumulateKind::Remontada => rows.sort_by(|a, b| {
            b.places_gained
                .cmp(&a.places_gained)
                .then_with(|| b.races.cmp(&a.races))
                .then_with(|| a.name.cmp(&b.name))
        }),
        _ => rows.sort_by(|a, b| {
            a.total_secs
                .total_cmp(&b.total_secs)
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
}

fn build_table(rows: &[CumulateEntry], kind: CumulateKind) -> Table {
    let mut headers = vec!["Rank".to_string(), "Biathlete".to_string(), "Nat".to_string()];
    match kind {
        CumulateKind::Miss => {
            headers.extend(["Miss", "Prone", "Standing", "Shots", "Races"].map(String::from));
        }
        CumulateKind::Shooting => {
            headers.extend(["Total", "Miss", "Accuracy", "Races"].map(String::from));
        }
        CumulateKind::Remontada => headers.extend(["Gained", "Races"].map(String::from)),
        _ => headers.extend(["Total", "Races"].map(String::from)),
    }

    let mut table = Table::new(headers);
    for (idx, row) in rows.iter().enumerate() {
        let mut cells = vec![(idx + 1).to_string(), row.name.clone(), row.nat.clone()];
        match kind {
            CumulateKind::Miss => cells.extend([
                row.misses.to_string(),
                row.prone_misses.to_string(),
                row.standing_misses.to_string(),
                row.shots.to_string(),
                row.races.to_string(),
            ]),
            CumulateKind::Shooting => cells.extend([
                format_seconds(row.total_secs),
                row.misses.to_string(),
                format_pct(row.shots - row.misses, row.shots),
                row.races.to_string(),
            ]),
            CumulateKind::Remontada => cells.extend([
                format!("{:+}", row.places_gained),
                row.races.to_string(),
            ]),
            _ => cells.extend([format_seconds(row.total_secs), row.races.to_string()]),
        }
        table.push_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(disc: &str, rows: &[serde_json::Value]) -> RaceResultsResponse {
        serde_json::from_value(serde_json::json!({
            "Competition": {"DisciplineId": disc, "catId": "SW"},
            "Results": rows,
        }))
        .unwrap()
    }

    fn finisher(name: &str, rank: u32, result: &str, shootings: &str) -> serde_json::Value {
        serde_json::json!({
            "Name": name,
            "Nat": "NOR",
            "Rank": rank.to_string(),
            "Result": result,
            "Shootings": shootings,
        })
    }

    #[test]
    fn test_race_in_scope_filters_relays_and_category() {
        let sprint = payload("SP", &[finisher("A", 1, "24:31.1", "0+0")]);
        assert!(race_in_scope(&sprint, "SW", None));
        assert!(!race_in_scope(&sprint, "SM", None));
        assert!(!race_in_scope(&sprint, "SW", Some("MS")));

        let relay = payload("RL", &[finisher("A", 1, "1:10:00.0", "0+0")]);
        assert!(!race_in_scope(&relay, "SW", None));
    }

    #[test]
    fn test_course_resolves_behind_diffs_against_winner() {
        let mut entries = HashMap::new();
        let race = payload(
            "SP",
            &[
                finisher("A", 1, "24:00.0", "0+0"),
                finisher("B", 2, "+30.0", "1+0"),
            ],
        );
        accumulate_race(&mut entries, &race, CumulateKind::Course, &RaceSlices::default());

        assert_eq!(entries["A"].total_secs, 24.0 * 60.0);
        assert_eq!(entries["B"].total_secs, 24.0 * 60.0 + 30.0);
    }

    #[test]
    fn test_miss_totals_and_sorting() {
        let mut entries = HashMap::new();
        let race = payload(
            "MS",
            &[
                finisher("A", 1, "35:00.0", "0+1+0+2"),
                finisher("B", 2, "+10.0", "0+0+0+0"),
            ],
        );
        accumulate_race(&mut entries, &race, CumulateKind::Miss, &RaceSlices::default());

        let a = &entries["A"];
        assert_eq!(a.misses, 3);
        assert_eq!(a.prone_misses, 1);
        assert_eq!(a.standing_misses, 2);
        assert_eq!(a.shots, 20);

        let mut rows: Vec<CumulateEntry> = entries.into_values().collect();
        sort_entries(&mut rows, CumulateKind::Miss);
        assert_eq!(rows[0].name, "B");
    }

    #[test]
    fn test_individual_penalty_charges_a_minute_per_miss() {
        let mut entries = HashMap::new();
        let race = payload("IN", &[finisher("A", 1, "51:00.0", "0+1+0+1")]);
        accumulate_race(&mut entries, &race, CumulateKind::Penalty, &RaceSlices::default());
        assert_eq!(entries["A"].total_secs, 120.0);
    }

    #[test]
    fn test_remontada_counts_places_gained() {
        let mut entries = HashMap::new();
        let race = payload(
            "PU",
            &[
                serde_json::json!({
                    "Name": "Climber", "Nat": "FRA", "Rank": "2",
                    "Result": "+5.0", "StartOrder": "12",
                }),
                serde_json::json!({
                    "Name": "Leader", "Nat": "NOR", "Rank": "1",
                    "Result": "30:00.0", "StartOrder": "1",
                }),
                serde_json::json!({
                    "Name": "Lapped", "Nat": "GER", "Rank": "10000",
                    "Result": "+4:00.0", "StartOrder": "3",
                }),
            ],
        );
        accumulate_race(&mut entries, &race, CumulateKind::Remontada, &RaceSlices::default());

        assert_eq!(entries["Climber"].places_gained, 10);
        assert_eq!(entries["Leader"].places_gained, 0);
        assert!(!entries.contains_key("Lapped"));

        let mut rows: Vec<CumulateEntry> = entries.into_values().collect();
        sort_entries(&mut rows, CumulateKind::Remontada);
        assert_eq!(rows[0].name, "Climber");
    }

    #[test]
    fn test_ski_prefers_published_ski_time() {
        let mut entries = HashMap::new();
        let race = payload("SP", &[finisher("A", 1, "24:00.0", "0+0")]);
        let mut slices = RaceSlices::default();
        slices.ski.insert("A".into(), "20:00.0".into());
        slices.course.insert("A".into(), "21:00.0".into());
        accumulate_race(&mut entries, &race, CumulateKind::Ski, &slices);
        assert_eq!(entries["A"].total_secs, 20.0 * 60.0);
    }

    #[test]
    fn test_table_shapes() {
        let rows = vec![CumulateEntry {
            name: "A".into(),
            nat: "NOR".into(),
            races: 3,
            total_secs: 3723.5,
            misses: 4,
            prone_misses: 1,
            standing_misses: 3,
            shots: 40,
            places_gained: 7,
        }];
        let time = build_table(&rows, CumulateKind::Course).render(crate::report::OutputMode::Tsv);
        assert_eq!(time.lines().nth(1).unwrap(), "1\tA\tNOR\t1:02:03.5\t3");

        let miss = build_table(&rows, CumulateKind::Miss).render(crate::report::OutputMode::Tsv);
        assert_eq!(miss.lines().nth(1).unwrap(), "1\tA\tNOR\t4\t1\t3\t40\t3");

        let gained =
            build_table(&rows, CumulateKind::Remontada).render(crate::report::OutputMode::Tsv);
        assert_eq!(gained.lines().nth(1).unwrap(), "1\tA\tNOR\t+7\t3");
    }
}
