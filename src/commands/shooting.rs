//! `shooting` subcommand: shooting accuracy aggregated over races.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::api::has_completed_results;
use crate::api::models::RaceResultsResponse;
use crate::api::ApiClient;
use crate::cli::{ShootingArgs, ShootingSort};
use crate::commands::{print_table, resolve_season};
use crate::constants::{category, discipline, level};
use crate::error::AppError;
use crate::report::{apply_limit, Table};
use crate::shooting::parse_stage_misses;
use crate::timing::format_pct;

/// Per-athlete shot tally across the races in scope. Shots are inferred from
/// the stage count (5 per range visit).
#[derive(Debug, Clone, Default)]
struct AthleteShooting {
    name: String,
    nat: String,
    shots: u32,
    misses: u32,
    prone_shots: u32,
    prone_misses: u32,
    standing_shots: u32,
    standing_misses: u32,
    races: u32,
}

impl AthleteShooting {
    fn accuracy(&self) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        f64::from(self.shots - self.misses) / f64::from(self.shots)
    }
}

/// One output row; the rank is frozen from the accuracy ordering so other
/// sort orders keep it visible.
#[derive(Debug, Clone)]
struct ShootingRow {
    rank: usize,
    totals: AthleteShooting,
}

pub async fn run(client: &ApiClient, args: &ShootingArgs, tsv: bool) -> Result<(), AppError> {
    let cat = if args.men { category::MEN } else { category::WOMEN };
    // An explicit race is taken as given; wider scopes filter by category.
    let gender_cat = if args.race.is_some() { None } else { Some(cat) };

    let (race_ids, scope_label) = collect_scope(client, args).await?;
    if race_ids.is_empty() {
        return Err(AppError::no_results("no races in scope"));
    }

    let mut totals: HashMap<String, AthleteShooting> = HashMap::new();
    let mut races_used = 0usize;
    for race_id in &race_ids {
        let payload = match client.fetch_results(race_id).await {
            Ok(p) => p,
            Err(e) if e.is_not_found() => {
                debug!("skipping race {race_id} without results");
                continue;
            }
            Err(e) => return Err(e),
        };
        if accumulate(&mut totals, &payload, gender_cat) {
            races_used += 1;
        }
    }

    let mut rows = ranked_rows(totals);
    if rows.is_empty() {
        return Err(AppError::no_results("no shooting results in scope"));
    }

    if let Some(top) = args.top.filter(|n| *n > 0) {
        let keep = top_cup_athletes(client, cat, top).await?;
        if !keep.is_empty() {
            rows.retain(|row| keep.contains(&row.totals.name));
        }
    }

    sort_shooting_rows(&mut rows, args.sort);
    apply_limit(&mut rows, args.limit);

    let gender = if args.men { "men" } else { "women" };
    println!("# Shooting accuracy - {scope_label} ({gender}, {races_used} races)");
    print_table(&build_table(&rows), tsv);
    Ok(())
}

async fn collect_scope(
    client: &ApiClient,
    args: &ShootingArgs,
) -> Result<(Vec<String>, String), AppError> {
    if let Some(race_id) = &args.race {
        return Ok((vec![race_id.clone()], race_id.clone()));
    }
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

/// Adds one race's stage misses to the tally. Relays, unfinished races, and
/// races the category filter excludes are skipped. Returns whether the race
/// counted.
fn accumulate(
    totals: &mut HashMap<String, AthleteShooting>,
    payload: &RaceResultsResponse,
    gender_cat: Option<&str>,
) -> bool {
    let disc = payload.discipline().to_uppercase();
    if discipline::is_relay(&disc) {
        return false;
    }
    if !has_completed_results(&payload.results) {
        return false;
    }
    if let Some(cat) = gender_cat {
        let race_cat = payload
            .competition
            .as_ref()
            .map(|c| c.cat_id.to_uppercase())
            .unwrap_or_default();
        if !race_cat.is_empty() && race_cat != cat {
            return false;
        }
    }

    let mut counted = false;
    for res in payload.individual_results() {
        if res.is_dns() {
            continue;
        }
        let Some(stages) = res
            .shootings
            .as_deref()
            .or(res.shooting_total.as_deref())
            .map(parse_stage_misses)
            .filter(|s| !s.is_empty())
        else {
            continue;
        };
        let key = res
            .ibu_id
            .clone()
            .unwrap_or_else(|| res.display_name().to_string());
        if key.is_empty() {
            continue;
        }

        let entry = totals.entry(key).or_insert_with(|| AthleteShooting {
            name: res.display_name().to_string(),
            nat: res.nat.clone(),
            ..AthleteShooting::default()
        });
        // Stages alternate prone/standing, starting prone
        for (idx, misses) in stages.iter().enumerate() {
            entry.shots += 5;
            entry.misses += misses;
            if idx % 2 == 0 {
                entry.prone_shots += 5;
                entry.prone_misses += misses;
            } else {
                entry.standing_shots += 5;
                entry.standing_misses += misses;
            }
        }
        entry.races += 1;
        counted = true;
    }
    counted
}

/// Rows ranked 1..n by accuracy (best first, more shots breaking ties).
fn ranked_rows(totals: HashMap<String, AthleteShooting>) -> Vec<ShootingRow> {
    let mut entries: Vec<AthleteShooting> = totals.into_values().collect();
    entries.sort_by(|a, b| {
        b.accuracy()
            .total_cmp(&a.accuracy())
            .then_with(|| b.shots.cmp(&a.shots))
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, totals)| ShootingRow { rank: idx + 1, totals })
        .collect()
}

fn sort_shooting_rows(rows: &mut [ShootingRow], sort: ShootingSort) {
    match sort {
        // ranked_rows already ordered by accuracy
        ShootingSort::Accuracy => {}
        ShootingSort::Misses => rows.sort_by(|a, b| {
            a.totals
                .misses
                .cmp(&b.totals.misses)
                .then_with(|| a.rank.cmp(&b.rank))
        }),
        ShootingSort::Shots => rows.sort_by(|a, b| {
            b.totals
                .shots
                .cmp(&a.totals.shots)
                .then_with(|| a.rank.cmp(&b.rank))
        }),
        ShootingSort::Races => rows.sort_by(|a, b| {
            b.totals
                .races
                .cmp(&a.totals.races)
                .then_with(|| a.rank.cmp(&b.rank))
        }),
        ShootingSort::Name => rows.sort_by(|a, b| a.totals.name.cmp(&b.totals.name)),
        ShootingSort::Country => rows.sort_by(|a, b| {
            a.totals
                .nat
                .cmp(&b.totals.nat)
                .then_with(|| a.rank.cmp(&b.rank))
        }),
    }
}

fn build_table(rows: &[ShootingRow]) -> Table {
    let headers = [
        "Rank", "Biathlete", "Nat", "Accuracy", "Prone", "Standing", "Miss", "Shots", "Races",
    ]
    .map(String::from)
    .to_vec();

    let mut table = Table::new(headers);
    for row in rows {
        let t = &row.totals;
        table.push_row(vec![
            row.rank.to_string(),
            t.name.clone(),
            t.nat.clone(),
            format_pct(t.shots - t.misses, t.shots),
            format_pct(t.prone_shots - t.prone_misses, t.prone_shots),
            format_pct(t.standing_shots - t.standing_misses, t.standing_shots),
            t.misses.to_string(),
            t.shots.to_string(),
            t.races.to_string(),
        ]);
    }
    table
}

/// Names of the top N in a category's World Cup total score, used to narrow
/// aggregations to the leaders.
pub(crate) async fn top_cup_athletes(
    client: &ApiClient,
    cat: &str,
    top: usize,
) -> Result<HashSet<String>, AppError> {
    let season_id = client.current_season_id().await?;
    let cups = client.fetch_cups(&season_id).await?;
    let Some(cup_id) = crate::commands::standings::find_cup_id(&cups, cat, 1, "TS") else {
        return Ok(HashSet::new());
    };
    let standings = client.fetch_cup_results(&cup_id).await?;
    Ok(standings
        .rows
        .iter()
        .take(top)
        .map(|row| row.name.clone())
        .filter(|name| !name.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(cat: &str, disc: &str, rows: &[(&str, &str, &str)]) -> RaceResultsResponse {
        let results: Vec<serde_json::Value> = rows
            .iter()
            .enumerate()
            .map(|(idx, (name, nat, shootings))| {
                serde_json::json!({
                    "Name": name,
                    "Nat": nat,
                    "Rank": (idx + 1).to_string(),
                    "Result": "24:31.1",
                    "Shootings": shootings,
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "Competition": {"DisciplineId": disc, "catId": cat},
            "Results": results,
        }))
        .unwrap()
    }

    #[test]
    fn test_accumulate_splits_prone_and_standing() {
        let mut totals = HashMap::new();
        let race = payload("IN", "IN", &[("A", "NOR", "0+1+0+2")]);
        assert!(accumulate(&mut totals, &race, None));

        let a = &totals["A"];
        assert_eq!(a.shots, 20);
        assert_eq!(a.misses, 3);
        assert_eq!(a.prone_shots, 10);
        assert_eq!(a.prone_misses, 0);
        assert_eq!(a.standing_shots, 10);
        assert_eq!(a.standing_misses, 3);
        assert_eq!(a.races, 1);
    }

    #[test]
    fn test_accumulate_sums_across_races() {
        let mut totals = HashMap::new();
        accumulate(&mut totals, &payload("SW", "SP", &[("A", "NOR", "1+0")]), Some("SW"));
        accumulate(&mut totals, &payload("SW", "MS", &[("A", "NOR", "0+0+0+1")]), Some("SW"));

        let a = &totals["A"];
        assert_eq!(a.shots, 30);
        assert_eq!(a.misses, 2);
        assert_eq!(a.races, 2);
    }

    #[test]
    fn test_accumulate_skips_relays_and_other_category() {
        let mut totals = HashMap::new();
        assert!(!accumulate(
            &mut totals,
            &payload("SW", "RL", &[("A", "NOR", "0+0")]),
            Some("SW")
        ));
        assert!(!accumulate(
            &mut totals,
            &payload("SM", "SP", &[("A", "NOR", "0+0")]),
            Some("SW")
        ));
        assert!(totals.is_empty());
    }

    #[test]
    fn test_ranked_rows_order_by_accuracy() {
        let mut totals = HashMap::new();
        accumulate(
            &mut totals,
            &payload("SW", "SP", &[("Clean", "NOR", "0+0"), ("Two", "GER", "1+1")]),
            Some("SW"),
        );
        let rows = ranked_rows(totals);
        assert_eq!(rows[0].totals.name, "Clean");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].totals.name, "Two");
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn test_sort_by_misses_keeps_accuracy_rank() {
        let mut totals = HashMap::new();
        accumulate(
            &mut totals,
            &payload(
                "SW",
                "MS",
                &[("A", "NOR", "0+0+0+1"), ("B", "GER", "0+0+0+0")],
            ),
            Some("SW"),
        );
        let mut rows = ranked_rows(totals);
        sort_shooting_rows(&mut rows, ShootingSort::Misses);
        assert_eq!(rows[0].totals.name, "B");
        // B shot clean, so it also holds rank 1 from the accuracy ordering
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn test_table_formats_percentages() {
        let rows = vec![ShootingRow {
            rank: 1,
            totals: AthleteShooting {
                name: "A".into(),
                nat: "NOR".into(),
                shots: 20,
                misses: 2,
                prone_shots: 10,
                prone_misses: 0,
                standing_shots: 10,
                standing_misses: 2,
                races: 1,
            },
        }];
        let rendered = build_table(&rows).render(crate::report::OutputMode::Tsv);
        assert_eq!(
            rendered.lines().nth(1).unwrap(),
            "1\tA\tNOR\t90.0%\t100.0%\t80.0%\t2\t20\t1"
        );
    }
}
