//! `ceremony` subcommand: top-5 placement counts across races.

use std::collections::HashMap;

use tracing::debug;

use crate::api::models::RaceResultsResponse;
use crate::api::ApiClient;
use crate::cli::CeremonyArgs;
use crate::commands::{print_table, resolve_season};
use crate::constants::{category, discipline, level};
use crate::error::AppError;
use crate::report::Table;

#[derive(Debug, Clone, Default)]
struct PodiumCounts {
    label: String,
    nat: String,
    slots: [u32; 5],
}

pub async fn run(client: &ApiClient, args: &CeremonyArgs, tsv: bool) -> Result<(), AppError> {
    let (race_ids, scope_label) = collect_scope(client, args).await?;
    if race_ids.is_empty() {
        return Err(AppError::no_results("no races in scope"));
    }

    let gender_cat = if args.athlete {
        if args.men {
            Some(category::MEN)
        } else if args.women {
            Some(category::WOMEN)
        } else {
            None
        }
    } else {
        None
    };

    let mut counts: HashMap<String, PodiumCounts> = HashMap::new();
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
        if accumulate(&mut counts, &payload, args.athlete, gender_cat) {
            races_used += 1;
        }
    }

    let mut rows: Vec<PodiumCounts> = counts.into_values().collect();
    if rows.is_empty() {
        return Err(AppError::no_results("no podium results in scope"));
    }
    rows.sort_by(|a, b| {
        b.slots
            .cmp(&a.slots)
            .then_with(|| a.label.cmp(&b.label))
    });

    println!("# Ceremony - {scope_label} ({races_used} races)");
    print_table(&build_table(&rows, args.athlete), tsv);
    Ok(())
}

async fn collect_scope(
    client: &ApiClient,
    args: &CeremonyArgs,
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

/// Adds one race's top five to the tally. Relays are skipped, as is any race
/// the gender filter excludes. Returns whether the race counted.
fn accumulate(
    counts: &mut HashMap<String, PodiumCounts>,
    payload: &RaceResultsResponse,
    by_athlete: bool,
    gender_cat: Option<&str>,
) -> bool {
    let disc = payload.discipline().to_uppercase();
    if discipline::is_relay(&disc) {
        return false;
    }
    let results = payload.individual_results();
    if results.is_empty() {
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

    for (slot, res) in results.iter().take(5).enumerate() {
        let (key, label, nat) = if by_athlete {
            let name = res.display_name().to_string();
            (name.clone(), name, res.nat.clone())
        } else {
            (res.nat.clone(), res.nat.clone(), String::new())
        };
        if key.is_empty() {
            continue;
        }
        let entry = counts.entry(key).or_insert_with(|| PodiumCounts {
            label,
            nat,
            slots: [0; 5],
        });
        entry.slots[slot] += 1;
    }
    true
}

fn build_table(rows: &[PodiumCounts], by_athlete: bool) -> Table {
    let mut headers = vec![if by_athlete { "Biathlete" } else { "Country" }.to_string()];
    if by_athlete {
        headers.push("Nat".to_string());
    }
    headers.extend(["1st", "2nd", "3rd", "4th", "5th"].map(String::from));

    let mut table = Table::new(headers);
    for row in rows {
        let mut cells = vec![row.label.clone()];
        if by_athlete {
            cells.push(row.nat.clone());
        }
        cells.extend(row.slots.iter().map(|c| c.to_string()));
        table.push_row(cells);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(cat: &str, disc: &str, names: &[(&str, &str, u32)]) -> RaceResultsResponse {
        let results: Vec<serde_json::Value> = names
            .iter()
            .map(|(name, nat, rank)| {
                serde_json::json!({"Name": name, "Nat": nat, "Rank": rank.to_string()})
            })
            .collect();
        serde_json::from_value(serde_json::json!({
            "Competition": {"DisciplineId": disc, "catId": cat},
            "Results": results,
        }))
        .unwrap()
    }

    #[test]
    fn test_accumulate_counts_top_five_by_country() {
        let mut counts = HashMap::new();
        let race = payload(
            "SW",
            "SP",
            &[
                ("A", "NOR", 1),
                ("B", "NOR", 2),
                ("C", "GER", 3),
                ("D", "FRA", 4),
                ("E", "GER", 5),
                ("F", "SWE", 6),
            ],
        );
        assert!(accumulate(&mut counts, &race, false, None));
        assert_eq!(counts["NOR"].slots, [1, 1, 0, 0, 0]);
        assert_eq!(counts["GER"].slots, [0, 0, 1, 0, 1]);
        assert!(!counts.contains_key("SWE"));
    }

    #[test]
    fn test_accumulate_skips_relays_and_filtered_categories() {
        let mut counts = HashMap::new();
        assert!(!accumulate(&mut counts, &payload("SW", "RL", &[("A", "NOR", 1)]), false, None));
        assert!(!accumulate(
            &mut counts,
            &payload("SM", "SP", &[("A", "NOR", 1)]),
            true,
            Some("SW")
        ));
        assert!(counts.is_empty());
    }

    #[test]
    fn test_sorting_prefers_wins_then_label() {
        let mut rows = vec![
            PodiumCounts { label: "GER".into(), nat: String::new(), slots: [1, 2, 0, 0, 0] },
            PodiumCounts { label: "NOR".into(), nat: String::new(), slots: [2, 0, 0, 0, 0] },
            PodiumCounts { label: "FRA".into(), nat: String::new(), slots: [1, 2, 0, 0, 0] },
        ];
        rows.sort_by(|a, b| b.slots.cmp(&a.slots).then_with(|| a.label.cmp(&b.label)));
        let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["NOR", "FRA", "GER"]);
    }
}
