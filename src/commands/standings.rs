//! `standings` subcommand: cup standings with per-discipline points.

use std::collections::HashMap;

use futures::future::join_all;

use crate::api::models::Cup;
use crate::api::ApiClient;
use crate::cli::{StandingsArgs, StandingsSort};
use crate::commands::{print_table, resolve_season};
use crate::constants::category;
use crate::error::AppError;
use crate::report::{apply_limit, rank_color, Table};

const DISCIPLINES: [&str; 4] = ["SP", "PU", "IN", "MS"];

#[derive(Debug, Clone)]
struct StandingRow {
    position: usize,
    name: String,
    nat: String,
    total: i64,
    by_discipline: HashMap<&'static str, i64>,
}

pub async fn run(client: &ApiClient, args: &StandingsArgs, tsv: bool) -> Result<(), AppError> {
    let season_id = resolve_season(client, args.season.as_deref()).await?;
    let cat = if args.men { category::MEN } else { category::WOMEN };

    let cups = client.fetch_cups(&season_id).await?;
    let Some(total_cup_id) = find_cup_id(&cups, cat, args.level, "TS") else {
        return Err(AppError::no_results(format!(
            "no total score cup found for season {season_id}"
        )));
    };

    let total = client.fetch_cup_results(&total_cup_id).await?;
    if total.rows.is_empty() {
        return Err(AppError::no_results(format!(
            "no standings found for cup {total_cup_id}"
        )));
    }

    // The per-discipline cups are independent, fetch them as one batch.
    let discipline_cups: Vec<(&str, String)> = DISCIPLINES
        .iter()
        .filter_map(|disc| find_cup_id(&cups, cat, args.level, disc).map(|id| (*disc, id)))
        .collect();
    let fetches = discipline_cups
        .iter()
        .map(|(_, cup_id)| client.fetch_cup_results(cup_id));
    let mut scores_by_discipline: HashMap<&str, HashMap<String, i64>> = HashMap::new();
    for ((disc, _), outcome) in discipline_cups.iter().zip(join_all(fetches).await) {
        // A missing discipline cup leaves its column at zero.
        let Ok(payload) = outcome else { continue };
        let by_athlete = payload
            .rows
            .into_iter()
            .filter_map(|row| row.ibu_id.map(|id| (id, row.score)))
            .collect();
        scores_by_discipline.insert(disc, by_athlete);
    }

    let mut rows: Vec<StandingRow> = total
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut by_discipline = HashMap::new();
            if let Some(id) = row.ibu_id.as_deref() {
                for disc in DISCIPLINES {
                    let score = scores_by_discipline
                        .get(disc)
                        .and_then(|m| m.get(id))
                        .copied()
                        .unwrap_or(0);
                    by_discipline.insert(disc, score);
                }
            }
            StandingRow {
                position: idx + 1,
                name: row.name.clone(),
                nat: row.nat.clone(),
                total: row.score,
                by_discipline,
            }
        })
        .collect();

    sort_standings(&mut rows, args.sort);
    apply_limit(&mut rows, args.limit);

    println!("# Standings - season {season_id} ({})", if args.men { "men" } else { "women" });
    print_table(&build_table(&rows), tsv);
    Ok(())
}

/// The cup matching a season's category, level, and discipline code.
pub(crate) fn find_cup_id(cups: &[Cup], cat: &str, level: i32, disc: &str) -> Option<String> {
    cups.iter()
        .find(|cup| cup.cat_id == cat && cup.level == level && cup.discipline_id == disc)
        .and_then(|cup| cup.cup_id.clone())
}

fn sort_standings(rows: &mut Vec<StandingRow>, sort: StandingsSort) {
    let disc = match sort {
        StandingsSort::Total => None,
        StandingsSort::Sprint => Some("SP"),
        StandingsSort::Pursuit => Some("PU"),
        StandingsSort::Individual => Some("IN"),
        StandingsSort::Massstart => Some("MS"),
    };
    if let Some(disc) = disc {
        rows.sort_by_key(|row| {
            let score = row.by_discipline.get(disc).copied().unwrap_or(0);
            (std::cmp::Reverse(score), std::cmp::Reverse(row.total))
        });
    }
}

fn build_table(rows: &[StandingRow]) -> Table {
    let mut table = Table::new(vec![
        "Rank".into(),
        "Biathlete".into(),
        "Nat".into(),
        "Total".into(),
        "Sprint".into(),
        "Pursuit".into(),
        "Individual".into(),
        "MassStart".into(),
    ]);
    for row in rows {
        let score_cell = |disc: &str| {
            let score = row.by_discipline.get(disc).copied().unwrap_or(0);
            if score > 0 { score.to_string() } else { "-".into() }
        };
        table.push_colored_row(
            vec![
                row.position.to_string(),
                row.name.clone(),
                row.nat.clone(),
                row.total.to_string(),
                score_cell("SP"),
                score_cell("PU"),
                score_cell("IN"),
                score_cell("MS"),
            ],
            rank_color(row.position as u32),
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cup(cat: &str, level: i32, disc: &str, id: &str) -> Cup {
        serde_json::from_value(serde_json::json!({
            "CupId": id,
            "CatId": cat,
            "Level": level,
            "DisciplineId": disc,
        }))
        .unwrap()
    }

    fn standing(position: usize, name: &str, total: i64, sprint: i64) -> StandingRow {
        StandingRow {
            position,
            name: name.into(),
            nat: "NOR".into(),
            total,
            by_discipline: HashMap::from([("SP", sprint), ("PU", 0), ("IN", 0), ("MS", 0)]),
        }
    }

    #[test]
    fn test_find_cup_id_matches_all_criteria() {
        let cups = vec![
            cup("SM", 1, "TS", "MEN_TOTAL"),
            cup("SW", 1, "TS", "WOMEN_TOTAL"),
            cup("SW", 1, "SP", "WOMEN_SPRINT"),
            cup("SW", 2, "TS", "IBU_CUP_TOTAL"),
        ];
        assert_eq!(find_cup_id(&cups, "SW", 1, "TS").as_deref(), Some("WOMEN_TOTAL"));
        assert_eq!(find_cup_id(&cups, "SW", 1, "SP").as_deref(), Some("WOMEN_SPRINT"));
        assert_eq!(find_cup_id(&cups, "MX", 1, "TS"), None);
    }

    #[test]
    fn test_sort_by_discipline_falls_back_to_total() {
        let mut rows = vec![
            standing(1, "A", 700, 200),
            standing(2, "B", 650, 250),
            standing(3, "C", 600, 250),
        ];
        sort_standings(&mut rows, StandingsSort::Sprint);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_total_sort_keeps_cup_order() {
        let mut rows = vec![standing(1, "A", 700, 0), standing(2, "B", 650, 100)];
        sort_standings(&mut rows, StandingsSort::Total);
        assert_eq!(rows[0].name, "A");
    }

    #[test]
    fn test_table_uses_dash_for_zero_scores() {
        let rendered =
            build_table(&[standing(1, "A", 700, 0)]).render(crate::report::OutputMode::Tsv);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "1\tA\tNOR\t700\t-\t-\t-\t-");
    }
}
