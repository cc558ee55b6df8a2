//! `relay` subcommand: team results with per-leg detail.
//!
//! Relay payloads mix team aggregate rows (`IsTeam`) with one row per leg.
//! Teams and legs join on the bib number; analytic times join on (bib, leg).

use std::collections::HashMap;

use crate::api::models::{RaceResult, RaceResultsResponse};
use crate::api::ApiClient;
use crate::cli::{RelayArgs, ResultSort};
use crate::commands::print_table;
use crate::constants::{analytic, category, discipline};
use crate::error::AppError;
use crate::report::{apply_limit, rank_color, sort_rows, SortValue, Table};
use crate::shooting::{parse_leg_shootings, parse_relay_shooting, RelayShooting};
use crate::timing::{format_seconds, parse_time_seconds};

const RELAY_LEGS: i32 = 4;

#[derive(Debug, Clone)]
struct RelayLeg {
    leg: i32,
    name: String,
    prone: Option<RelayShooting>,
    standing: Option<RelayShooting>,
    cumulative: Option<String>,
}

#[derive(Debug, Clone)]
struct RelayTeamRow {
    rank: Option<u32>,
    team: String,
    nat: String,
    result: String,
    behind: String,
    course: String,
    range: String,
    shooting: String,
    penalty: String,
    misses: Option<RelayShooting>,
    legs: Vec<Option<RelayLeg>>,
    dns: bool,
}

pub async fn run(client: &ApiClient, args: &RelayArgs, tsv: bool) -> Result<(), AppError> {
    let (disc, cat) = selected_category(args);
    let (race_id, payload) = match args.race.as_deref() {
        Some(id) => (id.to_string(), client.fetch_results(id).await?),
        None => {
            client
                .latest_completed_race_where(|race| {
                    race.discipline_id.eq_ignore_ascii_case(disc)
                        && (cat.is_empty() || race.cat_id.eq_ignore_ascii_case(cat))
                })
                .await?
        }
    };

    let mut rows = build_team_rows(client, &race_id, &payload, args.first).await;
    if rows.is_empty() {
        return Err(AppError::no_results(format!(
            "no relay results found for race {race_id}"
        )));
    }

    sort_team_rows(&mut rows, args.sort);
    apply_limit(&mut rows, args.limit);

    println!("{}", payload.header(&race_id));
    let table = if args.detail {
        build_detail_table(&rows)
    } else {
        build_summary_table(&rows)
    };
    print_table(&table, tsv);
    Ok(())
}

fn selected_category(args: &RelayArgs) -> (&'static str, &'static str) {
    if args.singlemixed {
        (discipline::SINGLE_MIXED_RELAY, category::MIXED)
    } else if args.mixed {
        (discipline::RELAY, category::MIXED)
    } else if args.men {
        (discipline::RELAY, category::MEN)
    } else {
        (discipline::RELAY, category::WOMEN)
    }
}

async fn build_team_rows(
    client: &ApiClient,
    race_id: &str,
    payload: &RaceResultsResponse,
    first: Option<usize>,
) -> Vec<RelayTeamRow> {
    let mut teams: Vec<&RaceResult> = payload.results.iter().filter(|r| r.is_team).collect();
    teams.sort_by_key(|t| {
        (
            t.rank_number().map(i64::from).unwrap_or(i64::MAX),
            t.result_order.unwrap_or(i64::MAX),
        )
    });
    if let Some(first) = first.filter(|n| *n > 0) {
        teams.truncate(first);
    }

    let mut legs_by_bib: HashMap<&str, Vec<&RaceResult>> = HashMap::new();
    for leg in payload.results.iter().filter(|r| !r.is_team) {
        if let Some(bib) = leg.bib.as_deref() {
            legs_by_bib.entry(bib).or_default().push(leg);
        }
    }

    let course_times = leg_time_map(client, race_id, analytic::COURSE_TOTAL).await;
    let range_times = leg_time_map(client, race_id, analytic::RANGE_TOTAL).await;
    let shooting_times = leg_time_map(client, race_id, analytic::SHOOTING_TOTAL).await;

    teams
        .iter()
        .map(|team| {
            let bib = team.bib.as_deref().unwrap_or("");
            let team_legs = legs_by_bib.get(bib).cloned().unwrap_or_default();

            let result = team.finish_time().unwrap_or("-").to_string();
            let course = sum_leg_times(&course_times, bib);
            let range = sum_leg_times(&range_times, bib);
            let shooting = sum_leg_times(&shooting_times, bib);

            let penalty = match (
                parse_time_seconds(&result),
                parse_time_seconds(&course),
                parse_time_seconds(&range),
            ) {
                (Some(r), Some(c), Some(rg)) if r - c - rg >= 0.0 => format_seconds(r - c - rg),
                _ => "-".into(),
            };

            let legs: Vec<Option<RelayLeg>> = (1..=RELAY_LEGS)
                .map(|i| {
                    let data = team_legs.iter().find(|l| l.leg == Some(i))?;
                    let figures = data.shootings.as_deref().and_then(parse_leg_shootings);
                    Some(RelayLeg {
                        leg: i,
                        name: data.display_name().to_string(),
                        prone: figures.map(|(p, _)| p),
                        standing: figures.map(|(_, s)| s),
                        cumulative: data.finish_time().map(str::to_string),
                    })
                })
                .collect();

            let misses = total_misses(&legs, team);

            RelayTeamRow {
                rank: team.rank_number(),
                team: team.display_name().to_string(),
                nat: team.nat.clone(),
                result,
                behind: team.behind.clone().unwrap_or_default(),
                course,
                range,
                shooting,
                penalty,
                misses,
                legs,
                dns: team.is_dns(),
            }
        })
        .collect()
}

/// Sums per-leg shooting figures; falls back to the team's `ShootingTotal`
/// when no leg carries one.
fn total_misses(legs: &[Option<RelayLeg>], team: &RaceResult) -> Option<RelayShooting> {
    let mut total = RelayShooting::default();
    let mut seen = false;
    for leg in legs.iter().flatten() {
        for figure in [leg.prone, leg.standing].into_iter().flatten() {
            total = total.add(figure);
            seen = true;
        }
    }
    if seen {
        Some(total)
    } else {
        team.shooting_total.as_deref().and_then(parse_relay_shooting)
    }
}

/// Analytic leg times keyed by (bib, leg).
async fn leg_time_map(
    client: &ApiClient,
    race_id: &str,
    type_id: &str,
) -> HashMap<(String, i32), f64> {
    let payload = match client.fetch_analytic_results(race_id, type_id).await {
        Ok(payload) => payload,
        Err(_) => return HashMap::new(),
    };
    let mut times = HashMap::new();
    for res in payload.results.iter().filter(|r| !r.is_team) {
        let (Some(bib), Some(leg)) = (res.bib.as_deref(), res.leg) else {
            continue;
        };
        if let Some(secs) = res
            .total_time
            .as_deref()
            .or(res.result.as_deref())
            .and_then(parse_time_seconds)
        {
            times.insert((bib.to_string(), leg), secs);
        }
    }
    times
}

fn sum_leg_times(times: &HashMap<(String, i32), f64>, bib: &str) -> String {
    let mut sum = 0.0;
    let mut seen = false;
    for leg in 1..=RELAY_LEGS {
        if let Some(secs) = times.get(&(bib.to_string(), leg)) {
            sum += secs;
            seen = true;
        }
    }
    if seen { format_seconds(sum) } else { "-".into() }
}

fn sort_team_rows(rows: &mut [RelayTeamRow], sort: ResultSort) {
    sort_rows(rows, |row| {
        if row.dns {
            return SortValue::Missing;
        }
        match sort {
            ResultSort::Result => row
                .rank
                .map(|r| SortValue::Int(i64::from(r)))
                .unwrap_or(SortValue::Missing),
            ResultSort::Course => SortValue::time(Some(&row.course)),
            ResultSort::Range => SortValue::time(Some(&row.range)),
            ResultSort::Shooting => SortValue::time(Some(&row.shooting)),
            ResultSort::Penalty => SortValue::time(Some(&row.penalty)),
            // Penalty loops outweigh spare rounds.
            ResultSort::Misses => row
                .misses
                .map(|m| SortValue::Int(i64::from(m.misses) * 1000 + i64::from(m.spares)))
                .unwrap_or(SortValue::Missing),
        }
    });
}

fn build_summary_table(rows: &[RelayTeamRow]) -> Table {
    let mut table = Table::new(
        ["Rank", "Team", "Nat", "Results", "Behind", "Course", "Range", "Shoot", "Penalty", "Miss"]
            .map(String::from)
            .to_vec(),
    );
    for row in rows {
        table.push_colored_row(
            vec![
                row.rank.map(|r| r.to_string()).unwrap_or_default(),
                row.team.clone(),
                row.nat.clone(),
                row.result.clone(),
                row.behind.clone(),
                row.course.clone(),
                row.range.clone(),
                row.shooting.clone(),
                row.penalty.clone(),
                row.misses.map(|m| m.format()).unwrap_or_else(|| "-".into()),
            ],
            row.rank.and_then(rank_color),
        );
    }
    table
}

fn build_detail_table(rows: &[RelayTeamRow]) -> Table {
    let mut table = Table::new(
        ["Rank", "Team", "Leg", "Biathlete", "LegTime", "Prone", "Standing", "Miss"]
            .map(String::from)
            .to_vec(),
    );
    for row in rows {
        let mut prev_secs: Option<f64> = None;
        for slot in &row.legs {
            let Some(leg) = slot else { continue };
            let curr_secs = leg.cumulative.as_deref().and_then(parse_time_seconds);
            let leg_time = match (curr_secs, prev_secs) {
                (Some(curr), Some(prev)) => format_seconds(curr - prev),
                (Some(curr), None) if leg.leg == 1 => format_seconds(curr),
                _ => "-".into(),
            };
            if let Some(curr) = curr_secs {
                prev_secs = Some(curr);
            }
            let leg_miss = match (leg.prone, leg.standing) {
                (Some(p), Some(s)) => p.add(s).format(),
                _ => "-".into(),
            };
            table.push_colored_row(
                vec![
                    row.rank.map(|r| r.to_string()).unwrap_or_default(),
                    row.team.clone(),
                    leg.leg.to_string(),
                    leg.name.clone(),
                    leg_time,
                    leg.prone.map(|p| p.format()).unwrap_or_else(|| "-".into()),
                    leg.standing.map(|s| s.format()).unwrap_or_else(|| "-".into()),
                    leg_miss,
                ],
                row.rank.and_then(rank_color),
            );
        }
    }
    table
}
