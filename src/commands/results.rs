//! `results` subcommand: individual race results plus per-lap and per-stage
//! analytic breakdowns.

use std::collections::HashMap;

use crate::api::models::{RaceResult, RaceResultsResponse};
use crate::api::ApiClient;
use crate::cli::{ResultSort, ResultsArgs, ResultsBreakdown};
use crate::commands::print_table;
use crate::constants::{analytic, discipline};
use crate::error::AppError;
use crate::report::{apply_limit, filter_nation, rank_color, sort_rows, SortValue, Table};
use crate::shooting::{parse_stage_misses, shooting_totals};
use crate::timing::{format_seconds, parse_time_seconds};

/// One fully assembled output row. All times stay strings; parsing happens
/// only inside sort keys and the penalty computation.
#[derive(Debug, Clone)]
struct ResultRow {
    rank: Option<u32>,
    name: String,
    nat: String,
    result: String,
    course: String,
    range: String,
    shooting: String,
    penalty: String,
    misses: Option<u32>,
    stage_misses: Vec<u32>,
    dns: bool,
}

pub async fn run(client: &ApiClient, args: &ResultsArgs, tsv: bool) -> Result<(), AppError> {
    let (race_id, payload) = resolve_race(client, args.race.as_deref()).await?;
    let mut results: Vec<RaceResult> = payload
        .individual_results()
        .into_iter()
        .cloned()
        .collect();
    if results.is_empty() {
        return Err(AppError::no_results(format!(
            "no results found for race {race_id}"
        )));
    }

    if let Some(first) = args.first.filter(|n| *n > 0) {
        results.truncate(first);
    }
    if let Some(top) = args.top {
        let cat = payload
            .competition
            .as_ref()
            .map(|c| c.cat_id.to_uppercase())
            .unwrap_or_default();
        let top_ids = top_total_score_ids(client, &cat, top).await?;
        if !top_ids.is_empty() {
            results.retain(|r| r.ibu_id.as_deref().is_some_and(|id| top_ids.contains(&id.to_string())));
        }
    }
    results = filter_nation(results, args.country.as_deref(), |r| r.nat.as_str());
    if results.is_empty() {
        return Err(AppError::no_results(format!(
            "no results matched for race {race_id}"
        )));
    }

    println!("{}", payload.header(&race_id));
    match args.breakdown {
        None => overview(client, &race_id, &payload, results, args, tsv).await,
        Some(kind) => breakdown(client, &race_id, &payload, results, kind, args, tsv).await,
    }
}

async fn resolve_race(
    client: &ApiClient,
    race: Option<&str>,
) -> Result<(String, RaceResultsResponse), AppError> {
    match race {
        Some(id) => Ok((id.to_string(), client.fetch_results(id).await?)),
        None => client.latest_completed_race().await,
    }
}

async fn overview(
    client: &ApiClient,
    race_id: &str,
    payload: &RaceResultsResponse,
    results: Vec<RaceResult>,
    args: &ResultsArgs,
    tsv: bool,
) -> Result<(), AppError> {
    let disc = payload.discipline().to_uppercase();
    let base_secs = base_time_seconds(&results);
    let course_times = analytic_map(client, race_id, analytic::COURSE_TOTAL).await;
    let range_times = analytic_map(client, race_id, analytic::RANGE_TOTAL).await;
    let shooting_times = analytic_map(client, race_id, analytic::SHOOTING_TOTAL).await;

    let mut rows: Vec<ResultRow> = results
        .iter()
        .map(|res| {
            build_row(
                res,
                &disc,
                base_secs,
                lookup(&course_times, res).or_else(|| res.total_course_time.clone()),
                lookup(&range_times, res).or_else(|| res.total_range_time.clone()),
                lookup(&shooting_times, res).or_else(|| res.total_shooting_time.clone()),
            )
        })
        .collect();

    sort_result_rows(&mut rows, args.sort);
    apply_limit(&mut rows, args.limit);

    print_table(&build_overview_table(&rows, args.detail), tsv);
    Ok(())
}

fn build_row(
    res: &RaceResult,
    disc: &str,
    base_secs: Option<f64>,
    course: Option<String>,
    range: Option<String>,
    shooting: Option<String>,
) -> ResultRow {
    let result = res
        .finish_time()
        .map(|raw| normalize_result_time(raw, base_secs))
        .unwrap_or_else(|| "-".into());
    let course = course.unwrap_or_else(|| "-".into());
    let range = range.unwrap_or_else(|| "-".into());
    let shooting = shooting.unwrap_or_else(|| "-".into());

    let stage_misses = res
        .shootings
        .as_deref()
        .or(res.shooting_total.as_deref())
        .map(parse_stage_misses)
        .unwrap_or_default();
    let misses = if stage_misses.is_empty() {
        None
    } else {
        Some(shooting_totals(&stage_misses).0)
    };

    let penalty = compute_penalty(disc, &result, &course, &range, misses);

    ResultRow {
        rank: res.rank_number(),
        name: res.display_name().to_string(),
        nat: res.nat.clone(),
        result,
        course,
        range,
        shooting,
        penalty,
        misses,
        stage_misses,
        dns: res.is_dns(),
    }
}

/// Time lost to penalties. Individual races add a fixed minute per miss;
/// everywhere else it is the finish time minus course and range time.
fn compute_penalty(
    disc: &str,
    result: &str,
    course: &str,
    range: &str,
    misses: Option<u32>,
) -> String {
    if disc == "IN" {
        return match misses {
            Some(m) => format_seconds(f64::from(m) * 60.0),
            None => "-".into(),
        };
    }
    let (Some(result_secs), Some(course_secs), Some(range_secs)) = (
        parse_time_seconds(result),
        parse_time_seconds(course),
        parse_time_seconds(range),
    ) else {
        return "-".into();
    };
    let penalty_secs = result_secs - course_secs - range_secs;
    if penalty_secs >= 0.0 {
        format_seconds(penalty_secs)
    } else {
        "-".into()
    }
}

/// The winner's absolute time in seconds: the first finish time in final
/// order that is not a behind-the-winner diff.
pub(crate) fn base_time_seconds<'a, I>(results: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a RaceResult>,
{
    results.into_iter().find_map(|res| {
        let raw = res.finish_time()?;
        if raw.trim_start().starts_with('+') {
            return None;
        }
        parse_time_seconds(raw)
    })
}

/// Renders a finish time as an absolute clock time. Behind-style diffs are
/// added onto the winner's time when it is known; anything unparseable passes
/// through untouched.
pub(crate) fn normalize_result_time(raw: &str, base_secs: Option<f64>) -> String {
    if raw.trim_start().starts_with('+') {
        if let (Some(base), Some(diff)) = (base_secs, parse_time_seconds(raw)) {
            return format_seconds(base + diff);
        }
        return raw.to_string();
    }
    match parse_time_seconds(raw) {
        Some(secs) => format_seconds(secs),
        None => raw.to_string(),
    }
}

/// Absolute finish time in seconds, resolving behind-style diffs against the
/// winner's time. None for DNS markers, unparseable strings, and diffs when
/// the winner's time is unknown.
pub(crate) fn result_seconds(raw: &str, base_secs: Option<f64>) -> Option<f64> {
    let diff = parse_time_seconds(raw)?;
    if raw.trim_start().starts_with('+') {
        Some(base_secs? + diff)
    } else {
        Some(diff)
    }
}

fn sort_result_rows(rows: &mut [ResultRow], sort: ResultSort) {
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
            ResultSort::Misses => row
                .misses
                .map(|m| SortValue::Int(i64::from(m)))
                .unwrap_or(SortValue::Missing),
        }
    });
}

fn build_overview_table(rows: &[ResultRow], detail: bool) -> Table {
    let mut headers = vec![
        "Rank".to_string(),
        "Biathlete".to_string(),
        "Nat".to_string(),
        "Results".to_string(),
        "Course".to_string(),
        "Range".to_string(),
        "Shoot".to_string(),
        "Penalty".to_string(),
        "Miss".to_string(),
    ];
    if detail {
        headers.extend(["Pr1", "Pr2", "St1", "St2"].map(String::from));
    }

    let mut table = Table::new(headers);
    for row in rows {
        let mut cells = vec![
            row.rank.map(|r| r.to_string()).unwrap_or_default(),
            row.name.clone(),
            row.nat.clone(),
            row.result.clone(),
            row.course.clone(),
            row.range.clone(),
            row.shooting.clone(),
            row.penalty.clone(),
            row.misses.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
        ];
        if detail {
            for stage in 0..4 {
                cells.push(
                    row.stage_misses
                        .get(stage)
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }
        table.push_colored_row(cells, row.rank.and_then(rank_color));
    }
    table
}

async fn breakdown(
    client: &ApiClient,
    race_id: &str,
    payload: &RaceResultsResponse,
    results: Vec<RaceResult>,
    kind: ResultsBreakdown,
    args: &ResultsArgs,
    tsv: bool,
) -> Result<(), AppError> {
    let disc = payload.discipline().to_uppercase();
    let (label, count, total_type): (&str, usize, &str) = match kind {
        ResultsBreakdown::Course => ("Lap", discipline::ski_laps(&disc), analytic::COURSE_TOTAL),
        ResultsBreakdown::Range => (
            "R",
            discipline::shooting_stages(&disc),
            analytic::RANGE_TOTAL,
        ),
        ResultsBreakdown::Shooting => (
            "S",
            discipline::shooting_stages(&disc),
            analytic::SHOOTING_TOTAL,
        ),
    };

    let totals = analytic_map(client, race_id, total_type).await;
    let mut stages: Vec<HashMap<String, String>> = Vec::with_capacity(count);
    for idx in 1..=count {
        let type_id = match kind {
            ResultsBreakdown::Course => analytic::course_lap(idx),
            ResultsBreakdown::Range => analytic::range_stage(idx),
            ResultsBreakdown::Shooting => analytic::shooting_stage(idx),
        };
        stages.push(analytic_map(client, race_id, &type_id).await);
    }

    let mut rows: Vec<(Option<u32>, String, String, Vec<String>, String, bool)> = results
        .iter()
        .map(|res| {
            let stage_times: Vec<String> = stages
                .iter()
                .map(|m| lookup(m, res).unwrap_or_else(|| "-".into()))
                .collect();
            let total = lookup(&totals, res).unwrap_or_else(|| "-".into());
            (
                res.rank_number(),
                res.display_name().to_string(),
                res.nat.clone(),
                stage_times,
                total,
                res.is_dns(),
            )
        })
        .collect();

    // Breakdowns order by the slice total; the final rank column stays for
    // cross reference.
    sort_rows(&mut rows, |(_, _, _, _, total, dns)| {
        if *dns {
            SortValue::Missing
        } else {
            SortValue::time(Some(total))
        }
    });
    apply_limit(&mut rows, args.limit);

    let mut headers = vec!["Rank".to_string(), "Biathlete".to_string(), "Nat".to_string()];
    for idx in 1..=count {
        headers.push(format!("{label}{idx}"));
    }
    headers.push("Total".to_string());

    let mut table = Table::new(headers);
    for (rank, name, nat, stage_times, total, _) in &rows {
        let mut cells = vec![
            rank.map(|r| r.to_string()).unwrap_or_default(),
            name.clone(),
            nat.clone(),
        ];
        cells.extend(stage_times.iter().cloned());
        cells.push(total.clone());
        table.push_colored_row(cells, rank.and_then(|r| rank_color(r)));
    }
    print_table(&table, tsv);
    Ok(())
}

/// Analytic times keyed by every identifier a result row may carry. Races
/// without the requested slice published yield an empty map instead of an
/// error.
pub(crate) async fn analytic_map(
    client: &ApiClient,
    race_id: &str,
    type_id: &str,
) -> HashMap<String, String> {
    let payload = match client.fetch_analytic_results(race_id, type_id).await {
        Ok(payload) => payload,
        Err(_) => return HashMap::new(),
    };
    let mut times = HashMap::new();
    for res in payload.results.iter().filter(|r| !r.is_team) {
        let Some(time) = res.total_time.as_deref().or(res.result.as_deref()) else {
            continue;
        };
        for key in [res.ibu_id.as_deref(), res.bib.as_deref()] {
            if let Some(key) = key {
                times.insert(key.to_string(), time.to_string());
            }
        }
        if !res.name.is_empty() {
            times.insert(res.name.clone(), time.to_string());
        }
    }
    times
}

pub(crate) fn lookup(times: &HashMap<String, String>, res: &RaceResult) -> Option<String> {
    for key in [
        res.ibu_id.as_deref(),
        res.bib.as_deref(),
        Some(res.name.as_str()),
        Some(res.short_name.as_str()),
    ]
    .into_iter()
    .flatten()
    {
        if let Some(time) = times.get(key) {
            return Some(time.clone());
        }
    }
    None
}

/// IBU ids of the top N in the current total score standings for a category.
async fn top_total_score_ids(
    client: &ApiClient,
    cat: &str,
    top: usize,
) -> Result<Vec<String>, AppError> {
    if top == 0 || !matches!(cat, "SW" | "SM") {
        return Ok(Vec::new());
    }
    let season_id = client.current_season_id().await?;
    let cups = client.fetch_cups(&season_id).await?;
    let Some(cup_id) = crate::commands::standings::find_cup_id(&cups, cat, 1, "TS") else {
        return Ok(Vec::new());
    };
    let standings = client.fetch_cup_results(&cup_id).await?;
    Ok(standings
        .rows
        .iter()
        .filter_map(|row| row.ibu_id.clone())
        .take(top)
        .collect())
}
