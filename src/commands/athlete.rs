//! `biathlete` subcommand: bios, id lookup, and season race ranks.

use std::collections::BTreeMap;

use tracing::debug;

use crate::api::models::AthleteHit;
use crate::api::ApiClient;
use crate::cli::{BiathleteAction, BiathleteArgs};
use crate::commands::{print_table, resolve_season};
use crate::error::AppError;
use crate::report::Table;
use crate::timing::date_only;

pub async fn run(client: &ApiClient, args: &BiathleteArgs, tsv: bool) -> Result<(), AppError> {
    match args.action {
        BiathleteAction::Info => info(client, args, tsv).await,
        BiathleteAction::Id => id_lookup(client, args, tsv).await,
        BiathleteAction::Results => season_results(client, args, tsv).await,
    }
}

fn requested_ids(args: &BiathleteArgs) -> Vec<String> {
    args.id
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a search term into (family, given) the way the register expects:
/// the last token is the family name, anything before it the given name.
fn split_name(term: &str) -> (String, String) {
    let tokens: Vec<&str> = term.split_whitespace().collect();
    match tokens.split_last() {
        Some((family, given)) => (family.to_string(), given.join(" ")),
        None => (String::new(), String::new()),
    }
}

async fn search_hits(client: &ApiClient, term: &str) -> Result<Vec<AthleteHit>, AppError> {
    let (family, given) = split_name(term);
    let mut hits: BTreeMap<String, AthleteHit> = BTreeMap::new();
    let mut collect = |batch: Vec<AthleteHit>| {
        for hit in batch {
            if let Some(id) = hit.ibu_id.clone() {
                hits.entry(id).or_insert(hit);
            }
        }
    };
    collect(client.search_athletes(&family, &given).await?.athletes);
    // A single token can be either name; try both directions.
    if given.is_empty() && !family.is_empty() {
        if let Ok(more) = client.search_athletes("", &family).await {
            collect(more.athletes);
        }
    }
    Ok(hits.into_values().collect())
}

async fn info(client: &ApiClient, args: &BiathleteArgs, tsv: bool) -> Result<(), AppError> {
    let mut ids = requested_ids(args);
    if let Some(term) = args.search.as_deref() {
        ids.extend(search_hits(client, term).await?.into_iter().filter_map(|h| h.ibu_id));
    }
    if ids.is_empty() {
        return Err(AppError::usage("provide --id or --search"));
    }

    let mut table = Table::new(
        ["Name", "Country", "Age", "BornIn", "Residence", "Profession", "IBUId"]
            .map(String::from)
            .to_vec(),
    );
    for ibu_id in &ids {
        let bio = match client.fetch_bio(ibu_id).await {
            Ok(bio) => bio,
            Err(e) if e.is_not_found() => {
                debug!("no bio for {ibu_id}");
                continue;
            }
            Err(e) => return Err(e),
        };
        let age = bio
            .age
            .as_deref()
            .or_else(|| bio.personal_value("age"))
            .map(|a| a.split(',').next().unwrap_or(a).trim().to_string())
            .unwrap_or_else(|| "-".into());
        let personal = |key: &str| bio.personal_value(key).unwrap_or("-").to_string();
        let name = if bio.full_name.is_empty() {
            format!("IBU {ibu_id}")
        } else {
            bio.full_name.clone()
        };
        table.push_row(vec![
            name,
            bio.nat.clone(),
            age,
            personal("born in"),
            personal("residence"),
            personal("profession"),
            ibu_id.clone(),
        ]);
    }

    if table.is_empty() {
        return Err(AppError::no_results("no bios found"));
    }
    println!("# Athlete info");
    print_table(&table, tsv);
    Ok(())
}

async fn id_lookup(client: &ApiClient, args: &BiathleteArgs, tsv: bool) -> Result<(), AppError> {
    let Some(term) = args.search.as_deref() else {
        return Err(AppError::usage("provide --search"));
    };
    let mut hits = search_hits(client, term).await?;
    if hits.is_empty() {
        return Err(AppError::no_results(format!(
            "no athletes matched search '{term}'"
        )));
    }

    // The register sometimes omits the nation; the bio usually has it.
    for hit in &mut hits {
        if hit.nat.is_empty() {
            if let Some(id) = hit.ibu_id.as_deref() {
                if let Ok(bio) = client.fetch_bio(id).await {
                    hit.nat = bio.nat;
                }
            }
        }
    }
    hits.sort_by_key(|h| h.display_name());

    let mut table = Table::new(["Name", "Country", "IBUId"].map(String::from).to_vec());
    for hit in &hits {
        table.push_row(vec![
            hit.display_name(),
            hit.nat.clone(),
            hit.ibu_id.clone().unwrap_or_default(),
        ]);
    }
    println!("# Athlete IBU ids");
    print_table(&table, tsv);
    Ok(())
}

async fn season_results(client: &ApiClient, args: &BiathleteArgs, tsv: bool) -> Result<(), AppError> {
    let ids: Vec<String> = requested_ids(args)
        .into_iter()
        .map(|id| id.to_lowercase())
        .collect();
    let search = args.search.as_deref().map(str::to_lowercase);
    if ids.is_empty() && search.is_none() {
        return Err(AppError::usage("provide --id or --search"));
    }

    let season_id = resolve_season(client, args.season.as_deref()).await?;
    let levels: Vec<i32> = if (1..=5).contains(&args.level) {
        vec![args.level]
    } else {
        (1..=5).collect()
    };

    // label keyed by athlete identity, rank per athlete per race
    let mut athletes: BTreeMap<String, String> = BTreeMap::new();
    let mut entries: Vec<(String, String, String, String, BTreeMap<String, String>)> = Vec::new();

    for level in levels {
        let events = client.fetch_events(&season_id, level).await?;
        for event in &events {
            let Some(event_id) = event.event_id.as_deref() else { continue };
            let mut races = client.fetch_races(event_id).await?;
            races.sort_by(|a, b| a.start_key().cmp(b.start_key()));
            for race in &races {
                let Some(race_id) = race.race_id.as_deref() else { continue };
                let payload = match client.fetch_results(race_id).await {
                    Ok(p) => p,
                    Err(e) if e.is_not_found() => continue,
                    Err(e) => return Err(e),
                };
                let mut matches: BTreeMap<String, String> = BTreeMap::new();
                for res in payload.results.iter().filter(|r| !r.is_team) {
                    let ibu = res.ibu_id.as_deref().unwrap_or("").to_lowercase();
                    let name = res.display_name();
                    let wanted = ids.contains(&ibu)
                        || search
                            .as_deref()
                            .is_some_and(|t| name.to_lowercase().contains(t));
                    if !wanted {
                        continue;
                    }
                    let key = if ibu.is_empty() { name.to_lowercase() } else { ibu };
                    let rank = res
                        .rank
                        .clone()
                        .or_else(|| res.result_order.map(|o| o.to_string()))
                        .unwrap_or_default();
                    matches.insert(key.clone(), rank);
                    athletes.entry(key).or_insert_with(|| {
                        if res.nat.is_empty() {
                            name.to_string()
                        } else {
                            format!("{name} ({})", res.nat)
                        }
                    });
                }
                if !matches.is_empty() {
                    let start = payload
                        .competition
                        .as_ref()
                        .map(|c| date_only(&c.start_time).to_string())
                        .unwrap_or_default();
                    let race_label = payload
                        .competition
                        .as_ref()
                        .map(|c| c.label().to_string())
                        .unwrap_or_else(|| race.label().to_string());
                    entries.push((
                        start,
                        event.location().to_string(),
                        race_label,
                        race_id.to_string(),
                        matches,
                    ));
                }
            }
        }
    }

    if athletes.is_empty() {
        return Err(AppError::no_results("no results found for the given athletes"));
    }
    entries.sort_by(|a, b| b.0.cmp(&a.0));

    let mut headers = vec![
        "Date".to_string(),
        "Location".to_string(),
        "Race".to_string(),
        "RaceId".to_string(),
    ];
    headers.extend(athletes.values().cloned());

    let mut table = Table::new(headers);
    for (date, location, race_label, race_id, matches) in &entries {
        let mut cells = vec![date.clone(), location.clone(), race_label.clone(), race_id.clone()];
        for key in athletes.keys() {
            cells.push(matches.get(key).cloned().unwrap_or_default());
        }
        table.push_row(cells);
    }
    println!("# Athlete results - season {season_id}");
    print_table(&table, tsv);
    Ok(())
}
