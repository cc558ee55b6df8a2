//! Typed endpoint wrappers on [`ApiClient`]

use tracing::{debug, info};

use crate::api::client::ApiClient;
use crate::api::fetch::fetch;
use crate::api::models::{
    AthleteBio, AthletesResponse, Cup, CupResultsResponse, Event, Race, RaceResult,
    RaceResultsResponse, Season,
};
use crate::api::urls::{
    build_analytic_url, build_athlete_search_url, build_bio_url, build_cup_results_url,
    build_cups_url, build_events_url, build_races_url, build_results_url, build_seasons_url,
};
use crate::constants::level;
use crate::error::AppError;

impl ApiClient {
    /// All seasons the API knows about.
    pub async fn fetch_seasons(&self) -> Result<Vec<Season>, AppError> {
        fetch(&self.client, &build_seasons_url(&self.base_url)).await
    }

    /// Events of one season at one competition level.
    pub async fn fetch_events(&self, season_id: &str, level: i32) -> Result<Vec<Event>, AppError> {
        fetch(&self.client, &build_events_url(&self.base_url, season_id, level)).await
    }

    /// Races of one event.
    pub async fn fetch_races(&self, event_id: &str) -> Result<Vec<Race>, AppError> {
        fetch(&self.client, &build_races_url(&self.base_url, event_id)).await
    }

    /// Final results of one race.
    pub async fn fetch_results(&self, race_id: &str) -> Result<RaceResultsResponse, AppError> {
        fetch(&self.client, &build_results_url(&self.base_url, race_id)).await
    }

    /// One analytic slice (course, range, or shooting splits) of one race.
    pub async fn fetch_analytic_results(
        &self,
        race_id: &str,
        type_id: &str,
    ) -> Result<RaceResultsResponse, AppError> {
        fetch(
            &self.client,
            &build_analytic_url(&self.base_url, race_id, type_id),
        )
        .await
    }

    /// Cup competitions defined for one season.
    pub async fn fetch_cups(&self, season_id: &str) -> Result<Vec<Cup>, AppError> {
        fetch(&self.client, &build_cups_url(&self.base_url, season_id)).await
    }

    /// Standings of one cup.
    pub async fn fetch_cup_results(&self, cup_id: &str) -> Result<CupResultsResponse, AppError> {
        fetch(&self.client, &build_cup_results_url(&self.base_url, cup_id)).await
    }

    /// CIS bio of one athlete.
    pub async fn fetch_bio(&self, ibu_id: &str) -> Result<AthleteBio, AppError> {
        fetch(&self.client, &build_bio_url(&self.base_url, ibu_id)).await
    }

    /// Name search over the athlete register.
    pub async fn search_athletes(
        &self,
        family_name: &str,
        given_name: &str,
    ) -> Result<AthletesResponse, AppError> {
        fetch(
            &self.client,
            &build_athlete_search_url(&self.base_url, family_name, given_name),
        )
        .await
    }

    /// Id of the current season: the one flagged `IsCurrent`, falling back to
    /// the highest sort order.
    pub async fn current_season_id(&self) -> Result<String, AppError> {
        let seasons = self.fetch_seasons().await?;
        current_season(&seasons)
            .and_then(|s| s.season_id.clone())
            .ok_or_else(|| AppError::no_results("no seasons available"))
    }

    /// Finds the most recent race with completed results: walks the current
    /// season's top-level events newest first and probes each event's races
    /// newest first until a payload with ranked finishers turns up.
    pub async fn latest_completed_race(
        &self,
    ) -> Result<(String, RaceResultsResponse), AppError> {
        self.latest_completed_race_where(|_| true).await
    }

    /// Like [`ApiClient::latest_completed_race`] but only considers races the
    /// predicate accepts, e.g. one discipline and category.
    pub async fn latest_completed_race_where<F>(
        &self,
        accept: F,
    ) -> Result<(String, RaceResultsResponse), AppError>
    where
        F: Fn(&Race) -> bool,
    {
        let season_id = self.current_season_id().await?;
        let mut events = self.fetch_events(&season_id, level::WORLD_CUP).await?;
        events.sort_by(|a, b| b.start_key().cmp(a.start_key()));

        for event in &events {
            let Some(event_id) = event.event_id.as_deref() else {
                continue;
            };
            let mut races = self.fetch_races(event_id).await?;
            races.sort_by(|a, b| b.start_key().cmp(a.start_key()));

            for race in races.iter().filter(|r| accept(r)) {
                let Some(race_id) = race.race_id.as_deref() else {
                    continue;
                };
                debug!("Probing race {} for completed results", race_id);
                let payload = match self.fetch_results(race_id).await {
                    Ok(payload) => payload,
                    // A race without published results is expected while
                    // scanning; keep walking backwards.
                    Err(e) if e.is_not_found() => continue,
                    Err(e) => return Err(e),
                };
                if has_completed_results(&payload.results) {
                    info!("Latest completed race: {}", race_id);
                    return Ok((race_id.to_string(), payload));
                }
            }
        }

        Err(AppError::no_results(
            "no completed races found in the current season",
        ))
    }
}

/// The season flagged current, falling back to the highest sort order.
pub fn current_season(seasons: &[Season]) -> Option<&Season> {
    seasons
        .iter()
        .find(|s| s.is_current)
        .or_else(|| seasons.iter().max_by_key(|s| s.sort_order))
}

/// True when at least one row carries a real final rank. The API publishes
/// placeholder rank 10000 for rows of races still in progress.
pub fn has_completed_results(results: &[RaceResult]) -> bool {
    results.iter().any(|row| {
        let ranked = row
            .rank
            .as_deref()
            .is_some_and(|r| !r.is_empty() && r != "10000");
        let finished = row
            .finish_time()
            .is_some_and(|t| !t.eq_ignore_ascii_case("DNS") && t != "-");
        ranked && finished
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season(id: &str, is_current: bool, sort_order: i64) -> Season {
        serde_json::from_value(serde_json::json!({
            "SeasonId": id,
            "Description": format!("Season {id}"),
            "IsCurrent": is_current,
            "SortOrder": sort_order,
        }))
        .unwrap()
    }

    #[test]
    fn test_current_season_prefers_is_current_flag() {
        let seasons = vec![season("2425", true, 10), season("2526", false, 20)];
        assert_eq!(
            current_season(&seasons).unwrap().season_id.as_deref(),
            Some("2425")
        );
    }

    #[test]
    fn test_current_season_falls_back_to_sort_order() {
        let seasons = vec![season("2425", false, 10), season("2526", false, 20)];
        assert_eq!(
            current_season(&seasons).unwrap().season_id.as_deref(),
            Some("2526")
        );
    }

    #[test]
    fn test_has_completed_results() {
        let ranked: RaceResult =
            serde_json::from_str(r#"{"Rank": "1", "Result": "24:31.1"}"#).unwrap();
        let placeholder: RaceResult =
            serde_json::from_str(r#"{"Rank": "10000", "Result": "24:31.1"}"#).unwrap();
        let dns: RaceResult = serde_json::from_str(r#"{"Rank": "1", "Result": "DNS"}"#).unwrap();

        assert!(has_completed_results(&[ranked]));
        assert!(!has_completed_results(&[placeholder]));
        assert!(!has_completed_results(&[dns]));
        assert!(!has_completed_results(&[]));
    }
}
