//! URL building for the results API endpoints

use reqwest::Url;

/// Builds the URL listing all seasons.
///
/// # Example
/// ```
/// use biathlon_results::api::build_seasons_url;
///
/// let url = build_seasons_url("https://api.example.com");
/// assert_eq!(url, "https://api.example.com/Seasons");
/// ```
pub fn build_seasons_url(api_base: &str) -> String {
    format!("{api_base}/Seasons")
}

/// Builds the URL listing the events of one season at one competition level.
///
/// # Example
/// ```
/// use biathlon_results::api::build_events_url;
///
/// let url = build_events_url("https://api.example.com", "2526", 1);
/// assert_eq!(url, "https://api.example.com/Events?SeasonId=2526&Level=1");
/// ```
pub fn build_events_url(api_base: &str, season_id: &str, level: i32) -> String {
    format!("{api_base}/Events?SeasonId={season_id}&Level={level}")
}

/// Builds the URL listing the races of one event.
pub fn build_races_url(api_base: &str, event_id: &str) -> String {
    format!("{api_base}/Competitions?EventId={event_id}")
}

/// Builds the URL for the final results of one race.
pub fn build_results_url(api_base: &str, race_id: &str) -> String {
    format!("{api_base}/Results?RaceId={race_id}")
}

/// Builds the URL for one analytic slice (course, range, or shooting splits)
/// of one race.
pub fn build_analytic_url(api_base: &str, race_id: &str, type_id: &str) -> String {
    format!("{api_base}/AnalyticResults?RaceId={race_id}&TypeId={type_id}")
}

/// Builds the URL listing the cup competitions of one season.
pub fn build_cups_url(api_base: &str, season_id: &str) -> String {
    format!("{api_base}/Cups?SeasonId={season_id}")
}

/// Builds the URL for the standings of one cup.
pub fn build_cup_results_url(api_base: &str, cup_id: &str) -> String {
    format!("{api_base}/CupResults?CupId={cup_id}")
}

/// Builds the URL for one athlete's CIS bio.
pub fn build_bio_url(api_base: &str, ibu_id: &str) -> String {
    format!("{api_base}/CISBios?IBUId={ibu_id}")
}

/// Builds the URL for the athlete name search. Name fragments come from the
/// command line, so they go through proper query encoding.
pub fn build_athlete_search_url(api_base: &str, family_name: &str, given_name: &str) -> String {
    let endpoint = format!("{api_base}/Athletes");
    match Url::parse_with_params(
        &endpoint,
        &[
            ("FamilyName", family_name),
            ("GivenName", given_name),
            ("RequestId", "0"),
        ],
    ) {
        Ok(url) => url.to_string(),
        // Unreachable for a well-formed base URL; keep the raw endpoint so
        // the error surfaces as an HTTP failure instead of a panic.
        Err(_) => endpoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://biathlonresults.com/modules/sportapi/api";

    #[test]
    fn test_build_results_url() {
        assert_eq!(
            build_results_url(BASE, "BT2526SWRLCP01SWSP"),
            "https://biathlonresults.com/modules/sportapi/api/Results?RaceId=BT2526SWRLCP01SWSP"
        );
    }

    #[test]
    fn test_build_analytic_url() {
        assert_eq!(
            build_analytic_url(BASE, "RACE1", "CRS2"),
            "https://biathlonresults.com/modules/sportapi/api/AnalyticResults?RaceId=RACE1&TypeId=CRS2"
        );
    }

    #[test]
    fn test_build_athlete_search_url_encodes_names() {
        let url = build_athlete_search_url(BASE, "Tandrevold Fjeld", "Ingrid");
        assert_eq!(
            url,
            "https://biathlonresults.com/modules/sportapi/api/Athletes?FamilyName=Tandrevold+Fjeld&GivenName=Ingrid&RequestId=0"
        );
    }
}
