//! Serde models mirroring the results API's JSON payloads.
//!
//! Field names on the wire are PascalCase. Several identifier fields (Rank,
//! Bib, Age, Score) are served as a number in some payloads and a string in
//! others; the deserializers here normalize them at the boundary so command
//! code never sees `serde_json::Value`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserializes a field that may arrive as string, number, or null into an
/// optional string. Empty strings count as missing.
fn opt_stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Deserializes cup points that may arrive as `745`, `"745"`, or null.
fn points<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    #[serde(rename = "SeasonId", default, deserialize_with = "opt_stringish")]
    pub season_id: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "IsCurrent", default)]
    pub is_current: bool,
    #[serde(rename = "SortOrder", default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "EventId", default, deserialize_with = "opt_stringish")]
    pub event_id: Option<String>,
    #[serde(rename = "SeasonId", default, deserialize_with = "opt_stringish")]
    pub season_id: Option<String>,
    #[serde(rename = "Level", default)]
    pub level: i32,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "ShortDescription", default)]
    pub short_description: String,
    #[serde(rename = "Organizer", default)]
    pub organizer: String,
    #[serde(rename = "Nat", default)]
    pub nat: String,
    #[serde(rename = "StartDate", default)]
    pub start_date: String,
    #[serde(rename = "EndDate", default)]
    pub end_date: String,
    #[serde(rename = "FirstCompetitionDate", default)]
    pub first_competition_date: String,
}

impl Event {
    /// Location label: the short description, falling back to the organizer.
    pub fn location(&self) -> &str {
        if !self.short_description.is_empty() {
            &self.short_description
        } else {
            &self.organizer
        }
    }

    /// First day of the event as a sortable string.
    pub fn start_key(&self) -> &str {
        if !self.start_date.is_empty() {
            &self.start_date
        } else {
            &self.first_competition_date
        }
    }
}

/// A race, served by the API as a "Competition".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    #[serde(rename = "RaceId", alias = "Id", default, deserialize_with = "opt_stringish")]
    pub race_id: Option<String>,
    #[serde(rename = "DisciplineId", default)]
    pub discipline_id: String,
    #[serde(rename = "catId", alias = "CatId", default)]
    pub cat_id: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "ShortDescription", default)]
    pub short_description: String,
    #[serde(rename = "StartTime", default)]
    pub start_time: String,
    #[serde(rename = "Location", default)]
    pub location: String,
    #[serde(rename = "StartDate", default)]
    pub start_date: String,
}

impl Race {
    /// Display label: short description, full description, then the id.
    pub fn label(&self) -> &str {
        if !self.short_description.is_empty() {
            &self.short_description
        } else if !self.description.is_empty() {
            &self.description
        } else {
            self.race_id.as_deref().unwrap_or("")
        }
    }

    /// Start instant as a sortable string (StartTime or StartDate).
    pub fn start_key(&self) -> &str {
        if !self.start_time.is_empty() {
            &self.start_time
        } else {
            &self.start_date
        }
    }
}

/// Summary of the host event embedded in a results payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SportEvent {
    #[serde(rename = "ShortDescription", default)]
    pub short_description: String,
    #[serde(rename = "Organizer", default)]
    pub organizer: String,
    #[serde(rename = "Nat", default)]
    pub nat: String,
}

/// One competitor (or relay team / relay leg) row in a results payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceResult {
    #[serde(rename = "IBUId", default, deserialize_with = "opt_stringish")]
    pub ibu_id: Option<String>,
    #[serde(rename = "Bib", default, deserialize_with = "opt_stringish")]
    pub bib: Option<String>,
    #[serde(rename = "Leg", default)]
    pub leg: Option<i32>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "ShortName", default)]
    pub short_name: String,
    #[serde(rename = "Nat", default)]
    pub nat: String,
    #[serde(rename = "Rank", default, deserialize_with = "opt_stringish")]
    pub rank: Option<String>,
    #[serde(rename = "ResultOrder", default)]
    pub result_order: Option<i64>,
    #[serde(rename = "Result", default, deserialize_with = "opt_stringish")]
    pub result: Option<String>,
    #[serde(rename = "TotalTime", default, deserialize_with = "opt_stringish")]
    pub total_time: Option<String>,
    #[serde(rename = "Behind", default, deserialize_with = "opt_stringish")]
    pub behind: Option<String>,
    #[serde(rename = "Shootings", default, deserialize_with = "opt_stringish")]
    pub shootings: Option<String>,
    #[serde(rename = "ShootingTotal", default, deserialize_with = "opt_stringish")]
    pub shooting_total: Option<String>,
    #[serde(rename = "IsTeam", default)]
    pub is_team: bool,
    #[serde(rename = "IRM", default, deserialize_with = "opt_stringish")]
    pub irm: Option<String>,
    #[serde(rename = "StartOrder", default, deserialize_with = "opt_stringish")]
    pub start_order: Option<String>,
    #[serde(rename = "TotalCourseTime", default, deserialize_with = "opt_stringish")]
    pub total_course_time: Option<String>,
    #[serde(rename = "TotalRangeTime", default, deserialize_with = "opt_stringish")]
    pub total_range_time: Option<String>,
    #[serde(rename = "TotalShootingTime", default, deserialize_with = "opt_stringish")]
    pub total_shooting_time: Option<String>,
}

impl RaceResult {
    /// Athlete display name, preferring the full name.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            &self.short_name
        }
    }

    /// Rank as a number when the API served a numeric rank.
    pub fn rank_number(&self) -> Option<u32> {
        self.rank.as_deref()?.trim().parse().ok()
    }

    /// Finish time string: `Result` falling back to `TotalTime`.
    pub fn finish_time(&self) -> Option<&str> {
        self.result.as_deref().or(self.total_time.as_deref())
    }

    /// True when the row represents a non-starter.
    pub fn is_dns(&self) -> bool {
        let irm_dns = self
            .irm
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("DNS"));
        let result_dns = self
            .finish_time()
            .is_some_and(|v| v.eq_ignore_ascii_case("DNS"));
        irm_dns || result_dns
    }
}

/// Full payload of the `Results` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RaceResultsResponse {
    #[serde(rename = "Competition", default)]
    pub competition: Option<Race>,
    #[serde(rename = "SportEvt", default)]
    pub sport_event: Option<SportEvent>,
    #[serde(rename = "Results", default)]
    pub results: Vec<RaceResult>,
}

impl RaceResultsResponse {
    /// Discipline code of the race, when the payload names it.
    pub fn discipline(&self) -> &str {
        self.competition
            .as_ref()
            .map(|c| c.discipline_id.as_str())
            .unwrap_or("")
    }

    /// Non-team rows sorted by rank, unranked rows last in result order.
    pub fn individual_results(&self) -> Vec<&RaceResult> {
        let mut rows: Vec<&RaceResult> = self.results.iter().filter(|r| !r.is_team).collect();
        rows.sort_by_key(|r| {
            (
                r.rank_number().map(i64::from).unwrap_or(i64::MAX),
                r.result_order.unwrap_or(i64::MAX),
            )
        });
        rows
    }

    /// Header line for the race: label, host location, start time, race id.
    pub fn header(&self, race_id: &str) -> String {
        let race_label = self
            .competition
            .as_ref()
            .map(|c| c.label().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| race_id.to_string());
        let event_label = self
            .sport_event
            .as_ref()
            .map(|e| {
                if !e.short_description.is_empty() {
                    e.short_description.clone()
                } else {
                    e.organizer.clone()
                }
            })
            .filter(|l| !l.is_empty());
        let start = self
            .competition
            .as_ref()
            .map(|c| crate::timing::format_start_datetime(&c.start_time))
            .filter(|s| !s.is_empty());

        let mut header = format!("# {race_label}");
        if let Some(event) = event_label {
            header.push_str(&format!(" - {event}"));
        }
        if let Some(start) = start {
            header.push_str(&format!(" {start}"));
        }
        header.push_str(&format!(" ({race_id})"));
        header
    }
}

/// A cup (points competition) definition for a season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cup {
    #[serde(rename = "CupId", default, deserialize_with = "opt_stringish")]
    pub cup_id: Option<String>,
    #[serde(rename = "SeasonId", default, deserialize_with = "opt_stringish")]
    pub season_id: Option<String>,
    #[serde(rename = "CatId", default)]
    pub cat_id: String,
    #[serde(rename = "Level", default)]
    pub level: i32,
    #[serde(rename = "DisciplineId", default)]
    pub discipline_id: String,
    #[serde(rename = "Description", default)]
    pub description: String,
}

/// One athlete row in a cup standings payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CupRow {
    #[serde(rename = "IBUId", alias = "IbuId", default, deserialize_with = "opt_stringish")]
    pub ibu_id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Nat", default)]
    pub nat: String,
    #[serde(rename = "Rank", default, deserialize_with = "opt_stringish")]
    pub rank: Option<String>,
    #[serde(rename = "Score", default, deserialize_with = "points")]
    pub score: i64,
}

/// Payload of the `CupResults` endpoint. Older seasons use `Results` instead
/// of `Rows` for the standings list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CupResultsResponse {
    #[serde(rename = "Rows", alias = "Results", default)]
    pub rows: Vec<CupRow>,
}

/// One `Description`/`Value` attribute in an athlete bio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BioAttribute {
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Value", default, deserialize_with = "opt_stringish")]
    pub value: Option<String>,
}

/// CIS bio payload for one athlete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthleteBio {
    #[serde(rename = "IBUId", default, deserialize_with = "opt_stringish")]
    pub ibu_id: Option<String>,
    #[serde(rename = "FullName", default)]
    pub full_name: String,
    #[serde(rename = "NAT", default)]
    pub nat: String,
    #[serde(rename = "Age", default, deserialize_with = "opt_stringish")]
    pub age: Option<String>,
    #[serde(rename = "PhotoURI", default, deserialize_with = "opt_stringish")]
    pub photo_uri: Option<String>,
    #[serde(rename = "Personal", default)]
    pub personal: Vec<BioAttribute>,
}

impl AthleteBio {
    /// Case-insensitive lookup in the free-form personal attribute list.
    pub fn personal_value(&self, key: &str) -> Option<&str> {
        self.personal
            .iter()
            .find(|attr| attr.description.eq_ignore_ascii_case(key))
            .and_then(|attr| attr.value.as_deref())
    }
}

/// One hit from the `Athletes` name search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteHit {
    #[serde(rename = "IBUId", alias = "IbuId", default, deserialize_with = "opt_stringish")]
    pub ibu_id: Option<String>,
    #[serde(rename = "GivenName", default)]
    pub given_name: String,
    #[serde(rename = "FamilyName", default)]
    pub family_name: String,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Nat", alias = "Nation", default)]
    pub nat: String,
}

impl AthleteHit {
    /// Display name, assembled from given/family names when needed.
    pub fn display_name(&self) -> String {
        if !self.name.is_empty() {
            return self.name.clone();
        }
        let assembled = format!("{} {}", self.given_name, self.family_name);
        let assembled = assembled.trim();
        if assembled.is_empty() {
            match &self.ibu_id {
                Some(id) => format!("IBU {id}"),
                None => String::new(),
            }
        } else {
            assembled.to_string()
        }
    }
}

/// Payload of the `Athletes` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AthletesResponse {
    #[serde(rename = "Athletes", alias = "athletes", default)]
    pub athletes: Vec<AthleteHit>,
}
