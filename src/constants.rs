//! Application-wide constants: API location, HTTP tuning, and the
//! biathlon discipline/category code tables used across commands.

/// Base URL of the IBU results API. All endpoint paths are appended to this.
pub const API_BASE_URL: &str = "https://biathlonresults.com/modules/sportapi/api";

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Maximum number of connections per host in the HTTP client pool
pub const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// Default number of rows shown by listing commands (0 means unlimited)
pub const DEFAULT_ROW_LIMIT: usize = 25;

/// Discipline and category codes as the API uses them
pub mod discipline {
    /// Relay discipline code
    pub const RELAY: &str = "RL";

    /// Single mixed relay discipline code
    pub const SINGLE_MIXED_RELAY: &str = "SR";

    /// Returns true for the two relay discipline codes.
    pub fn is_relay(code: &str) -> bool {
        code == RELAY || code == SINGLE_MIXED_RELAY
    }

    /// Skiing laps for an individual discipline (sprint has 3, the rest 5).
    pub fn ski_laps(code: &str) -> usize {
        match code {
            "SP" => 3,
            "PU" | "IN" | "MS" => 5,
            _ => 0,
        }
    }

    /// Shooting stages (range visits) for an individual discipline.
    pub fn shooting_stages(code: &str) -> usize {
        match code {
            "SP" => 2,
            "PU" | "IN" | "MS" => 4,
            _ => 0,
        }
    }

    /// Shots fired in an individual discipline (5 per stage).
    pub fn shots(code: &str) -> u32 {
        shooting_stages(code) as u32 * 5
    }

    /// Individual (non-relay, non-team) discipline codes.
    pub const INDIVIDUAL: [&str; 4] = ["SP", "PU", "IN", "MS"];
}

/// Category codes identifying the gender class of a race or cup
pub mod category {
    pub const WOMEN: &str = "SW";
    pub const MEN: &str = "SM";
    pub const MIXED: &str = "MX";
}

/// Event levels as the API numbers them
pub mod level {
    pub const WORLD_CUP: i32 = 1;

    /// Human-readable label for an event level.
    pub fn label(level: i32) -> String {
        match level {
            -1 => "All levels".to_string(),
            0 => "Mixed levels".to_string(),
            1 => "World Cup".to_string(),
            2 => "IBU Cup".to_string(),
            3 => "IBU Cup Junior".to_string(),
            4 => "Other".to_string(),
            5 => "Regional".to_string(),
            6 => "Para-biathlon".to_string(),
            other => other.to_string(),
        }
    }
}

/// Analytic result type ids served by the `AnalyticResults` endpoint
pub mod analytic {
    /// Total course (ski movement) time
    pub const COURSE_TOTAL: &str = "CRST";

    /// Total range (entry to exit) time
    pub const RANGE_TOTAL: &str = "RNGT";

    /// Total shooting time
    pub const SHOOTING_TOTAL: &str = "STTM";

    /// Total ski time (course time plus penalty loop time)
    pub const SKI_TOTAL: &str = "SKIT";

    /// Per-lap course time id, 1-based
    pub fn course_lap(lap: usize) -> String {
        format!("CRS{lap}")
    }

    /// Per-stage range time id, 1-based
    pub fn range_stage(stage: usize) -> String {
        format!("RNG{stage}")
    }

    /// Per-stage shooting time id, 1-based
    pub fn shooting_stage(stage: usize) -> String {
        format!("S{stage}TM")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ski_laps_per_discipline() {
        assert_eq!(discipline::ski_laps("SP"), 3);
        assert_eq!(discipline::ski_laps("PU"), 5);
        assert_eq!(discipline::ski_laps("IN"), 5);
        assert_eq!(discipline::ski_laps("MS"), 5);
        assert_eq!(discipline::ski_laps("RL"), 0);
    }

    #[test]
    fn test_shooting_stages_per_discipline() {
        assert_eq!(discipline::shooting_stages("SP"), 2);
        assert_eq!(discipline::shooting_stages("IN"), 4);
        assert_eq!(discipline::shooting_stages("XX"), 0);
    }

    #[test]
    fn test_shots_per_discipline() {
        assert_eq!(discipline::shots("SP"), 10);
        assert_eq!(discipline::shots("MS"), 20);
        assert_eq!(discipline::shots("RL"), 0);
    }

    #[test]
    fn test_is_relay() {
        assert!(discipline::is_relay("RL"));
        assert!(discipline::is_relay("SR"));
        assert!(!discipline::is_relay("SP"));
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(level::label(1), "World Cup");
        assert_eq!(level::label(2), "IBU Cup");
        assert_eq!(level::label(42), "42");
    }

    #[test]
    fn test_analytic_type_ids() {
        assert_eq!(analytic::course_lap(2), "CRS2");
        assert_eq!(analytic::range_stage(4), "RNG4");
        assert_eq!(analytic::shooting_stage(1), "S1TM");
    }
}
