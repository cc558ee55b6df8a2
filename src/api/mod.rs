//! Typed access to the results API: client construction, URL building,
//! generic fetching, and endpoint wrappers.

pub mod client;
mod endpoints;
mod fetch;
pub mod models;
pub mod urls;

pub use client::ApiClient;
pub use endpoints::{current_season, has_completed_results};
pub use urls::{
    build_analytic_url, build_athlete_search_url, build_bio_url, build_cup_results_url,
    build_cups_url, build_events_url, build_races_url, build_results_url, build_seasons_url,
};
