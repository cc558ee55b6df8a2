//! One module per subcommand, all sharing the same shape: resolve defaults,
//! fetch, filter and sort, render a [`Table`].

pub mod athlete;
pub mod ceremony;
pub mod cumulate;
pub mod events;
pub mod races;
pub mod relay;
pub mod results;
pub mod seasons;
pub mod shooting;
pub mod standings;

use crate::api::ApiClient;
use crate::error::AppError;
use crate::report::{color_enabled, OutputMode, Table};

/// Writes a rendered table to stdout. TSV mode never carries colors.
pub(crate) fn print_table(table: &Table, tsv: bool) {
    let mode = if tsv { OutputMode::Tsv } else { OutputMode::Plain };
    let use_color = !tsv && color_enabled();
    println!("{}", table.render_with_color(mode, use_color));
}

/// Season id from an optional flag, defaulting to the current season.
pub(crate) async fn resolve_season(
    client: &ApiClient,
    season: Option<&str>,
) -> Result<String, AppError> {
    match season {
        Some(id) => Ok(id.to_string()),
        None => client.current_season_id().await,
    }
}
