//! `seasons` subcommand

use crossterm::style::Color;

use crate::api::models::Season;
use crate::api::ApiClient;
use crate::cli::SeasonsArgs;
use crate::commands::print_table;
use crate::error::AppError;
use crate::report::{apply_limit, Table};

pub async fn run(client: &ApiClient, args: &SeasonsArgs, tsv: bool) -> Result<(), AppError> {
    let mut seasons = client.fetch_seasons().await?;
    if seasons.is_empty() {
        return Err(AppError::no_results("no seasons available"));
    }
    seasons.sort_by_key(|s| std::cmp::Reverse(s.sort_order));
    apply_limit(&mut seasons, args.limit);

    print_table(&build_table(&seasons), tsv);
    Ok(())
}

/// Seasons already over get dimmed, the current one highlighted. Seasons
/// published ahead of the current one stay uncolored.
fn season_color(season: &Season, current_sort_order: Option<i64>) -> Option<Color> {
    if season.is_current {
        Some(Color::Green)
    } else if current_sort_order.is_some_and(|current| season.sort_order < current) {
        Some(Color::DarkGrey)
    } else {
        None
    }
}

fn build_table(seasons: &[Season]) -> Table {
    let current_sort_order = seasons.iter().find(|s| s.is_current).map(|s| s.sort_order);

    let mut table = Table::new(vec!["Season".into(), "Description".into()]);
    for season in seasons {
        let description = if season.is_current {
            format!("{} *", season.description)
        } else {
            season.description.clone()
        };
        table.push_colored_row(
            vec![season.season_id.clone().unwrap_or_default(), description],
            season_color(season, current_sort_order),
        );
    }
    table
}
