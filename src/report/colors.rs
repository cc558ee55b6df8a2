//! Terminal color selection for rendered tables

use crossterm::style::Color;
use std::io::IsTerminal;

/// Medal and flower-ceremony highlighting for result rows.
pub fn rank_color(rank: u32) -> Option<Color> {
    match rank {
        1 => Some(Color::Yellow),
        2 => Some(Color::White),
        3 => Some(Color::DarkYellow),
        4..=6 => Some(Color::Cyan),
        _ => None,
    }
}

/// Colors are applied only when stdout is a terminal and the user has not
/// opted out via `NO_COLOR`.
pub fn color_enabled() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_color_medals_and_flowers() {
        assert_eq!(rank_color(1), Some(Color::Yellow));
        assert_eq!(rank_color(2), Some(Color::White));
        assert_eq!(rank_color(3), Some(Color::DarkYellow));
        assert_eq!(rank_color(4), Some(Color::Cyan));
        assert_eq!(rank_color(6), Some(Color::Cyan));
        assert_eq!(rank_color(7), None);
    }
}
