//! Plain-text table rendering

use crossterm::style::{Color, Stylize};

/// How a table is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Space-padded columns for human reading.
    #[default]
    Plain,
    /// Tab-separated values for piping into other tools.
    Tsv,
}

/// A header row plus data rows, rendered as aligned text. Rows may carry an
/// optional highlight color, applied only in plain mode on a terminal.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    row_colors: Vec<Option<Color>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
            row_colors: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.push_colored_row(row, None);
    }

    pub fn push_colored_row(&mut self, row: Vec<String>, color: Option<Color>) {
        self.rows.push(row);
        self.row_colors.push(color);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Renders the table as one header line plus one line per row. In plain
    /// mode every column is padded to the widest cell and columns are joined
    /// by two spaces, so all lines come out the same width. TSV mode joins
    /// cells with tabs and never pads.
    pub fn render(&self, mode: OutputMode) -> String {
        self.render_with_color(mode, false)
    }

    /// Like [`Table::render`] but optionally wraps highlighted rows in
    /// terminal colors.
    pub fn render_with_color(&self, mode: OutputMode, use_color: bool) -> String {
        match mode {
            OutputMode::Tsv => self.render_tsv(),
            OutputMode::Plain => self.render_plain(use_color),
        }
    }

    fn render_tsv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.headers.join("\t"));
        for row in &self.rows {
            lines.push(row.join("\t"));
        }
        lines.join("\n")
    }

    fn render_plain(&self, use_color: bool) -> String {
        let widths = self.column_widths();
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(pad_cells(&self.headers, &widths));
        for (row, color) in self.rows.iter().zip(&self.row_colors) {
            let line = pad_cells(row, &widths);
            match color {
                Some(c) if use_color => lines.push(line.with(*c).to_string()),
                _ => lines.push(line),
            }
        }
        lines.join("\n")
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .headers
            .len()
            .max(self.rows.iter().map(Vec::len).max().unwrap_or(0));
        let mut widths = vec![0usize; columns];
        for (i, h) in self.headers.iter().enumerate() {
            widths[i] = widths[i].max(h.chars().count());
        }
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        widths
    }
}

fn pad_cells(cells: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            format!("{cell:<width$}")
        })
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table = Table::new(vec!["Rank".into(), "Name".into(), "Time".into()]);
        table.push_row(vec!["1".into(), "Johannes Dale-Skjevdal".into(), "24:31.1".into()]);
        table.push_row(vec!["2".into(), "Sturla H. Laegreid".into(), "+14.2".into()]);
        table
    }

    #[test]
    fn test_render_line_count() {
        let rendered = sample().render(OutputMode::Plain);
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn test_plain_lines_share_width() {
        let rendered = sample().render(OutputMode::Plain);
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{widths:?}");
    }

    #[test]
    fn test_plain_pads_columns() {
        let rendered = sample().render(OutputMode::Plain);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[0].starts_with("Rank  Name"));
        assert!(lines[1].starts_with("1     Johannes Dale-Skjevdal"));
    }

    #[test]
    fn test_tsv_uses_tabs_without_padding() {
        let rendered = sample().render(OutputMode::Tsv);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Rank\tName\tTime");
        assert_eq!(lines[1], "1\tJohannes Dale-Skjevdal\t24:31.1");
    }

    #[test]
    fn test_short_rows_are_padded_out() {
        let mut table = Table::new(vec!["A".into(), "B".into()]);
        table.push_row(vec!["only".into()]);
        let rendered = table.render(OutputMode::Plain);
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert_eq!(widths[0], widths[1]);
    }

    #[test]
    fn test_color_wraps_highlighted_rows_only() {
        let mut table = Table::new(vec!["Rank".into()]);
        table.push_colored_row(vec!["1".into()], Some(Color::Yellow));
        table.push_row(vec!["7".into()]);
        let rendered = table.render_with_color(OutputMode::Plain, true);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[1].contains('\u{1b}'));
        assert!(!lines[2].contains('\u{1b}'));
    }

    #[test]
    fn test_tsv_ignores_colors() {
        let mut table = Table::new(vec!["Rank".into()]);
        table.push_colored_row(vec!["1".into()], Some(Color::Yellow));
        let rendered = table.render_with_color(OutputMode::Tsv, true);
        assert!(!rendered.contains('\u{1b}'));
    }
}
