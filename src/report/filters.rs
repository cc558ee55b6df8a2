//! Row filtering and sorting shared by the result commands

use std::cmp::Ordering;

use crate::timing::parse_time_seconds;

/// A comparable cell value. Rows whose sort column failed to parse (DNS,
/// lapped markers, empty cells) become [`SortValue::Missing`] and always sort
/// after every real value, so non-finishers sink to the bottom of any sorted
/// listing.
#[derive(Debug, Clone)]
pub enum SortValue {
    Time(f64),
    Int(i64),
    Text(String),
    Missing,
}

impl SortValue {
    /// Parses an optional time string ("24:31.1", "+14.2") into a key.
    pub fn time(value: Option<&str>) -> Self {
        value
            .and_then(parse_time_seconds)
            .map(SortValue::Time)
            .unwrap_or(SortValue::Missing)
    }

    /// Parses an optional integer string into a key.
    pub fn int(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(SortValue::Int)
            .unwrap_or(SortValue::Missing)
    }

    /// Case-folded text key; empty text counts as missing.
    pub fn text(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            SortValue::Missing
        } else {
            SortValue::Text(trimmed.to_lowercase())
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Missing, Missing) => Ordering::Equal,
            (Missing, _) => Ordering::Greater,
            (_, Missing) => Ordering::Less,
            (Time(a), Time(b)) => a.total_cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Time(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Int(a), Time(b)) => (*a as f64).total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            // Numbers sort before text when a column mixes both.
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

/// Stable ascending sort by the given key.
pub fn sort_rows<T, F>(rows: &mut [T], key: F)
where
    F: Fn(&T) -> SortValue,
{
    rows.sort_by(|a, b| key(a).cmp(&key(b)));
}

/// Keeps only rows whose nation matches, case-insensitively. `None` keeps
/// everything.
pub fn filter_nation<T, F>(rows: Vec<T>, nation: Option<&str>, nat_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    match nation {
        None => rows,
        Some(wanted) => rows
            .into_iter()
            .filter(|row| nat_of(row).eq_ignore_ascii_case(wanted))
            .collect(),
    }
}

/// Truncates to at most `limit` rows; zero means unlimited.
pub fn apply_limit<T>(rows: &mut Vec<T>, limit: usize) {
    if limit > 0 && rows.len() > limit {
        rows.truncate(limit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sorts_last() {
        let mut values = vec![
            SortValue::Missing,
            SortValue::Time(90.5),
            SortValue::Time(12.0),
            SortValue::Missing,
        ];
        values.sort();
        assert!(matches!(values[0], SortValue::Time(t) if t == 12.0));
        assert!(matches!(values[1], SortValue::Time(t) if t == 90.5));
        assert!(matches!(values[2], SortValue::Missing));
        assert!(matches!(values[3], SortValue::Missing));
    }

    #[test]
    fn test_time_parsing_keys() {
        assert!(SortValue::time(Some("1:30.5")) < SortValue::time(Some("1:31.0")));
        assert!(SortValue::time(Some("+14.2")) < SortValue::time(Some("1:00.0")));
        assert_eq!(SortValue::time(Some("DNS")), SortValue::Missing);
        assert_eq!(SortValue::time(None), SortValue::Missing);
    }

    #[test]
    fn test_text_keys_fold_case() {
        assert_eq!(SortValue::text("NOR"), SortValue::text("nor"));
        assert_eq!(SortValue::text("  "), SortValue::Missing);
    }

    #[test]
    fn test_sort_rows_is_stable_for_equal_keys() {
        let mut rows = vec![("b", 1), ("a", 1), ("c", 0)];
        sort_rows(&mut rows, |r| SortValue::Int(r.1));
        assert_eq!(rows, vec![("c", 0), ("b", 1), ("a", 1)]);
    }

    #[test]
    fn test_filter_nation_case_insensitive() {
        let rows = vec![("A", "NOR"), ("B", "GER"), ("C", "nor")];
        let kept = filter_nation(rows, Some("nor"), |r| r.1);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_filter_and_sort_commute() {
        let rows = vec![
            ("A", "NOR", Some("25:00.0")),
            ("B", "GER", Some("24:00.0")),
            ("C", "NOR", None),
            ("D", "NOR", Some("23:00.0")),
        ];

        let mut filtered_first = filter_nation(rows.clone(), Some("NOR"), |r| r.1);
        sort_rows(&mut filtered_first, |r| SortValue::time(r.2));

        let mut sorted_first = rows.clone();
        sort_rows(&mut sorted_first, |r| SortValue::time(r.2));
        let sorted_then_filtered = filter_nation(sorted_first, Some("NOR"), |r| r.1);

        assert_eq!(filtered_first, sorted_then_filtered);
    }

    #[test]
    fn test_apply_limit() {
        let mut rows = vec![1, 2, 3, 4];
        apply_limit(&mut rows, 2);
        assert_eq!(rows, vec![1, 2]);

        let mut unlimited = vec![1, 2, 3];
        apply_limit(&mut unlimited, 0);
        assert_eq!(unlimited.len(), 3);
    }
}
