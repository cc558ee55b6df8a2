use biathlon_results::cli::Shell;
use biathlon_results::completion::completion_script;
use biathlon_results::report::{filter_nation, sort_rows, OutputMode, SortValue, Table};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    name: &'static str,
    nat: &'static str,
    time: Option<&'static str>,
}

fn sample_rows() -> Vec<Row> {
    vec![
        Row { name: "A", nat: "NOR", time: Some("24:31.1") },
        Row { name: "B", nat: "GER", time: Some("24:05.9") },
        Row { name: "C", nat: "NOR", time: None },
        Row { name: "D", nat: "FRA", time: Some("25:10.0") },
        Row { name: "E", nat: "NOR", time: Some("23:59.0") },
    ]
}

#[test]
fn filter_then_sort_matches_sort_then_filter() {
    let rows = sample_rows();

    let mut filtered_first = filter_nation(rows.clone(), Some("NOR"), |r| r.nat);
    sort_rows(&mut filtered_first, |r| SortValue::time(r.time));

    let mut sorted = rows;
    sort_rows(&mut sorted, |r| SortValue::time(r.time));
    let sorted_first = filter_nation(sorted, Some("NOR"), |r| r.nat);

    assert_eq!(filtered_first, sorted_first);
    // Non-finishers end up last either way
    assert_eq!(filtered_first.last().map(|r| r.name), Some("C"));
}

#[test]
fn pretty_render_produces_n_plus_one_equal_width_lines() {
    let mut table = Table::new(vec!["Rank".into(), "Biathlete".into(), "Time".into()]);
    for (i, row) in sample_rows().iter().enumerate() {
        table.push_row(vec![
            (i + 1).to_string(),
            row.name.to_string(),
            row.time.unwrap_or("-").to_string(),
        ]);
    }

    let rendered = table.render(OutputMode::Plain);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), table.len() + 1);

    let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
    assert!(
        widths.windows(2).all(|w| w[0] == w[1]),
        "line widths differ: {widths:?}"
    );
}

#[test]
fn tsv_render_has_no_padding() {
    let mut table = Table::new(vec!["A".into(), "B".into()]);
    table.push_row(vec!["short".into(), "a much longer cell".into()]);
    table.push_row(vec!["x".into(), "y".into()]);

    let rendered = table.render(OutputMode::Tsv);
    assert_eq!(rendered.lines().nth(2), Some("x\ty"));
}

#[test]
fn completion_scripts_are_identical_across_calls() {
    for shell in [Shell::Bash, Shell::Zsh] {
        let first = completion_script(shell);
        let second = completion_script(shell);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
    assert_ne!(completion_script(Shell::Bash), completion_script(Shell::Zsh));
}
