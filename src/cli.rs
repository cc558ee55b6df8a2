use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};

use crate::constants::DEFAULT_ROW_LIMIT;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Biathlon results browser
///
/// A command-line client for the IBU biathlon results service. Lists seasons,
/// events, and races, prints race results, relay results, cup standings,
/// athlete bios, and podium counts as aligned text tables.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "biathlon")]
#[command(styles = get_styles())]
pub struct Cli {
    /// Print a shell completion script and exit
    #[arg(long, value_name = "SHELL", help_heading = "Shell Integration")]
    pub completion: Option<Shell>,

    /// Print tab-separated values instead of an aligned table
    #[arg(long, global = true, help_heading = "Output")]
    pub tsv: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List seasons, newest first
    Seasons(SeasonsArgs),
    /// List the events of a season
    Events(EventsArgs),
    /// List the races of an event or a whole season
    Races(RacesArgs),
    /// Individual race results, with per-lap and per-stage breakdowns
    Results(ResultsArgs),
    /// Cup standings with per-discipline points
    #[command(alias = "scores")]
    Standings(StandingsArgs),
    /// Relay team results
    Relay(RelayArgs),
    /// Athlete bios, id lookup, and season results
    Biathlete(BiathleteArgs),
    /// Podium placement counts by country or athlete
    Ceremony(CeremonyArgs),
    /// Shooting accuracy aggregated across a race, event, or season
    Shooting(ShootingArgs),
    /// Per-athlete totals accumulated across a season's races
    Cumulate(CumulateArgs),
}

#[derive(clap::Args, Debug)]
pub struct SeasonsArgs {
    /// Maximum number of rows, 0 for all
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EventSort {
    #[default]
    Startdate,
    Event,
    Country,
}

#[derive(clap::Args, Debug)]
pub struct EventsArgs {
    /// Season id (e.g. 2526), or "all"; defaults to the current season
    #[arg(short, long)]
    pub season: Option<String>,

    /// Competition level, 1 = World Cup
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub level: i32,

    /// Keep only events whose description or host matches
    #[arg(long)]
    pub search: Option<String>,

    /// Sort order
    #[arg(long, value_enum, default_value_t = EventSort::Startdate)]
    pub sort: EventSort,

    /// Keep only events that have already finished
    #[arg(long)]
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisciplineArg {
    Individual,
    Sprint,
    Pursuit,
    MassStart,
    Relay,
}

impl DisciplineArg {
    /// API discipline code.
    pub fn code(self) -> &'static str {
        match self {
            DisciplineArg::Individual => "IN",
            DisciplineArg::Sprint => "SP",
            DisciplineArg::Pursuit => "PU",
            DisciplineArg::MassStart => "MS",
            DisciplineArg::Relay => "RL",
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RacesArgs {
    /// List the races of one event
    #[arg(short, long, conflicts_with_all = ["season", "level"])]
    pub event: Option<String>,

    /// List the races of a whole season; defaults to the current season
    #[arg(short, long)]
    pub season: Option<String>,

    /// Competition level, 1 = World Cup
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub level: i32,

    /// Keep only races of one discipline
    #[arg(short, long, value_enum)]
    pub discipline: Option<DisciplineArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResultSort {
    #[default]
    Result,
    Course,
    Range,
    Shooting,
    Penalty,
    Misses,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsBreakdown {
    /// Per-lap course times
    Course,
    /// Per-stage range times
    Range,
    /// Per-stage shooting times
    Shooting,
}

#[derive(clap::Args, Debug)]
pub struct ResultsArgs {
    /// Race id; defaults to the most recent completed World Cup race
    #[arg(short, long, global = true)]
    pub race: Option<String>,

    /// Sort column
    #[arg(long, value_enum, default_value_t = ResultSort::Result, global = true)]
    pub sort: ResultSort,

    /// Keep only athletes of one nation (IOC code)
    #[arg(short, long, global = true)]
    pub country: Option<String>,

    /// Keep only the top N of the current World Cup total score
    #[arg(long, value_name = "N", global = true)]
    pub top: Option<usize>,

    /// Keep only the first N finishers before sorting
    #[arg(long, value_name = "N", global = true)]
    pub first: Option<usize>,

    /// Maximum number of rows, 0 for all
    #[arg(short = 'n', long, default_value_t = 0, global = true)]
    pub limit: usize,

    /// Add per-stage shooting columns
    #[arg(long, global = true)]
    pub detail: bool,

    #[command(subcommand)]
    pub breakdown: Option<ResultsBreakdown>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StandingsSort {
    #[default]
    Total,
    Sprint,
    Pursuit,
    Individual,
    Massstart,
}

#[derive(clap::Args, Debug)]
pub struct StandingsArgs {
    /// Season id; defaults to the current season
    #[arg(short, long)]
    pub season: Option<String>,

    /// Men's standings instead of women's
    #[arg(long)]
    pub men: bool,

    /// Competition level, 1 = World Cup
    #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
    pub level: i32,

    /// Sort column
    #[arg(long, value_enum, default_value_t = StandingsSort::Total)]
    pub sort: StandingsSort,

    /// Maximum number of rows, 0 for all
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub limit: usize,
}

#[derive(clap::Args, Debug)]
pub struct RelayArgs {
    /// Race id; defaults to the most recent completed relay
    #[arg(short, long)]
    pub race: Option<String>,

    /// Men's relay
    #[arg(long, conflicts_with_all = ["mixed", "singlemixed"])]
    pub men: bool,

    /// Mixed relay
    #[arg(long, conflicts_with = "singlemixed")]
    pub mixed: bool,

    /// Single mixed relay
    #[arg(long)]
    pub singlemixed: bool,

    /// Sort column
    #[arg(long, value_enum, default_value_t = ResultSort::Result)]
    pub sort: ResultSort,

    /// One row per leg instead of one row per team
    #[arg(long)]
    pub detail: bool,

    /// Keep only the first N teams before sorting
    #[arg(long, value_name = "N")]
    pub first: Option<usize>,

    /// Maximum number of rows, 0 for all
    #[arg(short = 'n', long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(clap::Args, Debug)]
pub struct BiathleteArgs {
    /// Comma-separated IBU ids
    #[arg(short, long, global = true, value_name = "IBU_ID[,IBU_ID...]")]
    pub id: Option<String>,

    /// Name to search for ("family" or "family given")
    #[arg(short, long, global = true)]
    pub search: Option<String>,

    /// Season id for result lookups; defaults to the current season
    #[arg(long, global = true)]
    pub season: Option<String>,

    /// Competition level, 1 = World Cup
    #[arg(long, default_value_t = 1, global = true, allow_negative_numbers = true)]
    pub level: i32,

    #[command(subcommand)]
    pub action: BiathleteAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiathleteAction {
    /// Bio details for athletes by IBU id
    Info,
    /// Find IBU ids by name
    Id,
    /// Season race ranks for athletes by IBU id
    Results,
}

#[derive(clap::Args, Debug)]
pub struct CeremonyArgs {
    /// Count podium places per athlete instead of per country
    #[arg(long)]
    pub athlete: bool,

    /// Count only one race
    #[arg(short, long, conflicts_with = "event")]
    pub race: Option<String>,

    /// Count only one event
    #[arg(short, long)]
    pub event: Option<String>,

    /// Athlete mode: men only
    #[arg(long, conflicts_with = "women", requires = "athlete")]
    pub men: bool,

    /// Athlete mode: women only
    #[arg(long, requires = "athlete")]
    pub women: bool,

    /// Season id; defaults to the current season
    #[arg(short, long, conflicts_with_all = ["race", "event"])]
    pub season: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ShootingSort {
    #[default]
    Accuracy,
    Misses,
    Shots,
    Races,
    Name,
    Country,
}

#[derive(clap::Args, Debug)]
pub struct ShootingArgs {
    /// Aggregate a single race
    #[arg(short, long, conflicts_with_all = ["event", "season"])]
    pub race: Option<String>,

    /// Aggregate the races of one event
    #[arg(short, long, conflicts_with = "season")]
    pub event: Option<String>,

    /// Season id; defaults to the current season
    #[arg(short, long)]
    pub season: Option<String>,

    /// Men instead of women
    #[arg(long)]
    pub men: bool,

    /// Sort column
    #[arg(long, value_enum, default_value_t = ShootingSort::Accuracy)]
    pub sort: ShootingSort,

    /// Keep only the top N of the current World Cup total score
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Maximum number of rows, 0 for all
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROW_LIMIT)]
    pub limit: usize,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CumulateKind {
    /// Total finish time
    Course,
    /// Total ski time
    Ski,
    /// Total range time
    Range,
    /// Total shooting time with accuracy
    Shooting,
    /// Total penalty time
    Penalty,
    /// Total misses with a prone/standing split
    Miss,
    /// Pursuit places gained from the start order
    Remontada,
}

#[derive(clap::Args, Debug)]
pub struct CumulateArgs {
    /// Season id; defaults to the current season
    #[arg(short, long, global = true, conflicts_with = "event")]
    pub season: Option<String>,

    /// Accumulate the races of one event
    #[arg(short, long, global = true)]
    pub event: Option<String>,

    /// Men instead of women
    #[arg(long, global = true)]
    pub men: bool,

    /// Keep only races of one discipline
    #[arg(short, long, value_enum, global = true)]
    pub discipline: Option<DisciplineArg>,

    /// Keep only the top N of the current World Cup total score
    #[arg(long, value_name = "N", global = true)]
    pub top: Option<usize>,

    /// Maximum number of rows, 0 for all
    #[arg(short = 'n', long, default_value_t = DEFAULT_ROW_LIMIT, global = true)]
    pub limit: usize,

    #[command(subcommand)]
    pub kind: CumulateKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_results_defaults() {
        let cli = Cli::parse_from(["biathlon", "results"]);
        match cli.command {
            Some(Command::Results(args)) => {
                assert_eq!(args.race, None);
                assert_eq!(args.sort, ResultSort::Result);
                assert_eq!(args.limit, 0);
                assert!(args.breakdown.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_results_breakdown_with_trailing_flags() {
        let cli = Cli::parse_from(["biathlon", "results", "course", "--race", "RACE1"]);
        match cli.command {
            Some(Command::Results(args)) => {
                assert_eq!(args.breakdown, Some(ResultsBreakdown::Course));
                assert_eq!(args.race.as_deref(), Some("RACE1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_scores_alias() {
        let cli = Cli::parse_from(["biathlon", "scores", "--men"]);
        assert!(matches!(cli.command, Some(Command::Standings(a)) if a.men));
    }

    #[test]
    fn test_relay_category_flags_conflict() {
        assert!(Cli::try_parse_from(["biathlon", "relay", "--men", "--mixed"]).is_err());
    }

    #[test]
    fn test_ceremony_scope_flags_conflict() {
        assert!(
            Cli::try_parse_from(["biathlon", "ceremony", "--race", "R", "--event", "E"]).is_err()
        );
    }

    #[test]
    fn test_shooting_scope_flags_conflict() {
        assert!(
            Cli::try_parse_from(["biathlon", "shooting", "--race", "R", "--season", "2526"])
                .is_err()
        );
        let cli = Cli::parse_from(["biathlon", "shooting", "--men", "--sort", "misses"]);
        match cli.command {
            Some(Command::Shooting(args)) => {
                assert!(args.men);
                assert_eq!(args.sort, ShootingSort::Misses);
                assert_eq!(args.limit, DEFAULT_ROW_LIMIT);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cumulate_requires_kind() {
        assert!(Cli::try_parse_from(["biathlon", "cumulate"]).is_err());
        let cli = Cli::parse_from(["biathlon", "cumulate", "miss", "--men", "-d", "sprint"]);
        match cli.command {
            Some(Command::Cumulate(args)) => {
                assert_eq!(args.kind, CumulateKind::Miss);
                assert!(args.men);
                assert_eq!(args.discipline, Some(DisciplineArg::Sprint));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_sort_key_rejected() {
        assert!(Cli::try_parse_from(["biathlon", "results", "--sort", "speed"]).is_err());
    }

    #[test]
    fn test_global_tsv_after_subcommand() {
        let cli = Cli::parse_from(["biathlon", "seasons", "--tsv"]);
        assert!(cli.tsv);
    }

    #[test]
    fn test_completion_without_subcommand() {
        let cli = Cli::parse_from(["biathlon", "--completion", "zsh"]);
        assert_eq!(cli.completion, Some(Shell::Zsh));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_biathlete_requires_action() {
        assert!(Cli::try_parse_from(["biathlon", "biathlete"]).is_err());
        let cli = Cli::parse_from(["biathlon", "biathlete", "info", "--id", "BTNOR123"]);
        match cli.command {
            Some(Command::Biathlete(args)) => {
                assert_eq!(args.action, BiathleteAction::Info);
                assert_eq!(args.id.as_deref(), Some("BTNOR123"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_debug_assert_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
