use clap::Parser;

use biathlon_results::api::ApiClient;
use biathlon_results::cli::{Cli, Command};
use biathlon_results::completion::completion_script;
use biathlon_results::error::AppError;
use biathlon_results::{commands, logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init();

    if let Some(shell) = cli.completion {
        print!("{}", completion_script(shell));
        return;
    }

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let Some(command) = cli.command else {
        return Err(AppError::usage("missing subcommand, see --help"));
    };
    let client = ApiClient::new()?;
    let tsv = cli.tsv;

    match command {
        Command::Seasons(args) => commands::seasons::run(&client, &args, tsv).await,
        Command::Events(args) => commands::events::run(&client, &args, tsv).await,
        Command::Races(args) => commands::races::run(&client, &args, tsv).await,
        Command::Results(args) => commands::results::run(&client, &args, tsv).await,
        Command::Standings(args) => commands::standings::run(&client, &args, tsv).await,
        Command::Relay(args) => commands::relay::run(&client, &args, tsv).await,
        Command::Biathlete(args) => commands::athlete::run(&client, &args, tsv).await,
        Command::Ceremony(args) => commands::ceremony::run(&client, &args, tsv).await,
        Command::Shooting(args) => commands::shooting::run(&client, &args, tsv).await,
        Command::Cumulate(args) => commands::cumulate::run(&client, &args, tsv).await,
    }
}
