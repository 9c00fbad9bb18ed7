use anyhow::Result;

use carambole_ranking::cli::Command;
use carambole_ranking::{handle_init, handle_score, handle_season, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Init => handle_init(),
        Command::Score { tournament } => handle_score(*tournament),
        Command::Season { category, season } => handle_season(*category, season),
    }
}
