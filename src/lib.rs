pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod scoring;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

use crate::cli::Command;
use crate::config::AppConfig;
use crate::services::{RecomputeOutcome, SeasonService, TournamentScoringService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::new();
    let pool = database::create_pool(&config.database_path())?;
    let mut conn = database::get_connection(&pool)?;
    database::setup::reset_database(&mut conn)
}

pub fn handle_score(tournament: i64) -> Result<()> {
    let config = AppConfig::new();
    let service = TournamentScoringService::new(config);
    let outcome = service.run(tournament)?;
    report_outcome(&outcome)
}

pub fn handle_season(category: i64, season: &str) -> Result<()> {
    let config = AppConfig::new();
    let service = SeasonService::new(config);
    let outcome = service.run(category, season)?;
    report_outcome(&outcome)
}

fn report_outcome(outcome: &RecomputeOutcome) -> Result<()> {
    log::info!(
        "Done: {} created, {} updated, {} skipped",
        outcome.created,
        outcome.updated,
        outcome.skipped
    );
    for warning in &outcome.warnings {
        log::warn!("{warning}");
    }
    if !outcome.is_success() {
        for error in &outcome.errors {
            log::error!("{}: {}", error.entity, error.message);
        }
        anyhow::bail!("{} entities failed to update", outcome.errors.len());
    }
    Ok(())
}
