use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "carambole tournament scoring and ranking engine")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Reset the database schema
    Init,
    /// Recompute positions, bonuses and points for one tournament
    Score {
        /// Tournament id
        #[arg(short, long)]
        tournament: i64,
    },
    /// Recompute the season ranking for a category
    Season {
        /// Category id
        #[arg(short, long)]
        category: i64,
        /// Season label, e.g. 2025-2026
        #[arg(short, long)]
        season: String,
    },
}
