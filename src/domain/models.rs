use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::breakdown::BonusBreakdown;

/// One side of a recorded match: a player's line on the score sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSide {
    pub licence: String,
    pub name: String,
    pub game_points: i64,
    pub innings: i64,
    pub series: i64,
    pub match_points: i64,
    pub average: f64,
}

/// One contest between two players within a tournament. Immutable once
/// recorded; owned by the tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub id: i64,
    pub tournament_id: i64,
    pub poule_name: String,
    pub round: i32,
    pub home: MatchSide,
    pub away: MatchSide,
}

impl TournamentMatch {
    pub fn sides(&self) -> [&MatchSide; 2] {
        [&self.home, &self.away]
    }
}

/// Tournament header row. The number orders tournaments within a season
/// (journée 1, journée 2, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: i64,
    pub organization_id: i64,
    pub category_id: i64,
    pub season: String,
    pub number: u32,
    pub name: String,
    pub date: Option<NaiveDate>,
}

/// Cumulative per-player performance figures, either tournament-wide or
/// restricted to a single poule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub match_points: i64,
    pub game_points: i64,
    pub innings: i64,
    pub best_series: i64,
    pub matches_played: i32,
    /// Best single-match average, counted only from matches the player won.
    pub best_match_average: f64,
}

impl PlayerStats {
    /// Overall average: game points per inning, 0 when no innings recorded.
    pub fn average(&self) -> f64 {
        if self.innings == 0 {
            0.0
        } else {
            self.game_points as f64 / self.innings as f64
        }
    }
}

/// A player's complete outcome in one tournament, rebuilt wholesale on
/// every recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTournamentStat {
    pub tournament_id: i64,
    pub licence: String,
    pub name: String,
    pub stats: PlayerStats,
    pub poule_name: Option<String>,
    pub poule_rank: Option<u32>,
    pub position: Option<u32>,
    pub position_points: i64,
    pub breakdown: BonusBreakdown,
    pub bonus_total: i64,
}

/// One lookup row of the position-to-points table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPointsEntry {
    pub organization_id: i64,
    pub participant_count: u32,
    pub position: u32,
    pub points: i64,
    /// Marks the generic row set used when no count-specific rows apply.
    pub is_default: bool,
}

/// Per-tournament contribution shown in the season ranking detail blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentScoreDetail {
    pub tournament_id: i64,
    pub number: u32,
    pub score: i64,
    pub match_points: i64,
    pub bonus_points: i64,
    pub position: Option<u32>,
    /// False for day scores dropped by best-of-N selection.
    pub counted: bool,
}

/// One line of the season ranking for a (category, season) pair. The full
/// row set is replaced on every recompute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonRankingRow {
    pub category_id: i64,
    pub season: String,
    pub licence: String,
    pub name: String,
    pub total_points: i64,
    pub details: Vec<TournamentScoreDetail>,
    pub cumulative_average: f64,
    pub best_series: i64,
    pub rank: u32,
    pub breakdown: BonusBreakdown,
}
