use anyhow::Result;
use log::{info, warn};

use crate::config::AppConfig;
use crate::database::{self, DbConn};
use crate::domain::CategoryThresholds;
use crate::scoring::{aggregate_season, SeasonInput};

use super::RecomputeOutcome;

/// Combines a category's tournaments into its season ranking and replaces
/// the stored rows.
pub struct SeasonService {
    config: AppConfig,
}

impl SeasonService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, category_id: i64, season: &str) -> Result<RecomputeOutcome> {
        let pool = database::create_pool(&self.config.database_path())?;
        let mut conn = database::get_connection(&pool)?;
        self.recompute(&mut conn, category_id, season)
    }

    pub fn recompute(
        &self,
        conn: &mut DbConn,
        category_id: i64,
        season: &str,
    ) -> Result<RecomputeOutcome> {
        let mut outcome = RecomputeOutcome::default();

        let tournaments = database::tournaments::list_by_category_season(conn, category_id, season)?;
        if tournaments.is_empty() {
            info!("No tournaments for category {category_id} season {season}, nothing to do");
            return Ok(outcome);
        }

        let organization_id = tournaments[0].organization_id;
        let settings = database::settings::get_for_organization(conn, organization_id)?;
        let thresholds = database::thresholds::get_for_category(conn, category_id)?
            .unwrap_or_else(|| {
                warn!("No thresholds for category {category_id}, season average bonus skipped");
                CategoryThresholds::default()
            });

        let mut inputs: Vec<SeasonInput> = Vec::new();
        for tournament in &tournaments {
            let stats = database::stats::list_by_tournament(conn, tournament.id)?;
            if stats.is_empty() {
                outcome.skipped += 1;
                continue;
            }
            inputs.extend(stats.into_iter().map(|stat| SeasonInput {
                tournament_id: tournament.id,
                number: tournament.number,
                stat,
            }));
        }

        if inputs.is_empty() {
            info!("No player results for category {category_id} season {season}, nothing to do");
            return Ok(outcome);
        }

        let rows = aggregate_season(
            category_id,
            season,
            &inputs,
            &settings.season,
            &settings.bonus,
            &thresholds,
        );

        database::season_rankings::replace_for_season(conn, category_id, season, &rows)?;
        outcome.created = rows.len();

        info!(
            "Season {} / category {}: wrote {} ranking rows ({} tournaments without results)",
            season, category_id, outcome.created, outcome.skipped
        );
        Ok(outcome)
    }
}
