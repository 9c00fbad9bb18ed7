use anyhow::{anyhow, Result};
use log::{error, info, warn};

use crate::config::AppConfig;
use crate::database::{self, DbConn};
use crate::domain::{CategoryThresholds, PlayerTournamentStat};
use crate::scoring::{
    aggregate_matches, apply_average_bonus, attach_points, evaluate_rules, resolve_points_table,
    resolve_positions, PouleClassifier, RuleContext,
};

use super::{EntityError, RecomputeOutcome};

/// Recomputes one tournament end to end: positions, bonuses, points.
/// The pipeline is an ordered chain of pure stages; only the final upsert
/// loop touches the database.
pub struct TournamentScoringService {
    config: AppConfig,
}

impl TournamentScoringService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, tournament_id: i64) -> Result<RecomputeOutcome> {
        let pool = database::create_pool(&self.config.database_path())?;
        let mut conn = database::get_connection(&pool)?;
        self.recompute(&mut conn, tournament_id)
    }

    pub fn recompute(&self, conn: &mut DbConn, tournament_id: i64) -> Result<RecomputeOutcome> {
        let tournament = database::tournaments::find_by_id(conn, tournament_id)?
            .ok_or_else(|| anyhow!("Unknown tournament: {tournament_id}"))?;

        let mut outcome = RecomputeOutcome::default();

        let matches = database::matches::list_by_tournament(conn, tournament_id)?;
        if matches.is_empty() {
            info!("Tournament {tournament_id} has no matches, nothing to do");
            return Ok(outcome);
        }

        // Stage 1: aggregate and resolve positions.
        let classifier = PouleClassifier::new()?;
        let aggregates = aggregate_matches(&matches, &classifier);
        let resolved = resolve_positions(&matches, &aggregates, &classifier);
        outcome.warnings.extend(resolved.warnings.iter().cloned());
        info!(
            "Tournament {}: {} players, {} poules, state {:?}",
            tournament_id,
            aggregates.player_count(),
            aggregates.per_poule.len(),
            resolved.state
        );

        // Stage 2: load scoring configuration.
        let settings =
            database::settings::get_for_organization(conn, tournament.organization_id)?;
        let rules = database::rules::list_for_organization(conn, tournament.organization_id)?;
        let thresholds = database::thresholds::get_for_category(conn, tournament.category_id)?
            .unwrap_or_else(|| {
                warn!(
                    "No thresholds for category {}, threshold-based rules will be skipped",
                    tournament.category_id
                );
                CategoryThresholds::default()
            });

        // Stage 3: position points lookup.
        let participant_count = aggregates.player_count() as u32;
        let entries =
            database::position_points::list_for_organization(conn, tournament.organization_id)?;
        let table = resolve_points_table(&entries, participant_count);
        if table.is_empty() {
            warn!(
                "No position points configured for organization {}, points default to 0",
                tournament.organization_id
            );
        }
        let points = attach_points(&resolved.positions, &table, settings.last_player_degradation);

        // Stage 4: per-player bonus evaluation and persistence.
        let mut licences: Vec<String> = aggregates.global.keys().cloned().collect();
        licences.sort_unstable();

        for licence in &licences {
            let stats = &aggregates.global[licence];
            let mut breakdown = database::stats::find(conn, tournament_id, licence)?
                .map(|existing| existing.breakdown)
                .unwrap_or_default();

            let context = RuleContext {
                average: stats.average(),
                participant_count,
                match_points: stats.match_points,
                best_series: stats.best_series,
                position: resolved.positions.get(licence).copied(),
                matches_played: stats.matches_played,
                best_match_average: stats.best_match_average,
            };
            evaluate_rules(&rules, &context, &thresholds, &mut breakdown);
            apply_average_bonus(stats.average(), &thresholds, &settings.bonus, &mut breakdown);

            let (poule_name, poule_rank) = match resolved.poule_ranks.get(licence) {
                Some((name, rank)) => (Some(name.clone()), Some(*rank)),
                None => (None, None),
            };
            let bonus_total = breakdown.total();
            let row = PlayerTournamentStat {
                tournament_id,
                licence: licence.clone(),
                name: aggregates.names.get(licence).cloned().unwrap_or_default(),
                stats: stats.clone(),
                poule_name,
                poule_rank,
                position: resolved.positions.get(licence).copied(),
                position_points: points.get(licence).copied().unwrap_or(0),
                breakdown,
                bonus_total,
            };

            match database::stats::upsert_stat(conn, &row) {
                Ok(true) => outcome.updated += 1,
                Ok(false) => outcome.created += 1,
                Err(e) => {
                    error!("Failed to save stats for player {licence}: {e:?}");
                    outcome.errors.push(EntityError {
                        entity: licence.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        database::stats::delete_absent(conn, tournament_id, &licences)?;

        info!(
            "Tournament {} recompute: {} created, {} updated, {} errors",
            tournament_id,
            outcome.created,
            outcome.updated,
            outcome.errors.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{create_memory_pool, setup};
    use crate::domain::{
        BonusCategory, MatchSide, OrganizationSettings, PositionPointsEntry, RuleCondition,
        RuleField, RuleOperator, RuleValue, ScoringRule, TournamentMatch,
    };

    fn side(licence: &str, game_points: i64, innings: i64, series: i64, match_points: i64) -> MatchSide {
        MatchSide {
            licence: licence.to_string(),
            name: format!("Player {licence}"),
            game_points,
            innings,
            series,
            match_points,
            average: if innings == 0 { 0.0 } else { game_points as f64 / innings as f64 },
        }
    }

    fn seed_tournament(conn: &mut DbConn) -> i64 {
        let tournament =
            database::tournaments::insert_tournament(conn, 1, 1, "2025-2026", 1, "Journée 1", None)
                .unwrap();

        // two-player poule plus a finale they contest again
        for (poule, round, home, away) in [
            ("Poule A", 1, side("100", 30, 20, 6, 2), side("200", 25, 20, 5, 0)),
            ("Poule A", 1, side("100", 28, 20, 4, 2), side("300", 20, 20, 3, 0)),
            ("Poule A", 1, side("200", 26, 20, 5, 2), side("300", 18, 20, 2, 0)),
            ("FINALE", 2, side("100", 30, 15, 7, 2), side("200", 22, 15, 4, 0)),
        ] {
            database::matches::insert_match(
                conn,
                &TournamentMatch {
                    id: 0,
                    tournament_id: tournament.id,
                    poule_name: poule.to_string(),
                    round,
                    home,
                    away,
                },
            )
            .unwrap();
        }

        for (count, position, points) in [(3, 1, 6), (3, 2, 4), (3, 3, 2)] {
            database::position_points::insert_entry(
                conn,
                &PositionPointsEntry {
                    organization_id: 1,
                    participant_count: count,
                    position,
                    points,
                    is_default: false,
                },
            )
            .unwrap();
        }

        database::settings::upsert(conn, &OrganizationSettings::with_defaults(1)).unwrap();

        tournament.id
    }

    #[test]
    fn recompute_writes_full_stat_rows() {
        let pool = create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        let tournament_id = seed_tournament(&mut conn);

        database::rules::insert_rule(
            &mut conn,
            1,
            &ScoringRule {
                id: 0,
                rule_type: BonusCategory::Podium,
                first: RuleCondition {
                    field: RuleField::Position,
                    operator: RuleOperator::Eq,
                    value: RuleValue::Literal(1.0),
                },
                combinator: None,
                second: None,
                points: 3,
                active: true,
                order: 1,
            },
        )
        .unwrap();

        let service = TournamentScoringService::new(AppConfig::new());
        let outcome = service.recompute(&mut conn, tournament_id).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.created, 3);

        let rows = database::stats::list_by_tournament(&mut conn, tournament_id).unwrap();
        assert_eq!(rows.len(), 3);

        let winner = rows.iter().find(|row| row.licence == "100").unwrap();
        assert_eq!(winner.position, Some(1));
        assert_eq!(winner.position_points, 6);
        assert_eq!(winner.breakdown.get(BonusCategory::Podium), Some(3));
        assert_eq!(winner.poule_rank, Some(1));

        let third = rows.iter().find(|row| row.licence == "300").unwrap();
        assert_eq!(third.position, Some(3));
        assert_eq!(third.breakdown.get(BonusCategory::Podium), None);
    }

    #[test]
    fn recompute_without_matches_is_a_no_op() {
        let pool = create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        let tournament =
            database::tournaments::insert_tournament(&mut conn, 1, 1, "2025-2026", 1, "Empty", None)
                .unwrap();

        let service = TournamentScoringService::new(AppConfig::new());
        let outcome = service.recompute(&mut conn, tournament.id).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.created + outcome.updated, 0);
        assert!(database::stats::list_by_tournament(&mut conn, tournament.id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn persistence_failure_for_one_player_does_not_abort_the_batch() {
        let pool = create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        let tournament_id = seed_tournament(&mut conn);

        conn.execute(
            "CREATE TRIGGER reject_licence_200 BEFORE INSERT ON player_tournament_stats \
             WHEN NEW.licence = '200' \
             BEGIN SELECT RAISE(ABORT, 'stats row locked'); END",
            [],
        )
        .unwrap();

        let service = TournamentScoringService::new(AppConfig::new());
        let outcome = service.recompute(&mut conn, tournament_id).unwrap();

        assert!(!outcome.is_success());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].entity, "200");
        assert_eq!(outcome.created, 2);

        let rows = database::stats::list_by_tournament(&mut conn, tournament_id).unwrap();
        let licences: Vec<&str> = rows.iter().map(|row| row.licence.as_str()).collect();
        assert_eq!(licences, vec!["100", "300"]);
    }

    #[test]
    fn reimport_prunes_players_no_longer_present() {
        let pool = create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        let tournament_id = seed_tournament(&mut conn);

        let service = TournamentScoringService::new(AppConfig::new());
        let first = service.recompute(&mut conn, tournament_id).unwrap();
        assert_eq!(first.created, 3);

        // Re-import without player 300.
        database::matches::delete_by_tournament(&mut conn, tournament_id).unwrap();
        database::matches::insert_match(
            &mut conn,
            &TournamentMatch {
                id: 0,
                tournament_id,
                poule_name: "Poule A".to_string(),
                round: 1,
                home: side("100", 30, 20, 6, 2),
                away: side("200", 25, 20, 5, 0),
            },
        )
        .unwrap();

        let second = service.recompute(&mut conn, tournament_id).unwrap();
        assert!(second.is_success());
        assert_eq!(second.updated, 2);

        assert!(database::stats::find(&mut conn, tournament_id, "300")
            .unwrap()
            .is_none());
        let rows = database::stats::list_by_tournament(&mut conn, tournament_id).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn configured_thresholds_drive_the_average_bonus() {
        let pool = create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        let tournament_id = seed_tournament(&mut conn);

        database::thresholds::upsert_for_category(
            &mut conn,
            1,
            &CategoryThresholds {
                min_average: Some(1.0),
                max_average: Some(1.8),
            },
        )
        .unwrap();

        let service = TournamentScoringService::new(AppConfig::new());
        let outcome = service.recompute(&mut conn, tournament_id).unwrap();
        assert!(outcome.is_success());

        // 88 points over 55 innings: above the minimum, below the maximum.
        let winner = database::stats::find(&mut conn, tournament_id, "100")
            .unwrap()
            .unwrap();
        assert_eq!(winner.breakdown.get(BonusCategory::AverageBonus), Some(1));

        // 38 points over 40 innings: below the minimum, no bonus.
        let third = database::stats::find(&mut conn, tournament_id, "300")
            .unwrap()
            .unwrap();
        assert_eq!(third.breakdown.get(BonusCategory::AverageBonus), None);
    }

    #[test]
    fn rerun_updates_instead_of_duplicating() {
        let pool = create_memory_pool().unwrap();
        let mut conn = pool.get().unwrap();
        setup::reset_database(&mut conn).unwrap();
        let tournament_id = seed_tournament(&mut conn);

        let service = TournamentScoringService::new(AppConfig::new());
        let first = service.recompute(&mut conn, tournament_id).unwrap();
        assert_eq!(first.created, 3);
        let second = service.recompute(&mut conn, tournament_id).unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, 3);
        assert_eq!(
            database::stats::list_by_tournament(&mut conn, tournament_id)
                .unwrap()
                .len(),
            3
        );
    }
}
