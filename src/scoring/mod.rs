pub mod aggregate;
pub mod bonus;
pub mod points;
pub mod position;
pub mod poule;
pub mod season;

pub use aggregate::{aggregate_matches, Aggregates};
pub use bonus::{apply_average_bonus, evaluate_rules, RuleContext};
pub use points::{attach_points, resolve_points_table, PointsTable};
pub use position::{canonical_cmp, resolve_positions, ResolvedPositions};
pub use poule::{ClassificationLabel, PouleClassifier, PouleKind};
pub use season::{aggregate_season, SeasonInput};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::{MatchSide, TournamentMatch};

    pub fn side(licence: &str, game_points: i64, innings: i64, series: i64, match_points: i64) -> MatchSide {
        MatchSide {
            licence: licence.to_string(),
            name: format!("Player {licence}"),
            game_points,
            innings,
            series,
            match_points,
            average: if innings == 0 {
                0.0
            } else {
                game_points as f64 / innings as f64
            },
        }
    }

    pub fn tournament_match(
        poule_name: &str,
        round: i32,
        home: MatchSide,
        away: MatchSide,
    ) -> TournamentMatch {
        TournamentMatch {
            id: 0,
            tournament_id: 1,
            poule_name: poule_name.to_string(),
            round,
            home,
            away,
        }
    }
}
