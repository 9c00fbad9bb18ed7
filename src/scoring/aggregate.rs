use std::collections::HashMap;

use crate::domain::{MatchSide, PlayerStats, TournamentMatch};

use super::poule::PouleClassifier;

/// Global and per-regular-poule aggregates for one tournament.
#[derive(Debug, Default)]
pub struct Aggregates {
    /// Stats across every match of the tournament, keyed by licence.
    pub global: HashMap<String, PlayerStats>,
    /// Stats per regular poule; classification matches never leak in.
    pub per_poule: HashMap<String, HashMap<String, PlayerStats>>,
    /// Licence to display name, first spelling seen wins.
    pub names: HashMap<String, String>,
}

impl Aggregates {
    pub fn player_count(&self) -> usize {
        self.global.len()
    }
}

/// Fold raw matches into per-player cumulative stats at both levels.
pub fn aggregate_matches(
    matches: &[TournamentMatch],
    classifier: &PouleClassifier,
) -> Aggregates {
    let mut aggregates = Aggregates::default();

    for record in matches {
        let regular = !classifier.classify(&record.poule_name).is_classification();

        for side in record.sides() {
            if side.licence.is_empty() {
                continue;
            }

            absorb(
                aggregates.global.entry(side.licence.clone()).or_default(),
                side,
            );
            aggregates
                .names
                .entry(side.licence.clone())
                .or_insert_with(|| side.name.clone());

            if regular {
                let poule = aggregates
                    .per_poule
                    .entry(record.poule_name.clone())
                    .or_default();
                absorb(poule.entry(side.licence.clone()).or_default(), side);
            }
        }
    }

    aggregates
}

fn absorb(stats: &mut PlayerStats, side: &MatchSide) {
    stats.match_points += side.match_points;
    stats.game_points += side.game_points;
    stats.innings += side.innings;
    stats.best_series = stats.best_series.max(side.series);
    stats.matches_played += 1;

    // Best single-match average counts won matches only.
    if side.match_points > 0 && side.innings > 0 {
        let match_average = side.game_points as f64 / side.innings as f64;
        if match_average > stats.best_match_average {
            stats.best_match_average = match_average;
        }
    }
}
