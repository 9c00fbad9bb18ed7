use std::collections::HashMap;

use log::info;

use crate::domain::{
    BonusBreakdown, BonusCategory, BonusSettings, CategoryThresholds, PlayerTournamentStat,
    QualificationMode, SeasonRankingRow, SeasonSettings, TournamentScoreDetail,
};

use super::bonus::apply_average_bonus;

/// One player's outcome in one tournament of the season, tagged with the
/// tournament's number within the season.
#[derive(Debug, Clone)]
pub struct SeasonInput {
    pub tournament_id: i64,
    pub number: u32,
    pub stat: PlayerTournamentStat,
}

/// Aggregate per-tournament outcomes into the season ranking under the
/// configured qualification mode. Rows come back ranked and ready to
/// replace the previous set.
pub fn aggregate_season(
    category_id: i64,
    season: &str,
    inputs: &[SeasonInput],
    settings: &SeasonSettings,
    bonus_settings: &BonusSettings,
    thresholds: &CategoryThresholds,
) -> Vec<SeasonRankingRow> {
    let rows = match settings.mode {
        QualificationMode::Standard => aggregate_standard(category_id, season, inputs, settings),
        QualificationMode::Journees => {
            aggregate_journees(category_id, season, inputs, settings, bonus_settings, thresholds)
        }
    };
    info!(
        "Season {} / category {}: {} ranked players ({} mode)",
        season,
        category_id,
        rows.len(),
        settings.mode.as_str()
    );
    rows
}

struct PlayerAccumulator {
    name: String,
    details: Vec<TournamentScoreDetail>,
    total: i64,
    game_points: i64,
    innings: i64,
    best_series: i64,
    breakdown: BonusBreakdown,
}

impl PlayerAccumulator {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            details: Vec::new(),
            total: 0,
            game_points: 0,
            innings: 0,
            best_series: 0,
            breakdown: BonusBreakdown::new(),
        }
    }

    fn average(&self) -> f64 {
        if self.innings == 0 {
            0.0
        } else {
            self.game_points as f64 / self.innings as f64
        }
    }
}

/// Standard mode: sum match points and bonus over the configured ranking
/// tournaments (the finale never carries a ranking number).
fn aggregate_standard(
    category_id: i64,
    season: &str,
    inputs: &[SeasonInput],
    settings: &SeasonSettings,
) -> Vec<SeasonRankingRow> {
    let mut players: HashMap<String, PlayerAccumulator> = HashMap::new();

    for input in inputs {
        if !settings.ranking_tournaments.contains(&input.number) {
            continue;
        }
        let stat = &input.stat;
        let accumulator = players
            .entry(stat.licence.clone())
            .or_insert_with(|| PlayerAccumulator::new(&stat.name));

        let score = stat.stats.match_points + stat.bonus_total;
        accumulator.total += score;
        accumulator.game_points += stat.stats.game_points;
        accumulator.innings += stat.stats.innings;
        accumulator.best_series = accumulator.best_series.max(stat.stats.best_series);
        accumulator.breakdown.accumulate(&stat.breakdown);
        accumulator.details.push(TournamentScoreDetail {
            tournament_id: input.tournament_id,
            number: input.number,
            score,
            match_points: stat.stats.match_points,
            bonus_points: stat.bonus_total,
            position: stat.position,
            counted: true,
        });
    }

    finalize_rows(category_id, season, players)
}

/// Journées mode: keep each player's best N day scores, then optionally a
/// season-level average bonus computed from the kept days (only when the
/// per-day average bonus is off, so the same signal is never counted at
/// two granularities).
fn aggregate_journees(
    category_id: i64,
    season: &str,
    inputs: &[SeasonInput],
    settings: &SeasonSettings,
    bonus_settings: &BonusSettings,
    thresholds: &CategoryThresholds,
) -> Vec<SeasonRankingRow> {
    struct Day {
        detail: TournamentScoreDetail,
        game_points: i64,
        innings: i64,
        best_series: i64,
    }

    let mut days_per_player: HashMap<String, (String, Vec<Day>)> = HashMap::new();

    for input in inputs {
        let stat = &input.stat;
        let day_bonus = stat
            .breakdown
            .get(BonusCategory::AverageBonus)
            .unwrap_or(0);
        let day_score = stat.position_points + day_bonus;

        let (_, days) = days_per_player
            .entry(stat.licence.clone())
            .or_insert_with(|| (stat.name.clone(), Vec::new()));
        days.push(Day {
            detail: TournamentScoreDetail {
                tournament_id: input.tournament_id,
                number: input.number,
                score: day_score,
                match_points: stat.stats.match_points,
                bonus_points: day_bonus,
                position: stat.position,
                counted: false,
            },
            game_points: stat.stats.game_points,
            innings: stat.stats.innings,
            best_series: stat.stats.best_series,
        });
    }

    let mut players: HashMap<String, PlayerAccumulator> = HashMap::new();
    for (licence, (name, mut days)) in days_per_player {
        // best day scores first; earlier days win exact ties
        days.sort_by(|a, b| {
            b.detail
                .score
                .cmp(&a.detail.score)
                .then(a.detail.number.cmp(&b.detail.number))
        });

        let mut accumulator = PlayerAccumulator::new(&name);
        for (index, day) in days.iter_mut().enumerate() {
            if index < settings.best_of_count {
                day.detail.counted = true;
                accumulator.total += day.detail.score;
                accumulator.game_points += day.game_points;
                accumulator.innings += day.innings;
                accumulator.best_series = accumulator.best_series.max(day.best_series);
            }
        }

        if !bonus_settings.average_bonus_enabled {
            let mut season_bonus = BonusBreakdown::new();
            let mut enabled = bonus_settings.clone();
            enabled.average_bonus_enabled = true;
            apply_average_bonus(accumulator.average(), thresholds, &enabled, &mut season_bonus);
            if let Some(points) = season_bonus.get(BonusCategory::AverageBonus) {
                accumulator.total += points;
                accumulator.breakdown.set(BonusCategory::AverageBonus, points);
            }
        }

        days.sort_by_key(|day| day.detail.number);
        accumulator.details = days.into_iter().map(|day| day.detail).collect();
        players.insert(licence, accumulator);
    }

    finalize_rows(category_id, season, players)
}

/// Order by total desc, cumulative average desc, best series desc and
/// assign sequential ranks. Licence order settles exact ties so repeated
/// recomputes are byte-identical.
fn finalize_rows(
    category_id: i64,
    season: &str,
    players: HashMap<String, PlayerAccumulator>,
) -> Vec<SeasonRankingRow> {
    let mut entries: Vec<(String, PlayerAccumulator)> = players.into_iter().collect();
    entries.sort_by(|(licence_a, a), (licence_b, b)| {
        b.total
            .cmp(&a.total)
            .then_with(|| {
                b.average()
                    .partial_cmp(&a.average())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| b.best_series.cmp(&a.best_series))
            .then_with(|| licence_a.cmp(licence_b))
    });

    entries
        .into_iter()
        .enumerate()
        .map(|(index, (licence, accumulator))| SeasonRankingRow {
            category_id,
            season: season.to_string(),
            licence,
            name: accumulator.name.clone(),
            total_points: accumulator.total,
            cumulative_average: accumulator.average(),
            best_series: accumulator.best_series,
            rank: index as u32 + 1,
            details: accumulator.details,
            breakdown: accumulator.breakdown,
        })
        .collect()
}
