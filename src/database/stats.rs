use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::domain::{PlayerStats, PlayerTournamentStat};

use super::connection::DbConn;

const COLUMNS: &str = "tournament_id, licence, name, match_points, game_points, innings, \
     best_series, matches_played, best_match_average, poule_name, poule_rank, position, \
     position_points, breakdown, bonus_total";

/// Insert-or-replace one player's tournament outcome. Returns whether a
/// row already existed, so callers can report created vs updated counts.
pub fn upsert_stat(conn: &mut DbConn, stat: &PlayerTournamentStat) -> Result<bool> {
    let existed = find(conn, stat.tournament_id, &stat.licence)?.is_some();
    let breakdown = stat.breakdown.to_json()?;

    let sql = format!(
        "INSERT OR REPLACE INTO player_tournament_stats ({COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
    );
    conn.execute(
        &sql,
        params![
            stat.tournament_id,
            stat.licence,
            stat.name,
            stat.stats.match_points,
            stat.stats.game_points,
            stat.stats.innings,
            stat.stats.best_series,
            stat.stats.matches_played,
            stat.stats.best_match_average,
            stat.poule_name,
            stat.poule_rank,
            stat.position,
            stat.position_points,
            breakdown,
            stat.bonus_total,
        ],
    )
    .context("Failed to upsert player tournament stat")?;

    Ok(existed)
}

pub fn find(
    conn: &mut DbConn,
    tournament_id: i64,
    licence: &str,
) -> Result<Option<PlayerTournamentStat>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM player_tournament_stats WHERE tournament_id = ?1 AND licence = ?2"
    );

    conn.query_row(&sql, params![tournament_id, licence], parse_stat_row)
        .optional()
        .context("Failed to query player tournament stat")
}

pub fn list_by_tournament(
    conn: &mut DbConn,
    tournament_id: i64,
) -> Result<Vec<PlayerTournamentStat>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM player_tournament_stats WHERE tournament_id = ?1 ORDER BY licence"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_stat_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

/// Remove rows for players no longer present in the tournament.
pub fn delete_absent(
    conn: &mut DbConn,
    tournament_id: i64,
    keep_licences: &[String],
) -> Result<usize> {
    if keep_licences.is_empty() {
        return conn
            .execute(
                "DELETE FROM player_tournament_stats WHERE tournament_id = ?1",
                params![tournament_id],
            )
            .context("Failed to delete player stats for tournament");
    }

    let placeholders: Vec<String> = (2..keep_licences.len() + 2)
        .map(|index| format!("?{index}"))
        .collect();
    let sql = format!(
        "DELETE FROM player_tournament_stats WHERE tournament_id = ?1 AND licence NOT IN ({})",
        placeholders.join(", ")
    );

    let mut values: Vec<&dyn rusqlite::ToSql> = vec![&tournament_id];
    for licence in keep_licences {
        values.push(licence);
    }

    conn.execute(&sql, values.as_slice())
        .context("Failed to delete absent player stats")
}

fn parse_stat_row(row: &rusqlite::Row) -> rusqlite::Result<PlayerTournamentStat> {
    let breakdown_json: String = row.get(13)?;
    let breakdown = serde_json::from_str(&breakdown_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(13, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(PlayerTournamentStat {
        tournament_id: row.get(0)?,
        licence: row.get(1)?,
        name: row.get(2)?,
        stats: PlayerStats {
            match_points: row.get(3)?,
            game_points: row.get(4)?,
            innings: row.get(5)?,
            best_series: row.get(6)?,
            matches_played: row.get(7)?,
            best_match_average: row.get(8)?,
        },
        poule_name: row.get(9)?,
        poule_rank: row.get(10)?,
        position: row.get(11)?,
        position_points: row.get(12)?,
        breakdown,
        bonus_total: row.get(14)?,
    })
}
