use anyhow::{Context, Result};
use rusqlite::params;

use crate::domain::{MatchSide, TournamentMatch};

use super::connection::DbConn;

const COLUMNS: &str = "id, tournament_id, poule_name, round, \
     home_licence, home_name, home_game_points, home_innings, home_series, home_match_points, home_average, \
     away_licence, away_name, away_game_points, away_innings, away_series, away_match_points, away_average";

pub fn insert_match(conn: &mut DbConn, record: &TournamentMatch) -> Result<TournamentMatch> {
    let sql = format!(
        "INSERT INTO matches (tournament_id, poule_name, round, \
         home_licence, home_name, home_game_points, home_innings, home_series, home_match_points, home_average, \
         away_licence, away_name, away_game_points, away_innings, away_series, away_match_points, away_average) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17) \
         RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![
            record.tournament_id,
            record.poule_name,
            record.round,
            record.home.licence,
            record.home.name,
            record.home.game_points,
            record.home.innings,
            record.home.series,
            record.home.match_points,
            record.home.average,
            record.away.licence,
            record.away.name,
            record.away.game_points,
            record.away.innings,
            record.away.series,
            record.away.match_points,
            record.away.average,
        ],
        parse_match_row,
    )
    .context("Failed to insert match")
}

pub fn list_by_tournament(conn: &mut DbConn, tournament_id: i64) -> Result<Vec<TournamentMatch>> {
    let sql = format!("SELECT {COLUMNS} FROM matches WHERE tournament_id = ?1 ORDER BY id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![tournament_id], parse_match_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn delete_by_tournament(conn: &mut DbConn, tournament_id: i64) -> Result<usize> {
    conn.execute("DELETE FROM matches WHERE tournament_id = ?1", params![tournament_id])
        .context("Failed to delete matches for tournament")
}

fn parse_match_row(row: &rusqlite::Row) -> rusqlite::Result<TournamentMatch> {
    Ok(TournamentMatch {
        id: row.get(0)?,
        tournament_id: row.get(1)?,
        poule_name: row.get(2)?,
        round: row.get(3)?,
        home: MatchSide {
            licence: row.get(4)?,
            name: row.get(5)?,
            game_points: row.get(6)?,
            innings: row.get(7)?,
            series: row.get(8)?,
            match_points: row.get(9)?,
            average: row.get(10)?,
        },
        away: MatchSide {
            licence: row.get(11)?,
            name: row.get(12)?,
            game_points: row.get(13)?,
            innings: row.get(14)?,
            series: row.get(15)?,
            match_points: row.get(16)?,
            average: row.get(17)?,
        },
    })
}
