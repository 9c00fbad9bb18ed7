use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

use crate::domain::Tournament;

use super::connection::DbConn;

const COLUMNS: &str = "id, organization_id, category_id, season, number, name, date";

#[allow(clippy::too_many_arguments)]
pub fn insert_tournament(
    conn: &mut DbConn,
    organization_id: i64,
    category_id: i64,
    season: &str,
    number: u32,
    name: &str,
    date: Option<NaiveDate>,
) -> Result<Tournament> {
    let sql = format!(
        "INSERT INTO tournaments (organization_id, category_id, season, number, name, date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {COLUMNS}"
    );

    conn.query_row(
        &sql,
        params![organization_id, category_id, season, number, name, date],
        parse_tournament_row,
    )
    .context("Failed to insert tournament")
}

pub fn find_by_id(conn: &mut DbConn, id: i64) -> Result<Option<Tournament>> {
    let sql = format!("SELECT {COLUMNS} FROM tournaments WHERE id = ?1");

    conn.query_row(&sql, params![id], parse_tournament_row)
        .optional()
        .context("Failed to query tournament by id")
}

pub fn list_by_category_season(
    conn: &mut DbConn,
    category_id: i64,
    season: &str,
) -> Result<Vec<Tournament>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM tournaments WHERE category_id = ?1 AND season = ?2 ORDER BY number"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![category_id, season], parse_tournament_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_tournament_row(row: &rusqlite::Row) -> rusqlite::Result<Tournament> {
    Ok(Tournament {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        category_id: row.get(2)?,
        season: row.get(3)?,
        number: row.get(4)?,
        name: row.get(5)?,
        date: row.get(6)?,
    })
}
