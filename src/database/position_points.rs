use anyhow::{Context, Result};
use rusqlite::params;

use crate::domain::PositionPointsEntry;

use super::connection::DbConn;

pub fn list_for_organization(
    conn: &mut DbConn,
    organization_id: i64,
) -> Result<Vec<PositionPointsEntry>> {
    let sql = "SELECT organization_id, participant_count, position, points, is_default \
         FROM position_points WHERE organization_id = ?1 ORDER BY participant_count, position";

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params![organization_id], parse_entry_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn insert_entry(conn: &mut DbConn, entry: &PositionPointsEntry) -> Result<()> {
    let sql = "INSERT INTO position_points (organization_id, participant_count, position, points, is_default) \
         VALUES (?1, ?2, ?3, ?4, ?5)";

    conn.execute(
        sql,
        params![
            entry.organization_id,
            entry.participant_count,
            entry.position,
            entry.points,
            entry.is_default,
        ],
    )
    .context("Failed to insert position points entry")?;

    Ok(())
}

fn parse_entry_row(row: &rusqlite::Row) -> rusqlite::Result<PositionPointsEntry> {
    Ok(PositionPointsEntry {
        organization_id: row.get(0)?,
        participant_count: row.get(1)?,
        position: row.get(2)?,
        points: row.get(3)?,
        is_default: row.get(4)?,
    })
}
