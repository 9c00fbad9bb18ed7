use anyhow::{Context, Result};
use rusqlite::params;

use crate::domain::SeasonRankingRow;

use super::connection::DbConn;

const COLUMNS: &str = "category_id, season, licence, name, total_points, details, \
     cumulative_average, best_series, player_rank, breakdown";

/// Replace the full ranking for a (category, season) pair in a single
/// transaction. The delete-then-insert never leaves a partial set behind
/// and doubles as the mutual-exclusion scope for concurrent recomputes.
pub fn replace_for_season(
    conn: &mut DbConn,
    category_id: i64,
    season: &str,
    rows: &[SeasonRankingRow],
) -> Result<()> {
    let tx = conn
        .transaction()
        .context("Failed to open season ranking transaction")?;

    tx.execute(
        "DELETE FROM season_rankings WHERE category_id = ?1 AND season = ?2",
        params![category_id, season],
    )
    .context("Failed to delete previous season ranking")?;

    {
        let sql = format!(
            "INSERT INTO season_rankings ({COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        );
        let mut stmt = tx.prepare(&sql)?;
        for row in rows {
            let details = serde_json::to_string(&row.details)
                .context("Failed to serialize season detail blob")?;
            let breakdown = row.breakdown.to_json()?;
            stmt.execute(params![
                row.category_id,
                row.season,
                row.licence,
                row.name,
                row.total_points,
                details,
                row.cumulative_average,
                row.best_series,
                row.rank,
                breakdown,
            ])
            .context("Failed to insert season ranking row")?;
        }
    }

    tx.commit().context("Failed to commit season ranking")
}

pub fn list_for_season(
    conn: &mut DbConn,
    category_id: i64,
    season: &str,
) -> Result<Vec<SeasonRankingRow>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM season_rankings WHERE category_id = ?1 AND season = ?2 \
         ORDER BY player_rank"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![category_id, season], parse_ranking_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

fn parse_ranking_row(row: &rusqlite::Row) -> rusqlite::Result<SeasonRankingRow> {
    let details_json: String = row.get(5)?;
    let breakdown_json: String = row.get(9)?;

    Ok(SeasonRankingRow {
        category_id: row.get(0)?,
        season: row.get(1)?,
        licence: row.get(2)?,
        name: row.get(3)?,
        total_points: row.get(4)?,
        details: serde_json::from_str(&details_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        cumulative_average: row.get(6)?,
        best_series: row.get(7)?,
        rank: row.get(8)?,
        breakdown: serde_json::from_str(&breakdown_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?,
    })
}
