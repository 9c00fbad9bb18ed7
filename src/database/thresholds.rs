use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::domain::CategoryThresholds;

use super::connection::DbConn;

pub fn get_for_category(conn: &mut DbConn, category_id: i64) -> Result<Option<CategoryThresholds>> {
    let sql = "SELECT min_average, max_average FROM category_thresholds WHERE category_id = ?1";

    conn.query_row(sql, params![category_id], |row| {
        Ok(CategoryThresholds {
            min_average: row.get(0)?,
            max_average: row.get(1)?,
        })
    })
    .optional()
    .context("Failed to query category thresholds")
}

pub fn upsert_for_category(
    conn: &mut DbConn,
    category_id: i64,
    thresholds: &CategoryThresholds,
) -> Result<()> {
    let sql = "INSERT OR REPLACE INTO category_thresholds (category_id, min_average, max_average) \
         VALUES (?1, ?2, ?3)";

    conn.execute(
        sql,
        params![category_id, thresholds.min_average, thresholds.max_average],
    )
    .context("Failed to upsert category thresholds")?;

    Ok(())
}
