use anyhow::{Context, Result};

use super::connection::DbConn;

/// Drop and recreate every engine table from the bundled schema.
pub fn reset_database(conn: &mut DbConn) -> Result<()> {
    let schema_sql = include_str!("schema.sql");

    for (idx, statement) in split_sql_statements(schema_sql).iter().enumerate() {
        conn.execute(statement, [])
            .with_context(|| format!("Failed to execute schema statement {}", idx + 1))?;
    }

    log::info!("Database schema reset");
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|statement| statement.trim().to_string())
        .filter(|statement| !statement.is_empty())
        .collect()
}
