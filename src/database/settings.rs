use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use crate::domain::{
    AverageBonusScheme, BonusSettings, OrganizationSettings, QualificationMode, SeasonSettings,
};

use super::connection::DbConn;

const COLUMNS: &str = "organization_id, average_bonus_enabled, average_bonus_scheme, \
     normal_low_points, normal_high_points, tier1_points, tier2_points, tier3_points, \
     last_player_degradation, qualification_mode, best_of_count, qualifying_days, ranking_tournaments";

/// Settings row for an organization; defaults when none is configured.
pub fn get_for_organization(conn: &mut DbConn, organization_id: i64) -> Result<OrganizationSettings> {
    let sql = format!("SELECT {COLUMNS} FROM organization_settings WHERE organization_id = ?1");

    let row = conn
        .query_row(&sql, params![organization_id], parse_settings_row)
        .optional()
        .context("Failed to query organization settings")?;

    match row {
        Some(settings) => Ok(settings),
        None => {
            log::warn!("No settings for organization {organization_id}, using defaults");
            Ok(OrganizationSettings::with_defaults(organization_id))
        }
    }
}

pub fn upsert(conn: &mut DbConn, settings: &OrganizationSettings) -> Result<()> {
    let ranking_tournaments = serde_json::to_string(&settings.season.ranking_tournaments)
        .context("Failed to serialize ranking tournament numbers")?;

    let sql = format!(
        "INSERT OR REPLACE INTO organization_settings ({COLUMNS}) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
    );
    conn.execute(
        &sql,
        params![
            settings.organization_id,
            settings.bonus.average_bonus_enabled,
            settings.bonus.scheme.as_str(),
            settings.bonus.normal_low_points,
            settings.bonus.normal_high_points,
            settings.bonus.tier_points[0],
            settings.bonus.tier_points[1],
            settings.bonus.tier_points[2],
            settings.last_player_degradation,
            settings.season.mode.as_str(),
            settings.season.best_of_count as i64,
            settings.season.qualifying_days,
            ranking_tournaments,
        ],
    )
    .context("Failed to upsert organization settings")?;

    Ok(())
}

fn parse_settings_row(row: &rusqlite::Row) -> rusqlite::Result<OrganizationSettings> {
    let scheme: String = row.get(2)?;
    let mode: String = row.get(9)?;
    let ranking_tournaments: String = row.get(12)?;

    Ok(OrganizationSettings {
        organization_id: row.get(0)?,
        bonus: BonusSettings {
            average_bonus_enabled: row.get(1)?,
            scheme: AverageBonusScheme::parse(&scheme)
                .ok_or_else(|| invalid_column(2, &scheme))?,
            normal_low_points: row.get(3)?,
            normal_high_points: row.get(4)?,
            tier_points: [row.get(5)?, row.get(6)?, row.get(7)?],
        },
        last_player_degradation: row.get(8)?,
        season: SeasonSettings {
            mode: QualificationMode::parse(&mode).ok_or_else(|| invalid_column(9, &mode))?,
            best_of_count: row.get::<_, i64>(10)? as usize,
            qualifying_days: row.get(11)?,
            ranking_tournaments: serde_json::from_str(&ranking_tournaments)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(12, rusqlite::types::Type::Text, Box::new(e)))?,
        },
    })
}

fn invalid_column(index: usize, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        format!("invalid settings column value: {raw}").into(),
    )
}
