use anyhow::{Context, Result};
use rusqlite::params;

use crate::domain::{
    BonusCategory, Combinator, RuleCondition, RuleField, RuleOperator, RuleValue, ScoringRule,
    ThresholdRef,
};

use super::connection::DbConn;

const COLUMNS: &str = "id, rule_type, first_field, first_operator, first_value, \
     combinator, second_field, second_operator, second_value, points, active, display_order";

pub fn list_for_organization(conn: &mut DbConn, organization_id: i64) -> Result<Vec<ScoringRule>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM scoring_rules WHERE organization_id = ?1 ORDER BY display_order, id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![organization_id], parse_rule_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}

pub fn insert_rule(conn: &mut DbConn, organization_id: i64, rule: &ScoringRule) -> Result<i64> {
    let sql = "INSERT INTO scoring_rules (organization_id, rule_type, first_field, first_operator, \
         first_value, combinator, second_field, second_operator, second_value, points, active, display_order) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)";

    let (second_field, second_operator, second_value) = match &rule.second {
        Some(condition) => (
            Some(condition.field.as_str()),
            Some(condition.operator.as_str()),
            Some(encode_value(&condition.value)),
        ),
        None => (None, None, None),
    };

    conn.execute(
        sql,
        params![
            organization_id,
            rule.rule_type.as_str(),
            rule.first.field.as_str(),
            rule.first.operator.as_str(),
            encode_value(&rule.first.value),
            rule.combinator.map(|combinator| combinator.as_str()),
            second_field,
            second_operator,
            second_value,
            rule.points,
            rule.active,
            rule.order,
        ],
    )
    .context("Failed to insert scoring rule")?;

    Ok(conn.last_insert_rowid())
}

/// Literal values are stored as their decimal text, threshold references
/// by name with a leading '@'.
fn encode_value(value: &RuleValue) -> String {
    match value {
        RuleValue::Literal(number) => number.to_string(),
        RuleValue::Threshold(reference) => format!("@{}", reference.as_str()),
    }
}

fn decode_value(raw: &str) -> Option<RuleValue> {
    if let Some(name) = raw.strip_prefix('@') {
        return ThresholdRef::parse(name).map(RuleValue::Threshold);
    }
    raw.parse().ok().map(RuleValue::Literal)
}

fn parse_rule_row(row: &rusqlite::Row) -> rusqlite::Result<ScoringRule> {
    let rule_type: String = row.get(1)?;
    let first_field: String = row.get(2)?;
    let first_operator: String = row.get(3)?;
    let first_value: String = row.get(4)?;
    let combinator: Option<String> = row.get(5)?;
    let second_field: Option<String> = row.get(6)?;
    let second_operator: Option<String> = row.get(7)?;
    let second_value: Option<String> = row.get(8)?;

    let first = parse_condition(1, &first_field, &first_operator, &first_value)?;
    let second = match (&second_field, &second_operator, &second_value) {
        (Some(field), Some(operator), Some(value)) => {
            Some(parse_condition(6, field, operator, value)?)
        }
        _ => None,
    };

    Ok(ScoringRule {
        id: row.get(0)?,
        rule_type: BonusCategory::parse(&rule_type)
            .ok_or_else(|| invalid_column(1, &rule_type))?,
        first,
        combinator: match combinator {
            Some(raw) => Some(Combinator::parse(&raw).ok_or_else(|| invalid_column(5, &raw))?),
            None => None,
        },
        second,
        points: row.get(9)?,
        active: row.get(10)?,
        order: row.get(11)?,
    })
}

fn parse_condition(
    column: usize,
    field: &str,
    operator: &str,
    value: &str,
) -> rusqlite::Result<RuleCondition> {
    Ok(RuleCondition {
        field: RuleField::parse(field).ok_or_else(|| invalid_column(column, field))?,
        operator: RuleOperator::parse(operator)
            .ok_or_else(|| invalid_column(column + 1, operator))?,
        value: decode_value(value).ok_or_else(|| invalid_column(column + 2, value))?,
    })
}

fn invalid_column(index: usize, raw: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        rusqlite::types::Type::Text,
        format!("invalid rule column value: {raw}").into(),
    )
}
