use serde::{Deserialize, Serialize};

use super::breakdown::BonusCategory;

/// Player metric a rule condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleField {
    Average,
    ParticipantCount,
    MatchPoints,
    BestSeries,
    Position,
    MatchesPlayed,
    BestMatchAverage,
}

impl RuleField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleField::Average => "average",
            RuleField::ParticipantCount => "participant_count",
            RuleField::MatchPoints => "match_points",
            RuleField::BestSeries => "best_series",
            RuleField::Position => "position",
            RuleField::MatchesPlayed => "matches_played",
            RuleField::BestMatchAverage => "best_match_average",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "average" => Some(RuleField::Average),
            "participant_count" => Some(RuleField::ParticipantCount),
            "match_points" => Some(RuleField::MatchPoints),
            "best_series" => Some(RuleField::BestSeries),
            "position" => Some(RuleField::Position),
            "matches_played" => Some(RuleField::MatchesPlayed),
            "best_match_average" => Some(RuleField::BestMatchAverage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
}

impl RuleOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOperator::Gt => ">",
            RuleOperator::Ge => ">=",
            RuleOperator::Lt => "<",
            RuleOperator::Le => "<=",
            RuleOperator::Eq => "=",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ">" => Some(RuleOperator::Gt),
            ">=" => Some(RuleOperator::Ge),
            "<" => Some(RuleOperator::Lt),
            "<=" => Some(RuleOperator::Le),
            "=" => Some(RuleOperator::Eq),
            _ => None,
        }
    }
}

/// Named category-threshold boundary a rule value can refer to instead of
/// a literal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdRef {
    MinAverage,
    MaxAverage,
}

impl ThresholdRef {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdRef::MinAverage => "min_average",
            ThresholdRef::MaxAverage => "max_average",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "min_average" => Some(ThresholdRef::MinAverage),
            "max_average" => Some(ThresholdRef::MaxAverage),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleValue {
    Literal(f64),
    Threshold(ThresholdRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "and" => Some(Combinator::And),
            "or" => Some(Combinator::Or),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    pub field: RuleField,
    pub operator: RuleOperator,
    pub value: RuleValue,
}

/// A configurable bonus rule. Rules sharing a rule_type are mutually
/// exclusive at evaluation time; `order` is a required part of the
/// contract, not implicit insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub id: i64,
    pub rule_type: BonusCategory,
    pub first: RuleCondition,
    pub combinator: Option<Combinator>,
    pub second: Option<RuleCondition>,
    pub points: i64,
    pub active: bool,
    pub order: i32,
}

/// Average boundaries configured per category and game mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryThresholds {
    pub min_average: Option<f64>,
    pub max_average: Option<f64>,
}
