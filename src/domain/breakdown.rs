use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Closed set of bonus categories. `AverageBonus` is reserved for the
/// dedicated average-bonus pass and never evaluated as a structured rule.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BonusCategory {
    AverageBonus,
    Participation,
    Podium,
    BestSeries,
    Performance,
    Assiduity,
}

impl BonusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BonusCategory::AverageBonus => "average_bonus",
            BonusCategory::Participation => "participation",
            BonusCategory::Podium => "podium",
            BonusCategory::BestSeries => "best_series",
            BonusCategory::Performance => "performance",
            BonusCategory::Assiduity => "assiduity",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "average_bonus" => Some(BonusCategory::AverageBonus),
            "participation" => Some(BonusCategory::Participation),
            "podium" => Some(BonusCategory::Podium),
            "best_series" => Some(BonusCategory::BestSeries),
            "performance" => Some(BonusCategory::Performance),
            "assiduity" => Some(BonusCategory::Assiduity),
            _ => None,
        }
    }
}

/// Per-player mapping of bonus category to awarded points. Writes to one
/// category never touch the others; JSON only at the storage boundary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BonusBreakdown(BTreeMap<BonusCategory, i64>);

impl BonusBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, category: BonusCategory, points: i64) {
        self.0.insert(category, points);
    }

    pub fn remove(&mut self, category: BonusCategory) {
        self.0.remove(&category);
    }

    pub fn get(&self, category: BonusCategory) -> Option<i64> {
        self.0.get(&category).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BonusCategory, i64)> + '_ {
        self.0.iter().map(|(category, points)| (*category, *points))
    }

    /// Total bonus: sum of positive entries only.
    pub fn total(&self) -> i64 {
        self.0.values().filter(|points| **points > 0).sum()
    }

    /// Adds every entry of `other` onto this breakdown, category by
    /// category. Used when cumulating a season.
    pub fn accumulate(&mut self, other: &BonusBreakdown) {
        for (category, points) in other.iter() {
            *self.0.entry(category).or_insert(0) += points;
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize bonus breakdown")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse bonus breakdown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_ignores_non_positive_entries() {
        let mut breakdown = BonusBreakdown::new();
        breakdown.set(BonusCategory::Participation, 2);
        breakdown.set(BonusCategory::Podium, 5);
        breakdown.set(BonusCategory::Performance, -3);
        breakdown.set(BonusCategory::BestSeries, 0);
        assert_eq!(breakdown.total(), 7);
    }

    #[test]
    fn json_round_trip_keeps_entries() {
        let mut breakdown = BonusBreakdown::new();
        breakdown.set(BonusCategory::AverageBonus, 3);
        breakdown.set(BonusCategory::Assiduity, 1);

        let json = breakdown.to_json().unwrap();
        let parsed = BonusBreakdown::from_json(&json).unwrap();
        assert_eq!(parsed, breakdown);
        assert_eq!(parsed.get(BonusCategory::AverageBonus), Some(3));
    }

    #[test]
    fn category_string_round_trip() {
        for category in [
            BonusCategory::AverageBonus,
            BonusCategory::Participation,
            BonusCategory::Podium,
            BonusCategory::BestSeries,
            BonusCategory::Performance,
            BonusCategory::Assiduity,
        ] {
            assert_eq!(BonusCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(BonusCategory::parse("unknown"), None);
    }
}
