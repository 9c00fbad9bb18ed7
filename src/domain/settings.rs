use serde::{Deserialize, Serialize};

/// How the average bonus is graded against the category thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AverageBonusScheme {
    /// Two levels: above the minimum, strictly above the maximum.
    Normal,
    /// Three levels split at the midpoint between minimum and maximum.
    Tiered,
}

impl AverageBonusScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AverageBonusScheme::Normal => "normal",
            AverageBonusScheme::Tiered => "tiered",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(AverageBonusScheme::Normal),
            "tiered" => Some(AverageBonusScheme::Tiered),
            _ => None,
        }
    }
}

/// How tournaments combine into the season ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationMode {
    /// Fixed set of ranking tournaments, finale excluded.
    Standard,
    /// Qualifying days: keep only the best N day scores per player.
    Journees,
}

impl QualificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualificationMode::Standard => "standard",
            QualificationMode::Journees => "journees",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(QualificationMode::Standard),
            "journees" => Some(QualificationMode::Journees),
            _ => None,
        }
    }
}

/// Average-bonus feature configuration for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSettings {
    pub average_bonus_enabled: bool,
    pub scheme: AverageBonusScheme,
    /// Normal scheme: points above the minimum boundary.
    pub normal_low_points: i64,
    /// Normal scheme: points strictly above the maximum boundary.
    pub normal_high_points: i64,
    /// Tiered scheme: points for the three tiers, lowest first.
    pub tier_points: [i64; 3],
}

impl Default for BonusSettings {
    fn default() -> Self {
        Self {
            average_bonus_enabled: true,
            scheme: AverageBonusScheme::Normal,
            normal_low_points: 1,
            normal_high_points: 2,
            tier_points: [1, 2, 3],
        }
    }
}

/// Season aggregation configuration for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSettings {
    pub mode: QualificationMode,
    /// Journées mode: how many day scores count per player.
    pub best_of_count: usize,
    /// Journées mode: number of qualifying days in the season.
    pub qualifying_days: u32,
    /// Standard mode: tournament numbers that count towards the ranking.
    pub ranking_tournaments: Vec<u32>,
}

impl Default for SeasonSettings {
    fn default() -> Self {
        Self {
            mode: QualificationMode::Standard,
            best_of_count: 3,
            qualifying_days: 4,
            ranking_tournaments: vec![1, 2, 3],
        }
    }
}

/// Feature flags and season settings for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSettings {
    pub organization_id: i64,
    pub bonus: BonusSettings,
    pub season: SeasonSettings,
    pub last_player_degradation: bool,
}

impl OrganizationSettings {
    pub fn with_defaults(organization_id: i64) -> Self {
        Self {
            organization_id,
            bonus: BonusSettings::default(),
            season: SeasonSettings::default(),
            last_player_degradation: false,
        }
    }
}
