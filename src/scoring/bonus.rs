use std::collections::BTreeMap;

use log::{debug, warn};

use crate::domain::{
    AverageBonusScheme, BonusBreakdown, BonusCategory, BonusSettings, CategoryThresholds,
    Combinator, RuleCondition, RuleValue, RuleField, ScoringRule, ThresholdRef,
};

/// Comparison tolerance for the `=` operator.
const EQ_TOLERANCE: f64 = 1e-6;

/// Player metrics a rule condition can read.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext {
    pub average: f64,
    pub participant_count: u32,
    pub match_points: i64,
    pub best_series: i64,
    pub position: Option<u32>,
    pub matches_played: i32,
    pub best_match_average: f64,
}

impl RuleContext {
    fn field_value(&self, field: RuleField) -> Option<f64> {
        match field {
            RuleField::Average => Some(self.average),
            RuleField::ParticipantCount => Some(self.participant_count as f64),
            RuleField::MatchPoints => Some(self.match_points as f64),
            RuleField::BestSeries => Some(self.best_series as f64),
            RuleField::Position => self.position.map(|position| position as f64),
            RuleField::MatchesPlayed => Some(self.matches_played as f64),
            RuleField::BestMatchAverage => Some(self.best_match_average),
        }
    }
}

/// Pass A: structured rule evaluation. Rules are grouped by rule_type and
/// tried in display order; the first rule whose condition holds wins the
/// whole group. Each evaluated group writes or removes exactly its own
/// breakdown key.
pub fn evaluate_rules(
    rules: &[ScoringRule],
    context: &RuleContext,
    thresholds: &CategoryThresholds,
    breakdown: &mut BonusBreakdown,
) {
    let mut groups: BTreeMap<BonusCategory, Vec<&ScoringRule>> = BTreeMap::new();
    for rule in rules {
        if !rule.active || rule.points == 0 || rule.rule_type == BonusCategory::AverageBonus {
            continue;
        }
        groups.entry(rule.rule_type).or_default().push(rule);
    }

    for (rule_type, mut group) in groups {
        group.sort_by_key(|rule| rule.order);

        let winner = group
            .iter()
            .find(|rule| rule_matches(rule, context, thresholds));

        match winner {
            Some(rule) if rule.points > 0 => breakdown.set(rule_type, rule.points),
            _ => breakdown.remove(rule_type),
        }
    }
}

fn rule_matches(
    rule: &ScoringRule,
    context: &RuleContext,
    thresholds: &CategoryThresholds,
) -> bool {
    let Some(first) = condition_holds(&rule.first, context, thresholds, rule.id) else {
        return false;
    };

    match (&rule.combinator, &rule.second) {
        (Some(combinator), Some(second)) => {
            let Some(second) = condition_holds(second, context, thresholds, rule.id) else {
                return false;
            };
            match combinator {
                Combinator::And => first && second,
                Combinator::Or => first || second,
            }
        }
        _ => first,
    }
}

/// None when the condition cannot be evaluated (unconfigured threshold
/// reference or unavailable field); the rule is then skipped, not failed.
fn condition_holds(
    condition: &RuleCondition,
    context: &RuleContext,
    thresholds: &CategoryThresholds,
    rule_id: i64,
) -> Option<bool> {
    let Some(actual) = context.field_value(condition.field) else {
        debug!(
            "Rule {}: field {} not available for this player, skipping",
            rule_id,
            condition.field.as_str()
        );
        return None;
    };

    let expected = match condition.value {
        RuleValue::Literal(value) => value,
        RuleValue::Threshold(reference) => match resolve_threshold(reference, thresholds) {
            Some(value) => value,
            None => {
                warn!(
                    "Rule {}: threshold {} not configured, skipping rule",
                    rule_id,
                    reference.as_str()
                );
                return None;
            }
        },
    };

    Some(compare(actual, condition.operator, expected))
}

fn resolve_threshold(reference: ThresholdRef, thresholds: &CategoryThresholds) -> Option<f64> {
    match reference {
        ThresholdRef::MinAverage => thresholds.min_average,
        ThresholdRef::MaxAverage => thresholds.max_average,
    }
}

fn compare(actual: f64, operator: crate::domain::RuleOperator, expected: f64) -> bool {
    use crate::domain::RuleOperator;
    match operator {
        RuleOperator::Gt => actual > expected,
        RuleOperator::Ge => actual >= expected,
        RuleOperator::Lt => actual < expected,
        RuleOperator::Le => actual <= expected,
        RuleOperator::Eq => (actual - expected).abs() <= EQ_TOLERANCE,
    }
}

/// Pass B: the dedicated average bonus, recomputed from the player's
/// average and the category boundaries. Writes or deletes exactly the
/// `average_bonus` key; when disabled any existing entry is cleared.
pub fn apply_average_bonus(
    average: f64,
    thresholds: &CategoryThresholds,
    settings: &BonusSettings,
    breakdown: &mut BonusBreakdown,
) {
    if !settings.average_bonus_enabled {
        breakdown.remove(BonusCategory::AverageBonus);
        return;
    }

    let (Some(min), Some(max)) = (thresholds.min_average, thresholds.max_average) else {
        warn!("Category thresholds not configured, average bonus skipped");
        return;
    };

    let points = match settings.scheme {
        AverageBonusScheme::Normal => {
            if average > max {
                settings.normal_high_points
            } else if average > min {
                settings.normal_low_points
            } else {
                0
            }
        }
        AverageBonusScheme::Tiered => {
            let mid = (min + max) / 2.0;
            if average < min {
                0
            } else if average < mid {
                settings.tier_points[0]
            } else if average < max {
                settings.tier_points[1]
            } else {
                settings.tier_points[2]
            }
        }
    };

    if points > 0 {
        breakdown.set(BonusCategory::AverageBonus, points);
    } else {
        breakdown.remove(BonusCategory::AverageBonus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RuleOperator;

    fn context() -> RuleContext {
        RuleContext {
            average: 2.5,
            participant_count: 8,
            match_points: 10,
            best_series: 15,
            position: Some(2),
            matches_played: 5,
            best_match_average: 3.1,
        }
    }

    fn thresholds() -> CategoryThresholds {
        CategoryThresholds {
            min_average: Some(2.0),
            max_average: Some(3.0),
        }
    }

    fn rule(
        id: i64,
        rule_type: BonusCategory,
        field: RuleField,
        operator: RuleOperator,
        value: RuleValue,
        points: i64,
        order: i32,
    ) -> ScoringRule {
        ScoringRule {
            id,
            rule_type,
            first: RuleCondition { field, operator, value },
            combinator: None,
            second: None,
            points,
            active: true,
            order,
        }
    }

    #[test]
    fn first_matching_rule_wins_its_group() {
        let rules = vec![
            rule(1, BonusCategory::Podium, RuleField::Position, RuleOperator::Eq, RuleValue::Literal(1.0), 5, 1),
            rule(2, BonusCategory::Podium, RuleField::Position, RuleOperator::Le, RuleValue::Literal(3.0), 2, 2),
            rule(3, BonusCategory::Podium, RuleField::Position, RuleOperator::Le, RuleValue::Literal(8.0), 1, 3),
        ];

        let mut breakdown = BonusBreakdown::new();
        evaluate_rules(&rules, &context(), &thresholds(), &mut breakdown);
        // position 2: rule 1 misses, rule 2 wins, rule 3 never evaluated
        assert_eq!(breakdown.get(BonusCategory::Podium), Some(2));
        assert_eq!(breakdown.total(), 2);
    }

    #[test]
    fn display_order_beats_slice_order() {
        let rules = vec![
            rule(1, BonusCategory::Podium, RuleField::Position, RuleOperator::Le, RuleValue::Literal(8.0), 1, 5),
            rule(2, BonusCategory::Podium, RuleField::Position, RuleOperator::Le, RuleValue::Literal(3.0), 2, 1),
        ];

        let mut breakdown = BonusBreakdown::new();
        evaluate_rules(&rules, &context(), &thresholds(), &mut breakdown);
        assert_eq!(breakdown.get(BonusCategory::Podium), Some(2));
    }

    #[test]
    fn unrelated_categories_survive_evaluation() {
        let rules = vec![rule(
            1,
            BonusCategory::Participation,
            RuleField::MatchesPlayed,
            RuleOperator::Ge,
            RuleValue::Literal(1.0),
            1,
            1,
        )];

        let mut breakdown = BonusBreakdown::new();
        breakdown.set(BonusCategory::AverageBonus, 3);
        breakdown.set(BonusCategory::BestSeries, 2);
        evaluate_rules(&rules, &context(), &thresholds(), &mut breakdown);

        assert_eq!(breakdown.get(BonusCategory::Participation), Some(1));
        assert_eq!(breakdown.get(BonusCategory::AverageBonus), Some(3));
        assert_eq!(breakdown.get(BonusCategory::BestSeries), Some(2));
    }

    #[test]
    fn group_with_no_match_clears_its_key() {
        let rules = vec![rule(
            1,
            BonusCategory::Podium,
            RuleField::Position,
            RuleOperator::Eq,
            RuleValue::Literal(1.0),
            5,
            1,
        )];

        let mut breakdown = BonusBreakdown::new();
        breakdown.set(BonusCategory::Podium, 5);
        evaluate_rules(&rules, &context(), &thresholds(), &mut breakdown);
        assert_eq!(breakdown.get(BonusCategory::Podium), None);
    }

    #[test]
    fn missing_threshold_reference_skips_the_rule() {
        let rules = vec![
            rule(
                1,
                BonusCategory::Performance,
                RuleField::Average,
                RuleOperator::Ge,
                RuleValue::Threshold(ThresholdRef::MaxAverage),
                5,
                1,
            ),
            rule(
                2,
                BonusCategory::Performance,
                RuleField::Average,
                RuleOperator::Ge,
                RuleValue::Literal(2.0),
                1,
                2,
            ),
        ];

        let bare = CategoryThresholds::default();
        let mut breakdown = BonusBreakdown::new();
        evaluate_rules(&rules, &context(), &bare, &mut breakdown);
        // rule 1 needs the unconfigured max threshold, rule 2 takes over
        assert_eq!(breakdown.get(BonusCategory::Performance), Some(1));
    }

    #[test]
    fn and_or_combinators() {
        let mut combined = rule(
            1,
            BonusCategory::Performance,
            RuleField::Average,
            RuleOperator::Ge,
            RuleValue::Literal(2.0),
            3,
            1,
        );
        combined.combinator = Some(Combinator::And);
        combined.second = Some(RuleCondition {
            field: RuleField::ParticipantCount,
            operator: RuleOperator::Ge,
            value: RuleValue::Literal(10.0),
        });

        let mut breakdown = BonusBreakdown::new();
        evaluate_rules(&[combined.clone()], &context(), &thresholds(), &mut breakdown);
        // 8 participants < 10: AND fails
        assert_eq!(breakdown.get(BonusCategory::Performance), None);

        combined.combinator = Some(Combinator::Or);
        evaluate_rules(&[combined], &context(), &thresholds(), &mut breakdown);
        assert_eq!(breakdown.get(BonusCategory::Performance), Some(3));
    }

    #[test]
    fn equality_uses_tolerance() {
        assert!(compare(2.0 + 1e-9, RuleOperator::Eq, 2.0));
        assert!(!compare(2.1, RuleOperator::Eq, 2.0));
    }

    #[test]
    fn inactive_zero_point_and_average_rules_are_ignored() {
        let mut inactive = rule(1, BonusCategory::Podium, RuleField::Position, RuleOperator::Le, RuleValue::Literal(8.0), 2, 1);
        inactive.active = false;
        let zero = rule(2, BonusCategory::BestSeries, RuleField::BestSeries, RuleOperator::Ge, RuleValue::Literal(1.0), 0, 1);
        let reserved = rule(3, BonusCategory::AverageBonus, RuleField::Average, RuleOperator::Ge, RuleValue::Literal(0.0), 9, 1);

        let mut breakdown = BonusBreakdown::new();
        evaluate_rules(&[inactive, zero, reserved], &context(), &thresholds(), &mut breakdown);
        assert!(breakdown.is_empty());
    }

    #[test]
    fn tiered_average_bonus_matches_boundaries() {
        let settings = BonusSettings {
            average_bonus_enabled: true,
            scheme: AverageBonusScheme::Tiered,
            tier_points: [1, 2, 3],
            ..BonusSettings::default()
        };

        // min 2.0, max 3.0, mid 2.5
        let cases = [(1.9, None), (2.0, Some(1)), (2.4, Some(1)), (2.5, Some(2)), (2.9, Some(2)), (3.0, Some(3))];
        for (average, expected) in cases {
            let mut breakdown = BonusBreakdown::new();
            apply_average_bonus(average, &thresholds(), &settings, &mut breakdown);
            assert_eq!(breakdown.get(BonusCategory::AverageBonus), expected, "average {average}");
        }
    }

    #[test]
    fn normal_average_bonus_two_levels() {
        let settings = BonusSettings {
            average_bonus_enabled: true,
            scheme: AverageBonusScheme::Normal,
            normal_low_points: 1,
            normal_high_points: 2,
            ..BonusSettings::default()
        };

        let cases = [(1.5, None), (2.1, Some(1)), (3.0, Some(1)), (3.1, Some(2))];
        for (average, expected) in cases {
            let mut breakdown = BonusBreakdown::new();
            apply_average_bonus(average, &thresholds(), &settings, &mut breakdown);
            assert_eq!(breakdown.get(BonusCategory::AverageBonus), expected, "average {average}");
        }
    }

    #[test]
    fn disabled_feature_clears_existing_entry() {
        let settings = BonusSettings {
            average_bonus_enabled: false,
            ..BonusSettings::default()
        };

        let mut breakdown = BonusBreakdown::new();
        breakdown.set(BonusCategory::AverageBonus, 3);
        breakdown.set(BonusCategory::Podium, 2);
        apply_average_bonus(2.5, &thresholds(), &settings, &mut breakdown);
        assert_eq!(breakdown.get(BonusCategory::AverageBonus), None);
        assert_eq!(breakdown.get(BonusCategory::Podium), Some(2));
    }

    #[test]
    fn missing_thresholds_leave_breakdown_untouched() {
        let settings = BonusSettings::default();
        let mut breakdown = BonusBreakdown::new();
        breakdown.set(BonusCategory::AverageBonus, 2);
        apply_average_bonus(2.5, &CategoryThresholds::default(), &settings, &mut breakdown);
        assert_eq!(breakdown.get(BonusCategory::AverageBonus), Some(2));
    }
}
