use anyhow::{Context, Result};
use regex::Regex;

/// What a classification poule was recognized as. Labels without a
/// derivable starting position are skipped by the position resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationLabel {
    Final,
    ThirdPlace,
    SemiFinal,
    Placement,
    Barrage,
    /// Matched a classification trigger but no starting position could be
    /// decoded from the name. Surfaced to operators as a warning.
    Unrecognized,
}

/// Outcome of classifying one poule name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PouleKind {
    /// Round-robin group, ranked by poule-local stats.
    Regular,
    /// Placement/elimination group assigning final positions directly.
    Classification {
        label: ClassificationLabel,
        start: Option<u32>,
    },
}

impl PouleKind {
    pub fn is_classification(&self) -> bool {
        matches!(self, PouleKind::Classification { .. })
    }
}

/// Name-pattern parser for poule labels. Patterns follow the federation's
/// score-sheet conventions; anything unmatched is a regular poule.
pub struct PouleClassifier {
    group_placement: Regex,
    classement_range: Regex,
    places_range: Regex,
    place_single: Regex,
    bare_range: Regex,
    group_token: Regex,
}

impl PouleClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            group_placement: compile(r"(?i)G\d+\s*-\s*\d+\s*-\s*P(\d+)\s*-\s*(\d+)")?,
            classement_range: compile(r"(?i)CLASSEMENT\s+(\d+)\s*-\s*(\d+)")?,
            places_range: compile(r"(?i)PLACES?\s+(\d+)\s*-\s*(\d+)")?,
            place_single: compile(r"(?i)PLACE\s+(\d+)\s*$")?,
            bare_range: compile(r"^\s*(\d+)\s*-\s*(\d+)\s*$")?,
            group_token: compile(r"(?i)\bG\d+\s*-\s*\d+\b")?,
        })
    }

    /// Classify a poule name. Pure and total: unmatched names are regular.
    pub fn classify(&self, name: &str) -> PouleKind {
        let upper = name.to_uppercase();

        if upper.contains("DEMI-FINALE")
            || upper.contains("DEMI FINALE")
            || upper.contains("SEMI-FINAL")
        {
            return classification(ClassificationLabel::SemiFinal, None);
        }
        if upper.contains("PETITE FINALE") {
            return classification(ClassificationLabel::ThirdPlace, Some(3));
        }
        if upper.contains("FINALE") {
            return classification(ClassificationLabel::Final, Some(1));
        }
        if let Some(captures) = self.group_placement.captures(name) {
            return placement_from_capture(&captures);
        }
        if let Some(captures) = self.classement_range.captures(name) {
            return placement_from_capture(&captures);
        }
        if upper.contains("CLASSEMENT") {
            return classification(ClassificationLabel::Unrecognized, None);
        }
        if let Some(captures) = self.places_range.captures(name) {
            return placement_from_capture(&captures);
        }
        if let Some(captures) = self.place_single.captures(name) {
            // Singular "Place n" labels the pair contesting positions
            // n-1 and n; the winner takes the better of the two.
            if let Some(n) = parse_capture(&captures, 1) {
                if n >= 2 {
                    return classification(ClassificationLabel::Placement, Some(n - 1));
                }
            }
            return classification(ClassificationLabel::Unrecognized, None);
        }
        if upper.contains("PLACE ") {
            return classification(ClassificationLabel::Unrecognized, None);
        }
        if upper.contains("BARRAGE") {
            return classification(ClassificationLabel::Barrage, None);
        }
        if let Some(captures) = self.bare_range.captures(name) {
            return placement_from_capture(&captures);
        }
        if self.group_token.is_match(name) {
            return classification(ClassificationLabel::Unrecognized, None);
        }

        PouleKind::Regular
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid poule pattern: {pattern}"))
}

fn classification(label: ClassificationLabel, start: Option<u32>) -> PouleKind {
    PouleKind::Classification { label, start }
}

fn placement_from_capture(captures: &regex::Captures<'_>) -> PouleKind {
    match parse_capture(captures, 1) {
        Some(start) if start >= 1 => classification(ClassificationLabel::Placement, Some(start)),
        _ => classification(ClassificationLabel::Unrecognized, None),
    }
}

fn parse_capture(captures: &regex::Captures<'_>, index: usize) -> Option<u32> {
    captures.get(index)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(name: &str) -> PouleKind {
        PouleClassifier::new().unwrap().classify(name)
    }

    #[test]
    fn plain_names_are_regular() {
        assert_eq!(classify("POULES"), PouleKind::Regular);
        assert_eq!(classify("Poule A"), PouleKind::Regular);
        assert_eq!(classify("Groupe unique"), PouleKind::Regular);
    }

    #[test]
    fn finale_starts_at_one() {
        assert_eq!(
            classify("FINALE"),
            PouleKind::Classification {
                label: ClassificationLabel::Final,
                start: Some(1)
            }
        );
    }

    #[test]
    fn petite_finale_starts_at_three() {
        assert_eq!(
            classify("Petite Finale"),
            PouleKind::Classification {
                label: ClassificationLabel::ThirdPlace,
                start: Some(3)
            }
        );
    }

    #[test]
    fn demi_finale_has_no_start() {
        for name in ["DEMI-FINALE", "Demi Finale 1", "Semi-final A"] {
            assert_eq!(
                classify(name),
                PouleKind::Classification {
                    label: ClassificationLabel::SemiFinal,
                    start: None
                }
            );
        }
    }

    #[test]
    fn group_placement_token_decodes_p_range() {
        assert_eq!(
            classify("G1-4 - P5-8"),
            PouleKind::Classification {
                label: ClassificationLabel::Placement,
                start: Some(5)
            }
        );
    }

    #[test]
    fn classement_range_uses_first_number() {
        assert_eq!(
            classify("Classement 9-12"),
            PouleKind::Classification {
                label: ClassificationLabel::Placement,
                start: Some(9)
            }
        );
    }

    #[test]
    fn places_range_and_singular_place() {
        assert_eq!(
            classify("Places 5-6"),
            PouleKind::Classification {
                label: ClassificationLabel::Placement,
                start: Some(5)
            }
        );
        // winner of "Place 6" takes position 5
        assert_eq!(
            classify("Place 6"),
            PouleKind::Classification {
                label: ClassificationLabel::Placement,
                start: Some(5)
            }
        );
    }

    #[test]
    fn bare_numeric_range_is_a_placement() {
        assert_eq!(
            classify("13-16"),
            PouleKind::Classification {
                label: ClassificationLabel::Placement,
                start: Some(13)
            }
        );
    }

    #[test]
    fn barrage_is_classification_without_start() {
        assert_eq!(
            classify("Barrage"),
            PouleKind::Classification {
                label: ClassificationLabel::Barrage,
                start: None
            }
        );
    }

    #[test]
    fn trigger_without_decodable_start_is_unrecognized() {
        assert_eq!(
            classify("Classement final"),
            PouleKind::Classification {
                label: ClassificationLabel::Unrecognized,
                start: None
            }
        );
        assert_eq!(
            classify("G5-8"),
            PouleKind::Classification {
                label: ClassificationLabel::Unrecognized,
                start: None
            }
        );
    }
}
