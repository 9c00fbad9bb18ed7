use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::domain::{PlayerStats, TournamentMatch};

use super::aggregate::Aggregates;
use super::poule::{ClassificationLabel, PouleClassifier, PouleKind};

/// Resolution progress; the resolver always runs the pipeline through to
/// `Finalized`, the intermediate states exist for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    PouleRanked,
    BracketResolved,
    Finalized,
}

/// Final in-tournament positions plus poule-internal ranks.
#[derive(Debug)]
pub struct ResolvedPositions {
    /// licence -> final position, unique and contiguous 1..N for
    /// consistent source data.
    pub positions: HashMap<String, u32>,
    /// licence -> (poule name, rank within that poule).
    pub poule_ranks: HashMap<String, (String, u32)>,
    pub state: ResolutionState,
    /// Classification poules that could not take part in resolution.
    pub warnings: Vec<String>,
}

/// Canonical performance order: match-points, then average, then best
/// series, all descending. Used everywhere players must be ranked.
pub fn canonical_cmp(a: &PlayerStats, b: &PlayerStats) -> Ordering {
    b.match_points
        .cmp(&a.match_points)
        .then_with(|| {
            b.average()
                .partial_cmp(&a.average())
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| b.best_series.cmp(&a.best_series))
}

/// Sort licences by canonical order over the given stats map. Licence
/// order breaks remaining ties so the result is deterministic.
fn sort_canonical(licences: &mut Vec<String>, stats: &HashMap<String, PlayerStats>) {
    licences.sort_unstable();
    licences.sort_by(|a, b| {
        let empty = PlayerStats::default();
        let sa = stats.get(a).unwrap_or(&empty);
        let sb = stats.get(b).unwrap_or(&empty);
        canonical_cmp(sa, sb)
    });
}

/// Compute each player's final rank within one tournament: poule ranking,
/// then classification-bracket resolution with cross-round conflict
/// handling, then fill-in of uncovered players.
pub fn resolve_positions(
    matches: &[TournamentMatch],
    aggregates: &Aggregates,
    classifier: &PouleClassifier,
) -> ResolvedPositions {
    let mut resolved = ResolvedPositions {
        positions: HashMap::new(),
        poule_ranks: HashMap::new(),
        state: ResolutionState::Unresolved,
        warnings: Vec::new(),
    };

    rank_poules(aggregates, &mut resolved);
    resolved.state = ResolutionState::PouleRanked;

    let brackets = collect_classification_poules(matches, classifier);
    if brackets.is_empty() {
        interleave_poule_ranks(aggregates, &mut resolved);
        resolved.state = ResolutionState::Finalized;
        return resolved;
    }

    let triples = resolve_brackets(&brackets, aggregates, &mut resolved.warnings);
    apply_triples(&triples, &mut resolved.positions);
    resolved.state = ResolutionState::BracketResolved;

    fill_uncovered(aggregates, &mut resolved.positions);
    resolved.state = ResolutionState::Finalized;
    resolved
}

fn rank_poules(aggregates: &Aggregates, resolved: &mut ResolvedPositions) {
    let mut poule_names: Vec<&String> = aggregates.per_poule.keys().collect();
    poule_names.sort_unstable();

    for poule_name in poule_names {
        let stats = &aggregates.per_poule[poule_name];
        let mut licences: Vec<String> = stats.keys().cloned().collect();
        sort_canonical(&mut licences, stats);

        for (index, licence) in licences.into_iter().enumerate() {
            resolved
                .poule_ranks
                .insert(licence, (poule_name.clone(), index as u32 + 1));
        }
    }
}

/// No classification phase: poule winners first, then all runners-up, and
/// so on, each block re-sorted by global stats.
fn interleave_poule_ranks(aggregates: &Aggregates, resolved: &mut ResolvedPositions) {
    let mut blocks: HashMap<u32, Vec<String>> = HashMap::new();
    for (licence, (_, rank)) in &resolved.poule_ranks {
        blocks.entry(*rank).or_default().push(licence.clone());
    }

    let mut ranks: Vec<u32> = blocks.keys().copied().collect();
    ranks.sort_unstable();

    let mut next_position = 1u32;
    for rank in ranks {
        let mut block = blocks.remove(&rank).unwrap_or_default();
        sort_canonical(&mut block, &aggregates.global);
        for licence in block {
            resolved.positions.insert(licence, next_position);
            next_position += 1;
        }
    }
}

struct ClassificationPoule {
    name: String,
    label: ClassificationLabel,
    start: Option<u32>,
    /// Latest round number seen among the poule's matches.
    phase: i32,
    contestants: HashSet<String>,
}

fn collect_classification_poules(
    matches: &[TournamentMatch],
    classifier: &PouleClassifier,
) -> Vec<ClassificationPoule> {
    let mut by_name: HashMap<String, ClassificationPoule> = HashMap::new();

    for record in matches {
        let PouleKind::Classification { label, start } = classifier.classify(&record.poule_name)
        else {
            continue;
        };

        let entry = by_name
            .entry(record.poule_name.clone())
            .or_insert_with(|| ClassificationPoule {
                name: record.poule_name.clone(),
                label,
                start,
                phase: record.round,
                contestants: HashSet::new(),
            });
        entry.phase = entry.phase.max(record.round);
        for side in record.sides() {
            if !side.licence.is_empty() {
                entry.contestants.insert(side.licence.clone());
            }
        }
    }

    let mut poules: Vec<ClassificationPoule> = by_name.into_values().collect();
    poules.sort_by(|a, b| a.name.cmp(&b.name));
    poules
}

struct PositionTriple {
    licence: String,
    position: u32,
    phase: i32,
}

/// Turn each start-bearing classification poule into direct position
/// assignments: contestants in global canonical order take start,
/// start+1, ... Semi-finals are skipped by design; poules without a
/// decodable start cannot assign and are reported.
fn resolve_brackets(
    brackets: &[ClassificationPoule],
    aggregates: &Aggregates,
    warnings: &mut Vec<String>,
) -> Vec<PositionTriple> {
    let mut triples = Vec::new();

    for poule in brackets {
        match (poule.label, poule.start) {
            (ClassificationLabel::SemiFinal, _) => {
                // outcome is already reflected in the finale poules it feeds
                debug!("Skipping semi-final poule '{}'", poule.name);
                continue;
            }
            (_, Some(start)) => {
                let mut licences: Vec<String> = poule.contestants.iter().cloned().collect();
                sort_canonical(&mut licences, &aggregates.global);
                for (offset, licence) in licences.into_iter().enumerate() {
                    triples.push(PositionTriple {
                        licence,
                        position: start + offset as u32,
                        phase: poule.phase,
                    });
                }
            }
            (label, None) => {
                warn!(
                    "Classification poule '{}' ({:?}) has no starting position, players fall back to fill-in",
                    poule.name, label
                );
                warnings.push(format!(
                    "classification poule '{}' assigns no positions",
                    poule.name
                ));
            }
        }
    }

    triples
}

/// Cross-round conflict resolution: latest round first, and a triple only
/// lands if neither its player nor its position was claimed by a later
/// round.
fn apply_triples(triples: &[PositionTriple], positions: &mut HashMap<String, u32>) {
    let mut ordered: Vec<&PositionTriple> = triples.iter().collect();
    ordered.sort_by(|a, b| b.phase.cmp(&a.phase).then(a.position.cmp(&b.position)));

    let mut claimed_positions: HashSet<u32> = HashSet::new();
    for triple in ordered {
        if positions.contains_key(&triple.licence) || claimed_positions.contains(&triple.position) {
            continue;
        }
        positions.insert(triple.licence.clone(), triple.position);
        claimed_positions.insert(triple.position);
    }
}

/// Players not covered by any bracket take the remaining free positions
/// in global canonical order.
fn fill_uncovered(aggregates: &Aggregates, positions: &mut HashMap<String, u32>) {
    let claimed: HashSet<u32> = positions.values().copied().collect();
    let mut uncovered: Vec<String> = aggregates
        .global
        .keys()
        .filter(|licence| !positions.contains_key(*licence))
        .cloned()
        .collect();
    sort_canonical(&mut uncovered, &aggregates.global);

    let mut next_position = 1u32;
    for licence in uncovered {
        while claimed.contains(&next_position) {
            next_position += 1;
        }
        positions.insert(licence, next_position);
        next_position += 1;
    }
}
