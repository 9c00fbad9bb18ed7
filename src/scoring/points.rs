use std::collections::{BTreeMap, HashMap};

use log::warn;

use crate::domain::PositionPointsEntry;

/// Position -> points for one tournament size.
pub type PointsTable = BTreeMap<u32, i64>;

/// Build the position-to-points table for a tournament. Fallback chain,
/// first non-empty level wins:
/// 1. rows for the exact participant count,
/// 2. rows for the smallest configured count >= the actual count,
/// 3. rows flagged as the generic/default set,
/// 4. any rows for the organization, ignoring count.
pub fn resolve_points_table(entries: &[PositionPointsEntry], participant_count: u32) -> PointsTable {
    let exact: PointsTable = rows_for_count(entries, participant_count);
    if !exact.is_empty() {
        return exact;
    }

    let larger_counts: Option<u32> = entries
        .iter()
        .filter(|entry| !entry.is_default && entry.participant_count >= participant_count)
        .map(|entry| entry.participant_count)
        .min();
    if let Some(count) = larger_counts {
        return rows_for_count(entries, count);
    }

    let defaults: PointsTable = entries
        .iter()
        .filter(|entry| entry.is_default)
        .map(|entry| (entry.position, entry.points))
        .collect();
    if !defaults.is_empty() {
        return defaults;
    }

    // Last resort: the smallest configured count, whatever it is.
    let smallest = entries.iter().map(|entry| entry.participant_count).min();
    match smallest {
        Some(count) => rows_for_count_any(entries, count),
        None => PointsTable::new(),
    }
}

fn rows_for_count(entries: &[PositionPointsEntry], count: u32) -> PointsTable {
    entries
        .iter()
        .filter(|entry| !entry.is_default && entry.participant_count == count)
        .map(|entry| (entry.position, entry.points))
        .collect()
}

fn rows_for_count_any(entries: &[PositionPointsEntry], count: u32) -> PointsTable {
    entries
        .iter()
        .filter(|entry| entry.participant_count == count)
        .map(|entry| (entry.position, entry.points))
        .collect()
}

/// Attach point values to already-resolved positions. With last-player
/// degradation enabled, the final position N is priced as position N+1
/// (kept as-is when no N+1 row exists).
pub fn attach_points(
    positions: &HashMap<String, u32>,
    table: &PointsTable,
    last_player_degradation: bool,
) -> HashMap<String, i64> {
    let last_position = positions.values().copied().max().unwrap_or(0);

    positions
        .iter()
        .map(|(licence, position)| {
            let mut lookup = *position;
            if last_player_degradation && *position == last_position && table.contains_key(&(last_position + 1)) {
                lookup = last_position + 1;
            }
            let points = table.get(&lookup).copied().unwrap_or_else(|| {
                warn!("No points configured for position {lookup}, defaulting to 0");
                0
            });
            (licence.clone(), points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(count: u32, position: u32, points: i64, is_default: bool) -> PositionPointsEntry {
        PositionPointsEntry {
            organization_id: 1,
            participant_count: count,
            position,
            points,
            is_default,
        }
    }

    fn table_of(count: u32, values: &[i64]) -> Vec<PositionPointsEntry> {
        values
            .iter()
            .enumerate()
            .map(|(index, points)| entry(count, index as u32 + 1, *points, false))
            .collect()
    }

    #[test]
    fn exact_count_wins() {
        let mut entries = table_of(6, &[10, 8, 6, 4, 2, 1]);
        entries.extend(table_of(8, &[12, 10, 8, 6, 4, 3, 2, 1]));

        let table = resolve_points_table(&entries, 6);
        assert_eq!(table[&1], 10);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn seven_players_fall_back_to_the_eight_row_set() {
        let mut entries = table_of(6, &[10, 8, 6, 4, 2, 1]);
        entries.extend(table_of(8, &[12, 10, 8, 6, 4, 3, 2, 1]));

        let table = resolve_points_table(&entries, 7);
        assert_eq!(table[&1], 12);
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn default_rows_cover_oversized_tournaments() {
        let mut entries = table_of(6, &[10, 8, 6, 4, 2, 1]);
        entries.push(entry(0, 1, 5, true));
        entries.push(entry(0, 2, 3, true));

        let table = resolve_points_table(&entries, 12);
        assert_eq!(table[&1], 5);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn any_rows_terminate_the_chain() {
        let entries = table_of(4, &[6, 4, 2, 1]);
        let table = resolve_points_table(&entries, 16);
        assert!(!table.is_empty());
        assert_eq!(table[&1], 6);
    }

    #[test]
    fn empty_configuration_yields_empty_table() {
        assert!(resolve_points_table(&[], 8).is_empty());
    }

    #[test]
    fn attach_preserves_positions_and_prices_them() {
        let entries = table_of(3, &[6, 4, 2]);
        let table = resolve_points_table(&entries, 3);
        let positions = HashMap::from([
            ("A".to_string(), 1),
            ("B".to_string(), 2),
            ("C".to_string(), 3),
        ]);

        let points = attach_points(&positions, &table, false);
        assert_eq!(points["A"], 6);
        assert_eq!(points["B"], 4);
        assert_eq!(points["C"], 2);
    }

    #[test]
    fn last_player_degradation_uses_next_position_value() {
        let entries = table_of(4, &[6, 4, 2, 1]);
        let table = resolve_points_table(&entries, 4);
        let positions = HashMap::from([
            ("A".to_string(), 1),
            ("B".to_string(), 2),
            ("C".to_string(), 3),
        ]);

        // last of three, priced as position 4
        let points = attach_points(&positions, &table, true);
        assert_eq!(points["C"], 1);
        assert_eq!(points["B"], 4);
    }

    #[test]
    fn degradation_keeps_own_value_when_no_next_row() {
        let entries = table_of(3, &[6, 4, 2]);
        let table = resolve_points_table(&entries, 3);
        let positions = HashMap::from([
            ("A".to_string(), 1),
            ("B".to_string(), 2),
            ("C".to_string(), 3),
        ]);

        let points = attach_points(&positions, &table, true);
        assert_eq!(points["C"], 2);
    }
}
