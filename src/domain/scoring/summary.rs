//! Descriptive statistics over raw score entries.
//!
//! Informational only: the facilitator may lock any value regardless.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Criterion, ItemId};

use super::score_entry::ScoreEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub item_id: ItemId,
    pub criterion: Criterion,
    pub count: usize,
    pub min: u32,
    pub max: u32,
    pub median: f64,
    pub mean: f64,
    /// True when every attendee submitted the same value.
    pub unanimous: bool,
}

/// Summarizes the entries for one item and criterion.
///
/// Entries for other items or criteria are ignored. Returns `None` if no
/// entry matches.
pub fn summarize(item_id: ItemId, criterion: Criterion, entries: &[ScoreEntry]) -> Option<ScoreSummary> {
    let mut values: Vec<u32> = entries
        .iter()
        .filter(|e| e.item_id == item_id && e.criterion == criterion)
        .map(|e| e.value.value())
        .collect();
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();

    let count = values.len();
    let min = values[0];
    let max = values[count - 1];
    let median = if count % 2 == 1 {
        f64::from(values[count / 2])
    } else {
        (f64::from(values[count / 2 - 1]) + f64::from(values[count / 2])) / 2.0
    };
    let mean = values.iter().map(|v| f64::from(*v)).sum::<f64>() / count as f64;

    Some(ScoreSummary {
        item_id,
        criterion,
        count,
        min,
        max,
        median,
        mean,
        unanimous: min == max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{AttendeeId, ProjectId, ScoreValue};

    fn entry(item: ItemId, criterion: Criterion, value: i64) -> ScoreEntry {
        ScoreEntry::new(
            ProjectId::new(),
            item,
            AttendeeId::new(),
            criterion,
            ScoreValue::try_from_i64(value).unwrap(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn summary_of_odd_count() {
        let item = ItemId::new();
        let entries = vec![
            entry(item, Criterion::Value, 13),
            entry(item, Criterion::Value, 3),
            entry(item, Criterion::Value, 8),
        ];

        let summary = summarize(item, Criterion::Value, &entries).unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.min, 3);
        assert_eq!(summary.max, 13);
        assert_eq!(summary.median, 8.0);
        assert_eq!(summary.mean, 8.0);
        assert!(!summary.unanimous);
    }

    #[test]
    fn median_of_even_count_is_midpoint() {
        let item = ItemId::new();
        let entries = vec![
            entry(item, Criterion::Complexity, 2),
            entry(item, Criterion::Complexity, 5),
        ];

        let summary = summarize(item, Criterion::Complexity, &entries).unwrap();
        assert_eq!(summary.median, 3.5);
    }

    #[test]
    fn other_items_and_criteria_are_ignored() {
        let item = ItemId::new();
        let entries = vec![
            entry(item, Criterion::Value, 5),
            entry(item, Criterion::Complexity, 89),
            entry(ItemId::new(), Criterion::Value, 1),
        ];

        let summary = summarize(item, Criterion::Value, &entries).unwrap();
        assert_eq!(summary.count, 1);
        assert!(summary.unanimous);
    }

    #[test]
    fn no_entries_means_no_summary() {
        assert!(summarize(ItemId::new(), Criterion::Value, &[]).is_none());
    }
}
