//! Pure reshaping of document sections into chart-ready forms.
//!
//! Everything here is synchronous and side-effect free: the renderer calls
//! these on every draw with whatever document is currently loaded, and none
//! of them mutate their input.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::document::{SenderCount, Slot, SlotCount, TrendPoint};

// ---------------------------------------------------------------------------
// Sender ranking
// ---------------------------------------------------------------------------

/// Return the top `n` senders by count, descending. Ties keep their original
/// relative order (`sort_by` is stable). The input slice is untouched.
pub fn top_senders(records: &[SenderCount], n: usize) -> Vec<SenderCount> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Weekly pivot
// ---------------------------------------------------------------------------

/// One row of the pivoted weekly trend: a week plus a count per pillar
/// observed in that week. Pillars the week never saw are simply absent and
/// read as zero via `pillar_count`.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekRow {
    pub week: String,
    pub counts: HashMap<String, u64>,
}

impl WeekRow {
    pub fn pillar_count(&self, pillar: &str) -> u64 {
        self.counts.get(pillar).copied().unwrap_or(0)
    }
}

/// Pivot flat (week, pillar, count) records into one row per week with one
/// entry per pillar, summing duplicate (week, pillar) pairs. Rows come out
/// ascending by lexicographic week string.
pub fn pivot_by_week(records: &[TrendPoint]) -> Vec<WeekRow> {
    let mut rows: BTreeMap<&str, HashMap<String, u64>> = BTreeMap::new();

    for record in records {
        let counts = rows.entry(record.week.as_str()).or_default();
        *counts.entry(record.pillar.clone()).or_insert(0) += record.count;
    }

    rows.into_iter()
        .map(|(week, counts)| WeekRow {
            week: week.to_string(),
            counts,
        })
        .collect()
}

/// The distinct pillar names across all trend records, in first-observed
/// order. This is the series set for the trend chart: every row is read
/// against the same column list.
pub fn pillar_columns(records: &[TrendPoint]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        if !columns.iter().any(|c| c == &record.pillar) {
            columns.push(record.pillar.clone());
        }
    }
    columns
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Composite-key lookup over (date, slot) cells plus the axes needed to
/// render the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    cells: HashMap<(String, Slot), u64>,
    /// Distinct dates, ascending string order.
    pub date_axis: Vec<String>,
    /// Max observed count, floored at 1 so intensity never divides by zero.
    pub max_count: u64,
}

impl Heatmap {
    /// Count for a cell; 0 when the document has no record for it.
    pub fn count(&self, date: &str, slot: Slot) -> u64 {
        self.cells
            .get(&(date.to_string(), slot))
            .copied()
            .unwrap_or(0)
    }

    /// Visual intensity in [0, 1]: count over the max observed count.
    pub fn intensity(&self, date: &str, slot: Slot) -> f64 {
        self.count(date, slot) as f64 / self.max_count as f64
    }
}

/// Build the (date, slot) lookup from flat heatmap records.
///
/// Duplicate composite keys overwrite in input order rather than summing --
/// the weekly pivot sums, this does not. The asymmetry comes straight from
/// the data producer; unclear whether it is intended, so both behaviors are
/// kept as-is.
///
/// Records with a slot label outside the four canonical ones cannot be placed
/// on the fixed slot axis and are skipped; their date still joins the date
/// axis.
pub fn build_heatmap(records: &[SlotCount]) -> Heatmap {
    let mut cells: HashMap<(String, Slot), u64> = HashMap::new();
    let mut dates: BTreeSet<&str> = BTreeSet::new();
    let mut max_count: u64 = 0;

    for record in records {
        dates.insert(record.date_only.as_str());
        if record.count > max_count {
            max_count = record.count;
        }
        if let Some(slot) = Slot::from_label(&record.slot) {
            cells.insert((record.date_only.clone(), slot), record.count);
        }
    }

    Heatmap {
        cells,
        date_axis: dates.into_iter().map(|d| d.to_string()).collect(),
        max_count: max_count.max(1),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sender(name: &str, count: u64) -> SenderCount {
        SenderCount {
            sender: name.to_string(),
            count,
        }
    }

    fn trend(week: &str, pillar: &str, count: u64) -> TrendPoint {
        TrendPoint {
            week: week.to_string(),
            pillar: pillar.to_string(),
            count,
        }
    }

    fn slot_count(date: &str, slot: &str, count: u64) -> SlotCount {
        SlotCount {
            date_only: date.to_string(),
            slot: slot.to_string(),
            count,
        }
    }

    #[test]
    fn test_top_senders_sorts_desc_and_truncates() {
        let records = vec![sender("a", 5), sender("b", 9), sender("c", 9)];
        let top = top_senders(&records, 2);

        // Ties keep original relative order: b before c.
        assert_eq!(top, vec![sender("b", 9), sender("c", 9)]);
    }

    #[test]
    fn test_top_senders_does_not_mutate_input() {
        let records = vec![sender("a", 1), sender("b", 3)];
        let before = records.clone();
        let _ = top_senders(&records, 1);
        let _ = top_senders(&records, 1);
        assert_eq!(records, before);
    }

    #[test]
    fn test_top_senders_n_larger_than_input() {
        let records = vec![sender("a", 1)];
        assert_eq!(top_senders(&records, 10).len(), 1);
        assert!(top_senders(&[], 5).is_empty());
    }

    #[test]
    fn test_pivot_by_week_sums_duplicates() {
        let records = vec![
            trend("2024-W01", "X", 3),
            trend("2024-W01", "X", 2),
            trend("2024-W01", "Y", 1),
            trend("2024-W02", "X", 4),
        ];
        let rows = pivot_by_week(&records);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].week, "2024-W01");
        assert_eq!(rows[0].pillar_count("X"), 5);
        assert_eq!(rows[0].pillar_count("Y"), 1);
        assert_eq!(rows[1].week, "2024-W02");
        assert_eq!(rows[1].pillar_count("X"), 4);
        // W02 never saw Y -- absent entry reads as zero.
        assert!(!rows[1].counts.contains_key("Y"));
        assert_eq!(rows[1].pillar_count("Y"), 0);
    }

    #[test]
    fn test_pivot_by_week_orders_rows_ascending() {
        let records = vec![
            trend("2024-W10", "X", 1),
            trend("2024-W02", "X", 1),
            trend("2024-W05", "X", 1),
        ];
        let rows = pivot_by_week(&records);
        let weeks: Vec<&str> = rows.iter().map(|r| r.week.as_str()).collect();
        assert_eq!(weeks, vec!["2024-W02", "2024-W05", "2024-W10"]);
    }

    #[test]
    fn test_pivot_is_pure_and_idempotent() {
        let records = vec![trend("2024-W01", "X", 3), trend("2024-W01", "Y", 1)];
        let before = records.clone();
        let first = pivot_by_week(&records);
        let second = pivot_by_week(&records);
        assert_eq!(first, second);
        assert_eq!(records, before);
    }

    #[test]
    fn test_pillar_columns_first_observed_order() {
        let records = vec![
            trend("2024-W01", "Ops", 1),
            trend("2024-W01", "Sales", 1),
            trend("2024-W02", "Ops", 1),
            trend("2024-W02", "Support", 1),
        ];
        assert_eq!(pillar_columns(&records), vec!["Ops", "Sales", "Support"]);
    }

    #[test]
    fn test_build_heatmap_axes_and_zero_cells() {
        let records = vec![
            slot_count("2024-03-02", "Morning", 4),
            slot_count("2024-03-01", "Evening", 9),
            slot_count("2024-03-01", "Morning", 2),
            slot_count("2024-03-02", "Evening", 1),
        ];
        let heatmap = build_heatmap(&records);

        assert_eq!(heatmap.date_axis, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(heatmap.max_count, 9);

        // Observed cells.
        assert_eq!(heatmap.count("2024-03-01", Slot::Evening), 9);
        assert_eq!(heatmap.count("2024-03-02", Slot::Morning), 4);

        // The two unobserved slots per date read as zero.
        for date in &heatmap.date_axis {
            assert_eq!(heatmap.count(date, Slot::Afternoon), 0);
            assert_eq!(heatmap.count(date, Slot::Night), 0);
        }
    }

    #[test]
    fn test_build_heatmap_empty_input_floors_max_at_one() {
        let heatmap = build_heatmap(&[]);
        assert!(heatmap.date_axis.is_empty());
        assert_eq!(heatmap.max_count, 1);
        assert_eq!(heatmap.intensity("2024-01-01", Slot::Morning), 0.0);
    }

    #[test]
    fn test_build_heatmap_duplicates_last_write_wins() {
        let records = vec![
            slot_count("2024-03-01", "Morning", 5),
            slot_count("2024-03-01", "Morning", 2),
        ];
        let heatmap = build_heatmap(&records);
        // Overwritten, not summed.
        assert_eq!(heatmap.count("2024-03-01", Slot::Morning), 2);
        // max_count still reflects the largest value seen in the input.
        assert_eq!(heatmap.max_count, 5);
    }

    #[test]
    fn test_build_heatmap_skips_unknown_slots() {
        let records = vec![
            slot_count("2024-03-01", "Brunch", 7),
            slot_count("2024-03-02", "Night", 3),
        ];
        let heatmap = build_heatmap(&records);

        // Unknown slot is skipped but its date still joins the axis.
        assert_eq!(heatmap.date_axis, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(heatmap.count("2024-03-01", Slot::Morning), 0);
        assert_eq!(heatmap.count("2024-03-02", Slot::Night), 3);
    }

    #[test]
    fn test_build_heatmap_intensity() {
        let records = vec![
            slot_count("2024-03-01", "Morning", 2),
            slot_count("2024-03-01", "Night", 8),
        ];
        let heatmap = build_heatmap(&records);
        assert_eq!(heatmap.intensity("2024-03-01", Slot::Night), 1.0);
        assert_eq!(heatmap.intensity("2024-03-01", Slot::Morning), 0.25);
        assert_eq!(heatmap.intensity("2024-03-01", Slot::Evening), 0.0);
    }
}
