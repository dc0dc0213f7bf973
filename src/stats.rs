//! Grouped frequency counts and percentage aggregates over the valid set.
//!
//! Pure functions: nothing here mutates records. Percentages use floor
//! division, so a grouping can sum to slightly under 100; counts always sum
//! exactly to the number of records aggregated.

use std::collections::HashMap;

use crate::record::Record;

/// One group in a frequency aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    /// Field value, or the `(sin <label>)` placeholder.
    pub value: String,
    pub count: usize,
    /// `floor(count / total * 100)`, with total floored to 1.
    pub pct: u8,
}

/// Group records by a field's value and count each group.
///
/// Output is sorted by count descending; groups with equal counts keep
/// first-encountered order (stable grouping, not lexical). Empty values
/// group under the placeholder for `label`.
pub fn count_by(records: &[Record], tag: &str, label: &str) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let value = record.field_or_placeholder(tag, label);
        match index.get(&value) {
            Some(&i) => groups[i].count += 1,
            None => {
                index.insert(value.clone(), groups.len());
                groups.push(GroupCount {
                    value,
                    count: 1,
                    pct: 0,
                });
            }
        }
    }

    let total = records.len().max(1);
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    for group in &mut groups {
        group.pct = (group.count * 100 / total) as u8;
    }
    groups
}

/// Filter records whose field value (or placeholder) equals `value`.
pub fn filter_by<'a>(
    records: &'a [Record],
    tag: &str,
    label: &str,
    value: &str,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| r.field_or_placeholder(tag, label) == value)
        .collect()
}

/// Session-wide tallies of the three classification outcomes.
///
/// `valid` counts both dated and undated records; `undated` is the subset of
/// `valid` without a resolved timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemporalBreakdown {
    pub valid: usize,
    pub undated: usize,
    pub future: usize,
}

impl TemporalBreakdown {
    /// Every ingested record: valid plus future-rejected.
    pub fn total(&self) -> usize {
        self.valid + self.future
    }

    pub fn valid_pct(&self) -> u8 {
        self.pct(self.valid)
    }

    pub fn undated_pct(&self) -> u8 {
        self.pct(self.undated)
    }

    pub fn future_pct(&self) -> u8 {
        self.pct(self.future)
    }

    fn pct(&self, count: usize) -> u8 {
        (count * 100 / self.total().max(1)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fields;

    fn record(id: &str, kind: &str) -> Record {
        let mut r = Record::new(id);
        if !kind.is_empty() {
            r.set_field(fields::INCIDENT_TYPE, kind);
        }
        r
    }

    #[test]
    fn counts_sum_to_record_count() {
        let records = vec![
            record("1", "Red"),
            record("2", "Hardware"),
            record("3", "Red"),
            record("4", ""),
            record("5", "Red"),
        ];
        let groups = count_by(&records, fields::INCIDENT_TYPE, "tipo");
        let total: usize = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn sorted_by_count_descending() {
        let records = vec![
            record("1", "Hardware"),
            record("2", "Red"),
            record("3", "Red"),
            record("4", "Red"),
            record("5", "Hardware"),
        ];
        let groups = count_by(&records, fields::INCIDENT_TYPE, "tipo");
        assert_eq!(groups[0].value, "Red");
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[1].value, "Hardware");
        assert_eq!(groups[1].count, 2);
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let records = vec![
            record("1", "Software"),
            record("2", "Hardware"),
            record("3", "Hardware"),
            record("4", "Software"),
        ];
        let groups = count_by(&records, fields::INCIDENT_TYPE, "tipo");
        // Equal counts: "Software" was seen first, so it stays first.
        assert_eq!(groups[0].value, "Software");
        assert_eq!(groups[1].value, "Hardware");
    }

    #[test]
    fn empty_values_group_under_placeholder() {
        let records = vec![record("1", ""), record("2", ""), record("3", "Red")];
        let groups = count_by(&records, fields::INCIDENT_TYPE, "tipo");
        assert_eq!(groups[0].value, "(sin tipo)");
        assert_eq!(groups[0].count, 2);
    }

    #[test]
    fn floor_percentages_never_exceed_100() {
        let records = vec![
            record("1", "a"),
            record("2", "a"),
            record("3", "b"),
        ];
        let groups = count_by(&records, fields::INCIDENT_TYPE, "tipo");
        assert_eq!(groups[0].pct, 66);
        assert_eq!(groups[1].pct, 33);
        let sum: u32 = groups.iter().map(|g| u32::from(g.pct)).sum();
        assert!(sum <= 100);
    }

    #[test]
    fn empty_input_yields_no_groups_and_no_division_by_zero() {
        let groups = count_by(&[], fields::INCIDENT_TYPE, "tipo");
        assert!(groups.is_empty());
    }

    #[test]
    fn filter_matches_placeholder_too() {
        let records = vec![record("1", "Red"), record("2", "")];
        let hits = filter_by(&records, fields::INCIDENT_TYPE, "tipo", "(sin tipo)");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
        let reds = filter_by(&records, fields::INCIDENT_TYPE, "tipo", "Red");
        assert_eq!(reds.len(), 1);
    }

    #[test]
    fn breakdown_percentages_use_overall_total() {
        let breakdown = TemporalBreakdown {
            valid: 3,
            undated: 1,
            future: 1,
        };
        assert_eq!(breakdown.total(), 4);
        assert_eq!(breakdown.valid_pct(), 75);
        assert_eq!(breakdown.undated_pct(), 25);
        assert_eq!(breakdown.future_pct(), 25);
    }

    #[test]
    fn empty_breakdown_is_all_zero() {
        let breakdown = TemporalBreakdown::default();
        assert_eq!(breakdown.total(), 0);
        assert_eq!(breakdown.valid_pct(), 0);
    }
}
