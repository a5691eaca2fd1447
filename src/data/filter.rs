use std::collections::BTreeSet;

use super::model::{Opportunity, OpportunityTable};

// ---------------------------------------------------------------------------
// Global selection: which regions and segments are included
// ---------------------------------------------------------------------------

/// Inclusion sets for the two global categorical filters.
///
/// An empty set selects nothing (it is *not* "no filter").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub regions: BTreeSet<String>,
    pub segments: BTreeSet<String>,
}

impl Selection {
    /// Everything observed at load time is selected.
    pub fn all(table: &OpportunityTable) -> Self {
        Selection {
            regions: table.regions.clone(),
            segments: table.segments.clone(),
        }
    }

    pub fn contains(&self, row: &Opportunity) -> bool {
        self.regions.contains(&row.region) && self.segments.contains(&row.customer_segment)
    }
}

/// Return the rows passing the global filters, in source order.
///
/// The base table is only borrowed; nothing is copied or mutated.
pub fn apply_filters<'a>(
    table: &'a OpportunityTable,
    selection: &Selection,
) -> Vec<&'a Opportunity> {
    if selection.regions.is_empty() || selection.segments.is_empty() {
        return Vec::new();
    }
    table.rows.iter().filter(|row| selection.contains(row)).collect()
}

// ---------------------------------------------------------------------------
// Section-local narrowing
// ---------------------------------------------------------------------------

/// Keep only rows whose segment is in `segments`.
pub fn narrow_by_segments<'a>(
    rows: &[&'a Opportunity],
    segments: &BTreeSet<String>,
) -> Vec<&'a Opportunity> {
    rows.iter()
        .copied()
        .filter(|row| segments.contains(&row.customer_segment))
        .collect()
}

/// Keep only rows whose stage is in `stages`.
pub fn narrow_by_stages<'a>(
    rows: &[&'a Opportunity],
    stages: &BTreeSet<String>,
) -> Vec<&'a Opportunity> {
    rows.iter()
        .copied()
        .filter(|row| stages.contains(&row.deal_stage))
        .collect()
}

/// Distinct stages present in `rows` (the stage options of a filtered view).
pub fn distinct_stages(rows: &[&Opportunity]) -> BTreeSet<String> {
    rows.iter()
        .filter(|row| !row.deal_stage.is_empty())
        .map(|row| row.deal_stage.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::mixed_deals;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn full_selection_keeps_every_row_in_order() {
        let table = mixed_deals();
        let rows = apply_filters(&table, &Selection::all(&table));
        let ids: Vec<&str> = rows.iter().map(|r| r.deal_id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn retained_rows_satisfy_both_predicates() {
        let table = mixed_deals();
        let selection = Selection {
            regions: set(&["UK", "US"]),
            segments: set(&["SMB", "Enterprise"]),
        };
        let rows = apply_filters(&table, &selection);

        assert!(rows.len() <= table.len());
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert!(selection.regions.contains(&row.region));
            assert!(selection.segments.contains(&row.customer_segment));
        }
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = mixed_deals();
        let selection = Selection {
            regions: set(&["DE", "UK"]),
            segments: table.segments.clone(),
        };
        let once = apply_filters(&table, &selection);
        let twice = apply_filters(&table, &selection);
        assert_eq!(once, twice);

        let refiltered: Vec<&Opportunity> =
            once.iter().copied().filter(|r| selection.contains(r)).collect();
        assert_eq!(once, refiltered);
    }

    #[test]
    fn empty_selection_yields_empty_result() {
        let table = mixed_deals();
        let mut selection = Selection::all(&table);
        selection.regions.clear();
        assert!(apply_filters(&table, &selection).is_empty());

        let mut selection = Selection::all(&table);
        selection.segments.clear();
        assert!(apply_filters(&table, &selection).is_empty());
    }

    #[test]
    fn unknown_values_select_nothing() {
        let table = mixed_deals();
        let selection = Selection {
            regions: set(&["Mars"]),
            segments: table.segments.clone(),
        };
        assert!(apply_filters(&table, &selection).is_empty());
    }

    #[test]
    fn narrowing_helpers() {
        let table = mixed_deals();
        let rows = apply_filters(&table, &Selection::all(&table));

        let smb = narrow_by_segments(&rows, &set(&["SMB"]));
        assert_eq!(smb.len(), 3);

        let stages = distinct_stages(&smb);
        assert_eq!(stages, set(&["Closed Lost", "Closed Won", "Negotiation"]));

        let negotiating = narrow_by_stages(&rows, &set(&["Negotiation"]));
        let ids: Vec<&str> = negotiating.iter().map(|r| r.deal_id.as_str()).collect();
        assert_eq!(ids, ["2", "8"]);
    }
}
