use std::collections::{BTreeMap, HashSet};

use crate::data::model::Opportunity;

/// Running aggregate over one group of opportunities.
#[derive(Debug, Clone, Default)]
pub struct GroupStats {
    deal_ids: HashSet<String>,
    total_value: f64,
    rows: usize,
}

impl GroupStats {
    pub fn push(&mut self, row: &Opportunity) {
        self.deal_ids.insert(row.deal_id.clone());
        self.total_value += row.deal_size;
        self.rows += 1;
    }

    /// Distinct `Deal_ID`s, so duplicated rows are not double-counted.
    pub fn total_deals(&self) -> usize {
        self.deal_ids.len()
    }

    /// Σ `Deal_Size`; 0 for an empty group.
    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// Mean `Deal_Size` over rows, `None` when there are no rows.
    pub fn mean(&self) -> Option<f64> {
        (self.rows > 0).then(|| self.total_value / self.rows as f64)
    }
}

impl<'a> FromIterator<&'a Opportunity> for GroupStats {
    fn from_iter<I: IntoIterator<Item = &'a Opportunity>>(iter: I) -> Self {
        let mut stats = GroupStats::default();
        for row in iter {
            stats.push(row);
        }
        stats
    }
}

/// Group rows by a categorical key, keys ascending.
///
/// Keys with no rows never appear (no zero-filled groups), and rows with an
/// empty key are left out.
pub fn group_by<'a, I, F>(rows: I, key: F) -> BTreeMap<String, GroupStats>
where
    I: IntoIterator<Item = &'a Opportunity>,
    F: Fn(&Opportunity) -> &str,
{
    let mut groups: BTreeMap<String, GroupStats> = BTreeMap::new();
    for row in rows {
        let k = key(row);
        if k.is_empty() {
            continue;
        }
        match groups.get_mut(k) {
            Some(stats) => stats.push(row),
            None => {
                groups.insert(k.to_string(), std::iter::once(row).collect());
            }
        }
    }
    groups
}
