//! Deal count and value per lead source.

use crate::data::model::Opportunity;

use super::aggregate::group_by;

#[derive(Debug, Clone, PartialEq)]
pub struct LeadSourceRow {
    pub lead_source: String,
    pub total_deals: usize,
    pub total_deal_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadSourceReport {
    pub rows: Vec<LeadSourceRow>,
}

impl LeadSourceReport {
    /// Rows ordered by descending `total_deal_value` (ties by name).
    pub fn ranked_by_value(&self) -> Vec<&LeadSourceRow> {
        let mut ranked: Vec<&LeadSourceRow> = self.rows.iter().collect();
        ranked.sort_by(|a, b| {
            b.total_deal_value
                .total_cmp(&a.total_deal_value)
                .then_with(|| a.lead_source.cmp(&b.lead_source))
        });
        ranked
    }

    /// Share of deals per source, from `total_deals` (not value).
    ///
    /// Fractions sum to 1 unless there are no deals, in which case the result
    /// is empty.
    pub fn deal_share(&self) -> Vec<(&str, f64)> {
        let total: usize = self.rows.iter().map(|r| r.total_deals).sum();
        if total == 0 {
            return Vec::new();
        }
        self.rows
            .iter()
            .map(|r| (r.lead_source.as_str(), r.total_deals as f64 / total as f64))
            .collect()
    }
}

pub fn lead_source_report(rows: &[&Opportunity]) -> LeadSourceReport {
    let rows = group_by(rows.iter().copied(), |r| r.lead_source.as_str())
        .into_iter()
        .map(|(lead_source, stats)| LeadSourceRow {
            lead_source,
            total_deals: stats.total_deals(),
            total_deal_value: stats.total_value(),
        })
        .collect();
    LeadSourceReport { rows }
}
