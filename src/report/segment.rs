//! Customer segment summary and deal-size distribution.

use std::collections::{BTreeMap, BTreeSet};

use crate::data::filter::narrow_by_segments;
use crate::data::model::Opportunity;

use super::aggregate::group_by;

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub customer_segment: String,
    pub total_deals: usize,
    pub total_deal_value: f64,
    pub avg_deal_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Five-number summary plus Tukey fences for a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Lowest value within `q1 - 1.5 × IQR`.
    pub lower_fence: f64,
    /// Highest value within `q3 + 1.5 × IQR`.
    pub upper_fence: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` for an empty sample. Non-finite values are ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low = q1 - 1.5 * iqr;
        let high = q3 + 1.5 * iqr;

        let fences = low..=high;
        let lower_fence = sorted.iter().copied().find(|v| fences.contains(v)).unwrap_or(q1);
        let upper_fence = sorted.iter().copied().rev().find(|v| fences.contains(v)).unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| !fences.contains(v))
            .collect();

        Some(BoxStats {
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_fence,
            upper_fence,
            outliers,
        })
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Raw deal sizes of one segment with their spread.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSpread {
    pub customer_segment: String,
    pub deal_sizes: Vec<f64>,
    pub stats: BoxStats,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentReport {
    pub summary: Vec<SegmentSummary>,
    pub distribution: Vec<SegmentSpread>,
}

/// Summary over all filtered rows; distribution over `distribution_segments`
/// only (a control independent from the global segment filter).
pub fn segment_report(
    rows: &[&Opportunity],
    distribution_segments: &BTreeSet<String>,
) -> SegmentReport {
    let summary = group_by(rows.iter().copied(), |r| r.customer_segment.as_str())
        .into_iter()
        .map(|(customer_segment, stats)| SegmentSummary {
            customer_segment,
            total_deals: stats.total_deals(),
            total_deal_value: stats.total_value(),
            avg_deal_value: stats.mean(),
        })
        .collect();

    let mut sizes: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in narrow_by_segments(rows, distribution_segments) {
        sizes
            .entry(row.customer_segment.clone())
            .or_default()
            .push(row.deal_size);
    }
    let distribution = sizes
        .into_iter()
        .filter_map(|(customer_segment, deal_sizes)| {
            let stats = BoxStats::from_values(&deal_sizes)?;
            Some(SegmentSpread {
                customer_segment,
                deal_sizes,
                stats,
            })
        })
        .collect();

    SegmentReport {
        summary,
        distribution,
    }
}
