//! Closed-won revenue: key metrics, quarterly trend, region and segment split.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::data::model::Opportunity;
use crate::error::DateParseError;

use super::aggregate::{group_by, GroupStats};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a raw `Deal_Closure_Date` cell.
///
/// Month-first for slash dates with a trailing year.
pub fn parse_closure_date(raw: &str) -> Result<NaiveDate, DateParseError> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| DateParseError {
            value: raw.to_string(),
        })
}

/// Calendar-quarter label, e.g. `2025Q1`.
///
/// Labels sort lexically; that matches calendar order for four-digit years.
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), date.month0() / 3 + 1)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueMetrics {
    pub total_revenue: f64,
    /// `None` when there is no dated closed-won deal.
    pub avg_deal_size: Option<f64>,
    pub total_closed_won: usize,
    /// Distinct deals in the filtered rows, before undated rows are dropped.
    pub total_deals: usize,
    /// Percentage in `[0, 100]`; 0 when there are no deals.
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRow {
    pub label: String,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueReport {
    pub metrics: RevenueMetrics,
    /// Ascending by quarter label.
    pub by_quarter: Vec<RevenueRow>,
    pub by_region: Vec<RevenueRow>,
    pub by_segment: Vec<RevenueRow>,
    /// Rows with a missing or unparsable closure date.
    pub excluded_dates: usize,
}

pub fn revenue_report(rows: &[&Opportunity]) -> RevenueReport {
    let total_deals = rows.iter().copied().collect::<GroupStats>().total_deals();

    // Undated rows are dropped for this section only.
    let mut excluded_dates = 0;
    let dated: Vec<(&Opportunity, NaiveDate)> = rows
        .iter()
        .copied()
        .filter_map(|row| {
            let parsed = match row.deal_closure_date.as_deref() {
                Some(raw) => parse_closure_date(raw).map_err(|e| {
                    log::debug!("Deal {} excluded from revenue: {e}", row.deal_id);
                }),
                None => Err(()),
            };
            match parsed {
                Ok(date) => Some((row, date)),
                Err(()) => {
                    excluded_dates += 1;
                    None
                }
            }
        })
        .collect();

    let closed_won: Vec<(&Opportunity, NaiveDate)> =
        dated.into_iter().filter(|(row, _)| row.is_closed_won()).collect();
    let won_rows: Vec<&Opportunity> = closed_won.iter().map(|(row, _)| *row).collect();
    let won = won_rows.iter().copied().collect::<GroupStats>();

    let total_closed_won = won.total_deals();
    let win_rate = if total_deals == 0 {
        0.0
    } else {
        100.0 * total_closed_won as f64 / total_deals as f64
    };

    let mut quarters: BTreeMap<String, f64> = BTreeMap::new();
    for (row, date) in &closed_won {
        *quarters.entry(quarter_label(*date)).or_default() += row.deal_size;
    }
    let by_quarter = quarters
        .into_iter()
        .map(|(label, total_revenue)| RevenueRow { label, total_revenue })
        .collect();

    let revenue_by = |groups: BTreeMap<String, GroupStats>| -> Vec<RevenueRow> {
        groups
            .into_iter()
            .map(|(label, stats)| RevenueRow {
                label,
                total_revenue: stats.total_value(),
            })
            .collect()
    };

    RevenueReport {
        metrics: RevenueMetrics {
            total_revenue: won.total_value(),
            avg_deal_size: won.mean(),
            total_closed_won,
            total_deals,
            win_rate,
        },
        by_quarter,
        by_region: revenue_by(group_by(won_rows.iter().copied(), |r| r.region.as_str())),
        by_segment: revenue_by(group_by(won_rows.iter().copied(), |r| r.customer_segment.as_str())),
        excluded_dates,
    }
}
