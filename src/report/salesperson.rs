//! Salesperson performance table and its CSV export.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::data::filter::{distinct_stages, narrow_by_stages};
use crate::data::model::Opportunity;
use crate::error::ExportError;

use super::aggregate::group_by;

/// Suggested file name for the downloaded table.
pub const EXPORT_FILE_NAME: &str = "salesperson_performance.csv";

const EXPORT_HEADER: [&str; 4] = [
    "Salesperson",
    "Total_Deals",
    "Total_Deal_Value",
    "Avg_Deal_Value",
];

/// Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalespersonRow {
    #[serde(rename = "Salesperson")]
    pub salesperson: String,
    #[serde(rename = "Total_Deals")]
    pub total_deals: usize,
    #[serde(rename = "Total_Deal_Value")]
    pub total_deal_value: f64,
    #[serde(rename = "Avg_Deal_Value")]
    pub avg_deal_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalespersonReport {
    /// Stage options: every stage present in the filtered rows.
    pub stage_options: BTreeSet<String>,
    /// Stages actually applied.
    pub stages: BTreeSet<String>,
    pub rows: Vec<SalespersonRow>,
}

/// Narrow the filtered rows by `stages` (all stages present when `None`),
/// then aggregate per salesperson.
pub fn salesperson_report(
    rows: &[&Opportunity],
    stages: Option<&BTreeSet<String>>,
) -> SalespersonReport {
    let stage_options = distinct_stages(rows);
    let stages = stages.cloned().unwrap_or_else(|| stage_options.clone());
    let narrowed = narrow_by_stages(rows, &stages);

    let rows = group_by(narrowed, |r| r.salesperson.as_str())
        .into_iter()
        .map(|(salesperson, stats)| SalespersonRow {
            salesperson,
            total_deals: stats.total_deals(),
            total_deal_value: stats.total_value(),
            avg_deal_value: stats.mean(),
        })
        .collect();

    SalespersonReport {
        stage_options,
        stages,
        rows,
    }
}

/// Encode the table as UTF-8 comma-delimited text with a header row.
///
/// The header is written even when there are no rows.
pub fn to_csv_bytes(rows: &[SalespersonRow]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(writer.into_inner()?)
}

pub fn write_csv(path: &Path, rows: &[SalespersonRow]) -> Result<(), ExportError> {
    std::fs::write(path, to_csv_bytes(rows)?)?;
    log::info!("Exported {} salesperson rows to {}", rows.len(), path.display());
    Ok(())
}
