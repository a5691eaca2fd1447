/// Report engine: filter → aggregate, one pure pass per interaction.
///
/// ```text
///   OpportunityTable ──► apply_filters ──► &[&Opportunity]
///                                              │
///          ┌──────────┬──────────────┬─────────┼──────────────┐
///          ▼          ▼              ▼         ▼              ▼
///      pipeline  lead_source      segment  salesperson     revenue
/// ```
///
/// Every section receives the same borrowed filtered rows and returns owned,
/// fully aggregated tables; nothing is written back to the base table.

pub mod aggregate;
pub mod format;
pub mod lead_source;
pub mod pipeline;
pub mod revenue;
pub mod salesperson;
pub mod segment;

use std::collections::BTreeSet;

use crate::data::filter::{apply_filters, Selection};
use crate::data::model::OpportunityTable;

use lead_source::{lead_source_report, LeadSourceReport};
use pipeline::{pipeline_report, PipelineReport};
use revenue::{revenue_report, RevenueReport};
use salesperson::{salesperson_report, SalespersonReport};
use segment::{segment_report, SegmentReport};

/// Every user-controlled input of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSelection {
    /// Global region / segment filters.
    pub filter: Selection,
    /// Segments shown in the deal-size distribution (independent control).
    pub distribution_segments: BTreeSet<String>,
    /// Stages for the salesperson table; `None` means every stage present in
    /// the filtered rows.
    pub salesperson_stages: Option<BTreeSet<String>>,
}

impl DashboardSelection {
    /// Defaults: everything observed at load time is selected.
    pub fn all(table: &OpportunityTable) -> Self {
        DashboardSelection {
            filter: Selection::all(table),
            distribution_segments: table.segments.clone(),
            salesperson_stages: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardReport {
    /// Rows surviving the global filters.
    pub filtered_rows: usize,
    pub pipeline: PipelineReport,
    pub lead_source: LeadSourceReport,
    pub segment: SegmentReport,
    pub salesperson: SalespersonReport,
    pub revenue: RevenueReport,
}

/// Run the filter stage and all five sections.
pub fn render(table: &OpportunityTable, selection: &DashboardSelection) -> DashboardReport {
    let rows = apply_filters(table, &selection.filter);

    DashboardReport {
        filtered_rows: rows.len(),
        pipeline: pipeline_report(&rows),
        lead_source: lead_source_report(&rows),
        segment: segment_report(&rows, &selection.distribution_segments),
        salesperson: salesperson_report(&rows, selection.salesperson_stages.as_ref()),
        revenue: revenue_report(&rows),
    }
}
