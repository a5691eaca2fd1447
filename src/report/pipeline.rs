//! Open-deal pipeline by region and by stage.

use crate::data::model::Opportunity;

use super::aggregate::group_by;

/// One row of "Pipeline Value by Region".
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPipeline {
    pub region: String,
    pub total_pipeline_value: f64,
    pub total_open_deals: usize,
    pub avg_pipeline_deal_size: Option<f64>,
}

/// One row of "Pipeline by Deal Stage".
#[derive(Debug, Clone, PartialEq)]
pub struct StagePipeline {
    pub deal_stage: String,
    pub total_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub by_region: Vec<RegionPipeline>,
    pub by_stage: Vec<StagePipeline>,
}

impl PipelineReport {
    /// Σ open `Deal_Size` across all regions.
    pub fn total_value(&self) -> f64 {
        self.by_region.iter().map(|r| r.total_pipeline_value).sum()
    }
}

/// Aggregate the open (non-terminal) deals of the filtered rows.
pub fn pipeline_report(rows: &[&Opportunity]) -> PipelineReport {
    let open: Vec<&Opportunity> = rows.iter().copied().filter(|r| r.is_open()).collect();

    let by_region = group_by(open.iter().copied(), |r| r.region.as_str())
        .into_iter()
        .map(|(region, stats)| RegionPipeline {
            region,
            total_pipeline_value: stats.total_value(),
            total_open_deals: stats.total_deals(),
            avg_pipeline_deal_size: stats.mean(),
        })
        .collect();

    let by_stage = group_by(open.iter().copied(), |r| r.deal_stage.as_str())
        .into_iter()
        .map(|(deal_stage, stats)| StagePipeline {
            deal_stage,
            total_value: stats.total_value(),
        })
        .collect();

    PipelineReport { by_region, by_stage }
}
