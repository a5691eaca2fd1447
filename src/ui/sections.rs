use std::collections::BTreeSet;

use eframe::egui::{self, RichText, Ui};

use crate::color::ColorMap;
use crate::report::format::{gbp, gbp_or_no_data, percent, si};
use crate::report::lead_source::LeadSourceReport;
use crate::report::pipeline::PipelineReport;
use crate::report::revenue::{RevenueReport, RevenueRow};
use crate::report::salesperson::SalespersonReport;
use crate::report::segment::SegmentReport;
use crate::state::AppState;

use super::charts::{bar_chart, box_plot, line_chart, metric, pie_chart, salesperson_table};
use super::panels::{multiselect, save_export_dialog};

/// What the user did inside the sections during this frame.
#[derive(Debug, Default)]
struct Interaction {
    selection_changed: bool,
    export_requested: bool,
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the title and all five report sections.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Paddle Sales Dashboard FY2025");
    ui.add_space(6.0);

    // Disjoint field borrows: the report is read while the selection is edited.
    let AppState {
        dataset: Some(dataset),
        report: Some(report),
        selection,
        ..
    } = &mut *state
    else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    let mut interaction = Interaction::default();

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            pipeline_section(ui, &report.pipeline);
            lead_source_section(ui, &report.lead_source);
            segment_section(
                ui,
                &report.segment,
                &dataset.segments,
                &mut selection.distribution_segments,
                &mut interaction,
            );
            salesperson_section(
                ui,
                &report.salesperson,
                &mut selection.salesperson_stages,
                &mut interaction,
            );
            revenue_section(ui, &report.revenue);
        });

    if interaction.selection_changed {
        state.refresh();
    }
    if interaction.export_requested {
        save_export_dialog(state);
    }
}

fn section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    egui::CollapsingHeader::new(RichText::new(title).heading())
        .id_salt(title)
        .default_open(false)
        .show(ui, add_contents);
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn pipeline_section(ui: &mut Ui, report: &PipelineReport) {
    section(ui, "📊 Pipeline Analysis", |ui| {
        metric(ui, "Total Pipeline Value", &gbp(report.total_value()));
        ui.add_space(4.0);

        let by_region: Vec<(&str, f64)> = report
            .by_region
            .iter()
            .map(|r| (r.region.as_str(), r.total_pipeline_value))
            .collect();
        bar_chart(
            ui,
            "pipeline_region",
            "Pipeline Value by Region",
            "Total Value (£)",
            &by_region,
            si,
        );

        for row in &report.by_region {
            ui.label(format!(
                "{}: {} open deal(s), average {}",
                row.region,
                row.total_open_deals,
                gbp_or_no_data(row.avg_pipeline_deal_size)
            ));
        }
        ui.separator();

        let by_stage: Vec<(&str, f64)> = report
            .by_stage
            .iter()
            .map(|s| (s.deal_stage.as_str(), s.total_value))
            .collect();
        bar_chart(
            ui,
            "pipeline_stage",
            "Pipeline by Deal Stage",
            "Total Value (£)",
            &by_stage,
            gbp,
        );
    });
}

fn lead_source_section(ui: &mut Ui, report: &LeadSourceReport) {
    section(ui, "📈 Lead Source Analysis", |ui| {
        let ranked: Vec<(&str, f64)> = report
            .ranked_by_value()
            .into_iter()
            .map(|r| (r.lead_source.as_str(), r.total_deal_value))
            .collect();
        bar_chart(
            ui,
            "lead_source_value",
            "Total Deal Value by Lead Source",
            "Total Value (£)",
            &ranked,
            si,
        );
        ui.separator();

        let colors = ColorMap::new(report.rows.iter().map(|r| r.lead_source.as_str()));
        pie_chart(
            ui,
            "lead_source_share",
            "Deal Count by Lead Source",
            &report.deal_share(),
            &colors,
        );
    });
}

fn segment_section(
    ui: &mut Ui,
    report: &SegmentReport,
    segment_options: &BTreeSet<String>,
    distribution_segments: &mut BTreeSet<String>,
    interaction: &mut Interaction,
) {
    section(ui, "🧩 Customer Segment Analysis", |ui| {
        let by_value: Vec<(&str, f64)> = report
            .summary
            .iter()
            .map(|s| (s.customer_segment.as_str(), s.total_deal_value))
            .collect();
        bar_chart(
            ui,
            "segment_value",
            "Total Deal Value by Customer Segment",
            "Total Value (£)",
            &by_value,
            si,
        );
        for row in &report.summary {
            ui.label(format!(
                "{}: {} deal(s), average {}",
                row.customer_segment,
                row.total_deals,
                gbp_or_no_data(row.avg_deal_value)
            ));
        }
        ui.separator();

        if multiselect(ui, "Filter by Customer Segment:", segment_options, distribution_segments) {
            interaction.selection_changed = true;
        }
        box_plot(
            ui,
            "segment_distribution",
            "Deal Size Distribution by Customer Segment",
            &report.distribution,
        );
        for spread in &report.distribution {
            ui.label(format!(
                "{}: {} deal(s), {} to {}, median {}",
                spread.customer_segment,
                spread.deal_sizes.len(),
                gbp(spread.stats.min),
                gbp(spread.stats.max),
                gbp(spread.stats.median)
            ));
        }
    });
}

fn salesperson_section(
    ui: &mut Ui,
    report: &SalespersonReport,
    stages: &mut Option<BTreeSet<String>>,
    interaction: &mut Interaction,
) {
    section(ui, "💼 Salesperson Performance", |ui| {
        let mut selected = report.stages.clone();
        if multiselect(ui, "Select Deal Stage(s):", &report.stage_options, &mut selected) {
            // Selecting every option falls back to "whatever the filters leave".
            *stages = (selected != report.stage_options).then_some(selected);
            interaction.selection_changed = true;
        }
        ui.add_space(4.0);

        salesperson_table(ui, &report.rows);
        if ui.button("Download Table as CSV").clicked() {
            interaction.export_requested = true;
        }
    });
}

fn revenue_section(ui: &mut Ui, report: &RevenueReport) {
    section(ui, "💰 Revenue Analysis", |ui| {
        ui.strong("Key Revenue Metrics");
        let m = &report.metrics;
        ui.columns(2, |cols| {
            metric(&mut cols[0], "Total Revenue", &gbp(m.total_revenue));
            metric(&mut cols[1], "Average Deal Size", &gbp_or_no_data(m.avg_deal_size));
        });
        ui.columns(2, |cols| {
            metric(&mut cols[0], "Total Closed Won Deals", &m.total_closed_won.to_string());
            metric(&mut cols[1], "Win Rate", &percent(m.win_rate));
        });
        ui.label(
            RichText::new(format!(
                "{} of {} deal(s) in the current selection closed won",
                m.total_closed_won, m.total_deals
            ))
            .weak(),
        );
        if report.excluded_dates > 0 {
            ui.label(
                RichText::new(format!(
                    "{} deal(s) without a valid closure date are left out of revenue figures",
                    report.excluded_dates
                ))
                .weak(),
            );
        }
        ui.separator();

        line_chart(
            ui,
            "revenue_quarter",
            "Closed Won Revenue Over Time",
            "Quarter",
            "Total Revenue (£)",
            &pairs(&report.by_quarter),
        );
        ui.separator();
        bar_chart(
            ui,
            "revenue_region",
            "Total Closed Won Revenue by Region",
            "Total Revenue (£)",
            &pairs(&report.by_region),
            si,
        );
        ui.separator();
        bar_chart(
            ui,
            "revenue_segment",
            "Total Closed Won Revenue by Customer Segment",
            "Total Revenue (£)",
            &pairs(&report.by_segment),
            si,
        );
    });
}

fn pairs(rows: &[RevenueRow]) -> Vec<(&str, f64)> {
    rows.iter().map(|r| (r.label.as_str(), r.total_revenue)).collect()
}
