use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoint,
    PlotPoints, Points, Polygon, Text,
};

use crate::color::{ColorMap, BRAND_YELLOW};
use crate::report::format::{gbp, gbp_or_no_data, NO_DATA};
use crate::report::salesperson::SalespersonRow;
use crate::report::segment::SegmentSpread;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// X-axis formatter printing category labels at integer positions.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

/// Title plus a "no data" notice when there is nothing to draw.
fn chart_header(ui: &mut Ui, title: &str, is_empty: bool) -> bool {
    ui.strong(title);
    if is_empty {
        ui.label(RichText::new(format!("{NO_DATA} for the current selection")).weak());
    }
    !is_empty
}

fn static_plot(id: &str) -> Plot<'_> {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Bar chart
// ---------------------------------------------------------------------------

/// Single-series bar chart in brand yellow with a value label above each bar.
pub fn bar_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    y_label: &str,
    data: &[(&str, f64)],
    value_label: fn(f64) -> String,
) {
    if !chart_header(ui, title, data.is_empty()) {
        return;
    }

    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::new(i as f64, *value)
                .name(*label)
                .fill(BRAND_YELLOW)
                .width(0.6)
        })
        .collect();
    let labels = data.iter().map(|(label, _)| label.to_string()).collect();

    static_plot(id)
        .x_axis_formatter(category_axis(labels))
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(BRAND_YELLOW)
                    .element_formatter(Box::new(|bar: &Bar, _: &BarChart| {
                        format!("{}\n{}", bar.name, gbp(bar.value))
                    })),
            );
            for (i, (_, value)) in data.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(i as f64, *value), value_label(*value))
                        .anchor(Align2::CENTER_BOTTOM),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

/// Convex pieces (≤ a quarter turn each) of a unit-circle sector.
///
/// Angles run clockwise from twelve o'clock; `start` and `sweep` are in
/// radians. Each piece starts with the centre point.
fn sector_polygons(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    if sweep <= 0.0 {
        return Vec::new();
    }
    let pieces = (sweep / (TAU / 4.0)).ceil().max(1.0) as usize;
    let step = sweep / pieces as f64;
    let segments = ((step / TAU) * 96.0).ceil().max(2.0) as usize;

    (0..pieces)
        .map(|p| {
            let a0 = start + step * p as f64;
            let mut points = vec![[0.0, 0.0]];
            points.extend((0..=segments).map(|s| {
                let a = FRAC_PI_2 - (a0 + step * s as f64 / segments as f64);
                [a.cos(), a.sin()]
            }));
            points
        })
        .collect()
}

/// Pie chart of `(label, fraction)` pairs; fractions are expected to sum to 1.
pub fn pie_chart(ui: &mut Ui, id: &str, title: &str, shares: &[(&str, f64)], colors: &ColorMap) {
    if !chart_header(ui, title, shares.is_empty()) {
        return;
    }

    static_plot(id)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for (label, share) in shares {
                let sweep = share * TAU;
                for piece in sector_polygons(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(piece))
                            .name(*label)
                            .fill_color(colors.color_for(label))
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                }
                let mid = FRAC_PI_2 - (start + sweep / 2.0);
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    RichText::new(format!("{:.1}%", share * 100.0)).color(Color32::BLACK),
                ));
                start += sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

/// One box per segment; points beyond the whiskers are drawn as outliers.
pub fn box_plot(ui: &mut Ui, id: &str, title: &str, spreads: &[SegmentSpread]) {
    if !chart_header(ui, title, spreads.is_empty()) {
        return;
    }

    let boxes: Vec<BoxElem> = spreads
        .iter()
        .enumerate()
        .map(|(i, spread)| {
            let s = &spread.stats;
            BoxElem::new(
                i as f64,
                BoxSpread::new(s.lower_fence, s.q1, s.median, s.q3, s.upper_fence),
            )
            .name(&spread.customer_segment)
            .fill(BRAND_YELLOW.gamma_multiply(0.5))
            .stroke(Stroke::new(1.5, BRAND_YELLOW))
            .box_width(0.5)
        })
        .collect();
    let outliers: Vec<[f64; 2]> = spreads
        .iter()
        .enumerate()
        .flat_map(|(i, spread)| spread.stats.outliers.iter().map(move |v| [i as f64, *v]))
        .collect();
    let labels = spreads.iter().map(|s| s.customer_segment.clone()).collect();

    static_plot(id)
        .x_axis_formatter(category_axis(labels))
        .y_axis_label("Deal Size (£)")
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes).name("Deal Size"));
            if !outliers.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(outliers))
                        .radius(3.0)
                        .color(BRAND_YELLOW)
                        .name("Outliers"),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// Line with markers over ordered category labels (quarters).
pub fn line_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    x_label: &str,
    y_label: &str,
    data: &[(&str, f64)],
) {
    if !chart_header(ui, title, data.is_empty()) {
        return;
    }

    let points: Vec<[f64; 2]> = data
        .iter()
        .enumerate()
        .map(|(i, (_, value))| [i as f64, *value])
        .collect();
    let labels = data.iter().map(|(label, _)| label.to_string()).collect();

    static_plot(id)
        .x_axis_formatter(category_axis(labels))
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(BRAND_YELLOW)
                    .width(3.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0).color(BRAND_YELLOW));
        });
}

// ---------------------------------------------------------------------------
// Tables and metric cards
// ---------------------------------------------------------------------------

pub fn salesperson_table(ui: &mut Ui, rows: &[SalespersonRow]) {
    if rows.is_empty() {
        ui.label(RichText::new(format!("{NO_DATA} for the current selection")).weak());
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(140.0))
        .columns(Column::auto().at_least(110.0), 3)
        .header(20.0, |mut header| {
            for title in ["Salesperson", "Total Deals", "Total Deal Value", "Avg Deal Value"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in rows {
                body.row(18.0, |mut tr| {
                    tr.col(|ui| {
                        ui.label(row.salesperson.as_str());
                    });
                    tr.col(|ui| {
                        ui.label(row.total_deals.to_string());
                    });
                    tr.col(|ui| {
                        ui.label(gbp(row.total_deal_value));
                    });
                    tr.col(|ui| {
                        ui.label(gbp_or_no_data(row.avg_deal_value));
                    });
                });
            }
        });
}

/// Label over a large value, like a dashboard KPI card.
pub fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(24.0).strong());
    });
}
