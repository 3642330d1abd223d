use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Legend, Plot};

use crate::color::parse_hex;
use crate::state::AppState;

fn to_color32(hex: &str) -> Color32 {
    parse_hex(hex)
        .map(|c| Color32::from_rgb(c.red, c.green, c.blue))
        .unwrap_or(Color32::GRAY)
}

// ---------------------------------------------------------------------------
// Stacked bar chart (central panel)
// ---------------------------------------------------------------------------

/// Render the stacked component chart for the current region and year.
pub fn bar_chart(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.bar else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No report loaded  (File → Open data folder…)");
        });
        return;
    };
    let figure = &view.figure;

    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(&figure.layout.title.text);
    });
    if view.series.is_empty() {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(format!(
                "No countries listed under '{}' in the {} report.",
                state.region, state.year
            ));
        });
    }

    let countries = view.series.countries.clone();

    // Each trace sits on top of every trace before it.
    let mut charts: Vec<BarChart> = Vec::with_capacity(figure.data.len());
    for trace in &figure.data {
        let color = to_color32(&trace.marker.color);
        let bars: Vec<Bar> = trace
            .x
            .iter()
            .zip(trace.y.iter())
            .enumerate()
            .map(|(i, (country, &value))| {
                Bar::new(i as f64, value)
                    .name(format!("{country}: {}", trace.name))
                    .fill(color)
                    .width(0.7)
            })
            .collect();

        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(&trace.name)
            .color(color)
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new("component_bar_chart")
        .legend(Legend::default())
        .x_axis_label(&figure.layout.xaxis.title.text)
        .y_axis_label(&figure.layout.yaxis.title.text)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            countries.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Score overview (bottom panel)
// ---------------------------------------------------------------------------

/// Per-country scores of the current year, each swatch coloured on the
/// choropleth's scale.
pub fn score_overview(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.map else {
        ui.label("No report loaded.");
        return;
    };
    let trace = &view.figure.data[0];

    ui.horizontal(|ui: &mut Ui| {
        ui.strong(&view.figure.layout.title.text);
        ui.label(format!("{} countries", trace.locations.len()));
        ui.hyperlink_to(
            &state.config.annotation.text,
            &state.config.annotation.url,
        );
    });

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(18.0))
        .column(Column::auto().at_least(200.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|_ui| {});
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong(&trace.colorbar.title.text);
            });
        })
        .body(|body| {
            body.rows(18.0, trace.locations.len(), |mut row| {
                let i = row.index();
                let score = trace.z[i];
                let c = view.scale.color_for(score);
                let swatch = Color32::from_rgb(c.red, c.green, c.blue);
                row.col(|ui| {
                    ui.label(RichText::new("■").color(swatch));
                });
                row.col(|ui| {
                    ui.label(&trace.text[i]);
                });
                row.col(|ui| {
                    ui.label(format!("{score:.3}"));
                });
            });
        });
}
