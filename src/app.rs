use eframe::egui;

use crate::config::PresentationConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HappinessDashApp {
    pub state: AppState,
}

impl HappinessDashApp {
    pub fn new(config: PresentationConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl Default for HappinessDashApp {
    fn default() -> Self {
        Self::new(PresentationConfig::default())
    }
}

impl eframe::App for HappinessDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: score overview ----
        egui::TopBottomPanel::bottom("score_overview")
            .default_height(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                plot::score_overview(ui, &self.state);
            });

        // ---- Central panel: stacked bar chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::bar_chart(ui, &self.state);
        });
    }
}
