use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::schema::REGIONS;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – region dropdown and year slider
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new(&state.config.title).color(Color32::from_rgb(0xED, 0x55, 0x3B)));
        ui.label(&state.config.subtitle);
    });
    ui.separator();

    // ---- Region dropdown ----
    ui.strong("Please select a region");
    let mut selected = state.region.clone();
    egui::ComboBox::from_id_salt("select_region")
        .selected_text(&selected)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for region in REGIONS {
                ui.selectable_value(&mut selected, region.to_string(), region);
            }
        });
    if selected != state.region {
        log::debug!("Region selected: {selected}");
        state.set_region(&selected);
    }
    ui.separator();

    // ---- Year slider ----
    let years = state.config.years.clone();
    if years.len() > 1 {
        ui.label("Drag the slider to change the year:");
        let last = years.len() - 1;
        let mut idx = state.slider_index.min(last);
        let label = years[idx].to_string();
        let response = ui.add(
            egui::Slider::new(&mut idx, 0..=last)
                .show_value(false)
                .text(label),
        );
        state.slider_index = idx;

        // Apply on release, not while dragging.
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            log::debug!("Year selected: {}", years[idx]);
            state.set_year(years[idx]);
        }

        ui.horizontal(|ui: &mut Ui| {
            for (i, year) in years.iter().enumerate() {
                if ui.selectable_label(i == state.slider_index, year.to_string()).clicked() {
                    state.set_year(*year);
                }
            }
        });
    } else {
        ui.label(format!("Year: {}", state.year));
    }
    ui.separator();

    if state.cache.is_loaded(state.year) {
        if let Ok(ds) = state.cache.get(state.year) {
            if ds.has_regions() {
                return;
            }
            ui.label(
                RichText::new(format!("The {} report has no region column.", ds.year()))
                    .italics(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export figures…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!("Data: {}", state.cache.dir().display()));

        if let Some(bar) = &state.bar {
            ui.separator();
            ui.label(format!(
                "{} report, {} countries shown",
                state.year,
                bar.series.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder with yearly reports (2015.csv, 2016.csv, …)")
        .set_directory(state.cache.dir())
        .pick_folder();

    if let Some(dir) = folder {
        state.set_data_dir(dir);
    }
}

pub fn export_dialog(state: &mut AppState) {
    let Some(dir) = rfd::FileDialog::new()
        .set_title("Export figures as JSON")
        .pick_folder()
    else {
        return;
    };

    match state.export_figures(&dir) {
        Ok(paths) => {
            log::info!("Exported {} figure(s) to {}", paths.len(), dir.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export figures: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
