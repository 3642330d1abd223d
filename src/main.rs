use eframe::egui;
use happiness_dash::app::HappinessDashApp;
use happiness_dash::config::PresentationConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match PresentationConfig::from_default_location() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}; falling back to the default preset");
            PresentationConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(HappinessDashApp::new(config)))),
    )
}
