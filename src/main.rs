mod app;
mod calc;
mod color;
mod config;
mod data;
mod error;
mod export;
mod state;
mod ui;

use app::DrillCloudApp;
use config::AppConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    // A broken config file must not keep the tool from starting.
    let (config, startup_error) = match AppConfig::load_startup() {
        Ok(config) => (config, None),
        Err(e) => {
            log::error!("{e:#}");
            (AppConfig::default(), Some(format!("Config rejected, using defaults: {e:#}")))
        }
    };
    let exporter = export::probe_exporter(&config.output_dir);

    let mut state = AppState::new(config, exporter);
    if let Some(msg) = startup_error {
        state.set_error(msg);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "drillcloud – LMR drilling energy",
        options,
        Box::new(|_cc| Ok(Box::new(DrillCloudApp::new(state)))),
    )
}
