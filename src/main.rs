mod app;
mod color;
mod state;
mod ui;

use app::AstroSpecApp;
use astrospec::config::PipelineConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Ignoring unusable config: {e:#}");
            PipelineConfig::default()
        }
    };
    log::info!("Using bin_size {} and max_frames {}", config.bin_size, config.max_frames);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AstroSpec – Light-curve Maps",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(AstroSpecApp::new(config)))
        }),
    )
}
