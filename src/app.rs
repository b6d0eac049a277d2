use astrospec::config::PipelineConfig;
use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct AstroSpecApp {
    pub state: AppState,
}

impl AstroSpecApp {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for AstroSpecApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: pipeline settings ----
        egui::SidePanel::left("settings_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map or light curves ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_plot(ui, &mut self.state);
        });
    }
}
