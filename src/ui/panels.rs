use astrospec::data::model::{MiriChannel, Observation};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – pipeline settings
// ---------------------------------------------------------------------------

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Settings");
    ui.separator();

    if state.observation.is_none() {
        ui.label("No observation loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Binning ----
            ui.strong("Bin size");
            let mut bin_size = state.config.bin_size;
            let changed = ui
                .add(egui::DragValue::new(&mut bin_size).range(1..=1000))
                .changed();
            if changed {
                state.set_bin_size(bin_size);
            }

            // ---- MIRI channel ----
            if matches!(state.observation, Some(Observation::Miri(_))) {
                ui.add_space(4.0);
                ui.strong("MIRI channel");
                ui.horizontal(|ui: &mut Ui| {
                    for (channel, label) in [(MiriChannel::A, "A"), (MiriChannel::B, "B")] {
                        if ui
                            .selectable_label(state.config.miri_channel == channel, label)
                            .clicked()
                        {
                            state.set_miri_channel(channel);
                        }
                    }
                });
            }

            if ui.button("Recompute").clicked() {
                state.recompute();
            }
            ui.separator();

            // ---- View selector ----
            ui.strong("View");
            for view in View::ALL {
                if ui.radio(state.view == view, view.label()).clicked() {
                    state.view = view;
                }
            }
            ui.separator();

            if state.view == View::Lightcurves {
                return;
            }

            // ---- Band overlay ----
            ui.strong("Show");
            let bands: Vec<String> = state
                .config
                .bands()
                .iter()
                .map(|b| b.name.clone())
                .collect();
            let selected_text = match &state.overlay {
                Some(name) => format!("{name} Band"),
                None => "Full Spectrum".to_string(),
            };
            egui::ComboBox::from_id_salt("overlay")
                .selected_text(selected_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(state.overlay.is_none(), "Full Spectrum")
                        .clicked()
                    {
                        state.overlay = None;
                    }
                    for name in &bands {
                        let is_selected = state.overlay.as_deref() == Some(name.as_str());
                        if ui
                            .selectable_label(is_selected, format!("{name} Band"))
                            .clicked()
                        {
                            state.overlay = Some(name.clone());
                        }
                    }
                });
            ui.separator();

            // ---- Animation frame ----
            let frames = state.frame_times();
            if frames.is_empty() {
                return;
            }
            let mut animate = state.frame.is_some();
            if ui.checkbox(&mut animate, "Time window").changed() {
                state.frame = animate.then_some(0);
            }
            if let Some(mut frame) = state.frame {
                let last = frames.len() - 1;
                let hour = frames[frame.min(last)];
                ui.add(
                    egui::Slider::new(&mut frame, 0..=last)
                        .show_value(false)
                        .text(format!("Time: {hour:.1} hours")),
                );
                state.frame = Some(frame);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.visualization.is_some(), egui::Button::new("Export JSON…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(obs), Some(name)) = (&state.observation, &state.file_name) {
            ui.label(format!("{name}: {}", obs.summary()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open NIRSpec or MIRI data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match astrospec::data::loader::load_file(&path) {
        Ok(observation) => {
            log::info!("Visualizing file: {file_name}");
            state.set_observation(observation, file_name);
        }
        Err(e) => {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let default_name = format!(
        "{}_visualization.json",
        state.file_name.as_deref().unwrap_or("astrospec")
    );
    let file = rfd::FileDialog::new()
        .set_title("Export computed bundles")
        .set_file_name(default_name)
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        state.export(&path);
    }
}
