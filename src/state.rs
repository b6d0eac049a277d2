use std::path::Path;

use astrospec::config::PipelineConfig;
use astrospec::data::model::{MiriChannel, Observation};
use astrospec::pipeline::map::MapBundle;
use astrospec::pipeline::{self, Visualization};
use astrospec::render;
use eframe::egui::TextureHandle;
use ndarray::Array1;

// ---------------------------------------------------------------------------
// View selection
// ---------------------------------------------------------------------------

/// Which artifact the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Variability,
    Flux,
    Lightcurves,
}

impl View {
    pub const ALL: [View; 3] = [View::Variability, View::Flux, View::Lightcurves];

    pub fn label(&self) -> &'static str {
        match self {
            View::Variability => "Variability map",
            View::Flux => "Flux map",
            View::Lightcurves => "Band light curves",
        }
    }
}

/// Identifies the contents of the cached heat-map texture.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapKey {
    pub generation: u64,
    pub view: View,
    pub overlay: Option<String>,
    pub frame: Option<usize>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: PipelineConfig,

    /// Loaded observation (None until user loads a file).
    pub observation: Option<Observation>,

    /// File name of the observation, used in titles.
    pub file_name: Option<String>,

    /// Bundles computed from the observation with the current config.
    pub visualization: Option<Visualization>,

    /// Bumped on every recompute so cached textures are rebuilt.
    pub generation: u64,

    pub view: View,

    /// Band whose overlay is shown instead of the full spectrum.
    pub overlay: Option<String>,

    /// Animation frame index, `None` when the map is shown undimmed.
    pub frame: Option<usize>,

    /// Heat-map texture of the current map view.
    pub heatmap: Option<(HeatmapKey, TextureHandle)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            observation: None,
            file_name: None,
            visualization: None,
            generation: 0,
            view: View::Variability,
            overlay: None,
            frame: None,
            heatmap: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded observation and compute its bundles.
    pub fn set_observation(&mut self, observation: Observation, file_name: String) {
        self.observation = Some(observation);
        self.file_name = Some(file_name);
        self.frame = None;
        self.recompute();
    }

    /// Re-run the pipeline with the current config.
    pub fn recompute(&mut self) {
        let (Some(observation), Some(name)) = (&self.observation, &self.file_name) else {
            return;
        };
        self.generation += 1;
        self.heatmap = None;
        match pipeline::run(observation, name, &self.config) {
            Ok(visualization) => {
                self.visualization = Some(visualization);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Pipeline failed for {name}: {e}");
                self.visualization = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    pub fn set_bin_size(&mut self, bin_size: usize) {
        if bin_size != self.config.bin_size {
            self.config.bin_size = bin_size;
            self.recompute();
        }
    }

    pub fn set_miri_channel(&mut self, channel: MiriChannel) {
        if channel != self.config.miri_channel {
            self.config.miri_channel = channel;
            self.recompute();
        }
    }

    /// The map bundle behind the current view, if it is a map view.
    pub fn current_map(&self) -> Option<&MapBundle> {
        let vis = self.visualization.as_ref()?;
        match self.view {
            View::Variability => Some(&vis.variability),
            View::Flux => Some(&vis.flux),
            View::Lightcurves => None,
        }
    }

    /// Animation frame instants for the current bundles.
    pub fn frame_times(&self) -> Array1<f64> {
        match &self.visualization {
            Some(vis) => render::frame_times(&vis.lightcurves.time_hours, self.config.max_frames),
            None => Array1::zeros(0),
        }
    }

    /// Hour of the selected animation frame.
    pub fn frame_hour(&self) -> Option<f64> {
        let frame = self.frame?;
        self.frame_times().get(frame).copied()
    }

    pub fn heatmap_key(&self) -> HeatmapKey {
        HeatmapKey {
            generation: self.generation,
            view: self.view,
            overlay: self.overlay.clone(),
            frame: self.frame,
        }
    }

    /// Write the current bundles as JSON.
    pub fn export(&mut self, path: &Path) {
        let Some(vis) = &self.visualization else {
            self.status_message = Some("Nothing to export yet.".into());
            return;
        };
        if let Err(e) = render::export_json(vis, path) {
            log::error!("Export failed: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
