//! Renderer-side helpers that need no UI types: animation frames, band
//! overlays and JSON export of computed bundles.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::{Array1, Array2, Zip};

use crate::pipeline::band::BandMask;
use crate::pipeline::map::MapBundle;
use crate::pipeline::Visualization;

/// Width (hours) of the Gaussian time window highlighted by an animation frame.
pub const FRAME_SIGMA_HOURS: f64 = 5.0;

/// `max_frames` evenly spaced instants from the first to the last hour, inclusive.
pub fn frame_times(time_hours: &Array1<f64>, max_frames: usize) -> Array1<f64> {
    match crate::pipeline::hours_extent(time_hours) {
        Some((start, end)) if max_frames > 1 => Array1::linspace(start, end, max_frames),
        Some((start, _)) if max_frames == 1 => Array1::from_elem(1, start),
        _ => Array1::zeros(0),
    }
}

/// Gaussian weight of every grid cell for a frame centred on `hour`.
pub fn frame_weights(time_grid: &Array2<f64>, hour: f64, sigma: f64) -> Array2<f64> {
    time_grid.mapv(|t| (-(t - hour).powi(2) / (2.0 * sigma * sigma)).exp())
}

/// The z grid dimmed away from `hour`, as shown by one animation frame.
pub fn frame_z(bundle: &MapBundle, hour: f64) -> Array2<f64> {
    frame_weights(&bundle.time_grid, hour, FRAME_SIGMA_HOURS) * &bundle.z
}

/// `z` where the mask is set, NaN elsewhere. Both grids share one shape.
pub fn masked(z: &Array2<f64>, mask: &BandMask) -> Array2<f64> {
    Zip::from(z)
        .and(&mask.mask)
        .map_collect(|&v, &inside| if inside { v } else { f64::NAN })
}

/// z values inside the named band, NaN elsewhere. `None` for an unknown band.
pub fn masked_z(bundle: &MapBundle, band_name: &str) -> Option<Array2<f64>> {
    let mask = bundle.mask(band_name)?;
    Some(masked(&bundle.z, mask))
}

/// The grid a renderer draws: optionally dimmed around `frame_hour`, then
/// limited to the `overlay` band. An unknown band name shows the full grid.
pub fn displayed_z(bundle: &MapBundle, overlay: Option<&str>, frame_hour: Option<f64>) -> Array2<f64> {
    match (frame_hour, overlay) {
        (None, Some(band)) => masked_z(bundle, band).unwrap_or_else(|| bundle.z.clone()),
        (None, None) => bundle.z.clone(),
        (Some(hour), overlay) => {
            let z = frame_z(bundle, hour);
            match overlay.and_then(|band| bundle.mask(band)) {
                Some(mask) => masked(&z, mask),
                None => z,
            }
        }
    }
}

/// Write every bundle of a visualization as JSON (NaN becomes `null`).
pub fn export_json(visualization: &Visualization, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer(std::io::BufWriter::new(file), visualization)
        .context("writing visualization JSON")?;
    log::info!("Exported visualization to {}", path.display());
    Ok(())
}
