use astrospec::pipeline::finite_range;
use astrospec::pipeline::map::MapBundle;
use astrospec::render;
use eframe::egui::{self, Color32, ColorImage, TextureOptions, Ui};
use egui_plot::{Line, Plot, PlotImage, PlotPoint, PlotPoints, VLine};
use ndarray::Array2;

use crate::color::{generate_palette, ColorScale};
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected artifact in the central panel.
pub fn central_plot(ui: &mut Ui, state: &mut AppState) {
    if state.visualization.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if state.observation.is_some() {
                "Nothing to show for this file with the current settings"
            } else {
                "Open a NIRSpec or MIRI file to view light curves  (File → Open…)"
            };
            ui.heading(hint);
        });
        return;
    }

    match state.view {
        View::Lightcurves => lightcurve_plot(ui, state),
        View::Variability | View::Flux => map_plot(ui, state),
    }
}

// ---------------------------------------------------------------------------
// Band light curves
// ---------------------------------------------------------------------------

fn lightcurve_plot(ui: &mut Ui, state: &AppState) {
    let Some(vis) = &state.visualization else {
        return;
    };
    let bundle = &vis.lightcurves;
    ui.heading(&bundle.title);

    let colors = generate_palette(bundle.curves.len());

    Plot::new("lightcurve_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Time (hours)")
        .y_axis_label("Normalized Flux")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (curve, &color) in bundle.curves.iter().zip(colors.iter()) {
                // NaN bins (empty band, missing samples) are left out of the line
                let points: PlotPoints = bundle
                    .time_hours
                    .iter()
                    .zip(curve.values.iter())
                    .filter(|(_, v)| v.is_finite())
                    .map(|(&t, &v)| [t, v])
                    .collect();

                let line = Line::new(points)
                    .name(format!("{} Band", curve.band.name))
                    .color(color)
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Variability / flux maps
// ---------------------------------------------------------------------------

fn map_plot(ui: &mut Ui, state: &mut AppState) {
    let key = state.heatmap_key();
    let frame_hour = state.frame_hour();
    let Some(bundle) = state.current_map() else {
        return;
    };

    let z = render::displayed_z(bundle, state.overlay.as_deref(), frame_hour);
    let range = finite_range(z.iter().copied());
    let title = bundle.title.clone();
    let z_label = bundle.mode.z_label();
    let extent = map_extent(bundle);
    let overlay_cells = state
        .overlay
        .as_deref()
        .and_then(|band| bundle.mask(band))
        .map(|mask| (mask.band.name.clone(), mask.count()));

    let texture_is_current = matches!(&state.heatmap, Some((cached, _)) if *cached == key);
    if !texture_is_current {
        let image = heatmap_image(&z, range);
        let texture = ui
            .ctx()
            .load_texture("lightcurve_map", image, TextureOptions::NEAREST);
        state.heatmap = Some((key, texture));
    }
    let Some((_, texture)) = &state.heatmap else {
        return;
    };

    ui.heading(&title);
    match range {
        Some((lo, hi)) => ui.label(format!("{z_label}: {lo:.3} … {hi:.3}")),
        None => ui.label(format!("{z_label}: no finite values")),
    };
    if let Some((band, cells)) = overlay_cells {
        ui.label(format!("{band} Band: {cells} grid cells"));
    }

    let Some(((t0, t1), (w0, w1))) = extent else {
        return;
    };
    let width = if t1 > t0 { t1 - t0 } else { 1.0 };
    let height = if w1 > w0 { w1 - w0 } else { 1.0 };
    let center = PlotPoint::new((t0 + t1) / 2.0, (w0 + w1) / 2.0);

    Plot::new("map_plot")
        .x_axis_label("Time (hours)")
        .y_axis_label("Wavelength (µm)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.image(
                PlotImage::new(texture.id(), center, egui::vec2(width as f32, height as f32))
                    .name(&title),
            );
            if let Some(hour) = frame_hour {
                plot_ui.vline(VLine::new(hour).color(Color32::WHITE).width(1.0));
            }
        });
}

/// `((time_min, time_max), (wavelength_min, wavelength_max))` of a map.
fn map_extent(bundle: &MapBundle) -> Option<((f64, f64), (f64, f64))> {
    let time = finite_range(bundle.time_grid.iter().copied())?;
    let wavelength = finite_range(bundle.wavelength_grid.iter().copied())?;
    Some((time, wavelength))
}

/// One pixel per grid cell, the highest wavelength row at the top.
fn heatmap_image(z: &Array2<f64>, range: Option<(f64, f64)>) -> ColorImage {
    let (rows, cols) = z.dim();
    let (lo, hi) = range.unwrap_or((0.0, 1.0));
    let scale = ColorScale::lightcurve_map();

    let mut image = ColorImage::new([cols.max(1), rows.max(1)], Color32::TRANSPARENT);
    for ((r, c), &value) in z.indexed_iter() {
        let y = rows - 1 - r;
        image.pixels[y * cols + c] = scale.color_for(value, lo, hi);
    }
    image
}
