/// Numeric core: from an [`Observation`] to the grids and series a renderer draws.
///
/// ```text
///   MIRI table ──► extract ──► normalize_rows ─┐
///                                             ├──► FluxCube ──► bin_cube ──┬──► build_map (variability, flux)
///   NIRSpec cube ─────────────────────────────┘                           └──► extract_band_lightcurves
/// ```
pub mod band;
pub mod binning;
pub mod error;
pub mod extract;
pub mod lightcurve;
pub mod map;
pub mod normalize;
pub mod stats;

use ndarray::Array1;
use serde::Serialize;

pub use error::PipelineError;

use crate::config::PipelineConfig;
use crate::data::model::{FluxCube, Observation};
use lightcurve::{extract_band_lightcurves, LightcurveBundle};
use map::{build_map, MapBundle, MapMode};

/// The three artifacts produced for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visualization {
    pub variability: MapBundle,
    pub flux: MapBundle,
    pub lightcurves: LightcurveBundle,
}

/// Turn an observation into a flux cube ready for binning.
///
/// NIRSpec cubes pass through. MIRI tables are reshaped, the configured
/// channel is picked and each wavelength row is divided by its median.
///
/// A missing (NaN) MJD counts as one more distinct time, so a MIRI table
/// with null times is rejected with [`PipelineError::ShapeMismatch`].
pub fn prepare_cube(
    observation: &Observation,
    config: &PipelineConfig,
) -> Result<FluxCube, PipelineError> {
    match observation {
        Observation::NirSpec(cube) => Ok(cube.clone()),
        Observation::Miri(table) => {
            let extracted = extract::extract(table)?;
            let (wavelengths, spectra) = extracted.channel(config.miri_channel);
            let flux = normalize::normalize_rows(spectra.view());
            if extracted.times.len() != flux.ncols() {
                let missing = extracted.times.iter().filter(|t| t.is_nan()).count();
                log::error!(
                    "MIRI MJD column gives {} unique times ({missing} missing) for {} samples per wavelength",
                    extracted.times.len(),
                    flux.ncols()
                );
            }
            FluxCube::new(flux, wavelengths.clone(), extracted.times.clone())
        }
    }
}

/// Build one map bundle with its title.
pub fn map_bundle(
    cube: &FluxCube,
    mode: MapMode,
    title: &str,
    config: &PipelineConfig,
) -> Result<MapBundle, PipelineError> {
    let mut bundle = build_map(
        cube,
        mode,
        config.bin_size,
        config.leading_trim,
        &config.bands(),
    )?;
    bundle.title = title.to_string();
    Ok(bundle)
}

/// Run the whole pipeline for one file.
///
/// `name` is the file name used in the bundle titles. Any stage failure is
/// returned as is; nothing is partially produced.
pub fn run(
    observation: &Observation,
    name: &str,
    config: &PipelineConfig,
) -> Result<Visualization, PipelineError> {
    config.validate()?;
    log::info!("Processing {} data for {name}", observation.instrument());

    let cube = prepare_cube(observation, config)?;
    log::info!(
        "Flux cube {:?}, {} wavelengths, {} times, bin_size {}",
        cube.flux.dim(),
        cube.n_wavelengths(),
        cube.n_times(),
        config.bin_size
    );

    let variability = map_bundle(
        &cube,
        MapMode::Variability,
        &format!("{name} Variability Map"),
        config,
    )?;
    let flux = map_bundle(&cube, MapMode::Flux, &format!("{name} Flux Map"), config)?;

    let mut lightcurves =
        extract_band_lightcurves(&cube, config.bin_size, &config.bands(), config.empty_band)?;
    lightcurves.title = format!("{name} Specific Wavelength Light Curves");

    log::info!("Visualization bundles computed for {name}");
    Ok(Visualization {
        variability,
        flux,
        lightcurves,
    })
}

/// Minimum and maximum of the finite values, if any.
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Hours axis of a bundle set, handy for sliders and axis bounds.
pub fn hours_extent(time_hours: &Array1<f64>) -> Option<(f64, f64)> {
    finite_range(time_hours.iter().copied())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::data::model::SpectralTable;

    #[test]
    fn finite_range_skips_nan_and_inf() {
        let values = [f64::NAN, 3.0, -1.0, f64::INFINITY, 2.0];
        assert_eq!(finite_range(values), Some((-1.0, 3.0)));
        assert_eq!(finite_range([f64::NAN]), None);
    }

    #[test]
    fn hours_extent_of_axis() {
        assert_eq!(hours_extent(&array![0.0, 48.0, 24.0]), Some((0.0, 48.0)));
    }

    #[test]
    fn miri_table_with_missing_time_is_rejected() {
        let table = SpectralTable::new(
            vec![5.0, 5.0, 6.0, 6.0],
            vec![9.0, 9.0, 10.0, 10.0],
            vec![1.0, 2.0, 3.0, 4.0],
            vec![1.0, 2.0, 3.0, 4.0],
            vec![100.0, f64::NAN, 100.0, 101.0],
        )
        .unwrap();
        assert!(matches!(
            prepare_cube(&Observation::Miri(table), &PipelineConfig::default()),
            Err(PipelineError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn nirspec_cube_passes_through_prepare() {
        let cube = FluxCube::new(array![[1.0, 2.0]], array![2.2], array![0.0, 1.0]).unwrap();
        let prepared = prepare_cube(&Observation::NirSpec(cube.clone()), &PipelineConfig::default())
            .unwrap();
        assert_eq!(prepared, cube);
    }
}
