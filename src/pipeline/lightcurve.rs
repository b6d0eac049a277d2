use ndarray::{Array1, Axis};
use serde::Serialize;

use super::band::Band;
use super::binning::bin_cube;
use super::error::PipelineError;
use super::normalize::normalize_series;
use super::stats::mean;
use crate::config::EmptyBandPolicy;
use crate::data::model::FluxCube;

/// Median-normalized light curve of one band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandLightcurve {
    pub band: Band,
    /// Number of wavelength rows averaged together.
    pub n_wavelengths: usize,
    pub values: Array1<f64>,
}

/// Band light curves sharing one elapsed-hours axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightcurveBundle {
    pub title: String,
    pub time_hours: Array1<f64>,
    pub curves: Vec<BandLightcurve>,
}

impl LightcurveBundle {
    pub fn curve(&self, band_name: &str) -> Option<&BandLightcurve> {
        self.curves.iter().find(|c| c.band.name == band_name)
    }
}

/// Average the binned flux over each band's wavelengths per time bin, then
/// divide each series by its own median.
///
/// The average is a plain mean over the selected rows, so a NaN in any of
/// them makes that bin NaN. A band with no wavelengths gives an all-NaN
/// series or [`PipelineError::EmptyBand`], depending on `policy`.
pub fn extract_band_lightcurves(
    cube: &FluxCube,
    bin_size: usize,
    bands: &[&Band],
    policy: EmptyBandPolicy,
) -> Result<LightcurveBundle, PipelineError> {
    let binned = bin_cube(cube, bin_size)?;

    let mut curves = Vec::with_capacity(bands.len());
    for &band in bands {
        let indices = band.indices(cube.wavelengths.view());
        if indices.is_empty() {
            match policy {
                EmptyBandPolicy::Error => return Err(PipelineError::EmptyBand(band.name.clone())),
                EmptyBandPolicy::Nan => log::warn!(
                    "band {} ({}–{} µm) has no wavelengths; its light curve is all NaN",
                    band.name,
                    band.min,
                    band.max
                ),
            }
        }

        let selected = binned.flux.select(Axis(0), &indices);
        let averaged: Array1<f64> = selected
            .axis_iter(Axis(1))
            .map(|column| mean(column.iter()))
            .collect();

        curves.push(BandLightcurve {
            band: band.clone(),
            n_wavelengths: indices.len(),
            values: normalize_series(averaged.view()),
        });
    }

    Ok(LightcurveBundle {
        title: String::new(),
        time_hours: binned.time_hours,
        curves,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    use super::*;

    fn two_band_cube() -> FluxCube {
        // rows: 2.2 (CH4), 2.3 (CH4), 3.0 (none), 4.8 (CO)
        let flux = array![
            [1.0, 1.0, 2.0, 2.0, 3.0, 3.0],
            [3.0, 3.0, 4.0, 4.0, 5.0, 5.0],
            [9.0, 9.0, 9.0, 9.0, 9.0, 9.0],
            [10.0, 10.0, 20.0, 20.0, 40.0, 40.0],
        ];
        FluxCube::new(
            flux,
            array![2.2, 2.3, 3.0, 4.8],
            array![0.0, 0.25, 0.5, 0.75, 1.0, 1.25],
        )
        .unwrap()
    }

    #[test]
    fn bands_average_then_normalize() {
        let (ch4, co) = (Band::ch4(), Band::co());
        let out = extract_band_lightcurves(&two_band_cube(), 2, &[&ch4, &co], EmptyBandPolicy::Nan)
            .unwrap();
        assert_eq!(out.time_hours, array![0.0, 12.0, 24.0]);

        let ch4_curve = out.curve("CH4").unwrap();
        assert_eq!(ch4_curve.n_wavelengths, 2);
        // averages 2, 3, 4 -> median 3
        assert_relative_eq!(ch4_curve.values[0], 2.0 / 3.0);
        assert_relative_eq!(ch4_curve.values[1], 1.0);
        assert_relative_eq!(ch4_curve.values[2], 4.0 / 3.0);

        let co_curve = out.curve("CO").unwrap();
        assert_eq!(co_curve.values, array![0.5, 1.0, 2.0]);
    }

    #[test]
    fn empty_band_is_nan_by_default() {
        let band = Band::new("H2O", 1.0, 1.5);
        let out = extract_band_lightcurves(&two_band_cube(), 3, &[&band], EmptyBandPolicy::Nan)
            .unwrap();
        assert_eq!(out.curves[0].n_wavelengths, 0);
        assert!(out.curves[0].values.iter().all(|v| v.is_nan()));
        assert_eq!(out.curves[0].values.len(), 2);
    }

    #[test]
    fn empty_band_can_be_an_error() {
        let band = Band::new("H2O", 1.0, 1.5);
        assert_eq!(
            extract_band_lightcurves(&two_band_cube(), 3, &[&band], EmptyBandPolicy::Error),
            Err(PipelineError::EmptyBand("H2O".into()))
        );
    }

    #[test]
    fn nan_in_a_band_row_poisons_that_bin() {
        let mut cube = two_band_cube();
        cube.flux[[0, 0]] = f64::NAN;
        cube.flux[[0, 1]] = f64::NAN;
        let ch4 = Band::ch4();
        let out = extract_band_lightcurves(&cube, 2, &[&ch4], EmptyBandPolicy::Nan).unwrap();
        assert!(out.curves[0].values[0].is_nan());
        // remaining averages 3, 4 -> NaN-aware median 3.5
        assert_relative_eq!(out.curves[0].values[1], 3.0 / 3.5);
    }

    #[test]
    fn too_few_samples_for_one_bin_is_empty() {
        let cube = FluxCube::new(Array2::ones((1, 2)), array![2.2], array![0.0, 1.0]).unwrap();
        let ch4 = Band::ch4();
        assert!(matches!(
            extract_band_lightcurves(&cube, 3, &[&ch4], EmptyBandPolicy::Nan),
            Err(PipelineError::EmptyResult(_))
        ));
    }
}
