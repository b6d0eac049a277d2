use std::fmt;
use std::str::FromStr;

use ndarray::{s, Array2, Axis, Zip};
use serde::{Deserialize, Serialize};

use super::band::{Band, BandMask};
use super::binning::bin_cube;
use super::error::PipelineError;
use super::stats::nan_median;
use crate::data::model::FluxCube;

// ---------------------------------------------------------------------------
// MapMode
// ---------------------------------------------------------------------------

/// What the z values of a map represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Percent deviation from each wavelength's median over time.
    Variability,
    /// Binned flux as is.
    Flux,
}

impl MapMode {
    pub fn z_label(&self) -> &'static str {
        match self {
            MapMode::Variability => "Variability %",
            MapMode::Flux => "Flux (Jy)",
        }
    }
}

impl FromStr for MapMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variability" => Ok(MapMode::Variability),
            "flux" => Ok(MapMode::Flux),
            other => Err(PipelineError::InvalidParameter(format!(
                "invalid map mode '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapMode::Variability => write!(f, "variability"),
            MapMode::Flux => write!(f, "flux"),
        }
    }
}

// ---------------------------------------------------------------------------
// MapBundle
// ---------------------------------------------------------------------------

/// Everything a renderer needs for a surface plot plus band overlays.
///
/// All grids share the shape `(W - leading_trim, T / bin_size)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapBundle {
    pub title: String,
    pub mode: MapMode,
    /// Elapsed hours, constant along each column.
    pub time_grid: Array2<f64>,
    /// Wavelength in µm, constant along each row.
    pub wavelength_grid: Array2<f64>,
    pub z: Array2<f64>,
    pub masks: Vec<BandMask>,
}

impl MapBundle {
    pub fn mask(&self, band_name: &str) -> Option<&BandMask> {
        self.masks.iter().find(|m| m.band.name == band_name)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.z.dim()
    }
}

/// `((flux / row_median) - 1) * 100`, NaN wherever the flux is not finite.
pub fn variability(flux: &Array2<f64>) -> Array2<f64> {
    let mut z = Array2::from_elem(flux.dim(), f64::NAN);
    for (row, mut z_row) in flux.axis_iter(Axis(0)).zip(z.axis_iter_mut(Axis(0))) {
        let median = nan_median(row.iter());
        Zip::from(&mut z_row).and(&row).for_each(|z, &f| {
            if f.is_finite() {
                *z = (f / median - 1.0) * 100.0;
            }
        });
    }
    z
}

/// Bin a cube, derive the requested z grid and trim the leading wavelength rows.
///
/// Fails with [`PipelineError::EmptyResult`] when binning leaves no time
/// points, or when no finite z value survives the trim (which includes a
/// cube with no more than `leading_trim` wavelengths).
pub fn build_map(
    cube: &FluxCube,
    mode: MapMode,
    bin_size: usize,
    leading_trim: usize,
    bands: &[&Band],
) -> Result<MapBundle, PipelineError> {
    let binned = bin_cube(cube, bin_size)?;
    let (rows, cols) = binned.flux.dim();

    let time_grid = binned
        .time_hours
        .broadcast((rows, cols))
        .ok_or_else(|| PipelineError::ShapeMismatch("time axis does not fit the flux grid".into()))?
        .to_owned();
    let wavelength_grid = cube
        .wavelengths
        .view()
        .insert_axis(Axis(1))
        .broadcast((rows, cols))
        .ok_or_else(|| {
            PipelineError::ShapeMismatch("wavelength axis does not fit the flux grid".into())
        })?
        .to_owned();

    let z = match mode {
        MapMode::Variability => variability(&binned.flux),
        MapMode::Flux => binned.flux,
    };

    let start = leading_trim.min(rows);
    let time_grid = time_grid.slice(s![start.., ..]).to_owned();
    let wavelength_grid = wavelength_grid.slice(s![start.., ..]).to_owned();
    let z = z.slice(s![start.., ..]).to_owned();
    log::info!("{mode} map after trimming {start} rows: {:?}", z.dim());

    if !z.iter().any(|v| v.is_finite()) {
        return Err(PipelineError::EmptyResult(
            "no finite values left after trimming".into(),
        ));
    }

    let masks = bands
        .iter()
        .map(|band| band.mask(wavelength_grid.view()))
        .collect();

    Ok(MapBundle {
        title: String::new(),
        mode,
        time_grid,
        wavelength_grid,
        z,
        masks,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    use super::*;

    /// `rows` wavelengths from 2.0 µm in 0.05 µm steps, `cols` daily samples.
    fn ramp_cube(rows: usize, cols: usize) -> FluxCube {
        let flux = Array2::from_shape_fn((rows, cols), |(r, c)| 1.0 + r as f64 + c as f64);
        let wavelengths = Array1::from_shape_fn(rows, |r| 2.0 + 0.05 * r as f64);
        let times = Array1::from_shape_fn(cols, |c| 60000.0 + c as f64);
        FluxCube::new(flux, wavelengths, times).unwrap()
    }

    #[test]
    fn mode_parses_and_rejects_unknown() {
        assert_eq!("flux".parse::<MapMode>().unwrap(), MapMode::Flux);
        assert!(matches!(
            "spectrum".parse::<MapMode>(),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn variability_is_percent_from_row_median() {
        let flux = array![[1.0, 2.0, 3.0], [4.0, f64::NAN, f64::INFINITY]];
        let z = variability(&flux);
        assert_relative_eq!(z[[0, 0]], -50.0);
        assert_relative_eq!(z[[0, 1]], 0.0);
        assert_relative_eq!(z[[0, 2]], 50.0);
        assert!(z[[1, 1]].is_nan());
        assert!(z[[1, 2]].is_nan());
    }

    #[test]
    fn flux_mode_returns_trimmed_binned_flux() {
        let cube = ramp_cube(5, 6);
        let map = build_map(&cube, MapMode::Flux, 2, 2, &[]).unwrap();
        assert_eq!(map.dim(), (3, 3));
        // row 2, first bin of columns {0, 1}: (3 + 4) / 2
        assert_relative_eq!(map.z[[0, 0]], 3.5);
        assert_relative_eq!(map.wavelength_grid[[0, 2]], 2.1);
        assert_eq!(map.time_grid.row(1), array![0.0, 48.0, 96.0]);
    }

    #[test]
    fn default_trim_drops_sixty_rows() {
        let cube = ramp_cube(70, 4);
        let map = build_map(&cube, MapMode::Variability, 2, 60, &[]).unwrap();
        assert_eq!(map.dim(), (10, 2));
        assert_relative_eq!(map.wavelength_grid[[0, 0]], 2.0 + 0.05 * 60.0);
    }

    #[test]
    fn trimming_everything_is_empty() {
        let cube = ramp_cube(60, 4);
        assert!(matches!(
            build_map(&cube, MapMode::Flux, 2, 60, &[]),
            Err(PipelineError::EmptyResult(_))
        ));
    }

    #[test]
    fn all_nan_after_trim_is_empty() {
        let mut cube = ramp_cube(4, 4);
        cube.flux.row_mut(3).fill(f64::NAN);
        assert!(build_map(&cube, MapMode::Flux, 2, 3, &[]).is_err());
    }

    #[test]
    fn masks_follow_trimmed_wavelengths() {
        let cube = ramp_cube(70, 4);
        let (ch4, co) = (Band::ch4(), Band::co());
        let map = build_map(&cube, MapMode::Flux, 1, 0, &[&ch4, &co]).unwrap();
        let ch4_mask = map.mask("CH4").unwrap();
        assert_eq!(ch4_mask.mask.dim(), map.dim());
        for (r, row) in ch4_mask.mask.axis_iter(Axis(0)).enumerate() {
            let expected = ch4.contains(map.wavelength_grid[[r, 0]]);
            assert!(row.iter().all(|&m| m == expected));
        }
        assert!(ch4_mask.count() > 0);
        let co_mask = map.mask("CO").unwrap();
        assert!(Zip::from(&ch4_mask.mask)
            .and(&co_mask.mask)
            .all(|&a, &b| !(a && b)));
    }

    #[test]
    fn zero_bin_size_is_invalid() {
        let cube = ramp_cube(3, 3);
        assert!(matches!(
            build_map(&cube, MapMode::Flux, 0, 0, &[]),
            Err(PipelineError::InvalidParameter(_))
        ));
    }
}
