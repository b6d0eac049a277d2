use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::error::PipelineError;
use super::stats::{nan_mean, nan_median};
use crate::data::model::FluxCube;

// ---------------------------------------------------------------------------
// Statistic
// ---------------------------------------------------------------------------

/// Summary applied to each time window. Both ignore NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    #[default]
    Mean,
    Median,
}

impl Statistic {
    fn apply<'a>(self, window: impl IntoIterator<Item = &'a f64>) -> f64 {
        match self {
            Statistic::Mean => nan_mean(window),
            Statistic::Median => nan_median(window),
        }
    }
}

impl FromStr for Statistic {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Statistic::Mean),
            "median" => Ok(Statistic::Median),
            other => Err(PipelineError::InvalidParameter(format!(
                "unknown statistic '{other}'"
            ))),
        }
    }
}

fn check_bin_size(bin_size: usize) -> Result<(), PipelineError> {
    if bin_size == 0 {
        return Err(PipelineError::InvalidParameter(
            "bin_size must be a positive integer".into(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// Reduce a series by contiguous windows of `bin_size`.
///
/// The output has `len / bin_size` elements; a trailing partial window is
/// dropped. A window holding only NaN yields NaN.
pub fn bin_series(
    series: ArrayView1<f64>,
    bin_size: usize,
    statistic: Statistic,
) -> Result<Array1<f64>, PipelineError> {
    check_bin_size(bin_size)?;
    Ok(series
        .exact_chunks(bin_size)
        .into_iter()
        .map(|window| statistic.apply(window.iter()))
        .collect())
}

/// Bin every wavelength row of a `(W, T)` grid along time: `(W, T / bin_size)`.
pub fn bin_grid(
    grid: ArrayView2<f64>,
    bin_size: usize,
    statistic: Statistic,
) -> Result<Array2<f64>, PipelineError> {
    check_bin_size(bin_size)?;
    let (rows, cols) = grid.dim();
    let bins = cols / bin_size;

    let mut values = Vec::with_capacity(rows * bins);
    for row in grid.rows() {
        values.extend(
            row.exact_chunks(bin_size)
                .into_iter()
                .map(|window| statistic.apply(window.iter())),
        );
    }

    let binned = Array2::from_shape_vec((rows, bins), values)
        .map_err(|e| PipelineError::ShapeMismatch(e.to_string()))?;
    log::debug!("binned grid {rows}x{cols} -> {rows}x{bins} (bin_size={bin_size})");
    Ok(binned)
}

/// Every `bin_size`-th timestamp, starting with the first.
///
/// Timestamps are picked, not averaged, even when the flux beside them is:
/// the binned time axis keeps the start time of each window.
pub fn stride_times(times: ArrayView1<f64>, bin_size: usize) -> Result<Array1<f64>, PipelineError> {
    check_bin_size(bin_size)?;
    Ok(times.iter().step_by(bin_size).copied().collect())
}

// ---------------------------------------------------------------------------
// Binned cube: what the map and light-curve stages start from
// ---------------------------------------------------------------------------

/// A flux cube after time binning, with elapsed hours alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedCube {
    /// `(W, T / bin_size)` mean-binned flux.
    pub flux: Array2<f64>,
    /// Strided times (MJD), one per flux column.
    pub times: Array1<f64>,
    /// Hours since the earliest binned time.
    pub time_hours: Array1<f64>,
}

/// Hours elapsed since the earliest time, for a time axis in days.
pub fn elapsed_hours(times: ArrayView1<f64>) -> Array1<f64> {
    let start = times.iter().copied().fold(f64::INFINITY, f64::min);
    times.mapv(|t| (t - start) * 24.0)
}

/// Mean-bin the flux along time and stride the time axis to match.
///
/// The strided axis is cut to the number of complete flux bins, so a cube
/// of 5 times binned by 2 keeps times 0 and 2 but not 4.
pub fn bin_cube(cube: &FluxCube, bin_size: usize) -> Result<BinnedCube, PipelineError> {
    let flux = bin_grid(cube.flux.view(), bin_size, Statistic::Mean)?;
    let n_bins = flux.ncols();
    if n_bins == 0 {
        return Err(PipelineError::EmptyResult(format!(
            "no time points left after binning {} samples by {bin_size}",
            cube.n_times()
        )));
    }

    let mut times = stride_times(cube.times.view(), bin_size)?;
    if times.len() < n_bins {
        return Err(PipelineError::ShapeMismatch(format!(
            "{} binned times for {n_bins} flux bins",
            times.len()
        )));
    }
    times = times.slice(ndarray::s![..n_bins]).to_owned();
    let time_hours = elapsed_hours(times.view());

    log::info!(
        "Flux data shape after binning: {:?} ({} time points)",
        flux.dim(),
        n_bins
    );
    Ok(BinnedCube {
        flux,
        times,
        time_hours,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn series_drops_trailing_remainder() {
        let series = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let binned = bin_series(series.view(), 3, Statistic::Mean).unwrap();
        assert_eq!(binned.len(), 2);
        assert_relative_eq!(binned[0], 2.0);
        assert_relative_eq!(binned[1], 5.0);
    }

    #[test]
    fn median_statistic_per_window() {
        let series = array![1.0, 9.0, 2.0, 4.0, 4.0, 100.0];
        let binned = bin_series(series.view(), 3, Statistic::Median).unwrap();
        assert_eq!(binned, array![2.0, 4.0]);
    }

    #[test]
    fn nan_is_ignored_inside_window() {
        let series = array![f64::NAN, 4.0, f64::NAN, f64::NAN];
        let binned = bin_series(series.view(), 2, Statistic::Mean).unwrap();
        assert_relative_eq!(binned[0], 4.0);
        assert!(binned[1].is_nan());
    }

    #[test]
    fn window_larger_than_series_is_empty() {
        let series = array![1.0, 2.0];
        assert!(bin_series(series.view(), 5, Statistic::Mean).unwrap().is_empty());
    }

    #[test]
    fn zero_bin_size_is_invalid() {
        let series = array![1.0, 2.0];
        assert!(matches!(
            bin_series(series.view(), 0, Statistic::Mean),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(stride_times(series.view(), 0).is_err());
        assert!(bin_grid(array![[1.0]].view(), 0, Statistic::Mean).is_err());
    }

    #[test]
    fn grid_bins_time_axis_only() {
        let grid = array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]];
        let binned = bin_grid(grid.view(), 2, Statistic::Mean).unwrap();
        assert_eq!(binned, array![[1.5, 3.5], [5.5, 7.5]]);
    }

    #[test]
    fn grid_shape_is_floor_of_columns() {
        let grid = Array2::<f64>::ones((3, 11));
        let binned = bin_grid(grid.view(), 4, Statistic::Median).unwrap();
        assert_eq!(binned.dim(), (3, 2));
    }

    #[test]
    fn times_are_strided_not_averaged() {
        let times = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let strided = stride_times(times.view(), 2).unwrap();
        assert_eq!(strided, array![0.0, 2.0, 4.0]);
    }

    #[test]
    fn cube_pairs_binned_flux_with_strided_hours() {
        let cube = FluxCube::new(
            array![[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]],
            array![1.0, 2.0],
            array![0.0, 1.0, 2.0, 3.0],
        )
        .unwrap();
        let binned = bin_cube(&cube, 2).unwrap();
        assert_eq!(binned.flux, array![[1.5, 3.5], [5.5, 7.5]]);
        assert_eq!(binned.times, array![0.0, 2.0]);
        assert_eq!(binned.time_hours, array![0.0, 48.0]);
    }

    #[test]
    fn cube_time_axis_is_cut_to_complete_bins() {
        let cube = FluxCube::new(
            Array2::ones((1, 5)),
            array![1.0],
            array![10.0, 10.5, 11.0, 11.5, 12.0],
        )
        .unwrap();
        let binned = bin_cube(&cube, 2).unwrap();
        assert_eq!(binned.times, array![10.0, 11.0]);
        assert_eq!(binned.time_hours, array![0.0, 24.0]);
    }

    #[test]
    fn cube_with_grid_wider_than_time_axis_is_a_shape_mismatch() {
        let mut cube = FluxCube::new(Array2::ones((1, 4)), array![1.0], array![0.0, 1.0, 2.0, 3.0])
            .unwrap();
        cube.flux = Array2::ones((1, 12));
        assert!(matches!(
            bin_cube(&cube, 2),
            Err(PipelineError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn cube_shorter_than_one_bin_is_empty() {
        let cube = FluxCube::new(Array2::ones((2, 3)), array![1.0, 2.0], array![0.0, 1.0, 2.0])
            .unwrap();
        assert!(matches!(
            bin_cube(&cube, 4),
            Err(PipelineError::EmptyResult(_))
        ));
    }

    #[test]
    fn statistic_parses_from_str() {
        assert_eq!("median".parse::<Statistic>().unwrap(), Statistic::Median);
        assert!("mode".parse::<Statistic>().is_err());
    }
}
