use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, Axis, Ix1, Ix2};

use super::error::PipelineError;
use super::stats::nan_median;

/// Divide a series by its NaN-aware median.
///
/// A zero or NaN median is not special-cased: the result carries inf/NaN.
pub fn normalize_series(series: ArrayView1<f64>) -> Array1<f64> {
    let median = nan_median(series.iter());
    series.mapv(|v| v / median)
}

/// Divide each row of a `(W, T)` grid by that row's NaN-aware median.
pub fn normalize_rows(grid: ArrayView2<f64>) -> Array2<f64> {
    let mut out = grid.to_owned();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let median = nan_median(row.iter());
        row.mapv_inplace(|v| v / median);
    }
    out
}

/// Dimension-dispatching entry point: 1D divides by the global median,
/// 2D divides per row, anything else is rejected.
pub fn normalize(array: &ArrayD<f64>) -> Result<ArrayD<f64>, PipelineError> {
    match array.ndim() {
        1 => {
            let series = array
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|e| PipelineError::ShapeMismatch(e.to_string()))?;
            Ok(normalize_series(series).into_dyn())
        }
        2 => {
            let grid = array
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|e| PipelineError::ShapeMismatch(e.to_string()))?;
            Ok(normalize_rows(grid).into_dyn())
        }
        n => Err(PipelineError::UnsupportedShape(n)),
    }
}
