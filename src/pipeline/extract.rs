use ndarray::{Array1, Array2};

use super::error::PipelineError;
use crate::data::model::{MiriChannel, SpectralTable};

/// Dense view of a [`SpectralTable`]: unique axes plus one grid per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedTable {
    pub times: Array1<f64>,
    pub wavelengths_a: Array1<f64>,
    pub wavelengths_b: Array1<f64>,
    pub spectra_a: Array2<f64>,
    pub spectra_b: Array2<f64>,
}

impl ExtractedTable {
    /// Wavelength axis and flux grid of one channel.
    pub fn channel(&self, channel: MiriChannel) -> (&Array1<f64>, &Array2<f64>) {
        match channel {
            MiriChannel::A => (&self.wavelengths_a, &self.spectra_a),
            MiriChannel::B => (&self.wavelengths_b, &self.spectra_b),
        }
    }
}

/// Sorted distinct values; NaN entries collapse together and sort last.
pub fn unique_sorted(values: &[f64]) -> Array1<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup_by(|a, b| a == b || (a.is_nan() && b.is_nan()));
    Array1::from_vec(sorted)
}

/// Reshape a flat flux column into `(rows, len / rows)` in row-major order.
///
/// The column must already be ordered wavelength-major (all times of the
/// first wavelength, then the next). Only the divisibility is checked here.
fn reshape_flux(flux: &[f64], rows: usize, column: &str) -> Result<Array2<f64>, PipelineError> {
    if rows == 0 || flux.len() % rows != 0 {
        return Err(PipelineError::ShapeMismatch(format!(
            "cannot reshape {} {column} samples into {rows} wavelength rows",
            flux.len()
        )));
    }
    Array2::from_shape_vec((rows, flux.len() / rows), flux.to_vec())
        .map_err(|e| PipelineError::ShapeMismatch(e.to_string()))
}

/// Restructure a MIRI table into unique axes and one 2D grid per channel.
pub fn extract(table: &SpectralTable) -> Result<ExtractedTable, PipelineError> {
    let wavelengths_a = unique_sorted(&table.wavelength_a);
    let wavelengths_b = unique_sorted(&table.wavelength_b);
    let times = unique_sorted(&table.time);

    let spectra_a = reshape_flux(&table.flux_a, wavelengths_a.len(), "fluxa")?;
    let spectra_b = reshape_flux(&table.flux_b, wavelengths_b.len(), "fluxb")?;

    log::info!(
        "Reshaped MIRI data: spectra_a {:?}, spectra_b {:?}, {} unique times",
        spectra_a.dim(),
        spectra_b.dim(),
        times.len()
    );

    Ok(ExtractedTable {
        times,
        wavelengths_a,
        wavelengths_b,
        spectra_a,
        spectra_b,
    })
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    /// Two wavelengths x three times, wavelength-major.
    fn small_table() -> SpectralTable {
        SpectralTable::new(
            vec![5.0, 5.0, 5.0, 6.0, 6.0, 6.0],
            vec![7.0, 7.0, 7.0, 7.0, 7.0, 7.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            vec![100.0, 100.1, 100.2, 100.0, 100.1, 100.2],
        )
        .unwrap()
    }

    #[test]
    fn axes_are_unique_and_ascending() {
        assert_eq!(unique_sorted(&[3.0, 1.0, 3.0, 2.0, 1.0]), array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn extract_reshapes_row_major() {
        let out = extract(&small_table()).unwrap();
        assert_eq!(out.times, array![100.0, 100.1, 100.2]);
        assert_eq!(out.wavelengths_a, array![5.0, 6.0]);
        assert_eq!(out.spectra_a, array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        // channel B has one wavelength, so every sample lands in a single row
        assert_eq!(out.spectra_b.dim(), (1, 6));
    }

    #[test]
    fn channel_selects_matching_axis() {
        let out = extract(&small_table()).unwrap();
        let (wl, flux) = out.channel(MiriChannel::B);
        assert_eq!(wl.len(), flux.nrows());
    }

    #[test]
    fn indivisible_rows_are_a_shape_mismatch() {
        let table = SpectralTable::new(
            vec![1.0, 2.0, 3.0, 1.0, 2.0],
            vec![1.0; 5],
            vec![0.0; 5],
            vec![0.0; 5],
            vec![0.0, 0.0, 0.0, 1.0, 1.0],
        )
        .unwrap();
        assert!(matches!(
            extract(&table),
            Err(PipelineError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn empty_table_is_a_shape_mismatch() {
        let table = SpectralTable::new(vec![], vec![], vec![], vec![], vec![]).unwrap();
        assert!(extract(&table).is_err());
    }
}
