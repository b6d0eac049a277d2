use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineError;

// ---------------------------------------------------------------------------
// Instrument
// ---------------------------------------------------------------------------

/// Source instrument, which decides how a file is read and prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    /// Dense flux cube with its time and wavelength axes.
    NirSpec,
    /// Flat two-channel spectral table.
    Miri,
}

impl Instrument {
    /// Detect the instrument from a file name (`nirspec` / `miri`, any case).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.contains("nirspec") {
            Some(Instrument::NirSpec)
        } else if lower.contains("miri") {
            Some(Instrument::Miri)
        } else {
            None
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::NirSpec => write!(f, "NIRSpec"),
            Instrument::Miri => write!(f, "MIRI"),
        }
    }
}

/// One of the two MIRI table channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MiriChannel {
    #[default]
    A,
    B,
}

// ---------------------------------------------------------------------------
// SpectralTable – the raw MIRI table
// ---------------------------------------------------------------------------

/// Parallel flat columns of a MIRI spectral table, one entry per sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralTable {
    pub wavelength_a: Vec<f64>,
    pub wavelength_b: Vec<f64>,
    pub flux_a: Vec<f64>,
    pub flux_b: Vec<f64>,
    /// Observation time (MJD).
    pub time: Vec<f64>,
}

impl SpectralTable {
    /// Build a table, checking every column has the same row count.
    pub fn new(
        wavelength_a: Vec<f64>,
        wavelength_b: Vec<f64>,
        flux_a: Vec<f64>,
        flux_b: Vec<f64>,
        time: Vec<f64>,
    ) -> Result<Self, PipelineError> {
        let rows = time.len();
        let columns = [
            ("wla", wavelength_a.len()),
            ("wlb", wavelength_b.len()),
            ("fluxa", flux_a.len()),
            ("fluxb", flux_b.len()),
        ];
        for (name, len) in columns {
            if len != rows {
                return Err(PipelineError::ShapeMismatch(format!(
                    "column {name} has {len} rows, MJD has {rows}"
                )));
            }
        }
        Ok(Self {
            wavelength_a,
            wavelength_b,
            flux_a,
            flux_b,
            time,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FluxCube – a flux grid with its axes
// ---------------------------------------------------------------------------

/// Flux indexed `[wavelength, time]` together with both axes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluxCube {
    pub flux: Array2<f64>,
    /// Ascending wavelengths (µm), one per flux row.
    pub wavelengths: Array1<f64>,
    /// Ascending times (MJD, days), one per flux column.
    pub times: Array1<f64>,
}

impl FluxCube {
    pub fn new(
        flux: Array2<f64>,
        wavelengths: Array1<f64>,
        times: Array1<f64>,
    ) -> Result<Self, PipelineError> {
        let (rows, cols) = flux.dim();
        if rows != wavelengths.len() || cols != times.len() {
            return Err(PipelineError::ShapeMismatch(format!(
                "flux grid is {rows}x{cols} but axes have {} wavelengths and {} times",
                wavelengths.len(),
                times.len()
            )));
        }
        Ok(Self {
            flux,
            wavelengths,
            times,
        })
    }

    pub fn n_wavelengths(&self) -> usize {
        self.wavelengths.len()
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }
}

// ---------------------------------------------------------------------------
// Observation – whatever a loader produced
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    NirSpec(FluxCube),
    Miri(SpectralTable),
}

impl Observation {
    pub fn instrument(&self) -> Instrument {
        match self {
            Observation::NirSpec(_) => Instrument::NirSpec,
            Observation::Miri(_) => Instrument::Miri,
        }
    }

    /// Short description for status lines.
    pub fn summary(&self) -> String {
        match self {
            Observation::NirSpec(cube) => format!(
                "NIRSpec cube: {} wavelengths x {} times",
                cube.n_wavelengths(),
                cube.n_times()
            ),
            Observation::Miri(table) => format!("MIRI table: {} rows", table.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn instrument_from_name_is_case_insensitive() {
        assert_eq!(
            Instrument::from_file_name("WASP_NIRSpec_flux.json"),
            Some(Instrument::NirSpec)
        );
        assert_eq!(
            Instrument::from_file_name("miri_spectra.parquet"),
            Some(Instrument::Miri)
        );
        assert_eq!(Instrument::from_file_name("spectra.fits"), None);
    }

    #[test]
    fn table_rejects_ragged_columns() {
        let err = SpectralTable::new(
            vec![1.0, 2.0],
            vec![1.0, 2.0],
            vec![1.0],
            vec![1.0, 2.0],
            vec![0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::ShapeMismatch(_)));
    }

    #[test]
    fn cube_checks_axes_against_grid() {
        let flux = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert!(FluxCube::new(flux.clone(), array![1.0, 2.0], array![0.0, 1.0, 2.0]).is_ok());
        assert!(FluxCube::new(flux, array![1.0, 2.0], array![0.0, 1.0]).is_err());
    }
}
