use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Band – an inclusive wavelength range
// ---------------------------------------------------------------------------

/// Named wavelength range in µm, inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn new(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
        }
    }

    /// Methane absorption band, 2.14–2.5 µm.
    pub fn ch4() -> Self {
        Self::new("CH4", 2.14, 2.5)
    }

    /// Carbon monoxide absorption band, 4.5–5.05 µm.
    pub fn co() -> Self {
        Self::new("CO", 4.5, 5.05)
    }

    pub fn contains(&self, wavelength: f64) -> bool {
        wavelength >= self.min && wavelength <= self.max
    }

    /// Row indices of `wavelengths` inside the band.
    pub fn indices(&self, wavelengths: ArrayView1<f64>) -> Vec<usize> {
        wavelengths
            .iter()
            .enumerate()
            .filter(|&(_, &wl)| self.contains(wl))
            .map(|(i, _)| i)
            .collect()
    }

    /// Boolean mask over a wavelength grid.
    pub fn mask(&self, wavelength_grid: ArrayView2<f64>) -> BandMask {
        BandMask {
            band: self.clone(),
            mask: wavelength_grid.mapv(|wl| self.contains(wl)),
        }
    }
}

/// Where a band lies on a `[wavelength, time]` grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandMask {
    pub band: Band,
    pub mask: Array2<bool>,
}

impl BandMask {
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }
}
