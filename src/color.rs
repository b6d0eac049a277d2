use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Continuous colour scale for heat maps
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale over `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<(f32, Srgb)>,
}

impl ColorScale {
    /// Dark blue for low values, cyan in the middle, yellow for high values.
    pub fn lightcurve_map() -> Self {
        Self {
            stops: vec![
                (0.0, Srgb::new(0u8, 0, 100).into_format()),
                (0.5, Srgb::new(0u8, 255, 255).into_format()),
                (1.0, Srgb::new(255u8, 255, 0).into_format()),
            ],
        }
    }

    /// Colour of a position in `[0, 1]` (clamped).
    pub fn at(&self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        for pair in self.stops.windows(2) {
            let (t0, c0) = pair[0];
            let (t1, c1) = pair[1];
            if t <= t1 {
                let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
                return to_color32(c0.mix(c1, f));
            }
        }
        self.stops
            .last()
            .map(|&(_, c)| to_color32(c))
            .unwrap_or(Color32::GRAY)
    }

    /// Colour of `value` within `[lo, hi]`; NaN and infinities are transparent.
    pub fn color_for(&self, value: f64, lo: f64, hi: f64) -> Color32 {
        if !value.is_finite() {
            return Color32::TRANSPARENT;
        }
        let span = hi - lo;
        let t = if span > 0.0 { (value - lo) / span } else { 0.5 };
        self.at(t as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_ends_and_middle() {
        let scale = ColorScale::lightcurve_map();
        assert_eq!(scale.at(0.0), Color32::from_rgb(0, 0, 100));
        assert_eq!(scale.at(0.5), Color32::from_rgb(0, 255, 255));
        assert_eq!(scale.at(1.0), Color32::from_rgb(255, 255, 0));
        assert_eq!(scale.at(7.0), Color32::from_rgb(255, 255, 0));
    }

    #[test]
    fn nan_is_transparent() {
        let scale = ColorScale::lightcurve_map();
        assert_eq!(scale.color_for(f64::NAN, 0.0, 1.0), Color32::TRANSPARENT);
    }

    #[test]
    fn palette_has_requested_size() {
        assert_eq!(generate_palette(2).len(), 2);
        assert!(generate_palette(0).is_empty());
    }
}
