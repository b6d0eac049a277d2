use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::MiriChannel;
use crate::pipeline::band::Band;
use crate::pipeline::PipelineError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_BIN_SIZE: usize = 25;
pub const DEFAULT_MAX_FRAMES: usize = 30;
/// Leading wavelength rows discarded from every map (detector edge artifacts).
pub const DEFAULT_LEADING_TRIM: usize = 60;

/// What to do when a band selects no wavelength rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyBandPolicy {
    /// Keep going with an all-NaN light curve.
    #[default]
    Nan,
    /// Fail with [`PipelineError::EmptyBand`].
    Error,
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Settings for one visualization request.
///
/// Every field has a default so a partial JSON file is enough:
///
/// ```json
/// { "bin_size": 10, "co": { "name": "CO", "min": 4.6, "max": 5.0 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of time samples averaged into one bin.
    pub bin_size: usize,
    /// Animation density; only the renderer reads it.
    pub max_frames: usize,
    pub leading_trim: usize,
    pub ch4: Band,
    pub co: Band,
    /// Which MIRI channel is visualized.
    pub miri_channel: MiriChannel,
    pub empty_band: EmptyBandPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bin_size: DEFAULT_BIN_SIZE,
            max_frames: DEFAULT_MAX_FRAMES,
            leading_trim: DEFAULT_LEADING_TRIM,
            ch4: Band::ch4(),
            co: Band::co(),
            miri_channel: MiriChannel::A,
            empty_band: EmptyBandPolicy::Nan,
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text).context("parsing config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Load `$ASTROSPEC_CONFIG`, else `./config.json`, else the defaults.
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os("ASTROSPEC_CONFIG") {
            return Self::load(Path::new(&path));
        }
        let local = Path::new("config.json");
        if local.exists() {
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.bin_size == 0 {
            return Err(PipelineError::InvalidParameter(
                "bin_size must be a positive integer".into(),
            ));
        }
        for band in [&self.ch4, &self.co] {
            if band.min.is_nan() || band.max.is_nan() || band.min > band.max {
                return Err(PipelineError::InvalidParameter(format!(
                    "band {} has min {} above max {}",
                    band.name, band.min, band.max
                )));
            }
        }
        Ok(())
    }

    /// The bands every map and light curve is computed for, in display order.
    pub fn bands(&self) -> [&Band; 2] {
        [&self.ch4, &self.co]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{ "bin_size": 5 }"#).unwrap();
        assert_eq!(config.bin_size, 5);
        assert_eq!(config.max_frames, DEFAULT_MAX_FRAMES);
        assert_eq!(config.leading_trim, DEFAULT_LEADING_TRIM);
        assert_eq!(config.ch4, Band::ch4());
        assert_eq!(config.empty_band, EmptyBandPolicy::Nan);
    }

    #[test]
    fn policy_and_channel_parse_lowercase() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "empty_band": "error", "miri_channel": "b" }"#).unwrap();
        assert_eq!(config.empty_band, EmptyBandPolicy::Error);
        assert_eq!(config.miri_channel, MiriChannel::B);
    }

    #[test]
    fn zero_bin_size_is_rejected() {
        let config = PipelineConfig {
            bin_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn inverted_band_is_rejected() {
        let mut config = PipelineConfig::default();
        config.co = Band::new("CO", 5.05, 4.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!("astrospec-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "bin_size": 3, "max_frames": 12 }"#).unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.bin_size, 3);
        assert_eq!(config.max_frames, 12);
    }
}
