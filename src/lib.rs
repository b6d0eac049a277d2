//! Light-curve maps for time-series spectra from the NIRSpec and MIRI instruments.
//!
//! ```text
//!   file ──► data::loader ──► Observation
//!                                  │
//!                                  ▼
//!                      pipeline::prepare_cube ──► FluxCube
//!                                  │
//!                    ┌─────────────┼──────────────┐
//!                    ▼             ▼              ▼
//!            variability map    flux map    band light curves
//! ```

pub mod config;
pub mod data;
pub mod pipeline;
pub mod render;
