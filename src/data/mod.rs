/// Data layer: instrument types and file loading.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  instrument from file name, format from extension
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ Observation  │  NIRSpec FluxCube  |  MIRI SpectralTable
///   └─────────────┘
/// ```

pub mod loader;
pub mod model;
