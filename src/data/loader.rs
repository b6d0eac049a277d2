use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array, LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use ndarray::{Array1, Array2};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{FluxCube, Instrument, Observation, SpectralTable};

/// Column names of a MIRI spectral table.
pub const MIRI_COLUMNS: [&str; 5] = ["wla", "wlb", "fluxa", "fluxb", "MJD"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an observation from a file.
///
/// The instrument comes from the file name (`nirspec` or `miri`), the
/// format from the extension:
/// * `.parquet` – MIRI flat table, or NIRSpec one row per wavelength
/// * `.json`    – MIRI column object, or NIRSpec `{flux, mjd, wavelength}`
/// * `.csv`     – MIRI flat table only
pub fn load_file(path: &Path) -> Result<Observation> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("file name is not valid UTF-8")?;
    let Some(instrument) = Instrument::from_file_name(file_name) else {
        bail!("Unsupported file type: {file_name} (name must contain 'nirspec' or 'miri')");
    };

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let observation = match (instrument, ext.as_str()) {
        (Instrument::Miri, "parquet" | "pq") => Observation::Miri(load_miri_parquet(path)?),
        (Instrument::Miri, "json") => Observation::Miri(load_miri_json(path)?),
        (Instrument::Miri, "csv") => Observation::Miri(load_miri_csv(path)?),
        (Instrument::NirSpec, "parquet" | "pq") => {
            Observation::NirSpec(load_nirspec_parquet(path)?)
        }
        (Instrument::NirSpec, "json") => Observation::NirSpec(load_nirspec_json(path)?),
        (instrument, other) => bail!("Unsupported file extension for {instrument}: .{other}"),
    };

    log::info!("Loaded {file_name}: {}", observation.summary());
    Ok(observation)
}

/// JSON `null` stands for a missing sample.
fn nan_filled(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

// ---------------------------------------------------------------------------
// JSON loaders
// ---------------------------------------------------------------------------

/// MIRI JSON schema (column-oriented, as written by `json.dump(df.to_dict(orient='list'))`):
///
/// ```json
/// { "wla": [...], "wlb": [...], "fluxa": [...], "fluxb": [...], "MJD": [...] }
/// ```
#[derive(Debug, Deserialize)]
struct MiriColumns {
    wla: Vec<Option<f64>>,
    wlb: Vec<Option<f64>>,
    fluxa: Vec<Option<f64>>,
    fluxb: Vec<Option<f64>>,
    #[serde(rename = "MJD")]
    mjd: Vec<Option<f64>>,
}

fn load_miri_json(path: &Path) -> Result<SpectralTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let cols: MiriColumns = serde_json::from_str(&text).context("parsing MIRI JSON")?;
    let table = SpectralTable::new(
        nan_filled(cols.wla),
        nan_filled(cols.wlb),
        nan_filled(cols.fluxa),
        nan_filled(cols.fluxb),
        nan_filled(cols.mjd),
    )?;
    Ok(table)
}

/// NIRSpec JSON schema: flux rows are wavelengths, columns are times.
///
/// ```json
/// { "flux": [[0.91, 0.93, ...], ...], "mjd": [59800.1, ...], "wavelength": [0.6, ...] }
/// ```
#[derive(Debug, Deserialize)]
struct NirSpecJson {
    flux: Vec<Vec<Option<f64>>>,
    mjd: Vec<Option<f64>>,
    wavelength: Vec<Option<f64>>,
}

fn load_nirspec_json(path: &Path) -> Result<FluxCube> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: NirSpecJson = serde_json::from_str(&text).context("parsing NIRSpec JSON")?;

    let times = nan_filled(root.mjd);
    let wavelengths = nan_filled(root.wavelength);
    let rows: Vec<Vec<f64>> = root.flux.into_iter().map(nan_filled).collect();
    cube_from_rows(rows, wavelengths, times)
}

/// Stack per-wavelength flux rows into a cube, checking every row spans the time axis.
fn cube_from_rows(rows: Vec<Vec<f64>>, wavelengths: Vec<f64>, times: Vec<f64>) -> Result<FluxCube> {
    let n_rows = rows.len();
    let n_times = times.len();
    let mut flat = Vec::with_capacity(n_rows * n_times);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != n_times {
            bail!("flux row {i} has {} values but there are {n_times} times", row.len());
        }
        flat.extend(row);
    }
    let flux = Array2::from_shape_vec((n_rows, n_times), flat).context("building flux grid")?;
    let cube = FluxCube::new(flux, Array1::from_vec(wavelengths), Array1::from_vec(times))?;
    Ok(cube)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// One MIRI table row. Empty cells become NaN.
#[derive(Debug, Deserialize)]
struct MiriRecord {
    wla: Option<f64>,
    wlb: Option<f64>,
    fluxa: Option<f64>,
    fluxb: Option<f64>,
    #[serde(rename = "MJD")]
    mjd: Option<f64>,
}

/// CSV layout: header row with the five MIRI column names, one sample per row.
fn load_miri_csv(path: &Path) -> Result<SpectralTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    let mut wla = Vec::new();
    let mut wlb = Vec::new();
    let mut fluxa = Vec::new();
    let mut fluxb = Vec::new();
    let mut mjd = Vec::new();

    for (row_no, result) in reader.deserialize::<MiriRecord>().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        wla.push(record.wla.unwrap_or(f64::NAN));
        wlb.push(record.wlb.unwrap_or(f64::NAN));
        fluxa.push(record.fluxa.unwrap_or(f64::NAN));
        fluxb.push(record.fluxb.unwrap_or(f64::NAN));
        mjd.push(record.mjd.unwrap_or(f64::NAN));
    }

    Ok(SpectralTable::new(wla, wlb, fluxa, fluxb, mjd)?)
}

// ---------------------------------------------------------------------------
// Parquet loaders
// ---------------------------------------------------------------------------

/// Load a flat MIRI table: numeric columns `wla`, `wlb`, `fluxa`, `fluxb`,
/// `MJD`. Record batches are concatenated in file order.
fn load_miri_parquet(path: &Path) -> Result<SpectralTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: [Vec<f64>; 5] = Default::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for (name, values) in MIRI_COLUMNS.iter().zip(columns.iter_mut()) {
            let col = column_by_name(&batch, name)?;
            values.extend(
                extract_f64_column(col).with_context(|| format!("reading column '{name}'"))?,
            );
        }
    }

    let [wla, wlb, fluxa, fluxb, mjd] = columns;
    Ok(SpectralTable::new(wla, wlb, fluxa, fluxb, mjd)?)
}

/// Load a NIRSpec cube stored one row per wavelength.
///
/// Expected schema:
/// - `wavelength`: Float64 – the row's wavelength (µm)
/// - `flux`: List<Float64> – flux over time for that wavelength
/// - `mjd`: List<Float64> – the time axis, read from the first row
fn load_nirspec_parquet(path: &Path) -> Result<FluxCube> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut wavelengths = Vec::new();
    let mut rows = Vec::new();
    let mut times: Option<Vec<f64>> = None;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let wl_col = column_by_name(&batch, "wavelength")?;
        let flux_col = column_by_name(&batch, "flux")?;
        let mjd_col = column_by_name(&batch, "mjd")?;

        wavelengths.extend(extract_f64_column(wl_col).context("reading 'wavelength'")?);
        for row in 0..batch.num_rows() {
            if times.is_none() {
                times = Some(
                    extract_f64_list(mjd_col, row)
                        .with_context(|| format!("Row {row}: failed to read 'mjd'"))?,
                );
            }
            rows.push(
                extract_f64_list(flux_col, row)
                    .with_context(|| format!("Row {row}: failed to read 'flux'"))?,
            );
        }
    }

    cube_from_rows(rows, wavelengths, times.unwrap_or_default())
}

// -- Parquet / Arrow helpers --

fn column_by_name<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
    Ok(batch.column(idx))
}

/// Read a primitive numeric column as `f64`, nulls as NaN.
fn extract_f64_column(col: &ArrayRef) -> Result<Vec<f64>> {
    let any = col.as_any();
    let values: Vec<f64> = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, |i| i as f64))
            .collect(),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map_or(f64::NAN, f64::from))
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &ArrayRef, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    extract_f64_column(&values_array)
}
