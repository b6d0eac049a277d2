use std::f64::consts::PI;
use std::sync::Arc;

use arrow::array::{Float64Array, Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Rotation period of the synthetic brown dwarf, in days.
const PERIOD_DAYS: f64 = 0.3;
const MJD_START: f64 = 60_000.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std_dev * z
    }
}

/// Flux of a rotating object: blackbody-ish continuum with band-dependent
/// modulation that is stronger and phase-shifted inside CH4 and CO.
fn flux(wavelength: f64, mjd: f64, rng: &mut SimpleRng) -> f64 {
    let continuum = 1.0 / (wavelength.powi(2) * ((1.4 / wavelength).exp() - 0.9));
    let (amplitude, phase) = if (2.14..=2.5).contains(&wavelength) {
        (0.04, 0.8)
    } else if (4.5..=5.05).contains(&wavelength) {
        (0.025, 2.1)
    } else {
        (0.01, 0.0)
    };
    let modulation = 1.0 + amplitude * (2.0 * PI * (mjd - MJD_START) / PERIOD_DAYS + phase).sin();
    continuum * modulation * (1.0 + rng.gauss(0.0, 0.002))
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
        .collect()
}

#[derive(Serialize)]
struct NirSpecJson {
    flux: Vec<Vec<f64>>,
    mjd: Vec<f64>,
    wavelength: Vec<f64>,
}

fn write_nirspec(rng: &mut SimpleRng) {
    let wavelengths = linspace(0.6, 5.3, 420);
    let mjd = linspace(MJD_START, MJD_START + 0.6, 500);

    let flux: Vec<Vec<f64>> = wavelengths
        .iter()
        .map(|&wl| mjd.iter().map(|&t| flux(wl, t, rng)).collect())
        .collect();

    let output_path = "sample_nirspec.json";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    serde_json::to_writer(
        std::io::BufWriter::new(file),
        &NirSpecJson {
            flux,
            mjd,
            wavelength: wavelengths.clone(),
        },
    )
    .expect("Failed to write JSON");

    println!(
        "Wrote NIRSpec cube ({} wavelengths x 500 times) to {output_path}",
        wavelengths.len()
    );
}

fn write_miri(rng: &mut SimpleRng) {
    let wavelengths_a = linspace(4.4, 7.5, 160);
    let wavelengths_b = linspace(7.5, 14.0, 160);
    let mjd = linspace(MJD_START, MJD_START + 0.6, 150);

    // Wavelength-major: every time of the first wavelength, then the next.
    let rows = wavelengths_a.len() * mjd.len();
    let mut wla = Vec::with_capacity(rows);
    let mut wlb = Vec::with_capacity(rows);
    let mut fluxa = Vec::with_capacity(rows);
    let mut fluxb = Vec::with_capacity(rows);
    let mut times = Vec::with_capacity(rows);
    for (&wa, &wb) in wavelengths_a.iter().zip(wavelengths_b.iter()) {
        for &t in &mjd {
            wla.push(wa);
            wlb.push(wb);
            fluxa.push(flux(wa, t, rng));
            fluxb.push(flux(wb, t, rng));
            times.push(t);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("wla", DataType::Float64, false),
        Field::new("wlb", DataType::Float64, false),
        Field::new("fluxa", DataType::Float64, true),
        Field::new("fluxb", DataType::Float64, true),
        Field::new("MJD", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wla)),
            Arc::new(Float64Array::from(wlb)),
            Arc::new(Float64Array::from(fluxa)),
            Arc::new(Float64Array::from(fluxb)),
            Arc::new(Float64Array::from(times)),
        ],
    )
    .expect("Failed to create RecordBatch");

    let output_path = "sample_miri.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!("Wrote MIRI table ({rows} rows) to {output_path}");
}

/// The NIRSpec cube again, as parquet with one row per wavelength.
fn write_nirspec_parquet(rng: &mut SimpleRng) {
    let wavelengths = linspace(0.6, 5.3, 420);
    let mjd = linspace(MJD_START, MJD_START + 0.6, 200);

    let mut flux_builder = ListBuilder::new(Float64Builder::new());
    let mut mjd_builder = ListBuilder::new(Float64Builder::new());
    for &wl in &wavelengths {
        for &t in &mjd {
            flux_builder.values().append_value(flux(wl, t, rng));
            mjd_builder.values().append_value(t);
        }
        flux_builder.append(true);
        mjd_builder.append(true);
    }

    let list_type = DataType::List(Arc::new(Field::new("item", DataType::Float64, true)));
    let schema = Arc::new(Schema::new(vec![
        Field::new("wavelength", DataType::Float64, false),
        Field::new("flux", list_type.clone(), false),
        Field::new("mjd", list_type, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from(wavelengths.clone())),
            Arc::new(flux_builder.finish()),
            Arc::new(mjd_builder.finish()),
        ],
    )
    .expect("Failed to create RecordBatch");

    let output_path = "sample_nirspec.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote NIRSpec cube ({} wavelengths x {} times) to {output_path}",
        wavelengths.len(),
        mjd.len()
    );
}

fn main() {
    let mut rng = SimpleRng::new(42);
    write_nirspec(&mut rng);
    write_nirspec_parquet(&mut rng);
    write_miri(&mut rng);
}
