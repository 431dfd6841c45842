use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use clap::Parser;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Write a synthetic maritime incident table.
#[derive(Debug, Parser)]
struct Args {
    /// Output file; `.csv` or `.parquet`
    #[arg(default_value = "maritime_incidents_realistic.csv")]
    output: PathBuf,

    /// Number of rows
    #[arg(long, default_value_t = 1000)]
    rows: usize,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Country, rough sea-area centre (lat, lon).
const COUNTRIES: &[(&str, f64, f64)] = &[
    ("Indonesia", -2.0, 118.0),
    ("Philippines", 12.0, 123.0),
    ("Nigeria", 4.0, 5.0),
    ("Somalia", 6.0, 50.0),
    ("Greece", 37.5, 24.5),
    ("United Kingdom", 51.0, 1.5),
    ("United States", 29.0, -90.0),
    ("Brazil", -23.5, -43.0),
    ("India", 18.5, 71.5),
    ("China", 30.5, 123.0),
];

const VESSEL_TYPES: &[&str] = &["Tanker", "Cargo", "Fishing", "Passenger", "Container", "Bulk Carrier"];

const INCIDENT_TYPES: &[&str] = &["Collision", "Grounding", "Fire", "Piracy", "Sinking", "Oil Spill"];

#[derive(Debug, Serialize)]
struct SampleRow {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Latitude")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    longitude: Option<f64>,
    #[serde(rename = "Country")]
    country: &'static str,
    #[serde(rename = "Vessel_Type")]
    vessel_type: &'static str,
    #[serde(rename = "Incident_Type")]
    incident_type: &'static str,
    #[serde(rename = "Casualties")]
    casualties: Option<i64>,
    #[serde(rename = "Cargo_Loss")]
    cargo_loss: &'static str,
}

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

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n.max(1)
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn generate(rows: usize, seed: u64) -> Vec<SampleRow> {
    let mut rng = SimpleRng::new(seed);
    let first_day = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or_default();

    (0..rows)
        .map(|i| {
            let (country, lat, lon) = rng.pick(COUNTRIES);
            let incident_type = rng.pick(INCIDENT_TYPES);

            // Heavy-tailed: most incidents are minor, a few are disasters.
            let casualties = rng.gauss(1.0, 1.4).exp().floor().min(400.0) as i64;
            let date = first_day
                .checked_add_days(Days::new(rng.below(7 * 365) as u64))
                .map(|d| d.format("%Y-%m-%d").to_string());

            let mut row = SampleRow {
                date,
                latitude: Some(lat + rng.gauss(0.0, 2.5)),
                longitude: Some(lon + rng.gauss(0.0, 2.5)),
                country,
                vessel_type: rng.pick(VESSEL_TYPES),
                incident_type,
                casualties: Some(casualties),
                cargo_loss: if rng.next_f64() < 0.35 { "Yes" } else { "No" },
            };

            // A sprinkling of the problems real exports have.
            if i % 97 == 13 {
                row.date = Some("unknown".to_string());
            }
            if i % 53 == 7 {
                row.casualties = None;
            }
            if i % 71 == 5 {
                row.latitude = None;
                row.longitude = None;
            }
            row
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SampleRow]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Date", DataType::Utf8, true),
        Field::new("Latitude", DataType::Float64, true),
        Field::new("Longitude", DataType::Float64, true),
        Field::new("Country", DataType::Utf8, false),
        Field::new("Vessel_Type", DataType::Utf8, false),
        Field::new("Incident_Type", DataType::Utf8, false),
        Field::new("Casualties", DataType::Int64, true),
        Field::new("Cargo_Loss", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter(rows.iter().map(|r| r.date.as_deref()))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.latitude))),
        Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.longitude))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.country))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.vessel_type))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.incident_type))),
        Arc::new(Int64Array::from_iter(rows.iter().map(|r| r.casualties))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.cargo_loss))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = generate(args.rows, args.seed);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => write_csv(&args.output, &rows)?,
        "parquet" | "pq" => write_parquet(&args.output, &rows)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    println!("Wrote {} incidents to {}", rows.len(), args.output.display());
    Ok(())
}
