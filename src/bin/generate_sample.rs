use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

const FEATURES: [&str; 8] = [
    "NDAI", "SD", "CORR", "angle_DF", "angle_CF", "angle_BF", "angle_AF", "angle_AN",
];

/// Write a synthetic labeled-pixel dataset for trying out the viewer.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output file: `.parquet` or `.csv`.
    #[arg(short, long, default_value = "sample_pixels.parquet")]
    output: PathBuf,

    /// Seed for every random draw.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of images.
    #[arg(long, default_value_t = 3)]
    images: i64,

    #[arg(long, default_value_t = 120)]
    width: i64,

    #[arg(long, default_value_t = 80)]
    height: i64,
}

#[derive(Debug, Serialize)]
struct PixelRow {
    source: i64,
    x: i64,
    y: i64,
    label: i64,
    #[serde(rename = "NDAI")]
    ndai: f64,
    #[serde(rename = "SD")]
    sd: f64,
    #[serde(rename = "CORR")]
    corr: f64,
    #[serde(rename = "angle_DF")]
    angle_df: f64,
    #[serde(rename = "angle_CF")]
    angle_cf: f64,
    #[serde(rename = "angle_BF")]
    angle_bf: f64,
    #[serde(rename = "angle_AF")]
    angle_af: f64,
    #[serde(rename = "angle_AN")]
    angle_an: f64,
}

impl PixelRow {
    fn features(&self) -> [f64; 8] {
        [
            self.ndai,
            self.sd,
            self.corr,
            self.angle_df,
            self.angle_cf,
            self.angle_bf,
            self.angle_af,
            self.angle_an,
        ]
    }
}

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Label from the distance to the nearest cloud centre, relative to its
/// radius: inside → cloudy, thin rim → unlabeled, outside → cloud-free.
fn label_at(x: f64, y: f64, clouds: &[(f64, f64, f64)]) -> i64 {
    let nearest = clouds
        .iter()
        .map(|&(cx, cy, r)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt() / r)
        .fold(f64::INFINITY, f64::min);
    if nearest < 1.0 {
        1
    } else if nearest < 1.3 {
        0
    } else {
        -1
    }
}

fn generate(args: &Args) -> Vec<PixelRow> {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut rows = Vec::new();

    for source in 1..=args.images {
        let n_clouds = rng.gen_range(2..6);
        let clouds: Vec<(f64, f64, f64)> = (0..n_clouds)
            .map(|_| {
                (
                    rng.gen_range(0.0..args.width as f64),
                    rng.gen_range(0.0..args.height as f64),
                    rng.gen_range(6.0..20.0),
                )
            })
            .collect();
        // Scenes differ slightly in brightness.
        let offset = gauss(&mut rng, 0.0, 8.0);

        for y in 0..args.height {
            for x in 0..args.width {
                let label = label_at(x as f64, y as f64, &clouds);
                let (ndai, sd, corr, radiance) = match label {
                    1 => (1.6, 8.0, 0.55, 230.0),
                    0 => (0.9, 4.0, 0.35, 250.0),
                    _ => (-0.4, 1.5, 0.15, 270.0),
                };
                let base = radiance + offset;
                rows.push(PixelRow {
                    source,
                    x,
                    y,
                    label,
                    ndai: gauss(&mut rng, ndai, 0.5),
                    sd: gauss(&mut rng, sd, sd * 0.4).abs(),
                    corr: gauss(&mut rng, corr, 0.1),
                    angle_df: gauss(&mut rng, base + 20.0, 25.0),
                    angle_cf: gauss(&mut rng, base + 5.0, 22.0),
                    angle_bf: gauss(&mut rng, base - 5.0, 20.0),
                    angle_af: gauss(&mut rng, base - 10.0, 18.0),
                    angle_an: gauss(&mut rng, base - 15.0, 17.0),
                });
            }
        }
    }
    rows
}

fn write_parquet(rows: &[PixelRow], path: &Path) -> Result<()> {
    let int_col = |f: fn(&PixelRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields = vec![
        Field::new("source", DataType::Int64, false),
        Field::new("x", DataType::Int64, false),
        Field::new("y", DataType::Int64, false),
        Field::new("label", DataType::Int64, false),
    ];
    let mut columns = vec![
        int_col(|r| r.source),
        int_col(|r| r.x),
        int_col(|r| r.y),
        int_col(|r| r.label),
    ];
    for (i, name) in FEATURES.iter().enumerate() {
        fields.push(Field::new(*name, DataType::Float64, false));
        let values: Vec<f64> = rows.iter().map(|r| r.features()[i]).collect();
        columns.push(Arc::new(Float64Array::from(values)) as ArrayRef);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn write_csv(rows: &[PixelRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating output file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = generate(&args);

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "parquet" | "pq" => write_parquet(&rows, &args.output)?,
        "csv" => write_csv(&rows, &args.output)?,
        other => bail!("Unsupported output extension: .{other}"),
    }

    log::info!(
        "seed {}: {} images, {}×{} pixels each",
        args.seed,
        args.images,
        args.width,
        args.height
    );
    println!("Wrote {} pixels to {}", rows.len(), args.output.display());
    Ok(())
}
