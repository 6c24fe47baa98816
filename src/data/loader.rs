use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Feature, Label, Observation, PixelDataset, SourceId, required_columns};
use crate::error::AnalysisError;

/// Number of whitespace-separated columns in a raw MISR image file.
const RAW_COLUMNS: usize = 11;

// ---------------------------------------------------------------------------
// DataSource – where the dataset comes from
// ---------------------------------------------------------------------------

/// Supplies the pixel dataset to the analysis.
pub trait DataSource {
    fn load(&self) -> Result<PixelDataset>;
}

/// A set of files on disk, concatenated in the given order.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub paths: Vec<PathBuf>,
}

impl FileSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl DataSource for FileSource {
    fn load(&self) -> Result<PixelDataset> {
        load_paths(&self.paths)
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and concatenate several files.
pub fn load_paths(paths: &[PathBuf]) -> Result<PixelDataset> {
    let mut dataset = PixelDataset::default();
    for path in paths {
        let part = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        log::info!(
            "{}: {} pixels from {} image(s)",
            path.display(),
            part.len(),
            part.source_count()
        );
        dataset.extend(part);
    }
    Ok(dataset)
}

/// Load a pixel dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.txt` / `.dat` – raw MISR image file, 11 whitespace-separated columns
///   `y x label NDAI SD CORR DF CF BF AF AN`, source taken from the file name
/// * `.parquet`      – flat columns named as in [`required_columns`]
/// * `.json`         – `[{ "source": 1, "x": 12, "y": 4, "label": -1, ... }, ...]`
/// * `.csv`          – header row with the same column names
pub fn load_file(path: &Path) -> Result<PixelDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "txt" | "dat" => load_raw_image(path),
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Locate every required column in `names`, or report all that are missing.
fn resolve_columns<S: AsRef<str>>(names: &[S]) -> Result<Vec<usize>, AnalysisError> {
    let mut indices = Vec::new();
    let mut missing = Vec::new();
    for col in required_columns() {
        match names.iter().position(|n| n.as_ref() == col) {
            Some(i) => indices.push(i),
            None => missing.push(col.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(AnalysisError::MissingColumns { columns: missing })
    }
}

/// Accepts `12` as well as `12.0`, which is how pandas writes integer
/// columns that went through a float dtype.
fn to_integer(v: f64, row: usize, col: &str) -> Result<i64> {
    if !v.is_finite() || v.fract() != 0.0 {
        bail!("Row {row}, {col}: '{v}' is not an integer");
    }
    Ok(v as i64)
}

fn parse_number(s: &str, row: usize, col: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{s}' is not a number"))
}

/// Build an observation from the 12 canonical column values.
fn build_observation(
    row: usize,
    source: SourceId,
    x: f64,
    y: f64,
    label: f64,
    features: [f64; 8],
) -> Result<Observation> {
    let x = to_integer(x, row, "x")?;
    let y = to_integer(y, row, "y")?;
    let label = Label::decode(to_integer(label, row, "label")?, row)?;
    Ok(Observation {
        source,
        x,
        y,
        label,
        features,
    })
}

// ---------------------------------------------------------------------------
// Raw MISR image loader
// ---------------------------------------------------------------------------

/// Source id from a file name: the last run of digits, so `image2.txt`
/// gives `2` and `image_2020_3.txt` gives `3`. Otherwise the whole stem.
fn source_from_path(path: &Path) -> SourceId {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match stem
        .rsplit(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
    {
        Some(digits) => SourceId::parse(digits),
        None => SourceId::Text(stem.to_string()),
    }
}

fn load_raw_image(path: &Path) -> Result<PixelDataset> {
    let text = std::fs::read_to_string(path).context("reading image file")?;
    let source = source_from_path(path);

    let mut observations = Vec::new();
    for (row, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let values: Vec<f64> = line
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| parse_number(tok, row, &format!("column {j}")))
            .collect::<Result<_>>()?;
        if values.len() != RAW_COLUMNS {
            bail!(
                "Row {row}: expected {RAW_COLUMNS} columns, found {}",
                values.len()
            );
        }

        let mut features = [0.0; 8];
        features.copy_from_slice(&values[3..]);
        observations.push(build_observation(
            row,
            source.clone(),
            values[1],
            values[0],
            values[2],
            features,
        )?);
    }

    Ok(PixelDataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "source": 1, "x": 65, "y": 2, "label": -1,
///     "NDAI": 0.18, "SD": 1.2, "CORR": 0.14, "angle_DF": 263.8, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<PixelDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    if text.trim().is_empty() {
        return Ok(PixelDataset::default());
    }
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut observations = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        resolve_columns(&keys).with_context(|| format!("Row {i}"))?;

        let number = |col: &str| -> Result<f64> {
            obj.get(col)
                .and_then(|v| v.as_f64())
                .with_context(|| format!("Row {i}, {col}: not a number"))
        };

        let source = match &obj["source"] {
            JsonValue::String(s) => SourceId::parse(s),
            JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(v), _) => SourceId::Integer(v),
                (None, Some(v)) => SourceId::Integer(to_integer(v, i, "source")?),
                (None, None) => bail!("Row {i}, source: unsupported value {n}"),
            },
            other => bail!("Row {i}, source: unsupported value {other}"),
        };

        let mut features = [0.0; 8];
        for f in Feature::ALL {
            features[f.index()] = number(f.column())?;
        }

        observations.push(build_observation(
            i,
            source,
            number("x")?,
            number("y")?,
            number("label")?,
            features,
        )?);
    }

    Ok(PixelDataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with (at least) the columns of
/// [`required_columns`]; extra columns are ignored.
fn load_csv(path: &Path) -> Result<PixelDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    // Zero-byte file: no header, nothing to check.
    if headers.is_empty() {
        return Ok(PixelDataset::default());
    }

    // Index order follows `required_columns`: source, x, y, label, features…
    let idx = resolve_columns(&headers)?;

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let field = |k: usize| record.get(idx[k]).unwrap_or("");

        let mut features = [0.0; 8];
        for f in Feature::ALL {
            features[f.index()] = parse_number(field(4 + f.index()), row_no, f.column())?;
        }

        observations.push(build_observation(
            row_no,
            SourceId::parse(field(0)),
            parse_number(field(1), row_no, "x")?,
            parse_number(field(2), row_no, "y")?,
            parse_number(field(3), row_no, "label")?,
            features,
        )?);
    }

    Ok(PixelDataset::from_observations(observations))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Numeric columns may be any integer or float type; `source` may be a
/// string or an integer column.  Works with files written by both
/// **Pandas** (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<PixelDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // Checked against the file schema so files without row groups are covered too.
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let idx = resolve_columns(&names)?;

    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        read_batch(&batch, &idx, &names, observations.len(), &mut observations)?;
    }

    Ok(PixelDataset::from_observations(observations))
}

fn read_batch(
    batch: &RecordBatch,
    idx: &[usize],
    names: &[String],
    first_row: usize,
    out: &mut Vec<Observation>,
) -> Result<()> {
    let sources = source_column(batch.column(idx[0]), first_row)?;
    let numeric: Vec<Vec<f64>> = idx[1..]
        .iter()
        .map(|&i| f64_column(batch.column(i)).with_context(|| format!("column '{}'", names[i])))
        .collect::<Result<_>>()?;

    for (row, source) in sources.into_iter().enumerate() {
        let mut features = [0.0; 8];
        for f in Feature::ALL {
            features[f.index()] = numeric[3 + f.index()][row];
        }
        out.push(build_observation(
            first_row + row,
            source,
            numeric[0][row],
            numeric[1][row],
            numeric[2][row],
            features,
        )?);
    }
    Ok(())
}

// -- Parquet / Arrow helpers --

/// Cast any numeric column to `f64`, rejecting nulls.
fn f64_column(col: &ArrayRef) -> Result<Vec<f64>> {
    if col.null_count() > 0 {
        bail!("column contains {} null value(s)", col.null_count());
    }
    let casted = cast(col, &DataType::Float64)
        .with_context(|| format!("cannot read {:?} as Float64", col.data_type()))?;
    let arr = casted
        .as_any()
        .downcast_ref::<Float64Array>()
        .context("expected Float64Array")?;
    Ok(arr.values().to_vec())
}

/// Integer, float or string `source`. Float ids must be whole numbers.
fn source_column(col: &ArrayRef, first_row: usize) -> Result<Vec<SourceId>> {
    if col.null_count() > 0 {
        bail!("'source' column contains null values");
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let casted = cast(col, &DataType::Utf8).context("casting 'source' to Utf8")?;
            let arr = casted
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.iter().map(|s| SourceId::parse(s.unwrap_or(""))).collect())
        }
        DataType::Float16 | DataType::Float32 | DataType::Float64 => f64_column(col)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| -> Result<SourceId> {
                Ok(SourceId::Integer(to_integer(v, first_row + row, "source")?))
            })
            .collect(),
        _ => {
            let casted = cast(col, &DataType::Int64)
                .with_context(|| format!("cannot read 'source' of type {:?}", col.data_type()))?;
            let arr = casted
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            Ok(arr.values().iter().map(|&v| SourceId::Integer(v)).collect())
        }
    }
}
