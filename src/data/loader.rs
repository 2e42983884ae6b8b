use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    LaunchDataset, LaunchRecord, Outcome, COL_BOOSTER_CATEGORY, COL_CLASS, COL_LAUNCH_SITE,
    COL_PAYLOAD_MASS,
};
use crate::error::DatasetError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the launch dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row; `Launch Site`, `Payload Mass (kg)`, `class`,
///   `Booster Version Category` columns (others ignored)
/// * `.json`    – `[{ "Launch Site": "...", "Payload Mass (kg)": 0.0, ... }, ...]`
/// * `.parquet` – same columns, as written by `df.to_parquet()`
pub fn load_file(path: &Path) -> Result<LaunchDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DatasetError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading dataset {}", path.display()))?;

    log::info!(
        "Loaded {} launch records from {} ({} sites)",
        dataset.len(),
        path.display(),
        dataset.sites().len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row validation shared by every format
// ---------------------------------------------------------------------------

/// Raw cell values of one row, before validation.
struct RawRow {
    launch_site: Option<String>,
    payload: Option<RawNumber>,
    class: Option<RawNumber>,
    booster: Option<String>,
}

/// A numeric cell as read from the file, kept as text for error messages.
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Int(i) => Some(*i as f64),
            RawNumber::Float(f) => Some(*f),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    fn describe(&self) -> String {
        match self {
            RawNumber::Int(i) => i.to_string(),
            RawNumber::Float(f) => f.to_string(),
            RawNumber::Text(s) => s.clone(),
        }
    }
}

fn validate_row(row: usize, raw: RawRow) -> Result<LaunchRecord, DatasetError> {
    let launch_site = raw
        .launch_site
        .filter(|s| !s.trim().is_empty())
        .ok_or(DatasetError::MissingValue {
            row,
            column: COL_LAUNCH_SITE,
        })?;

    let payload = raw.payload.ok_or(DatasetError::MissingValue {
        row,
        column: COL_PAYLOAD_MASS,
    })?;
    let payload_mass_kg = payload
        .as_f64()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| DatasetError::InvalidPayload {
            row,
            value: payload.describe(),
        })?;

    let class = raw.class.ok_or(DatasetError::MissingValue {
        row,
        column: COL_CLASS,
    })?;
    let outcome = class
        .as_f64()
        .filter(|c| c.fract() == 0.0)
        .and_then(|c| Outcome::from_class(c as i64))
        .ok_or_else(|| DatasetError::InvalidClass {
            row,
            value: class.describe(),
        })?;

    // A missing booster category is tolerated; it only affects colouring.
    let booster_version_category = raw.booster.unwrap_or_default();

    Ok(LaunchRecord::new(
        launch_site,
        payload_mass_kg,
        outcome,
        booster_version_category,
    ))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one launch per row.
fn load_csv(path: &Path) -> Result<LaunchDataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<LaunchDataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    };
    let site_idx = column(COL_LAUNCH_SITE)?;
    let payload_idx = column(COL_PAYLOAD_MASS)?;
    let class_idx = column(COL_CLASS)?;
    let booster_idx = column(COL_BOOSTER_CATEGORY)?;

    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let text = |idx: usize| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let raw = RawRow {
            launch_site: text(site_idx),
            payload: text(payload_idx).map(RawNumber::Text),
            class: text(class_idx).map(RawNumber::Text),
            booster: text(booster_idx),
        };
        records.push(validate_row(row_no, raw)?);
    }

    Ok(LaunchDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Launch Site": "CCAFS LC-40",
///     "Payload Mass (kg)": 525.0,
///     "class": 1,
///     "Booster Version Category": "v1.0"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<LaunchDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<LaunchDataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let raw = RawRow {
            launch_site: obj.get(COL_LAUNCH_SITE).and_then(json_to_text),
            payload: obj.get(COL_PAYLOAD_MASS).and_then(json_to_number),
            class: obj.get(COL_CLASS).and_then(json_to_number),
            booster: obj.get(COL_BOOSTER_CATEGORY).and_then(json_to_text),
        };
        records.push(validate_row(i, raw)?);
    }

    Ok(LaunchDataset::from_records(records))
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_to_number(val: &JsonValue) -> Option<RawNumber> {
    match val {
        JsonValue::Null => None,
        JsonValue::Number(n) => Some(match n.as_i64() {
            Some(i) => RawNumber::Int(i),
            None => RawNumber::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        JsonValue::Bool(b) => Some(RawNumber::Int(i64::from(*b))),
        other => Some(RawNumber::Text(json_to_text(other).unwrap_or_default())),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of launch records.
///
/// String columns may be Utf8 or LargeUtf8; numeric columns may be any of
/// Int32/Int64/Float32/Float64 (`class` may also be Boolean).
fn load_parquet(path: &Path) -> Result<LaunchDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &str| {
            schema
                .index_of(name)
                .map(|idx| batch.column(idx))
                .map_err(|_| DatasetError::MissingColumn(name.to_string()))
        };
        let site_col = column(COL_LAUNCH_SITE)?;
        let payload_col = column(COL_PAYLOAD_MASS)?;
        let class_col = column(COL_CLASS)?;
        let booster_col = column(COL_BOOSTER_CATEGORY)?;

        for row in 0..batch.num_rows() {
            let row_no = records.len();
            let raw = RawRow {
                launch_site: extract_text(site_col, row, row_no, COL_LAUNCH_SITE)?,
                payload: extract_number(payload_col, row, row_no, COL_PAYLOAD_MASS)?,
                class: extract_number(class_col, row, row_no, COL_CLASS)?,
                booster: extract_text(booster_col, row, row_no, COL_BOOSTER_CATEGORY)?,
            };
            records.push(validate_row(row_no, raw)?);
        }
    }

    Ok(LaunchDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn unsupported(col: &Arc<dyn Array>, row: usize, column: &'static str) -> DatasetError {
    DatasetError::UnsupportedType {
        row,
        column,
        data_type: format!("{:?}", col.data_type()),
    }
}

/// Extract a string cell from a Utf8 or LargeUtf8 column.
fn extract_text(
    col: &Arc<dyn Array>,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<Option<String>, DatasetError> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| unsupported(col, row_no, column))?;
            Ok(Some(arr.value(row).to_string()))
        }
        DataType::LargeUtf8 => Ok(Some(col.as_string::<i64>().value(row).to_string())),
        _ => Err(unsupported(col, row_no, column)),
    }
}

/// Extract a numeric cell from an integer, float, or boolean column.
fn extract_number(
    col: &Arc<dyn Array>,
    row: usize,
    row_no: usize,
    column: &'static str,
) -> Result<Option<RawNumber>, DatasetError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| RawNumber::Int(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| RawNumber::Int(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| RawNumber::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| RawNumber::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| RawNumber::Int(i64::from(a.value(row)))),
        _ => None,
    };
    value
        .map(Some)
        .ok_or_else(|| unsupported(col, row_no, column))
}
