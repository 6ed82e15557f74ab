use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, ProteinRow, ProteinTable};
use crate::error::HeatmapError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a score table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`           – header row, comma separated
/// * `.tsv` / `.txt`  – header row, tab separated
/// * `.parquet`       – flat schema of string / numeric / bool columns
/// * `.json`          – `[{ "PreyGene": "VCP", "SE_UB_WT_BR_SaintScore": 0.9, ... }, ...]`
pub fn load_file(path: &Path) -> Result<ProteinTable> {
    load_table(path, &[])
}

/// Like [`load_file`], but cells of `text_columns` in delimited files keep
/// their raw spelling instead of being typed (`007` stays `007`).
pub fn load_table(path: &Path, text_columns: &[&str]) -> Result<ProteinTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_delimited(path, b',', text_columns)?,
        "tsv" | "txt" => load_delimited(path, b'\t', text_columns)?,
        "parquet" | "pq" => load_parquet(path)?,
        "json" => load_json(path)?,
        other => return Err(HeatmapError::UnsupportedFormat(other.to_string()).into()),
    };

    log::info!(
        "Loaded {} rows × {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

/// Header row with column names; cells outside `text_columns` are typed by
/// inference.
fn load_delimited(path: &Path, delimiter: u8, text_columns: &[&str]) -> Result<ProteinTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("row {row_no}"))?;
        let cells = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| {
                let cell = if text_columns.contains(&col.as_str()) {
                    text_cell(value)
                } else {
                    guess_cell_type(value)
                };
                (col.clone(), cell)
            })
            .collect();
        rows.push(ProteinRow { cells });
    }

    Ok(ProteinTable::new(headers, rows))
}

fn is_na(s: &str) -> bool {
    s.is_empty() || matches!(s, "NA" | "NaN" | "nan" | "N/A" | "null")
}

/// Untyped cell; only the NA spellings become `Null`.
fn text_cell(s: &str) -> CellValue {
    let s = s.trim();
    if is_na(s) {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

/// Plain decimal or exponent notation.  `f64::from_str` also accepts
/// `inf`, `infinity` and `NaN` in any case, which are gene symbols here.
fn is_decimal(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
        && s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

/// Type a raw text cell.  Empty and the usual NA spellings become `Null`.
pub fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if is_na(s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if is_decimal(s) {
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> Result<ProteinTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;
        let cells = obj
            .iter()
            .map(|(key, val)| (key.clone(), json_to_cell(val)))
            .collect();
        rows.push(ProteinRow { cells });
    }

    Ok(ProteinTable::from_rows(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per score / metadata field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ProteinTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let mut cells = std::collections::BTreeMap::new();
            for (col_idx, col_name) in columns.iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row);
                cells.insert(col_name.clone(), value);
            }
            rows.push(ProteinRow { cells });
        }
    }

    Ok(ProteinTable::new(columns, rows))
}

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Null, |a| CellValue::Bool(a.value(row))),
        other => CellValue::Text(format!("{other:?}")),
    }
}
