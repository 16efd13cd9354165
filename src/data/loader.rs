use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, BooleanArray, Date32Array, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, LargeStringArray, StringArray, TimestampMicrosecondArray,
    TimestampMillisecondArray, TimestampNanosecondArray, TimestampSecondArray, UInt16Array,
    UInt32Array, UInt8Array,
};
use arrow::datatypes::{DataType, TimeUnit};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::raw::{Cell, RawTable};
use crate::error::IngestError;

type Result<T> = std::result::Result<T, IngestError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw row set from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (the published `day.csv` / `hour.csv`)
/// * `.json`    – `[{ "dteday": "2011-01-01", "cnt": 985, ... }, ...]`
/// * `.parquet` – one column per field, as written by `df.to_parquet()`;
///   `Date32` and timestamp columns both become dates
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(IngestError::UnsupportedFormat(other.to_string())),
    };
    log::debug!(
        "read {} rows x {} columns from {}",
        raw.len(),
        raw.columns.len(),
        path.display()
    );
    Ok(raw)
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV text that is already in memory.
pub fn read_csv<R: std::io::Read>(source_name: &str, input: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw = RawTable::new(source_name, headers);
    for result in reader.records() {
        let record = result?;
        raw.push_row(record.iter().map(Cell::guess).collect());
    }
    Ok(raw)
}

fn load_csv(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(&source_name(path), file)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`).
///
/// Columns are the union of all object keys, in the order they first appear
/// in the file. Dates may be strings or epoch milliseconds, which is how
/// pandas writes a datetime column.
pub fn read_json(source_name: &str, text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root.as_array().ok_or_else(|| IngestError::Malformed {
        source_name: source_name.to_string(),
        message: "expected top-level JSON array".to_string(),
    })?;

    let mut raw = RawTable::new(source_name, Vec::new());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| IngestError::Malformed {
            source_name: source_name.to_string(),
            message: format!("row {i} is not a JSON object"),
        })?;

        let mut row = vec![Cell::Null; raw.columns.len()];
        for (key, val) in obj {
            let idx = raw.ensure_column(key);
            if idx >= row.len() {
                row.resize(idx + 1, Cell::Null);
            }
            row[idx] = json_to_cell(val);
        }
        raw.push_row(row);
    }
    Ok(raw)
}

fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_json(&source_name(path), &text)
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Integer, float, boolean, string and `Date32` columns are supported; the
/// date column may be either a string or a `Date32`.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let name = source_name(path);
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut raw: Option<RawTable> = None;
    for batch_result in reader {
        let batch = batch_result?;
        let schema = batch.schema();
        let table = raw.get_or_insert_with(|| {
            let columns = schema.fields().iter().map(|f| f.name().clone()).collect();
            RawTable::new(name.clone(), columns)
        });

        let mut rows = vec![Vec::with_capacity(schema.fields().len()); batch.num_rows()];
        for (field, col) in schema.fields().iter().zip(batch.columns()) {
            for (row, cells) in rows.iter_mut().enumerate() {
                cells.push(extract_cell(&name, field.name(), col, row)?);
            }
        }
        for row in rows {
            table.push_row(row);
        }
    }

    // A file with no row groups still carries a schema.
    match raw {
        Some(raw) => Ok(raw),
        None => Err(IngestError::Empty { source_name: name }),
    }
}

// -- Parquet / Arrow helpers --

fn downcast<'a, T: 'static>(
    source_name: &str,
    column: &str,
    col: &'a Arc<dyn Array>,
) -> Result<&'a T> {
    col.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| IngestError::UnsupportedColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
            data_type: format!("{:?}", col.data_type()),
        })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(
    source_name: &str,
    column: &str,
    col: &Arc<dyn Array>,
    row: usize,
) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            Cell::Text(downcast::<StringArray>(source_name, column, col)?.value(row).to_string())
        }
        DataType::LargeUtf8 => Cell::Text(
            downcast::<LargeStringArray>(source_name, column, col)?
                .value(row)
                .to_string(),
        ),
        DataType::Int8 => {
            Cell::Integer(i64::from(downcast::<Int8Array>(source_name, column, col)?.value(row)))
        }
        DataType::Int16 => {
            Cell::Integer(i64::from(downcast::<Int16Array>(source_name, column, col)?.value(row)))
        }
        DataType::Int32 => {
            Cell::Integer(i64::from(downcast::<Int32Array>(source_name, column, col)?.value(row)))
        }
        DataType::Int64 => Cell::Integer(downcast::<Int64Array>(source_name, column, col)?.value(row)),
        DataType::UInt8 => {
            Cell::Integer(i64::from(downcast::<UInt8Array>(source_name, column, col)?.value(row)))
        }
        DataType::UInt16 => {
            Cell::Integer(i64::from(downcast::<UInt16Array>(source_name, column, col)?.value(row)))
        }
        DataType::UInt32 => {
            Cell::Integer(i64::from(downcast::<UInt32Array>(source_name, column, col)?.value(row)))
        }
        DataType::Float32 => {
            Cell::Float(f64::from(downcast::<Float32Array>(source_name, column, col)?.value(row)))
        }
        DataType::Float64 => Cell::Float(downcast::<Float64Array>(source_name, column, col)?.value(row)),
        DataType::Boolean => Cell::Bool(downcast::<BooleanArray>(source_name, column, col)?.value(row)),
        DataType::Date32 => match downcast::<Date32Array>(source_name, column, col)?.value_as_date(row) {
            Some(date) => Cell::Date(date),
            None => Cell::Null,
        },
        // pandas writes `pd.to_datetime` columns as naive timestamps; keep the calendar day.
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => downcast::<TimestampSecondArray>(source_name, column, col)?
                    .value_as_datetime(row),
                TimeUnit::Millisecond => {
                    downcast::<TimestampMillisecondArray>(source_name, column, col)?
                        .value_as_datetime(row)
                }
                TimeUnit::Microsecond => {
                    downcast::<TimestampMicrosecondArray>(source_name, column, col)?
                        .value_as_datetime(row)
                }
                TimeUnit::Nanosecond => {
                    downcast::<TimestampNanosecondArray>(source_name, column, col)?
                        .value_as_datetime(row)
                }
            };
            match datetime {
                Some(dt) => Cell::Date(dt.date()),
                None => Cell::Null,
            }
        }
        other => {
            return Err(IngestError::UnsupportedColumn {
                source_name: source_name.to_string(),
                column: column.to_string(),
                data_type: format!("{other:?}"),
            })
        }
    };
    Ok(cell)
}
