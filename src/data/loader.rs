use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, UInt32Type, UInt64Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, Column, RowKey, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one column per field
/// * `.json`    – records orient: `[{ "ALE": 77.1, ... }, ...]`
/// * `.parquet` – flat columns of numbers, strings or booleans
///
/// When `key_column` is given its values become the record keys and the column
/// is removed from the table; otherwise rows are keyed by position. Sentinel
/// codes are loaded as plain numbers.
pub fn load_table(path: &Path, key_column: Option<&str>) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let columns = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let table = attach_keys(columns, key_column)
        .with_context(|| format!("building table from {}", path.display()))?;
    log::debug!(
        "loaded {} rows x {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

fn attach_keys(mut columns: Vec<Column>, key_column: Option<&str>) -> Result<Table> {
    let Some(name) = key_column else {
        return Ok(Table::with_positional_keys(columns)?);
    };

    let idx = columns
        .iter()
        .position(|c| c.name == name)
        .with_context(|| format!("missing key column '{name}'"))?;
    let key_col = columns.remove(idx);

    let keys = key_col
        .cells
        .iter()
        .enumerate()
        .map(|(row, cell)| cell_to_key(cell).with_context(|| format!("Row {row}: invalid key '{cell}'")))
        .collect::<Result<Vec<RowKey>>>()?;

    Ok(Table::new(keys, columns)?)
}

fn cell_to_key(cell: &Cell) -> Option<RowKey> {
    match cell {
        Cell::Integer(i) => RowKey::try_from(*i).ok(),
        Cell::Float(f) if f.fract() == 0.0 && *f >= 0.0 => Some(*f as RowKey),
        Cell::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Column>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(str::to_string)
        .collect();
    let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }
        for (raw, value) in fields.iter_mut().zip(record.iter()) {
            raw.push(value.trim().to_string());
        }
    }

    Ok(headers
        .into_iter()
        .zip(fields)
        .map(|(name, raw)| typed_column(name, &raw))
        .collect())
}

/// A column holding any zero-padded digit string (a FIPS code, say) loads
/// entirely as text, so codes keep their width. Otherwise every field is
/// guessed on its own.
fn typed_column(name: String, raw: &[String]) -> Column {
    let as_codes = raw.iter().any(|s| is_zero_padded_code(s));
    let cells = raw
        .iter()
        .map(|s| match guess_cell_type(s) {
            Cell::Integer(_) if as_codes => Cell::Text(s.clone()),
            cell => cell,
        })
        .collect();
    Column::new(name, cells)
}

/// Empty fields and the usual pandas NA spellings load as `Missing`. Digit
/// strings with a leading zero stay text.
fn guess_cell_type(s: &str) -> Cell {
    let s = s.trim();
    if s.is_empty() || matches!(s, "NA" | "NaN" | "nan" | "null") {
        return Cell::Missing;
    }
    if is_zero_padded_code(s) {
        return Cell::Text(s.to_string());
    }
    if let Ok(i) = s.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Cell::Float(f);
    }
    Cell::Text(s.to_string())
}

fn is_zero_padded_code(s: &str) -> bool {
    s.len() > 1 && s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`). Columns appear in
/// first-seen order; a field absent from a record loads as `Missing`.
fn load_json(path: &Path) -> Result<Vec<Column>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<Column> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !columns.iter().any(|c| &c.name == key) {
                columns.push(Column::new(key.clone(), vec![Cell::Missing; i]));
            }
        }
        for col in &mut columns {
            col.cells.push(obj.get(&col.name).map_or(Cell::Missing, json_to_cell));
        }
    }

    Ok(columns)
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
        JsonValue::Bool(b) => Cell::Integer(i64::from(*b)),
        JsonValue::Null => Cell::Missing,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Column>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Column::new(f.name().clone(), Vec::new()))
        .collect();

    let reader = builder.build().context("building parquet reader")?;
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col, array) in columns.iter_mut().zip(batch.columns()) {
            append_arrow_cells(&mut col.cells, array)
                .with_context(|| format!("column '{}'", col.name))?;
        }
    }

    Ok(columns)
}

/// Append every value of `array` to `cells`, nulls becoming `Missing`.
fn append_arrow_cells(cells: &mut Vec<Cell>, array: &ArrayRef) -> Result<()> {
    macro_rules! push_all {
        ($values:expr, $convert:expr) => {{
            let values = $values;
            let convert = $convert;
            for row in 0..values.len() {
                cells.push(if values.is_null(row) {
                    Cell::Missing
                } else {
                    convert(values.value(row))
                });
            }
        }};
    }

    match array.data_type() {
        DataType::Utf8 => push_all!(array.as_string::<i32>(), |s: &str| Cell::Text(s.to_string())),
        DataType::LargeUtf8 => push_all!(array.as_string::<i64>(), |s: &str| Cell::Text(s.to_string())),
        DataType::Int16 => push_all!(array.as_primitive::<Int16Type>(), |v: i16| Cell::Integer(v.into())),
        DataType::Int32 => push_all!(array.as_primitive::<Int32Type>(), |v: i32| Cell::Integer(v.into())),
        DataType::Int64 => push_all!(array.as_primitive::<Int64Type>(), Cell::Integer),
        DataType::UInt32 => push_all!(array.as_primitive::<UInt32Type>(), |v: u32| Cell::Integer(v.into())),
        DataType::UInt64 => push_all!(array.as_primitive::<UInt64Type>(), |v: u64| {
            i64::try_from(v).map_or_else(|_| Cell::Text(v.to_string()), Cell::Integer)
        }),
        DataType::Float32 => push_all!(array.as_primitive::<Float32Type>(), |v: f32| Cell::Float(v.into())),
        DataType::Float64 => push_all!(array.as_primitive::<Float64Type>(), Cell::Float),
        DataType::Boolean => push_all!(array.as_boolean(), |b: bool| Cell::Integer(i64::from(b))),
        DataType::Null => cells.extend(std::iter::repeat(Cell::Missing).take(array.len())),
        other => return Err(anyhow!("unsupported column type {other:?}")),
    }
    Ok(())
}
