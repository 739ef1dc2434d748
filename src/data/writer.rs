use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use super::model::{Cell, Column, Table};

/// Write a table as CSV, with the record key as the first column.
/// Missing cells are written as empty fields.
pub fn write_csv(table: &Table, path: &Path, key_header: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;

    let mut header = vec![key_header];
    header.extend(table.column_names());
    writer.write_record(&header).context("writing CSV header")?;

    for index in 0..table.height() {
        let Some((key, cells)) = table.row(index) else {
            break;
        };
        let mut record = Vec::with_capacity(cells.len() + 1);
        record.push(key.to_string());
        record.extend(cells.iter().map(|c| c.to_string()));
        writer
            .write_record(&record)
            .with_context(|| format!("writing CSV row {index}"))?;
    }

    writer.flush().context("flushing CSV file")?;
    log::debug!("wrote {} rows to {}", table.height(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

/// Pick the narrowest Arrow type holding every present cell of the column.
fn arrow_column(col: &Column) -> (DataType, ArrayRef) {
    let present = || col.cells.iter().filter(|c| !c.is_missing());

    if present().all(|c| matches!(c, Cell::Integer(_))) {
        let values: Vec<Option<i64>> = col
            .cells
            .iter()
            .map(|c| match c {
                Cell::Integer(i) => Some(*i),
                _ => None,
            })
            .collect();
        (DataType::Int64, Arc::new(Int64Array::from(values)))
    } else if col.is_numeric() {
        let values: Vec<Option<f64>> = col.cells.iter().map(Cell::as_f64).collect();
        (DataType::Float64, Arc::new(Float64Array::from(values)))
    } else {
        let values: Vec<Option<String>> = col
            .cells
            .iter()
            .map(|c| (!c.is_missing()).then(|| c.to_string()))
            .collect();
        (DataType::Utf8, Arc::new(StringArray::from(values)))
    }
}

/// Write a table as Parquet, with the record key as a `UInt64` first column.
pub fn write_parquet(table: &Table, path: &Path, key_header: &str) -> Result<()> {
    let mut fields = vec![Field::new(key_header, DataType::UInt64, false)];
    let mut arrays: Vec<ArrayRef> = vec![Arc::new(UInt64Array::from(table.keys().to_vec()))];

    for col in table.columns() {
        let (dtype, array) = arrow_column(col);
        fields.push(Field::new(col.name.as_str(), dtype, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    log::debug!("wrote {} rows to {}", table.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_table;

    fn sample() -> Table {
        Table::new(
            vec![3, 8],
            vec![
                Column::from_values("FIPS", vec!["01001", "01003"]),
                Column::from_values("MVA", vec![Some(1.25), None]),
                Column::from_values("Count", vec![4i64, 5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn csv_output_reloads_with_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.csv");
        write_csv(&sample(), &path, "row_id").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("row_id,FIPS,MVA,Count\n3,01001,1.25,4\n8,01003,,5\n"));

        let reloaded = load_table(&path, Some("row_id")).unwrap();
        assert_eq!(reloaded.keys(), &[3, 8]);
        assert_eq!(reloaded.column("MVA").unwrap().cells[1], Cell::Missing);
    }

    #[test]
    fn parquet_output_preserves_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("features.parquet");
        write_parquet(&sample(), &path, "row_id").unwrap();

        let reloaded = load_table(&path, Some("row_id")).unwrap();
        assert_eq!(reloaded, sample());
    }
}
