//! FIPS builder: joins state and county sub-codes into a zero-padded
//! five-digit code.

use crate::data::model::{Cell, Column, RowKey, Table};
use crate::error::{CleanError, Result};

/// Coerce a sub-code cell to a non-negative integer.
///
/// Floats are truncated toward zero, text is parsed as a decimal integer.
fn sub_code(cell: &Cell, column: &str, key: RowKey) -> Result<u64> {
    let invalid = || CleanError::InvalidCode {
        column: column.to_string(),
        key,
        value: match cell {
            Cell::Missing => "<missing>".to_string(),
            other => other.to_string(),
        },
    };

    let value = match cell {
        Cell::Integer(i) => *i,
        Cell::Float(f) if f.is_finite() => f.trunc() as i64,
        Cell::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    u64::try_from(value).map_err(|_| invalid())
}

/// Format a state/county pair as a FIPS code: two then three digits,
/// zero-padded. Wider values are kept whole.
pub fn format_fips(state: u64, county: u64) -> String {
    format!("{state:02}{county:03}")
}

/// Add the combined FIPS column built from the state and county sub-codes.
///
/// The sub-code columns are left in place.
pub fn build_fips(
    table: &Table,
    state_column: &str,
    county_column: &str,
    fips_column: &str,
) -> Result<Table> {
    table.require_columns(&[state_column, county_column])?;
    let states = table.column(state_column)?;
    let counties = table.column(county_column)?;

    let cells = table
        .keys()
        .iter()
        .zip(states.cells.iter().zip(&counties.cells))
        .map(|(&key, (s, c))| {
            let state = sub_code(s, state_column, key)?;
            let county = sub_code(c, county_column, key)?;
            Ok(Cell::Text(format_fips(state, county)))
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("built '{fips_column}' for {} rows", cells.len());
    table.with_column(Column::new(fips_column, cells))
}
