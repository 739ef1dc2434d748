//! Column pruner.

use crate::data::model::Table;
use crate::error::Result;

/// Drop the named columns.
///
/// Strict: if any name is absent the whole call fails with
/// [`CleanError::MissingColumns`](crate::error::CleanError::MissingColumns)
/// listing every absent column, and nothing is dropped.
pub fn drop_unused_columns<S: AsRef<str>>(table: &Table, columns: &[S]) -> Result<Table> {
    let out = table.drop_columns(columns)?;
    log::debug!("dropped {} column(s), {} remain", columns.len(), out.width());
    Ok(out)
}
