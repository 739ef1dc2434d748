//! Merging of train and test splits that share an identifier column.

use crate::data::model::{Cell, Column, Table};
use crate::error::Result;

/// Train and test splits with the identifier column removed, plus the
/// combined view that still carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedSplits {
    pub train: Table,
    pub test: Table,
    pub combined: Table,
}

/// Stack `bottom` under `top`.
///
/// Columns are the union of both schemas in first-seen order; a cell missing
/// from one side becomes [`Cell::Missing`]. Keys must not overlap.
pub fn concat_tables(top: &Table, bottom: &Table) -> Result<Table> {
    let mut names: Vec<&str> = top.column_names();
    for name in bottom.column_names() {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let cells_of = |table: &Table, name: &str| -> Vec<Cell> {
        match table.column(name) {
            Ok(col) => col.cells.clone(),
            Err(_) => vec![Cell::Missing; table.height()],
        }
    };

    let columns = names
        .iter()
        .map(|name| {
            let mut cells = cells_of(top, name);
            cells.extend(cells_of(bottom, name));
            Column::new(*name, cells)
        })
        .collect();

    let keys = top.keys().iter().chain(bottom.keys()).copied().collect();
    Table::new(keys, columns)
}

/// Combine cleaned train and test feature tables for reference, then strip
/// `id_column` from both splits when the test split has it.
///
/// Removal from the train split is strict: if the test split carries the
/// column but the train split does not, the call fails.
pub fn merge_splits(train: &Table, test: &Table, id_column: &str) -> Result<MergedSplits> {
    let combined = concat_tables(train, test)?;

    let (train, test) = if test.has_column(id_column) {
        log::debug!("dropping '{id_column}' from train and test splits");
        (train.drop_columns(&[id_column])?, test.drop_columns(&[id_column])?)
    } else {
        (train.clone(), test.clone())
    };

    Ok(MergedSplits {
        train,
        test,
        combined,
    })
}
