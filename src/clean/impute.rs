//! Null normalizer: fills missing numeric cells with the column mean.

use crate::data::model::{Cell, Column, Table};
use crate::error::{CleanError, Result};

/// What the null normalizer filled in for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ImputedColumn {
    pub column: String,
    pub filled: usize,
    pub mean: f64,
}

/// Mean of the present numeric cells, `None` when there are none.
fn column_mean(col: &Column) -> Option<f64> {
    let (sum, n) = col
        .cells
        .iter()
        .filter_map(Cell::as_f64)
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Replace every missing cell of each numeric column with that column's mean.
///
/// The mean is taken over the non-missing cells only. Columns holding text
/// are skipped, and columns without missing cells are returned untouched.
/// A numeric column whose cells are all missing has no mean and fails with
/// [`CleanError::DegenerateColumn`].
pub fn impute_column_means(table: &Table) -> Result<(Table, Vec<ImputedColumn>)> {
    let mut fills = Vec::with_capacity(table.width());

    for col in table.columns() {
        let missing = col.missing_count();
        if missing == 0 || !col.is_numeric() {
            continue;
        }
        let mean = column_mean(col).ok_or_else(|| CleanError::DegenerateColumn(col.name.clone()))?;
        fills.push(ImputedColumn {
            column: col.name.clone(),
            filled: missing,
            mean,
        });
    }

    let out = table.map_columns(|col| {
        let fill = fills.iter().find(|f| f.column == col.name)?;
        Some(
            col.cells
                .iter()
                .map(|c| if c.is_missing() { Cell::Float(fill.mean) } else { c.clone() })
                .collect(),
        )
    });

    for fill in &fills {
        log::debug!("imputed {} cell(s) of '{}' with mean {:.4}", fill.filled, fill.column, fill.mean);
    }
    Ok((out, fills))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_ignores_missing_cells() {
        let table = Table::with_positional_keys(vec![Column::from_values(
            "Uninsured",
            vec![Some(10.0), None, Some(20.0), None],
        )])
        .unwrap();

        let (out, fills) = impute_column_means(&table).unwrap();
        assert_eq!(
            out.column("Uninsured").unwrap().cells,
            vec![Cell::Float(10.0), Cell::Float(15.0), Cell::Float(20.0), Cell::Float(15.0)]
        );
        assert_eq!(fills, vec![ImputedColumn { column: "Uninsured".into(), filled: 2, mean: 15.0 }]);
    }

    #[test]
    fn integer_columns_are_averaged_as_floats() {
        let table = Table::with_positional_keys(vec![Column::from_values(
            "MVA",
            vec![Some(1i64), Some(2), None],
        )])
        .unwrap();
        let (out, _) = impute_column_means(&table).unwrap();
        assert_eq!(out.column("MVA").unwrap().cells[2], Cell::Float(1.5));
    }

    #[test]
    fn complete_table_is_a_no_op() {
        let table = Table::with_positional_keys(vec![
            Column::from_values("a", vec![1.0, 2.0]),
            Column::from_values("FIPS", vec!["01001", "01003"]),
        ])
        .unwrap();
        let (out, fills) = impute_column_means(&table).unwrap();
        assert_eq!(out, table);
        assert!(fills.is_empty());
    }

    #[test]
    fn text_columns_are_skipped() {
        let table = Table::with_positional_keys(vec![Column::new(
            "FIPS",
            vec![Cell::from("01001"), Cell::Missing],
        )])
        .unwrap();
        let (out, fills) = impute_column_means(&table).unwrap();
        assert_eq!(out, table);
        assert!(fills.is_empty());
    }

    #[test]
    fn all_missing_column_is_degenerate() {
        let table = Table::with_positional_keys(vec![
            Column::from_values("ok", vec![1.0, 2.0]),
            Column::from_values("Toxic_Chem", vec![None::<f64>, None]),
        ])
        .unwrap();
        let err = impute_column_means(&table).unwrap_err();
        assert!(matches!(err, CleanError::DegenerateColumn(name) if name == "Toxic_Chem"));
    }
}
