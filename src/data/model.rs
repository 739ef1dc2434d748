use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{CleanError, Result};

/// Record key shared by the features and target tables.
pub type RowKey = u64;

// ---------------------------------------------------------------------------
// Cell – a single value in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes found in the source tables.
///
/// `Missing` is the only representation of absent data inside the crate;
/// sentinel codes are turned into it at the ingestion boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Float(f64),
    Integer(i64),
    Text(String),
    Missing,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Integer(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Missing, Into::into)
    }
}

impl Cell {
    /// Interpret the cell as an `f64` (numeric cells only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Cell::Text(_))
    }
}

// ---------------------------------------------------------------------------
// Column – a named vector of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Column {
            name: name.into(),
            cells,
        }
    }

    /// Build a column from anything convertible into cells.
    pub fn from_values<T: Into<Cell>>(name: impl Into<String>, values: Vec<T>) -> Self {
        Column::new(name, values.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A column is numeric when it holds no text cell.
    pub fn is_numeric(&self) -> bool {
        !self.cells.iter().any(Cell::is_text)
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }
}

// ---------------------------------------------------------------------------
// Table – keyed rows, named columns
// ---------------------------------------------------------------------------

/// An ordered, keyed table.
///
/// Every column holds exactly one cell per key, keys are unique and column
/// names are unique. All transforms in this crate take a `&Table` and return a
/// new one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    keys: Vec<RowKey>,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that lengths, keys and names are consistent.
    pub fn new(keys: Vec<RowKey>, columns: Vec<Column>) -> Result<Self> {
        let mut seen_keys = HashSet::with_capacity(keys.len());
        for &key in &keys {
            if !seen_keys.insert(key) {
                return Err(CleanError::DuplicateKey(key));
            }
        }

        let mut seen_names = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen_names.insert(col.name.as_str()) {
                return Err(CleanError::DuplicateColumn(col.name.clone()));
            }
            if col.len() != keys.len() {
                return Err(CleanError::LengthMismatch {
                    column: col.name.clone(),
                    expected: keys.len(),
                    got: col.len(),
                });
            }
        }

        Ok(Table { keys, columns })
    }

    /// Build a table keyed by row position (`0..n`).
    pub fn with_positional_keys(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, Column::len);
        Table::new((0..height as RowKey).collect(), columns)
    }

    pub fn height(&self) -> usize {
        self.keys.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    pub fn key_set(&self) -> BTreeSet<RowKey> {
        self.keys.iter().copied().collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Look a column up by name, failing with a schema error when absent.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CleanError::MissingColumns(vec![name.to_string()]))
    }

    /// Fail with every name in `names` that is not a column of this table.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<()> {
        let absent: Vec<String> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|n| !self.has_column(n))
            .map(str::to_string)
            .collect();
        if absent.is_empty() {
            Ok(())
        } else {
            Err(CleanError::MissingColumns(absent))
        }
    }

    /// Return a copy with `column` replacing the column of the same name, or
    /// appended when no such column exists.
    pub fn with_column(&self, column: Column) -> Result<Table> {
        if column.len() != self.height() {
            return Err(CleanError::LengthMismatch {
                got: column.len(),
                expected: self.height(),
                column: column.name,
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => *slot = column,
            None => columns.push(column),
        }
        Ok(Table {
            keys: self.keys.clone(),
            columns,
        })
    }

    /// Return a copy where `rewrite` may supply new cells for each column.
    ///
    /// Columns for which `rewrite` returns `None` are kept as they are. The
    /// replacement must hold one cell per row.
    pub fn map_columns<F>(&self, mut rewrite: F) -> Table
    where
        F: FnMut(&Column) -> Option<Vec<Cell>>,
    {
        let columns = self
            .columns
            .iter()
            .map(|col| match rewrite(col) {
                Some(cells) => {
                    debug_assert_eq!(cells.len(), self.height(), "column '{}'", col.name);
                    Column::new(col.name.clone(), cells)
                }
                None => col.clone(),
            })
            .collect();
        Table {
            keys: self.keys.clone(),
            columns,
        }
    }

    /// Return a copy without the named columns. Every name must exist.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        self.require_columns(names)?;
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.iter().any(|n| n.as_ref() == c.name))
            .cloned()
            .collect();
        Ok(Table {
            keys: self.keys.clone(),
            columns,
        })
    }

    /// Return a copy holding only the rows whose `mask` entry is `true`.
    pub fn filter_rows(&self, mask: &[bool]) -> Table {
        debug_assert_eq!(mask.len(), self.height());
        let pick = |i: &usize| mask.get(*i).copied().unwrap_or(false);

        let keys = (0..self.height())
            .filter(pick)
            .map(|i| self.keys[i])
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                cells: (0..col.len()).filter(pick).map(|i| col.cells[i].clone()).collect(),
            })
            .collect();
        Table { keys, columns }
    }

    /// Row view: key plus the cell of each column, in column order.
    pub fn row(&self, index: usize) -> Option<(RowKey, Vec<&Cell>)> {
        let key = *self.keys.get(index)?;
        let cells = self.columns.iter().map(|c| &c.cells[index]).collect();
        Some((key, cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec![10, 20, 30],
            vec![
                Column::from_values("a", vec![1.0, 2.0, 3.0]),
                Column::from_values("b", vec!["x", "y", "z"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = Table::new(vec![1, 1], vec![Column::from_values("a", vec![1.0, 2.0])]);
        assert!(matches!(err, Err(CleanError::DuplicateKey(1))));
    }

    #[test]
    fn rejects_ragged_columns() {
        let err = Table::new(vec![1, 2], vec![Column::from_values("a", vec![1.0])]);
        assert!(matches!(err, Err(CleanError::LengthMismatch { .. })));
    }

    #[test]
    fn rejects_duplicate_column_names() {
        let err = Table::new(
            vec![1],
            vec![
                Column::from_values("a", vec![1.0]),
                Column::from_values("a", vec![2.0]),
            ],
        );
        assert!(matches!(err, Err(CleanError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn drop_columns_is_strict() {
        let t = sample();
        let err = t.drop_columns(&["a", "nope", "also_nope"]).unwrap_err();
        match err {
            CleanError::MissingColumns(names) => assert_eq!(names, vec!["nope", "also_nope"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(t.drop_columns(&["a"]).unwrap().column_names(), vec!["b"]);
    }

    #[test]
    fn filter_rows_keeps_keys_aligned() {
        let t = sample().filter_rows(&[true, false, true]);
        assert_eq!(t.keys(), &[10, 30]);
        assert_eq!(t.column("b").unwrap().cells, vec![Cell::from("x"), Cell::from("z")]);
    }

    #[test]
    fn with_column_replaces_in_place() {
        let t = sample()
            .with_column(Column::from_values("a", vec![9.0, 9.0, 9.0]))
            .unwrap();
        assert_eq!(t.column_names(), vec!["a", "b"]);
        assert_eq!(t.column("a").unwrap().cells[0], Cell::Float(9.0));
    }

    #[test]
    fn empty_table_has_empty_columns() {
        let t = sample().filter_rows(&[false, false, false]);
        assert!(t.is_empty());
        assert!(t.columns().iter().all(Column::is_empty));
        assert!(!sample().column("a").unwrap().is_empty());
    }

    #[test]
    fn optional_values_become_missing() {
        let col = Column::from_values("a", vec![Some(1.0), None]);
        assert_eq!(col.missing_count(), 1);
        assert!(col.is_numeric());
    }
}
