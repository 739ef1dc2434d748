//! Sentinel decoding: the single place where magic "missing" codes are
//! recognised. Downstream steps only ever see [`Cell::Missing`].

use crate::config::MISSING_SENTINELS;
use crate::data::model::{Cell, Table};
use crate::error::{CleanError, Result};

/// Set of numeric codes that stand for missing or invalid data.
#[derive(Debug, Clone, PartialEq)]
pub struct SentinelSet {
    values: Vec<f64>,
}

impl Default for SentinelSet {
    fn default() -> Self {
        SentinelSet::new(MISSING_SENTINELS.to_vec())
    }
}

impl SentinelSet {
    pub fn new(values: Vec<f64>) -> Self {
        SentinelSet { values }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.values.iter().any(|&s| s == value)
    }

    /// True for `Missing` cells and for numeric cells holding a sentinel.
    pub fn is_missing(&self, cell: &Cell) -> bool {
        match cell {
            Cell::Missing => true,
            other => other.as_f64().is_some_and(|v| self.contains(v)),
        }
    }
}

/// Replace every sentinel-valued numeric cell with [`Cell::Missing`].
///
/// Text cells are never touched. Returns the decoded table and the number of
/// cells that were turned into `Missing`.
pub fn decode_sentinels(table: &Table, sentinels: &SentinelSet) -> (Table, usize) {
    let mut decoded = 0;

    let out = table.map_columns(|col| {
        let hits = col
            .cells
            .iter()
            .filter(|c| !c.is_missing() && sentinels.is_missing(c))
            .count();
        if hits == 0 {
            return None;
        }
        decoded += hits;
        log::debug!("decoded {hits} sentinel cell(s) in '{}'", col.name);

        Some(
            col.cells
                .iter()
                .map(|c| if sentinels.is_missing(c) { Cell::Missing } else { c.clone() })
                .collect(),
        )
    });

    (out, decoded)
}

/// Fail on the first numeric cell that holds a sentinel code.
///
/// Steps that compute new values (means, rescaled rates, percentages) can land
/// on a code even though their inputs were decoded.
pub fn ensure_no_sentinels(table: &Table, sentinels: &SentinelSet) -> Result<()> {
    for col in table.columns() {
        for (cell, &key) in col.cells.iter().zip(table.keys()) {
            if let Some(value) = cell.as_f64().filter(|&v| sentinels.contains(v)) {
                return Err(CleanError::ComputedSentinel {
                    column: col.name.clone(),
                    key,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    #[test]
    fn every_published_code_is_recognised() {
        let set = SentinelSet::default();
        for code in [-9999.0, -2222.0, -2222.2, -2.0, -1111.1, -1111.0, -1.0] {
            assert!(set.contains(code), "{code} should be a sentinel");
        }
        assert!(!set.contains(0.0));
        assert!(!set.contains(-3.0));
    }

    #[test]
    fn integer_cells_are_compared_numerically() {
        assert!(SentinelSet::default().is_missing(&Cell::Integer(-9999)));
        assert!(!SentinelSet::default().is_missing(&Cell::Integer(9999)));
    }

    #[test]
    fn decode_leaves_text_and_regular_values() {
        let table = Table::with_positional_keys(vec![
            Column::from_values("rate", vec![Cell::Float(-1111.1), Cell::Float(3.5), Cell::Integer(-1)]),
            Column::from_values("name", vec!["-1", "King", "Pierce"]),
        ])
        .unwrap();

        let (decoded, hits) = decode_sentinels(&table, &SentinelSet::default());
        assert_eq!(hits, 2);
        assert_eq!(
            decoded.column("rate").unwrap().cells,
            vec![Cell::Missing, Cell::Float(3.5), Cell::Missing]
        );
        assert_eq!(decoded.column("name").unwrap(), table.column("name").unwrap());
    }

    #[test]
    fn computed_code_is_reported_with_its_position() {
        let table = Table::new(
            vec![7, 8],
            vec![
                Column::from_values("name", vec!["-1", "King"]),
                Column::from_values("Dentist_Rate", vec![0.25, -1.0]),
            ],
        )
        .unwrap();

        let err = ensure_no_sentinels(&table, &SentinelSet::default()).unwrap_err();
        assert!(matches!(
            err,
            CleanError::ComputedSentinel { column, key: 8, value } if column == "Dentist_Rate" && value == -1.0
        ));

        let clean = table.filter_rows(&[true, false]);
        assert!(ensure_no_sentinels(&clean, &SentinelSet::default()).is_ok());
    }
}
