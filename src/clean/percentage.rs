//! Rescaling of rate and count columns.
//!
//! Rates are published per 1000 people and become proportions. Counts are
//! head counts and become a percentage of the county population.

use crate::data::model::{Cell, Column, Table};
use crate::error::{CleanError, Result};

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn numeric_cells(table: &Table, column: &str) -> Result<Vec<Option<f64>>> {
    let col = table.column(column)?;
    col.cells
        .iter()
        .zip(table.keys())
        .map(|(cell, &key)| match cell {
            Cell::Missing => Ok(None),
            Cell::Text(_) => Err(CleanError::NonNumeric {
                column: column.to_string(),
                key,
            }),
            other => Ok(other.as_f64()),
        })
        .collect()
}

fn to_column(name: &str, values: Vec<Option<f64>>) -> Column {
    Column::from_values(name, values)
}

/// Rows kept before converting `count`: the count must not exceed the
/// population and the population must be positive. Rows with a missing count
/// or population are kept and convert to `Missing`.
fn population_mask(population: &[Option<f64>], counts: &[Option<f64>]) -> Vec<bool> {
    population
        .iter()
        .zip(counts)
        .map(|(pop, count)| match (pop, count) {
            (Some(p), Some(c)) => *p > 0.0 && p - c >= 0.0,
            _ => true,
        })
        .collect()
}

/// Result of [`convert_to_percentages`].
#[derive(Debug, Clone, PartialEq)]
pub struct PercentageOutcome {
    pub table: Table,
    /// Rows removed because a count exceeded the population.
    pub rows_filtered: usize,
}

/// Rescale `rate_columns` to `v / 1000` and `count_columns` to a percentage
/// of `population_column`, both rounded to two decimals.
///
/// Count columns are processed in order. Before each one is converted, rows
/// whose count exceeds the population (or whose population is not positive)
/// are removed. The population column itself is never rewritten, so every
/// filter compares against the original population.
pub fn convert_to_percentages<S: AsRef<str>>(
    table: &Table,
    rate_columns: &[S],
    count_columns: &[S],
    population_column: &str,
) -> Result<PercentageOutcome> {
    table.require_columns(rate_columns)?;
    table.require_columns(count_columns)?;
    table.require_columns(&[population_column])?;

    let mut out = table.clone();

    for rate in rate_columns.iter().map(|name| name.as_ref()) {
        let values = numeric_cells(&out, rate)?
            .into_iter()
            .map(|v| v.map(|v| round2(v / 1000.0)))
            .collect();
        out = out.with_column(to_column(rate, values))?;
    }

    let mut rows_filtered = 0;
    for count in count_columns.iter().map(|name| name.as_ref()) {
        let population = numeric_cells(&out, population_column)?;
        let counts = numeric_cells(&out, count)?;

        let mask = population_mask(&population, &counts);
        let dropped = mask.iter().filter(|keep| !**keep).count();
        if dropped > 0 {
            log::warn!("'{count}': dropping {dropped} row(s) where the count exceeds the population");
            rows_filtered += dropped;
            out = out.filter_rows(&mask);
        }

        let percentages = population
            .iter()
            .zip(&counts)
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|((pop, c), _)| match (pop, c) {
                (Some(p), Some(c)) => Some(round2(c / p * 100.0)),
                _ => None,
            })
            .collect();
        out = out.with_column(to_column(count, percentages))?;
    }

    Ok(PercentageOutcome {
        table: out,
        rows_filtered,
    })
}
