//! Target validator: removes rows without a usable target value.

use crate::clean::sentinel::SentinelSet;
use crate::data::model::Table;
use crate::error::Result;

/// Remove every row whose target value is missing or a sentinel code.
///
/// Targets are never imputed. Returns the filtered table and the number of
/// rows removed.
pub fn drop_invalid_targets(
    target: &Table,
    target_column: &str,
    sentinels: &SentinelSet,
) -> Result<(Table, usize)> {
    let mask: Vec<bool> = target
        .column(target_column)?
        .cells
        .iter()
        .map(|cell| !sentinels.is_missing(cell))
        .collect();

    let dropped = mask.iter().filter(|keep| !**keep).count();
    if dropped > 0 {
        log::warn!("'{target_column}': dropping {dropped} row(s) with an invalid target");
    }
    Ok((target.filter_rows(&mask), dropped))
}
