//! Record reconciler: restricts both tables to their shared keys.

use std::collections::BTreeSet;

use crate::data::model::{RowKey, Table};

/// Outcome of aligning the features and target tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub features_rows: usize,
    pub target_rows: usize,
    /// Keys that were only present in the features table.
    pub dropped_from_features: Vec<RowKey>,
    /// Keys that were only present in the target table.
    pub dropped_from_target: Vec<RowKey>,
}

fn keep_keys(table: &Table, keep: &BTreeSet<RowKey>) -> Table {
    let mask: Vec<bool> = table.keys().iter().map(|k| keep.contains(k)).collect();
    table.filter_rows(&mask)
}

/// Drop keys present in only one of the two tables, so both end up with
/// exactly the same key set. Row order within each table is preserved.
pub fn reconcile(features: &Table, target: &Table) -> (Table, Table, ReconcileReport) {
    let x_keys = features.key_set();
    let y_keys = target.key_set();

    let dropped_from_features: Vec<RowKey> = x_keys.difference(&y_keys).copied().collect();
    let dropped_from_target: Vec<RowKey> = y_keys.difference(&x_keys).copied().collect();

    let shared: BTreeSet<RowKey> = x_keys.intersection(&y_keys).copied().collect();
    let features = keep_keys(features, &shared);
    let target = keep_keys(target, &shared);

    log::info!(
        "reconciled records: features={} target={} (dropped {} / {})",
        features.height(),
        target.height(),
        dropped_from_features.len(),
        dropped_from_target.len()
    );

    let report = ReconcileReport {
        features_rows: features.height(),
        target_rows: target.height(),
        dropped_from_features,
        dropped_from_target,
    };
    (features, target, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn keyed(keys: Vec<RowKey>) -> Table {
        let values: Vec<f64> = keys.iter().map(|k| *k as f64).collect();
        Table::new(keys, vec![Column::from_values("v", values)]).unwrap()
    }

    #[test]
    fn keeps_only_shared_keys() {
        let (x, y, report) = reconcile(&keyed(vec![1, 2, 3]), &keyed(vec![2, 3, 4]));
        assert_eq!(x.key_set(), BTreeSet::from([2, 3]));
        assert_eq!(y.key_set(), BTreeSet::from([2, 3]));
        assert_eq!((report.features_rows, report.target_rows), (2, 2));
        assert_eq!(report.dropped_from_features, vec![1]);
        assert_eq!(report.dropped_from_target, vec![4]);
    }

    #[test]
    fn preserves_row_order_and_values() {
        let (x, _, _) = reconcile(&keyed(vec![9, 3, 5]), &keyed(vec![5, 9]));
        assert_eq!(x.keys(), &[9, 5]);
        assert_eq!(x.column("v").unwrap().cells[1].as_f64(), Some(5.0));
    }

    #[test]
    fn disjoint_tables_become_empty() {
        let (x, y, _) = reconcile(&keyed(vec![1]), &keyed(vec![2]));
        assert!(x.is_empty());
        assert!(y.is_empty());
    }
}
