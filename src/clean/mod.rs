//! Cleaning steps and the pipeline that chains them.
//!
//! ```text
//!   features (X)                         target (Y)
//!        │                                    │
//!        ▼                                    ▼
//!   ┌──────────┐                         ┌──────────┐
//!   │ sentinel │  codes → Missing        │ sentinel │
//!   └──────────┘                         └──────────┘
//!        │                                    │
//!   fips → impute → percentage → prune       target
//!        │                                    │
//!        └───────────────┬────────────────────┘
//!                        ▼
//!                  ┌───────────┐
//!                  │ reconcile │  identical key sets
//!                  └───────────┘
//! ```
//!
//! Every step takes `&Table` and returns a new table.

pub mod fips;
pub mod impute;
pub mod merge;
pub mod percentage;
pub mod prune;
pub mod reconcile;
pub mod sentinel;
pub mod target;

use crate::config::CleaningConfig;
use crate::data::model::Table;
use crate::error::Result;

pub use fips::{build_fips, format_fips};
pub use impute::{impute_column_means, ImputedColumn};
pub use merge::{concat_tables, merge_splits, MergedSplits};
pub use percentage::{convert_to_percentages, round2, PercentageOutcome};
pub use prune::drop_unused_columns;
pub use reconcile::{reconcile, ReconcileReport};
pub use sentinel::{decode_sentinels, ensure_no_sentinels, SentinelSet};
pub use target::drop_invalid_targets;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Counters collected while the pipeline runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningReport {
    pub features_sentinels_decoded: usize,
    pub target_sentinels_decoded: usize,
    pub imputed: Vec<ImputedColumn>,
    /// Feature rows removed because a count exceeded the population.
    pub rows_filtered_by_population: usize,
    pub invalid_targets_dropped: usize,
    pub reconcile: ReconcileReport,
}

/// Cleaned, key-aligned tables ready for modeling.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedDataset {
    pub features: Table,
    pub target: Table,
    pub report: CleaningReport,
}

/// The cleaning pipeline over a features table and a target table.
pub struct CleaningPipeline {
    config: CleaningConfig,
    sentinels: SentinelSet,
}

impl CleaningPipeline {
    /// Pipeline over the published county schema.
    pub fn new() -> Self {
        Self::from_valid_config(CleaningConfig::default())
    }

    /// Pipeline over a custom schema. The config is validated first.
    pub fn with_config(config: CleaningConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: CleaningConfig) -> Self {
        let sentinels = SentinelSet::new(config.missing_sentinels.clone());
        Self { config, sentinels }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Run every step in order and return key-aligned tables.
    ///
    /// Inputs are the raw tables, with sentinel codes still in place. The
    /// first failing step aborts the run.
    pub fn run(&self, features: &Table, target: &Table) -> Result<CleanedDataset> {
        let cfg = &self.config;
        let mut report = CleaningReport::default();

        // Ingestion boundary
        let (x, decoded) = decode_sentinels(features, &self.sentinels);
        report.features_sentinels_decoded = decoded;
        let (y, decoded) = decode_sentinels(target, &self.sentinels);
        report.target_sentinels_decoded = decoded;

        // Features
        let x = build_fips(&x, &cfg.state_code_column, &cfg.county_code_column, &cfg.fips_column)?;
        let (x, imputed) = impute_column_means(&x)?;
        report.imputed = imputed;
        ensure_no_sentinels(&x, &self.sentinels)?;
        let converted = convert_to_percentages(&x, &cfg.rate_columns, &cfg.count_columns, &cfg.population_column)?;
        report.rows_filtered_by_population = converted.rows_filtered;
        ensure_no_sentinels(&converted.table, &self.sentinels)?;
        let x = drop_unused_columns(&converted.table, &cfg.dropped_columns)?;

        // Target
        let (y, dropped) = drop_invalid_targets(&y, &cfg.target_column, &self.sentinels)?;
        report.invalid_targets_dropped = dropped;

        let (features, target, reconciled) = reconcile(&x, &y);
        report.reconcile = reconciled;

        log::info!(
            "cleaned {} feature rows x {} columns; {} imputed column(s), {} row(s) filtered, {} invalid target(s)",
            features.height(),
            features.width(),
            report.imputed.len(),
            report.rows_filtered_by_population,
            report.invalid_targets_dropped
        );

        Ok(CleanedDataset {
            features,
            target,
            report,
        })
    }
}

impl Default for CleaningPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function: clean with the default county schema.
pub fn clean_dataset(features: &Table, target: &Table) -> Result<CleanedDataset> {
    CleaningPipeline::new().run(features, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COUNT_COLUMNS, DROPPED_COLUMNS, RATE_COLUMNS};
    use crate::data::model::{Cell, Column};
    use crate::error::CleanError;

    /// Three counties with every published column; row 2 has a sentinel
    /// rate and a sentinel `Premature`, row 3 an over-population count.
    fn raw_features() -> Table {
        let keys = vec![1, 2, 3];
        let mut columns = vec![
            Column::from_values("State_FIPS_Code", vec![5i64, 12, 53]),
            Column::from_values("County_FIPS_Code", vec![23i64, 3, 33]),
            Column::from_values("Population_Size", vec![2000.0, 1000.0, 100.0]),
            Column::from_values("Prim_Care_Phys_Rate", vec![1234.0, -1111.1, 800.0]),
            Column::from_values("Dentist_Rate", vec![600.0, 400.0, 200.0]),
        ];
        for name in COUNT_COLUMNS {
            let third = if name == "Uninsured" { 500.0 } else { 10.0 };
            columns.push(Column::from_values(name, vec![50.0, 20.0, third]));
        }
        for name in DROPPED_COLUMNS {
            if !columns.iter().any(|c| c.name == name) {
                let second = if name == "Premature" { -9999.0 } else { 2.0 };
                columns.push(Column::from_values(name, vec![1.0, second, 3.0]));
            }
        }
        Table::new(keys, columns).unwrap()
    }

    fn raw_target() -> Table {
        Table::new(
            vec![1, 2, 3, 4],
            vec![Column::from_values("ALE", vec![77.0, 79.5, 75.0, -1.0])],
        )
        .unwrap()
    }

    #[test]
    fn end_to_end_aligns_and_cleans() {
        let cleaned = clean_dataset(&raw_features(), &raw_target()).unwrap();

        assert_eq!(cleaned.features.keys(), &[1, 2]);
        assert_eq!(cleaned.target.keys(), &[1, 2]);
        for name in DROPPED_COLUMNS {
            assert!(!cleaned.features.has_column(name), "{name} should be dropped");
        }

        let fips = &cleaned.features.column("FIPS").unwrap().cells;
        assert_eq!(fips, &vec![Cell::from("05023"), Cell::from("12003")]);

        // Sentinel rate on row 2 is imputed with mean(1234, 800) = 1017 → 1.02.
        let rate = &cleaned.features.column("Prim_Care_Phys_Rate").unwrap().cells;
        assert_eq!(rate, &vec![Cell::Float(1.23), Cell::Float(1.02)]);

        let uninsured = &cleaned.features.column("Uninsured").unwrap().cells;
        assert_eq!(uninsured, &vec![Cell::Float(2.5), Cell::Float(2.0)]);
    }

    #[test]
    fn report_counts_every_correction() {
        let report = clean_dataset(&raw_features(), &raw_target()).unwrap().report;
        assert_eq!(report.features_sentinels_decoded, 2);
        assert_eq!(report.target_sentinels_decoded, 1);
        assert_eq!(report.rows_filtered_by_population, 1);
        assert_eq!(report.invalid_targets_dropped, 1);
        assert_eq!(report.reconcile.dropped_from_target, vec![3]);
        assert!(report.imputed.iter().any(|c| c.column == "Prim_Care_Phys_Rate"));
    }

    #[test]
    fn keeps_unlisted_columns() {
        let x = raw_features()
            .with_column(Column::from_values("Obesity", vec![30.0, 31.0, 32.0]))
            .unwrap();
        let cleaned = clean_dataset(&x, &raw_target()).unwrap();
        let expected = RATE_COLUMNS.len() + COUNT_COLUMNS.len() - 1 + 2;
        assert_eq!(cleaned.features.width(), expected);
        assert!(cleaned.features.has_column("Obesity"));
    }

    #[test]
    fn missing_schema_column_aborts() {
        let x = raw_features().drop_columns(&["Mammogram"]).unwrap();
        let err = clean_dataset(&x, &raw_target()).unwrap_err();
        assert!(matches!(err, CleanError::MissingColumns(cols) if cols == vec!["Mammogram"]));
    }

    #[test]
    fn imputed_mean_equal_to_a_code_aborts() {
        // mean(-3, 1) = -1, which reads as a missing-value code.
        let x = raw_features()
            .with_column(Column::from_values("Prim_Care_Phys_Rate", vec![-3.0, 1.0, -9999.0]))
            .unwrap();
        let err = clean_dataset(&x, &raw_target()).unwrap_err();
        assert!(matches!(
            err,
            CleanError::ComputedSentinel { column, key: 3, value } if column == "Prim_Care_Phys_Rate" && value == -1.0
        ));
    }

    #[test]
    fn rescaled_rate_equal_to_a_code_aborts() {
        let x = raw_features()
            .with_column(Column::from_values("Dentist_Rate", vec![600.0, -1000.0, 200.0]))
            .unwrap();
        let err = clean_dataset(&x, &raw_target()).unwrap_err();
        assert!(matches!(
            err,
            CleanError::ComputedSentinel { column, key: 2, value } if column == "Dentist_Rate" && value == -1.0
        ));
    }

    #[test]
    fn custom_config_is_kept() {
        let config = CleaningConfig {
            target_column: "LE".into(),
            ..CleaningConfig::default()
        };
        let pipeline = CleaningPipeline::with_config(config).unwrap();
        assert_eq!(pipeline.config().target_column, "LE");
        assert_eq!(CleaningPipeline::default().config(), &CleaningConfig::default());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CleaningConfig {
            missing_sentinels: Vec::new(),
            ..CleaningConfig::default()
        };
        assert!(CleaningPipeline::with_config(config).is_err());
    }
}
