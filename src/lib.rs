//! Cleaning of county health-statistics tables before modeling.
//!
//! The features table (`X`) and the target table (`Y`) share a record key.
//! [`CleaningPipeline`] decodes sentinel codes, builds the FIPS identifier,
//! imputes column means, rescales rates and counts, prunes unused columns,
//! drops invalid targets and finally aligns both tables to the same keys.
//!
//! ```no_run
//! use std::path::Path;
//! use county_clean::{clean_dataset, data::loader::load_table};
//!
//! # fn main() -> anyhow::Result<()> {
//! let x = load_table(Path::new("features.csv"), None)?;
//! let y = load_table(Path::new("target.csv"), None)?;
//! let cleaned = clean_dataset(&x, &y)?;
//! assert_eq!(cleaned.features.key_set(), cleaned.target.key_set());
//! # Ok(())
//! # }
//! ```

pub mod clean;
pub mod config;
pub mod data;
pub mod error;

pub use clean::{clean_dataset, CleanedDataset, CleaningPipeline, CleaningReport};
pub use config::CleaningConfig;
pub use data::model::{Cell, Column, RowKey, Table};
pub use error::{CleanError, Result};
