//! Column schema and sentinel codes used by the cleaning pipeline.
//!
//! The constants below describe the county health-statistics tables as they
//! are published. [`CleaningConfig`] carries the same values and can be
//! overridden from a TOML file when a dataset release renames a column.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CleanError, Result};

/// Numeric codes the source dataset uses for "missing" or "invalid".
pub const MISSING_SENTINELS: [f64; 7] = [-9999.0, -2222.0, -2222.2, -2.0, -1111.1, -1111.0, -1.0];

pub const STATE_CODE_COLUMN: &str = "State_FIPS_Code";
pub const COUNTY_CODE_COLUMN: &str = "County_FIPS_Code";
pub const FIPS_COLUMN: &str = "FIPS";
pub const POPULATION_COLUMN: &str = "Population_Size";
pub const TARGET_COLUMN: &str = "ALE";

/// Per-1000 rates, rescaled to proportions.
pub const RATE_COLUMNS: [&str; 2] = ["Prim_Care_Phys_Rate", "Dentist_Rate"];

/// Head counts, converted to a percentage of the population.
pub const COUNT_COLUMNS: [&str; 9] = [
    "No_HS_Diploma",
    "Unemployed",
    "Sev_Work_Disabled",
    "Major_Depression",
    "Recent_Drug_Use",
    "Uninsured",
    "Elderly_Medicare",
    "Disabled_Medicare",
    "MVA",
];

/// Columns removed before modeling.
pub const DROPPED_COLUMNS: [&str; 11] = [
    "Premature",
    "Toxic_Chem",
    "Pap_Smear",
    "Proctoscopy",
    "Flu_Vac",
    "Pneumo_Vax",
    "Mammogram",
    "State_FIPS_Code",
    "County_FIPS_Code",
    "Population_Size",
    "Sev_Work_Disabled",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn default_state_code_column() -> String {
    STATE_CODE_COLUMN.to_string()
}

fn default_county_code_column() -> String {
    COUNTY_CODE_COLUMN.to_string()
}

fn default_fips_column() -> String {
    FIPS_COLUMN.to_string()
}

fn default_population_column() -> String {
    POPULATION_COLUMN.to_string()
}

fn default_target_column() -> String {
    TARGET_COLUMN.to_string()
}

fn default_rate_columns() -> Vec<String> {
    owned(&RATE_COLUMNS)
}

fn default_count_columns() -> Vec<String> {
    owned(&COUNT_COLUMNS)
}

fn default_dropped_columns() -> Vec<String> {
    owned(&DROPPED_COLUMNS)
}

fn default_missing_sentinels() -> Vec<f64> {
    MISSING_SENTINELS.to_vec()
}

/// Schema and codes driving every cleaning step.
///
/// Every field has a default, so a TOML file only needs to list overrides:
///
/// ```toml
/// target_column = "ALE"
/// dropped_columns = ["Premature", "Toxic_Chem"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningConfig {
    #[serde(default = "default_state_code_column")]
    pub state_code_column: String,
    #[serde(default = "default_county_code_column")]
    pub county_code_column: String,
    #[serde(default = "default_fips_column")]
    pub fips_column: String,
    #[serde(default = "default_population_column")]
    pub population_column: String,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    #[serde(default = "default_rate_columns")]
    pub rate_columns: Vec<String>,
    #[serde(default = "default_count_columns")]
    pub count_columns: Vec<String>,
    #[serde(default = "default_dropped_columns")]
    pub dropped_columns: Vec<String>,
    #[serde(default = "default_missing_sentinels")]
    pub missing_sentinels: Vec<f64>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            state_code_column: default_state_code_column(),
            county_code_column: default_county_code_column(),
            fips_column: default_fips_column(),
            population_column: default_population_column(),
            target_column: default_target_column(),
            rate_columns: default_rate_columns(),
            count_columns: default_count_columns(),
            dropped_columns: default_dropped_columns(),
            missing_sentinels: default_missing_sentinels(),
        }
    }
}

impl CleaningConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: CleaningConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loading cleaning config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Reject configurations the pipeline cannot run consistently.
    pub fn validate(&self) -> Result<()> {
        if self.missing_sentinels.is_empty() {
            return Err(CleanError::InvalidConfig(
                "missing_sentinels must not be empty".into(),
            ));
        }

        let rates: BTreeSet<&str> = self.rate_columns.iter().map(String::as_str).collect();
        let overlap: Vec<&str> = self
            .count_columns
            .iter()
            .map(String::as_str)
            .filter(|c| rates.contains(c))
            .collect();
        if !overlap.is_empty() {
            return Err(CleanError::InvalidConfig(format!(
                "columns listed as both rate and count: {}",
                overlap.join(", ")
            )));
        }

        if self.count_columns.contains(&self.population_column)
            || self.rate_columns.contains(&self.population_column)
        {
            return Err(CleanError::InvalidConfig(format!(
                "population column '{}' cannot be rescaled",
                self.population_column
            )));
        }

        Ok(())
    }
}
