//! Error type shared by every cleaning step.

use crate::data::model::RowKey;

pub type Result<T> = std::result::Result<T, CleanError>;

#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// One or more referenced columns are absent from the table.
    #[error("missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A geographic sub-code cannot be coerced to a non-negative integer.
    #[error("column '{column}', key {key}: cannot use '{value}' as a FIPS sub-code")]
    InvalidCode {
        column: String,
        key: RowKey,
        value: String,
    },

    #[error("column '{column}', key {key}: expected a numeric value")]
    NonNumeric { column: String, key: RowKey },

    /// Every value of the column is missing, so no mean exists to impute with.
    #[error("column '{0}' has no non-missing values to compute a mean from")]
    DegenerateColumn(String),

    /// A step computed a value that coincides with a missing-value code.
    #[error("column '{column}', key {key}: computed value {value} collides with a missing-value code")]
    ComputedSentinel {
        column: String,
        key: RowKey,
        value: f64,
    },

    #[error("column '{column}' has {got} cells but the table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate record key {0}")]
    DuplicateKey(RowKey),

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),

    #[error("invalid cleaning configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse cleaning configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
