//! Data layer: table model and file boundary.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → raw Table (sentinels still numeric)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  keys + named columns of Cell
//!   └──────────┘
//!        │   (cleaning pipeline, see `crate::clean`)
//!        ▼
//!   ┌──────────┐
//!   │  writer   │  Table → .csv / .parquet
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod writer;
