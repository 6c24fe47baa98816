//! Data layer: core types and loading.
//!
//! Architecture:
//! ```text
//!  imageN.txt / .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file(s) → PixelDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────────┐
//!   │ PixelDataset │  Vec<Observation>, sorted source set
//!   └──────────────┘
//! ```

pub mod loader;
pub mod model;
