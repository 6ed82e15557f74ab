/// Data layer: core types, loading, filtering, projection and ordering.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → ProteinTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  contaminant / identifier exclusion, score gate → row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  matrix  │  condition mapping → ScoreMatrix
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  order   │  category lists, then score rank → RowOrder
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod matrix;
pub mod model;
pub mod order;
