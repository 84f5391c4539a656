/// Data layer: core types, loading, and aggregation.
///
/// Architecture:
/// ```text
///  german_credit.zip
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  unzip → pick data file → parse → drop index column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Column>, typed cells
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌───────────┐
///   │ binning   │   │ aggregate │  grouped counts, per-group values
///   └──────────┘   └───────────┘
///                        │
///                        ▼
///                   ┌──────────┐
///                   │  stats    │  summaries, box geometry, KDE
///                   └──────────┘
/// ```

pub mod aggregate;
pub mod binning;
pub mod loader;
pub mod model;
pub mod stats;
