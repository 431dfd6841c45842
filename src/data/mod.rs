/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse cells → derive Year/Month/Severity/… → IncidentTable
///   └──────────┘   (bad cells become nulls + RowParseWarning)
///        │
///        ▼
///   ┌──────────┐
///   │  cache   │  one Arc<LoadedDataset> per unchanged file
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  (table, Selection) → IncidentView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  IncidentView → Dashboard (map, timeline, flows, …)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
