/// Data layer: raw row sets, ingestion, and the loaded tables.
///
/// Architecture:
/// ```text
///  day.csv / hour.csv (.json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  ingest   │  required columns, dates, codes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetStore  │  Arc<Table> daily + hourly, read-only
///   └──────────────┘
/// ```

pub mod ingest;
pub mod loader;
pub mod model;
pub mod raw;
pub mod store;
