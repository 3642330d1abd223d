/// Data layer: yearly schemas, loading, and the aggregation pipeline.
///
/// Architecture:
/// ```text
///  <year>.csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  year → column names, display names
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (cached per year)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region predicate on trimmed values
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group by country, sum, sort → SeriesSet
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
