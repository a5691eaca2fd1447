/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  validate schema, parse rows, memoize per path
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ OpportunityTable │  Vec<Opportunity>, region/segment/stage universes
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  region ∧ segment inclusion sets → borrowed rows
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
