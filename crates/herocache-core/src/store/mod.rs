//! Persistent offline cache.
//!
//! Heroes, locations and transformations live in a single SQLite database.
//! Child rows reference their hero by id; a child whose hero is not yet stored
//! is kept as an orphan. Ids are unique per kind and re-inserting an existing
//! id is a no-op.

mod filter;
mod hero_store;
mod migrations;
mod records;

pub use filter::HeroFilter;
pub use hero_store::HeroStore;
pub use records::{HeroRecord, InsertSummary, LocationRecord, StoreCounts, TransformationRecord};
