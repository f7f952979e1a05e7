//! Rows as persisted in the local store.

use rusqlite::Row;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroRecord {
    pub id: String,
    pub name: String,
    pub info: String,
    pub photo: String,
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRecord {
    pub id: String,
    pub date: String,
    pub latitude: String,
    pub longitude: String,
    /// Owning hero; `None` for orphans
    pub hero_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformationRecord {
    pub id: String,
    pub name: String,
    pub info: String,
    pub photo: String,
    /// Owning hero; `None` for orphans
    pub hero_id: Option<String>,
}

/// Outcome of an insert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Number of rows per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub heroes: usize,
    pub locations: usize,
    pub transformations: usize,
}

impl StoreCounts {
    pub fn is_empty(&self) -> bool {
        self.heroes == 0 && self.locations == 0 && self.transformations == 0
    }
}

pub(crate) const HERO_COLUMNS: &str = "id, name, info, photo, favorite";
pub(crate) const LOCATION_COLUMNS: &str = "id, date, latitude, longitude, hero_id";
pub(crate) const TRANSFORMATION_COLUMNS: &str = "id, name, info, photo, hero_id";

pub(crate) fn hero_from_row(row: &Row<'_>) -> rusqlite::Result<HeroRecord> {
    Ok(HeroRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        info: row.get(2)?,
        photo: row.get(3)?,
        favorite: row.get::<_, i64>(4)? != 0,
    })
}

pub(crate) fn location_from_row(row: &Row<'_>) -> rusqlite::Result<LocationRecord> {
    Ok(LocationRecord {
        id: row.get(0)?,
        date: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        hero_id: row.get(4)?,
    })
}

pub(crate) fn transformation_from_row(row: &Row<'_>) -> rusqlite::Result<TransformationRecord> {
    Ok(TransformationRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        info: row.get(2)?,
        photo: row.get(3)?,
        hero_id: row.get(4)?,
    })
}
