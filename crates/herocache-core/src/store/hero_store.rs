//! SQLite-backed store for heroes, locations and transformations.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use tracing::{debug, info, warn};

use super::filter::HeroFilter;
use super::migrations::apply_migrations;
use super::records::{
    hero_from_row, location_from_row, transformation_from_row, HeroRecord, InsertSummary,
    LocationRecord, StoreCounts, TransformationRecord, HERO_COLUMNS, LOCATION_COLUMNS,
    TRANSFORMATION_COLUMNS,
};
use crate::api::wire::{present, ApiHero, ApiLocation, ApiTransformation};
use crate::error::{Error, Result};
use crate::utils::fold_key;

/// Local relational cache. Share it as `Arc<HeroStore>`; every operation
/// takes the connection lock for its whole duration.
pub struct HeroStore {
    conn: Mutex<Connection>,
}

impl HeroStore {
    /// Open (or create) a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::store)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let journal_mode: String =
            conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        debug!(path = %path.display(), journal_mode = %journal_mode, "Opened hero store");
        Self::init(conn)
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::init(conn)
    }

    fn init(mut conn: Connection) -> Result<Self> {
        apply_migrations(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::store(format!("store lock poisoned: {}", e)))
    }

    // ===== Heroes =====

    /// Insert heroes, skipping incomplete records and ids already stored.
    pub fn insert_heroes(&self, heroes: &[ApiHero]) -> Result<InsertSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = InsertSummary::default();

        for hero in heroes {
            let Some((id, name)) = hero_keys(hero) else {
                debug!(id = ?hero.id, "Skipping hero with missing id or name");
                summary.skipped += 1;
                continue;
            };

            let changed = tx.execute(
                "INSERT INTO heroes (id, name, name_key, info, photo, favorite)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    id,
                    name,
                    fold_key(name),
                    hero.description.as_deref().unwrap_or_default(),
                    hero.photo.as_deref().unwrap_or_default(),
                    hero.favorite.unwrap_or(false),
                ],
            )?;

            if changed == 0 {
                debug!(id, "Skipping hero already stored");
                summary.skipped += 1;
            } else {
                summary.inserted += 1;
            }
        }

        tx.commit()?;
        debug!(inserted = summary.inserted, skipped = summary.skipped, "Inserted heroes");
        Ok(summary)
    }

    /// Insert or overwrite heroes, last writer wins. Used by explicit refresh.
    pub fn merge_heroes(&self, heroes: &[ApiHero]) -> Result<InsertSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = InsertSummary::default();

        for hero in heroes {
            let Some((id, name)) = hero_keys(hero) else {
                debug!(id = ?hero.id, "Skipping hero with missing id or name");
                summary.skipped += 1;
                continue;
            };

            tx.execute(
                "INSERT INTO heroes (id, name, name_key, info, photo, favorite)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    name_key = excluded.name_key,
                    info = excluded.info,
                    photo = excluded.photo,
                    favorite = excluded.favorite",
                params![
                    id,
                    name,
                    fold_key(name),
                    hero.description.as_deref().unwrap_or_default(),
                    hero.photo.as_deref().unwrap_or_default(),
                    hero.favorite.unwrap_or(false),
                ],
            )?;
            summary.inserted += 1;
        }

        tx.commit()?;
        debug!(merged = summary.inserted, skipped = summary.skipped, "Merged heroes");
        Ok(summary)
    }

    /// Fetch heroes matching `filter`, ordered by name.
    pub fn fetch_heroes(&self, filter: &HeroFilter, ascending: bool) -> Result<Vec<HeroRecord>> {
        let (clause, values) = filter.to_sql();
        let direction = if ascending { "ASC" } else { "DESC" };
        let sql = format!(
            "SELECT {HERO_COLUMNS} FROM heroes{clause}
             ORDER BY name_key {direction}, name {direction}, id {direction}"
        );

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let heroes = stmt
            .query_map(params_from_iter(values.iter()), hero_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(heroes)
    }

    pub fn fetch_hero(&self, id: &str) -> Result<Option<HeroRecord>> {
        let conn = self.lock()?;
        let hero = conn
            .query_row(
                &format!("SELECT {HERO_COLUMNS} FROM heroes WHERE id = ?1"),
                [id],
                hero_from_row,
            )
            .optional()?;
        Ok(hero)
    }

    // ===== Locations =====

    /// Insert locations, wiring each to its hero when that hero is stored.
    pub fn insert_locations(&self, locations: &[ApiLocation]) -> Result<InsertSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = InsertSummary::default();

        for location in locations {
            let (Some(id), Some(latitude), Some(longitude)) = (
                present(&location.id),
                present(&location.latitude),
                present(&location.longitude),
            ) else {
                debug!(id = ?location.id, "Skipping location with missing id or coordinates");
                summary.skipped += 1;
                continue;
            };

            let hero_id = resolve_hero(&tx, location.hero_id())?;
            let changed = tx.execute(
                "INSERT INTO locations (id, date, latitude, longitude, hero_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    id,
                    location.date.as_deref().unwrap_or_default(),
                    latitude,
                    longitude,
                    hero_id,
                ],
            )?;

            if changed == 0 {
                debug!(id, "Skipping location already stored");
                summary.skipped += 1;
            } else {
                summary.inserted += 1;
            }
        }

        tx.commit()?;
        debug!(inserted = summary.inserted, skipped = summary.skipped, "Inserted locations");
        Ok(summary)
    }

    /// Locations owned by a hero, in insertion order
    pub fn locations_for_hero(&self, hero_id: &str) -> Result<Vec<LocationRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE hero_id = ?1 ORDER BY seq"
        ))?;
        let locations = stmt
            .query_map([hero_id], location_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(locations)
    }

    pub fn fetch_location(&self, id: &str) -> Result<Option<LocationRecord>> {
        let conn = self.lock()?;
        let location = conn
            .query_row(
                &format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1"),
                [id],
                location_from_row,
            )
            .optional()?;
        Ok(location)
    }

    // ===== Transformations =====

    /// Insert transformations, wiring each to its hero when that hero is stored.
    pub fn insert_transformations(
        &self,
        transformations: &[ApiTransformation],
    ) -> Result<InsertSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut summary = InsertSummary::default();

        for transformation in transformations {
            let (Some(id), Some(name)) = (present(&transformation.id), present(&transformation.name))
            else {
                debug!(id = ?transformation.id, "Skipping transformation with missing id or name");
                summary.skipped += 1;
                continue;
            };

            let hero_id = resolve_hero(&tx, transformation.hero_id())?;
            let changed = tx.execute(
                "INSERT INTO transformations (id, name, name_key, info, photo, hero_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO NOTHING",
                params![
                    id,
                    name,
                    fold_key(name),
                    transformation.description.as_deref().unwrap_or_default(),
                    transformation.photo.as_deref().unwrap_or_default(),
                    hero_id,
                ],
            )?;

            if changed == 0 {
                debug!(id, "Skipping transformation already stored");
                summary.skipped += 1;
            } else {
                summary.inserted += 1;
            }
        }

        tx.commit()?;
        debug!(
            inserted = summary.inserted,
            skipped = summary.skipped,
            "Inserted transformations"
        );
        Ok(summary)
    }

    /// Transformations owned by a hero, ordered by name
    pub fn transformations_for_hero(&self, hero_id: &str) -> Result<Vec<TransformationRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRANSFORMATION_COLUMNS} FROM transformations
             WHERE hero_id = ?1 ORDER BY name_key, name, seq"
        ))?;
        let transformations = stmt
            .query_map([hero_id], transformation_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transformations)
    }

    pub fn fetch_transformation(&self, id: &str) -> Result<Option<TransformationRecord>> {
        let conn = self.lock()?;
        let transformation = conn
            .query_row(
                &format!("SELECT {TRANSFORMATION_COLUMNS} FROM transformations WHERE id = ?1"),
                [id],
                transformation_from_row,
            )
            .optional()?;
        Ok(transformation)
    }

    // ===== Maintenance =====

    pub fn counts(&self) -> Result<StoreCounts> {
        let conn = self.lock()?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(usize::try_from(n).unwrap_or_default())
        };
        Ok(StoreCounts {
            heroes: count("heroes")?,
            locations: count("locations")?,
            transformations: count("transformations")?,
        })
    }

    /// Remove every record of every kind. All-or-nothing: on failure the
    /// transaction rolls back and the previous contents stay readable.
    pub fn clear_all(&self) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for table in ["locations", "transformations", "heroes"] {
            if let Err(e) = tx.execute(&format!("DELETE FROM {table}"), []) {
                warn!(table, error = %e, "Clearing store failed, rolling back");
                return Err(e.into());
            }
        }

        tx.commit()?;
        info!("Cleared hero store");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn execute_batch_for_tests(&self, sql: &str) -> Result<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }
}

/// Trimmed id and name, or `None` if either is missing
fn hero_keys(hero: &ApiHero) -> Option<(&str, &str)> {
    Some((present(&hero.id)?, present(&hero.name)?))
}

/// The hero id to store on a child row: the embedded id if that hero exists,
/// otherwise `None` (orphan).
fn resolve_hero(tx: &Transaction<'_>, hero_id: Option<&str>) -> Result<Option<String>> {
    let Some(hero_id) = hero_id else {
        return Ok(None);
    };

    let found: Option<String> = tx
        .query_row("SELECT id FROM heroes WHERE id = ?1", [hero_id], |row| row.get(0))
        .optional()?;

    if found.is_none() {
        debug!(hero_id, "Referenced hero not stored, keeping child as orphan");
    }
    Ok(found)
}
