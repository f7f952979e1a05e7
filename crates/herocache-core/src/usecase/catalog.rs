//! Cache-or-fetch reconciliation.
//!
//! Every read goes to the store first. A non-empty local result is returned
//! as-is and the network is never touched; an empty one triggers a single
//! fetch, after which the store is re-read so callers always see persisted
//! state. `refresh_heroes` is the only path that bypasses the cache.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::api::HeroApi;
use crate::error::{Error, Result};
use crate::models::{Hero, Location, Transformation};
use crate::store::{HeroFilter, HeroRecord, HeroStore};

pub struct HeroCatalog {
    store: Arc<HeroStore>,
    api: Arc<dyn HeroApi>,
    ascending: AtomicBool,
}

impl HeroCatalog {
    pub fn new(store: Arc<HeroStore>, api: Arc<dyn HeroApi>) -> Self {
        Self {
            store,
            api,
            ascending: AtomicBool::new(true),
        }
    }

    pub fn store(&self) -> &Arc<HeroStore> {
        &self.store
    }

    pub fn sort_ascending(&self) -> bool {
        self.ascending.load(Ordering::Relaxed)
    }

    pub fn set_sort_ascending(&self, ascending: bool) {
        self.ascending.store(ascending, Ordering::Relaxed);
    }

    /// Flip the sort direction and return the new value
    pub fn toggle_sort(&self) -> bool {
        !self.ascending.fetch_xor(true, Ordering::Relaxed)
    }

    /// Heroes matching `filter` (name substring, case and diacritic
    /// insensitive), fetched from the API only when nothing matches locally.
    pub async fn load_heroes(&self, filter: Option<&str>) -> Result<Vec<Hero>> {
        let hero_filter = HeroFilter::from_name(filter);
        let cached = self.fetch_heroes(&hero_filter)?;
        if !cached.is_empty() {
            debug!(count = cached.len(), ?filter, "Heroes served from cache");
            return Ok(cached);
        }

        debug!(?filter, "No cached heroes, fetching from API");
        let name = filter.map(str::trim).unwrap_or_default();
        let payload = self.api.load_heroes(name).await.map_err(|e| {
            warn!(error = %e, "Failed to fetch heroes");
            e
        })?;
        self.store.insert_heroes(&payload)?;

        self.fetch_heroes(&hero_filter)
    }

    /// Always fetch heroes from the API and overwrite what is stored for
    /// the returned ids.
    pub async fn refresh_heroes(&self, filter: Option<&str>) -> Result<Vec<Hero>> {
        let name = filter.map(str::trim).unwrap_or_default();
        let payload = self.api.load_heroes(name).await.map_err(|e| {
            warn!(error = %e, "Failed to refresh heroes");
            e
        })?;
        let summary = self.store.merge_heroes(&payload)?;
        debug!(merged = summary.inserted, "Heroes refreshed");

        self.fetch_heroes(&HeroFilter::from_name(filter))
    }

    /// Locations for a stored hero, in insertion order.
    pub async fn load_locations(&self, hero_id: &str) -> Result<Vec<Location>> {
        let hero = self.require_hero(hero_id)?;

        let cached = self.store.locations_for_hero(&hero.id)?;
        if !cached.is_empty() {
            debug!(hero_id = %hero.id, count = cached.len(), "Locations served from cache");
            return Ok(cached.into_iter().map(Location::from).collect());
        }

        let payload = self.api.load_locations(&hero.id).await.map_err(|e| {
            warn!(hero_id = %hero.id, error = %e, "Failed to fetch locations");
            e
        })?;
        self.store.insert_locations(&payload)?;

        Ok(self
            .store
            .locations_for_hero(&hero.id)?
            .into_iter()
            .map(Location::from)
            .collect())
    }

    /// Transformations for a stored hero, ordered by name.
    pub async fn load_transformations(&self, hero_id: &str) -> Result<Vec<Transformation>> {
        let hero = self.require_hero(hero_id)?;

        let cached = self.store.transformations_for_hero(&hero.id)?;
        if !cached.is_empty() {
            debug!(hero_id = %hero.id, count = cached.len(), "Transformations served from cache");
            return Ok(cached.into_iter().map(Transformation::from).collect());
        }

        let payload = self.api.load_transformations(&hero.id).await.map_err(|e| {
            warn!(hero_id = %hero.id, error = %e, "Failed to fetch transformations");
            e
        })?;
        self.store.insert_transformations(&payload)?;

        Ok(self
            .store
            .transformations_for_hero(&hero.id)?
            .into_iter()
            .map(Transformation::from)
            .collect())
    }

    fn fetch_heroes(&self, filter: &HeroFilter) -> Result<Vec<Hero>> {
        Ok(self
            .store
            .fetch_heroes(filter, self.sort_ascending())?
            .into_iter()
            .map(Hero::from)
            .collect())
    }

    fn require_hero(&self, hero_id: &str) -> Result<HeroRecord> {
        self.store.fetch_hero(hero_id)?.ok_or_else(|| {
            debug!(hero_id, "Hero not in store");
            Error::HeroNotFound(hero_id.to_string())
        })
    }
}
