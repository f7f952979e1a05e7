//! Screen state for UI front-ends.
//!
//! Each screen owns a `watch` channel of `ScreenStatus`; a UI subscribes and
//! re-renders from the screen's accessors whenever the status changes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use crate::models::{Coordinate, Hero, Location, Transformation};
use crate::usecase::{ClearData, HeroCatalog, LoginService};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenStatus {
    Idle,
    Loading,
    DataUpdated,
    Error(String),
    Cleared,
}

/// Status channel shared by every screen
struct StatusChannel {
    tx: watch::Sender<ScreenStatus>,
}

impl StatusChannel {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(ScreenStatus::Idle);
        Self { tx }
    }

    fn publish(&self, status: ScreenStatus) {
        debug!(?status, "Screen status changed");
        self.tx.send_replace(status);
    }

    fn current(&self) -> ScreenStatus {
        self.tx.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ScreenStatus> {
        self.tx.subscribe()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Heroes list
// ============================================================================

pub struct HeroesScreen {
    catalog: Arc<HeroCatalog>,
    clear: Arc<ClearData>,
    status: StatusChannel,
    heroes: Mutex<Vec<Hero>>,
}

impl HeroesScreen {
    pub fn new(catalog: Arc<HeroCatalog>, clear: Arc<ClearData>) -> Self {
        Self {
            catalog,
            clear,
            status: StatusChannel::new(),
            heroes: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> ScreenStatus {
        self.status.current()
    }

    pub async fn load(&self, filter: Option<&str>) {
        self.status.publish(ScreenStatus::Loading);
        match self.catalog.load_heroes(filter).await {
            Ok(heroes) => {
                *lock(&self.heroes) = heroes;
                self.status.publish(ScreenStatus::DataUpdated);
            }
            Err(e) => self.status.publish(ScreenStatus::Error(e.to_string())),
        }
    }

    pub fn heroes(&self) -> Vec<Hero> {
        lock(&self.heroes).clone()
    }

    pub fn hero_count(&self) -> usize {
        lock(&self.heroes).len()
    }

    pub fn hero_at(&self, index: usize) -> Option<Hero> {
        lock(&self.heroes).get(index).cloned()
    }

    /// Flip the sort direction; takes effect on the next `load`
    pub fn toggle_sort(&self) -> bool {
        self.catalog.toggle_sort()
    }

    pub fn clear(&self) {
        match self.clear.clear_all_and_logout() {
            Ok(()) => {
                lock(&self.heroes).clear();
                self.status.publish(ScreenStatus::Cleared);
            }
            Err(e) => self.status.publish(ScreenStatus::Error(e.to_string())),
        }
    }
}

// ============================================================================
// Hero detail
// ============================================================================

/// A location ready to be dropped on a map
#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub title: String,
    pub coordinate: Coordinate,
    pub location: Location,
}

#[derive(Default)]
struct HeroDetail {
    locations: Vec<Location>,
    transformations: Vec<Transformation>,
}

pub struct HeroDetailScreen {
    catalog: Arc<HeroCatalog>,
    hero: Hero,
    status: StatusChannel,
    detail: Mutex<HeroDetail>,
}

impl HeroDetailScreen {
    pub fn new(catalog: Arc<HeroCatalog>, hero: Hero) -> Self {
        Self {
            catalog,
            hero,
            status: StatusChannel::new(),
            detail: Mutex::new(HeroDetail::default()),
        }
    }

    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> ScreenStatus {
        self.status.current()
    }

    /// Load locations and transformations; the first error wins.
    pub async fn load(&self) {
        self.status.publish(ScreenStatus::Loading);

        let locations = match self.catalog.load_locations(&self.hero.id).await {
            Ok(locations) => locations,
            Err(e) => {
                self.status.publish(ScreenStatus::Error(e.to_string()));
                return;
            }
        };
        let transformations = match self.catalog.load_transformations(&self.hero.id).await {
            Ok(transformations) => transformations,
            Err(e) => {
                self.status.publish(ScreenStatus::Error(e.to_string()));
                return;
            }
        };

        *lock(&self.detail) = HeroDetail {
            locations,
            transformations,
        };
        self.status.publish(ScreenStatus::DataUpdated);
    }

    /// Locations with a valid coordinate, titled with the hero's name
    pub fn map_points(&self) -> Vec<MapPoint> {
        lock(&self.detail)
            .locations
            .iter()
            .filter_map(|location| {
                Some(MapPoint {
                    title: self.hero.name.clone(),
                    coordinate: location.coordinate()?,
                    location: location.clone(),
                })
            })
            .collect()
    }

    pub fn locations(&self) -> Vec<Location> {
        lock(&self.detail).locations.clone()
    }

    pub fn transformations(&self) -> Vec<Transformation> {
        lock(&self.detail).transformations.clone()
    }
}

// ============================================================================
// Login
// ============================================================================

pub struct LoginScreen {
    login: Arc<LoginService>,
    status: StatusChannel,
}

impl LoginScreen {
    pub fn new(login: Arc<LoginService>) -> Self {
        Self {
            login,
            status: StatusChannel::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ScreenStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> ScreenStatus {
        self.status.current()
    }

    pub async fn login(&self, username: &str, password: &str) {
        if username.is_empty() {
            self.status
                .publish(ScreenStatus::Error("Username is empty".to_string()));
            return;
        }
        if password.is_empty() {
            self.status
                .publish(ScreenStatus::Error("Password is empty".to_string()));
            return;
        }

        self.status.publish(ScreenStatus::Loading);
        match self.login.login(username, password).await {
            Ok(()) => self.status.publish(ScreenStatus::DataUpdated),
            Err(e) => self.status.publish(ScreenStatus::Error(e.to_string())),
        }
    }
}
