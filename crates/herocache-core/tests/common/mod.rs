#![allow(dead_code)]

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use herocache_core::api::{ApiHero, ApiLocation, ApiTransformation, HeroApi};
use herocache_core::utils::fold_key;
use herocache_core::{Error, Result};

/// Substring match ignoring case and diacritics
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold_key(haystack).contains(&fold_key(needle))
}

/// Name order used by the store: folded form first, raw string as tie-breaker
pub fn cmp_folded(a: &str, b: &str) -> CmpOrdering {
    fold_key(a).cmp(&fold_key(b)).then_with(|| a.cmp(b))
}

/// The 26 heroes served by the fixture API.
pub fn fixture_heroes() -> Vec<ApiHero> {
    serde_json::from_str(include_str!("../fixtures/heroes.json"))
        .expect("Failed to parse heroes fixture")
}

pub fn hero(id: &str, name: &str) -> ApiHero {
    ApiHero {
        id: Some(id.into()),
        name: Some(name.into()),
        description: Some(format!("About {}", name)),
        photo: Some(format!("https://example.com/{}.jpg", id)),
        favorite: Some(false),
    }
}

pub fn location(id: &str, hero_id: Option<&str>) -> ApiLocation {
    ApiLocation {
        id: Some(id.into()),
        date: Some("2022-09-26T00:00:00Z".into()),
        latitude: Some("35.71867899343361".into()),
        longitude: Some("139.8202084625344".into()),
        hero: hero_id.map(ApiHero::reference),
    }
}

pub fn transformation(id: &str, name: &str, hero_id: Option<&str>) -> ApiTransformation {
    ApiTransformation {
        id: Some(id.into()),
        name: Some(name.into()),
        photo: Some(format!("https://example.com/{}.jpg", id)),
        description: Some(format!("{} transformation", name)),
        hero: hero_id.map(ApiHero::reference),
    }
}

/// In-process `HeroApi` with canned payloads and per-endpoint call counters.
#[derive(Default)]
pub struct StubApi {
    pub heroes: Mutex<Vec<ApiHero>>,
    pub locations: Vec<ApiLocation>,
    pub transformations: Vec<ApiTransformation>,
    pub failure: Option<Error>,
    /// Heroes whose location fetch fails with `ApiStatus(500)`
    pub broken_locations: HashSet<String>,
    pub hero_calls: AtomicUsize,
    pub location_calls: AtomicUsize,
    pub transformation_calls: AtomicUsize,
}

impl StubApi {
    pub fn with_heroes(heroes: Vec<ApiHero>) -> Self {
        Self {
            heroes: Mutex::new(heroes),
            ..Default::default()
        }
    }

    pub fn failing(error: Error) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn set_heroes(&self, heroes: Vec<ApiHero>) {
        *self.heroes.lock().unwrap() = heroes;
    }

    pub fn total_calls(&self) -> usize {
        self.hero_calls.load(Ordering::SeqCst)
            + self.location_calls.load(Ordering::SeqCst)
            + self.transformation_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match self.failure {
            Some(ref e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

fn owned_by(hero: &Option<ApiHero>, hero_id: &str) -> bool {
    hero.as_ref().and_then(|h| h.id.as_deref()) == Some(hero_id)
}

#[async_trait]
impl HeroApi for StubApi {
    async fn load_heroes(&self, name: &str) -> Result<Vec<ApiHero>> {
        self.hero_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .heroes
            .lock()
            .unwrap()
            .iter()
            .filter(|h| contains_folded(h.name.as_deref().unwrap_or_default(), name))
            .cloned()
            .collect())
    }

    async fn load_locations(&self, hero_id: &str) -> Result<Vec<ApiLocation>> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        if self.broken_locations.contains(hero_id) {
            return Err(Error::ApiStatus(500));
        }
        Ok(self
            .locations
            .iter()
            .filter(|l| owned_by(&l.hero, hero_id))
            .cloned()
            .collect())
    }

    async fn load_transformations(&self, hero_id: &str) -> Result<Vec<ApiTransformation>> {
        self.transformation_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .transformations
            .iter()
            .filter(|t| owned_by(&t.hero, hero_id))
            .cloned()
            .collect())
    }

    async fn login(&self, _username: &str, _password: &str) -> Result<String> {
        self.check()?;
        Ok("stub-token".to_string())
    }
}
