mod common;

use common::{fixture_heroes, hero, location, transformation};
use herocache_core::api::{ApiHero, ApiLocation};
use herocache_core::store::{HeroFilter, HeroStore, InsertSummary};
use herocache_core::Location;

fn names(store: &HeroStore, filter: &HeroFilter, ascending: bool) -> Vec<String> {
    store
        .fetch_heroes(filter, ascending)
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect()
}

#[test]
fn test_insert_is_idempotent() {
    let store = HeroStore::open_in_memory().unwrap();
    let heroes = fixture_heroes();

    let first = store.insert_heroes(&heroes).unwrap();
    assert_eq!(first, InsertSummary { inserted: 26, skipped: 0 });

    let second = store.insert_heroes(&heroes).unwrap();
    assert_eq!(second, InsertSummary { inserted: 0, skipped: 26 });
    assert_eq!(store.counts().unwrap().heroes, 26);
}

#[test]
fn test_incomplete_records_are_skipped_not_fatal() {
    let store = HeroStore::open_in_memory().unwrap();
    let nameless = ApiHero {
        id: Some("h9".into()),
        ..Default::default()
    };
    let summary = store
        .insert_heroes(&[hero("h1", "Goku"), nameless, hero(" ", "Blank id")])
        .unwrap();
    assert_eq!(summary, InsertSummary { inserted: 1, skipped: 2 });

    let no_coords = ApiLocation {
        latitude: None,
        ..location("l1", Some("h1"))
    };
    let summary = store.insert_locations(&[no_coords]).unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(store.counts().unwrap().locations, 0);
}

#[test]
fn test_sort_order_both_directions() {
    let store = HeroStore::open_in_memory().unwrap();
    store
        .insert_heroes(&[hero("h1", "Luis"), hero("h2", "Alberto")])
        .unwrap();

    assert_eq!(names(&store, &HeroFilter::all(), true), ["Alberto", "Luis"]);
    assert_eq!(names(&store, &HeroFilter::all(), false), ["Luis", "Alberto"]);
}

#[test]
fn test_sort_ignores_case_and_accents() {
    let store = HeroStore::open_in_memory().unwrap();
    store
        .insert_heroes(&[
            hero("h1", "vegeta"),
            hero("h2", "Ángel"),
            hero("h3", "Bulma"),
        ])
        .unwrap();

    assert_eq!(
        names(&store, &HeroFilter::all(), true),
        ["Ángel", "Bulma", "vegeta"]
    );
}

#[test]
fn test_name_filter_is_case_and_diacritic_insensitive() {
    let store = HeroStore::open_in_memory().unwrap();
    store
        .insert_heroes(&[hero("h1", "Gokú"), hero("h2", "Vegeta"), hero("h3", "100%")])
        .unwrap();

    assert_eq!(names(&store, &HeroFilter::name_contains("goku"), true), ["Gokú"]);
    assert_eq!(names(&store, &HeroFilter::name_contains("GOK"), true), ["Gokú"]);
    assert!(names(&store, &HeroFilter::name_contains("Freezer"), true).is_empty());

    // LIKE wildcards in user input are literal
    assert_eq!(names(&store, &HeroFilter::name_contains("%"), true), ["100%"]);
}

#[test]
fn test_filter_by_id_and_favorite() {
    let store = HeroStore::open_in_memory().unwrap();
    store.insert_heroes(&fixture_heroes()).unwrap();

    let favorites = names(&store, &HeroFilter::all().favorites(true), true);
    assert_eq!(favorites, ["Goku", "Vegeta"]);

    let goku_id = store.fetch_heroes(&HeroFilter::name_contains("Goku"), true).unwrap()[0]
        .id
        .clone();
    assert_eq!(names(&store, &HeroFilter::by_id(goku_id), true), ["Goku"]);
}

#[test]
fn test_children_are_wired_to_stored_hero() {
    let store = HeroStore::open_in_memory().unwrap();
    store.insert_heroes(&[hero("h1", "Goku")]).unwrap();
    store
        .insert_locations(&[location("l1", Some("h1")), location("l2", Some("h1"))])
        .unwrap();
    store
        .insert_transformations(&[transformation("t1", "Super Saiyan", Some("h1"))])
        .unwrap();

    let locations = store.locations_for_hero("h1").unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].hero_id.as_deref(), Some("h1"));
    assert_eq!(store.transformations_for_hero("h1").unwrap().len(), 1);

    let location = Location::from(store.fetch_location("l1").unwrap().unwrap());
    let coordinate = location.coordinate().unwrap();
    assert!((coordinate.latitude - 35.71867899343361).abs() < 1e-9);
}

#[test]
fn test_orphan_stays_orphan_after_late_hero_insert() {
    let store = HeroStore::open_in_memory().unwrap();
    store.insert_locations(&[location("l1", Some("h1"))]).unwrap();
    store
        .insert_transformations(&[transformation("t1", "Super Saiyan", Some("h1"))])
        .unwrap();

    store.insert_heroes(&[hero("h1", "Goku")]).unwrap();

    assert!(store.fetch_location("l1").unwrap().unwrap().hero_id.is_none());
    assert!(store.fetch_transformation("t1").unwrap().unwrap().hero_id.is_none());
    assert!(store.locations_for_hero("h1").unwrap().is_empty());
    assert!(store.transformations_for_hero("h1").unwrap().is_empty());
}

#[test]
fn test_clear_all_empties_every_kind() {
    let store = HeroStore::open_in_memory().unwrap();
    store.insert_heroes(&[hero("h1", "Goku")]).unwrap();
    store.insert_locations(&[location("l1", Some("h1"))]).unwrap();
    store
        .insert_transformations(&[transformation("t1", "Kaioken", None)])
        .unwrap();

    store.clear_all().unwrap();
    assert!(store.counts().unwrap().is_empty());

    // Cleared ids can be inserted again
    let summary = store.insert_heroes(&[hero("h1", "Goku")]).unwrap();
    assert_eq!(summary.inserted, 1);
}

#[test]
fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("heroes.sqlite3");

    {
        let store = HeroStore::open(&path).unwrap();
        store.insert_heroes(&fixture_heroes()).unwrap();
    }

    let store = HeroStore::open(&path).unwrap();
    assert_eq!(store.counts().unwrap().heroes, 26);
}
