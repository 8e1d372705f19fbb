use super::*;
use crate::bench::ZoneNames;
use crate::config::RegistryConfig;
use crate::sim::SimHost;

fn host() -> SimHost {
    let mut host = SimHost::new("Town_01");
    host.add_zone("Town_01", "TOWN");
    host.add_zone("Cave_01", "CAVE");
    host.add_zone("Peak_01", "peak");
    host
}

fn bench(scene: &str, marker: &str, name: &str, order: u64) -> BenchRecord {
    BenchRecord::new(BenchKey::new(scene, marker), name, order)
}

fn registry(records: Vec<BenchRecord>) -> BenchRegistry {
    let mut registry = BenchRegistry::new(&RegistryConfig::default());
    registry.replace_records(records);
    registry
}

fn names_in(index: &CategoryIndex, category: &str, registry: &BenchRegistry) -> Vec<String> {
    index
        .records_in(category, registry)
        .iter()
        .map(|r| r.display_name.clone())
        .collect()
}

#[test]
fn test_natural_sort_within_category() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);
    let favorites = FavoriteCategories::default();
    let registry = registry(vec![
        bench("Town_01", "a", "#2", 1),
        bench("Town_01", "b", "#10", 2),
        bench("Town_01", "c", "#3", 3),
    ]);

    let mut index = CategoryIndex::new();
    index.rebuild(&registry, &resolver, &favorites);
    assert_eq!(index.category_names(), &["TOWN".to_string()]);
    assert_eq!(names_in(&index, "TOWN", &registry), vec!["#2", "#3", "#10"]);
}

#[test]
fn test_category_order_favorites_then_alphabetical() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);
    let mut favorites = FavoriteCategories::default();
    let registry = registry(vec![
        bench("Town_01", "a", "#1", 1),
        bench("Cave_01", "b", "#1", 2),
        bench("Peak_01", "c", "#1", 3),
    ]);

    let mut index = CategoryIndex::new();
    index.rebuild(&registry, &resolver, &favorites);
    assert_eq!(index.category_names(), &["CAVE", "peak", "TOWN"]);

    favorites.toggle("TOWN");
    favorites.toggle("peak");
    assert!(index.ensure_fresh(&registry, &resolver, &favorites));
    assert_eq!(index.category_names(), &["TOWN", "peak", "CAVE"]);
}

#[test]
fn test_favorite_records_first() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);
    let favorites = FavoriteCategories::default();

    let mut late_fav = bench("Town_01", "x", "#9", 4);
    late_fav.is_favorite = true;
    late_fav.favorite_order = 2;
    let mut early_fav = bench("Town_01", "y", "Zed", 5);
    early_fav.is_favorite = true;
    early_fav.favorite_order = 1;
    let registry = registry(vec![
        bench("Town_01", "a", "#1", 1),
        late_fav,
        early_fav,
        bench("Town_01", "b", "Alpha", 2),
    ]);

    let mut index = CategoryIndex::new();
    index.rebuild(&registry, &resolver, &favorites);
    assert_eq!(
        names_in(&index, "TOWN", &registry),
        vec!["Zed", "#9", "#1", "Alpha"]
    );
}

#[test]
fn test_rebuild_is_idempotent() {
    let host = host();
    let zones = ZoneNames::parse("CAVE=Depths");
    let resolver = CategoryResolver::new(&zones, &host);
    let favorites = FavoriteCategories::parse("Depths");
    let registry = registry(vec![
        bench("Town_01", "a", "#2", 1),
        bench("Cave_01", "b", "#1", 2),
        bench("Town_01", "c", "Home", 3),
    ]);

    let mut index = CategoryIndex::new();
    index.rebuild(&registry, &resolver, &favorites);
    let first: Vec<(String, Vec<usize>)> = index
        .category_names()
        .iter()
        .map(|n| (n.clone(), index.indices(n).to_vec()))
        .collect();

    index.rebuild(&registry, &resolver, &favorites);
    let second: Vec<(String, Vec<usize>)> = index
        .category_names()
        .iter()
        .map(|n| (n.clone(), index.indices(n).to_vec()))
        .collect();

    assert_eq!(first, second);
    assert_eq!(first[0].0, "Depths");
}

#[test]
fn test_grouping_is_case_insensitive() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);
    let favorites = FavoriteCategories::default();

    let mut a = bench("Town_01", "a", "#1", 1);
    a.parent_category = Some("Route".into());
    let mut b = bench("Cave_01", "b", "#2", 2);
    b.parent_category = Some("route".into());
    let registry = registry(vec![a, b]);

    let mut index = CategoryIndex::new();
    index.rebuild(&registry, &resolver, &favorites);
    assert_eq!(index.category_count(), 1);
    assert_eq!(index.indices("ROUTE").len(), 2);
}

#[test]
fn test_ensure_fresh_tracks_revisions() {
    let host = host();
    let mut zones = ZoneNames::new();
    let favorites = FavoriteCategories::default();
    let mut registry = registry(vec![bench("Town_01", "a", "#1", 1)]);
    let mut index = CategoryIndex::new();

    {
        let resolver = CategoryResolver::new(&zones, &host);
        assert!(index.ensure_fresh(&registry, &resolver, &favorites));
        assert!(!index.ensure_fresh(&registry, &resolver, &favorites));
    }

    registry
        .rename(&BenchKey::new("Town_01", "a"), "Home")
        .unwrap();
    {
        let resolver = CategoryResolver::new(&zones, &host);
        assert!(index.ensure_fresh(&registry, &resolver, &favorites));
    }

    zones.insert("TOWN", "Village");
    let resolver = CategoryResolver::new(&zones, &host);
    assert!(index.ensure_fresh(&registry, &resolver, &favorites));
    assert_eq!(index.category_names(), &["Village"]);

    index.mark_dirty();
    assert!(index.ensure_fresh(&registry, &resolver, &favorites));
}

#[test]
fn test_locate() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);
    let favorites = FavoriteCategories::default();
    let registry = registry(vec![
        bench("Town_01", "a", "#1", 1),
        bench("Cave_01", "b", "#1", 2),
        bench("Cave_01", "c", "#2", 3),
    ]);

    let mut index = CategoryIndex::new();
    index.rebuild(&registry, &resolver, &favorites);
    assert_eq!(index.locate(&BenchKey::new("Cave_01", "c"), &registry), Some((0, 1)));
    assert_eq!(index.locate(&BenchKey::new("Town_01", "a"), &registry), Some((1, 0)));
    assert_eq!(index.locate(&BenchKey::new("Nope", "x"), &registry), None);
    assert!(index.indices("Missing").is_empty());
}
