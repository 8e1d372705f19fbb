//! Loading and saving bench state through the host's key/value persistence.

use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::bench::codec::{self, DecodeReport};
use crate::bench::registry::BenchRegistry;
use crate::bench::zones::{CategoryResolver, ZoneNames};
use crate::category::FavoriteCategories;
use crate::host::PersistenceStore;

pub const BENCHES_KEY: &str = "benches";
pub const ZONE_RENAMES_KEY: &str = "zoneRenames";
pub const FAVORITE_CATEGORIES_KEY: &str = "favoriteCategories";

/// What happened while loading the bench list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub records: usize,
    pub anomalies: Vec<String>,
    pub migrated_from_flat: bool,
    /// Whether a normalizing re-save was scheduled.
    pub resave: bool,
    /// A stored payload existed but yielded no records; it was left untouched.
    pub unreadable: bool,
}

/// Session-scoped persistence coordinator.
///
/// A repaired or legacy payload is re-saved once; later loads in the same
/// session never schedule another normalization.
#[derive(Debug, Default)]
pub struct BenchStore {
    normalized_this_session: bool,
}

impl BenchStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(name = "bench_store_load", skip_all)]
    pub fn load_benches(
        &mut self,
        store: &dyn PersistenceStore,
        registry: &mut BenchRegistry,
        resolver: &CategoryResolver<'_>,
    ) -> LoadSummary {
        let raw = store.load_value(BENCHES_KEY).unwrap_or_default();
        let migrated_from_flat = !raw.trim().is_empty() && !codec::is_versioned(&raw);

        let report = if codec::is_versioned(&raw) {
            match codec::decode_versioned(&raw, resolver) {
                Ok(report) => report,
                Err(e) => {
                    // Keep whatever the flat parser can salvage instead of dropping the list.
                    warn!(error = %e, "Versioned bench list unreadable, trying flat parser");
                    let mut report = codec::decode_flat(&raw, resolver);
                    report.anomalies.push(format!("unreadable versioned payload: {}", e));
                    report
                }
            }
        } else {
            codec::decode_flat(&raw, resolver)
        };

        let DecodeReport {
            records,
            mut anomalies,
        } = report;
        registry.replace_records(records);

        let renamed = registry.normalize_legacy_names(resolver);
        if renamed > 0 {
            anomalies.push(format!("{} legacy bench names normalized", renamed));
        }
        if migrated_from_flat {
            anomalies.push("flat bench list migrated to versioned schema".to_string());
        }

        // A non-empty payload that yielded nothing stays on disk untouched.
        let salvaged_nothing = !raw.trim().is_empty() && registry.is_empty();
        if salvaged_nothing {
            warn!(bytes = raw.len(), "No bench records recovered, keeping stored payload");
            anomalies.push("no records recovered; stored payload left as is".to_string());
        }

        let resave = !anomalies.is_empty() && !salvaged_nothing && !self.normalized_this_session;
        if resave {
            self.normalized_this_session = true;
            registry.mark_dirty();
        } else {
            registry.mark_saved();
        }

        info!(
            records = registry.len(),
            anomalies = anomalies.len(),
            migrated_from_flat,
            resave,
            "Loaded bench list"
        );

        LoadSummary {
            records: registry.len(),
            anomalies,
            migrated_from_flat,
            resave,
            unreadable: salvaged_nothing,
        }
    }

    /// Write the registry if it has unsaved changes.
    #[instrument(name = "bench_store_save", skip_all)]
    pub fn save_benches(
        &self,
        store: &mut dyn PersistenceStore,
        registry: &mut BenchRegistry,
    ) -> Result<()> {
        if !registry.is_dirty() {
            return Ok(());
        }
        let payload = codec::encode_versioned(registry.records())
            .context("Failed to serialize bench list")?;
        store
            .save_value(BENCHES_KEY, &payload)
            .context("Failed to save bench list")?;
        registry.mark_saved();
        info!(records = registry.len(), bytes = payload.len(), "Saved bench list");
        Ok(())
    }
}

pub fn load_zone_names(store: &dyn PersistenceStore) -> ZoneNames {
    store
        .load_value(ZONE_RENAMES_KEY)
        .map(|raw| ZoneNames::parse(&raw))
        .unwrap_or_default()
}

pub fn save_zone_names(store: &mut dyn PersistenceStore, zones: &ZoneNames) -> Result<()> {
    store
        .save_value(ZONE_RENAMES_KEY, &zones.serialize())
        .context("Failed to save zone renames")
}

pub fn load_favorite_categories(store: &dyn PersistenceStore) -> FavoriteCategories {
    store
        .load_value(FAVORITE_CATEGORIES_KEY)
        .map(|raw| FavoriteCategories::parse(&raw))
        .unwrap_or_default()
}

pub fn save_favorite_categories(
    store: &mut dyn PersistenceStore,
    favorites: &FavoriteCategories,
) -> Result<()> {
    store
        .save_value(FAVORITE_CATEGORIES_KEY, &favorites.serialize())
        .context("Failed to save favorite categories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::record::BenchKey;
    use crate::config::RegistryConfig;
    use crate::sim::SimHost;

    fn host() -> SimHost {
        let mut host = SimHost::new("Town_01");
        host.add_zone("Town_01", "TOWN");
        host
    }

    #[test]
    fn test_flat_payload_migrates_once() {
        let mut host = host();
        host.storage
            .insert(BENCHES_KEY.to_string(), "Town_01|A|#1|TOWN|0|1|0|0".to_string());

        let mut store = BenchStore::new();
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        let zones = ZoneNames::new();
        let summary = {
            let resolver = CategoryResolver::new(&zones, &host);
            store.load_benches(&host, &mut registry, &resolver)
        };
        assert!(summary.migrated_from_flat);
        assert!(summary.resave);
        assert!(registry.is_dirty());

        store.save_benches(&mut host, &mut registry).unwrap();
        let saved = host.storage.get(BENCHES_KEY).unwrap().clone();
        assert!(codec::is_versioned(&saved));
        assert!(!registry.is_dirty());

        // Loading the normalized payload does not schedule another save
        let summary = {
            let resolver = CategoryResolver::new(&zones, &host);
            store.load_benches(&host, &mut registry, &resolver)
        };
        assert!(!summary.migrated_from_flat);
        assert!(!summary.resave);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&BenchKey::new("Town_01", "A")));
    }

    #[test]
    fn test_clean_versioned_payload_is_not_resaved() {
        let mut host = host();
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        registry.replace_records(vec![crate::bench::BenchRecord::new(
            BenchKey::new("Town_01", "A"),
            "#1",
            1,
        )]);
        registry.mark_dirty();
        BenchStore::new().save_benches(&mut host, &mut registry).unwrap();

        let mut fresh = BenchRegistry::new(&RegistryConfig::default());
        let zones = ZoneNames::new();
        let resolver = CategoryResolver::new(&zones, &host);
        let summary = BenchStore::new().load_benches(&host, &mut fresh, &resolver);
        assert!(summary.anomalies.is_empty(), "{:?}", summary.anomalies);
        assert!(!fresh.is_dirty());
    }

    #[test]
    fn test_versioned_payload_with_one_bad_record_keeps_the_rest() {
        let mut host = host();
        host.storage.insert(
            BENCHES_KEY.to_string(),
            r##"{"version":2,"benches":[
                {"scene":"Town_01","marker":"A","displayName":"Home","isRenamed":true,"addedOrder":1,"isFavorite":true,"favoriteOrder":1},
                {"scene":"Town_01","marker":"B","displayName":"#1","isRenamed":false,"addedOrder":"two","isFavorite":false},
                42
            ]}"##
                .to_string(),
        );

        let mut store = BenchStore::new();
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        let zones = ZoneNames::new();
        let summary = {
            let resolver = CategoryResolver::new(&zones, &host);
            store.load_benches(&host, &mut registry, &resolver)
        };
        assert_eq!(registry.len(), 2);
        assert!(summary.resave);
        assert!(!summary.unreadable);
        assert!(registry.get(&BenchKey::new("Town_01", "A")).unwrap().is_favorite);
        assert_eq!(registry.get(&BenchKey::new("Town_01", "B")).unwrap().added_order, 2);

        store.save_benches(&mut host, &mut registry).unwrap();
        let saved = host.storage.get(BENCHES_KEY).unwrap();
        assert!(saved.contains("\"marker\":\"A\"") && saved.contains("\"marker\":\"B\""));
    }

    #[test]
    fn test_unreadable_payload_is_never_overwritten() {
        let mut host = host();
        let raw = r#"{"version":2,"benches":[{"scene":"Town_01""#;
        host.storage.insert(BENCHES_KEY.to_string(), raw.to_string());

        let mut store = BenchStore::new();
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        let zones = ZoneNames::new();
        let summary = {
            let resolver = CategoryResolver::new(&zones, &host);
            store.load_benches(&host, &mut registry, &resolver)
        };
        assert!(registry.is_empty());
        assert!(summary.unreadable);
        assert!(!summary.resave);
        assert!(!registry.is_dirty());

        store.save_benches(&mut host, &mut registry).unwrap();
        assert_eq!(host.storage.get(BENCHES_KEY).map(String::as_str), Some(raw));
    }

    #[test]
    fn test_empty_storage_loads_empty_registry() {
        let host = host();
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        let zones = ZoneNames::new();
        let resolver = CategoryResolver::new(&zones, &host);
        let summary = BenchStore::new().load_benches(&host, &mut registry, &resolver);
        assert_eq!(summary.records, 0);
        assert!(!summary.resave);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_save_skipped_when_clean() {
        let mut host = host();
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        BenchStore::new().save_benches(&mut host, &mut registry).unwrap();
        assert!(host.storage.get(BENCHES_KEY).is_none());
    }

    #[test]
    fn test_save_failure_keeps_dirty() {
        let mut host = host();
        host.fail_saves = true;
        let mut registry = BenchRegistry::new(&RegistryConfig::default());
        registry.mark_dirty();
        assert!(BenchStore::new().save_benches(&mut host, &mut registry).is_err());
        assert!(registry.is_dirty());
    }

    #[test]
    fn test_zone_and_favorite_lists_roundtrip() {
        let mut host = host();
        let mut zones = ZoneNames::new();
        zones.insert("TOWN", "Home");
        save_zone_names(&mut host, &zones).unwrap();
        assert_eq!(load_zone_names(&host).get("TOWN"), Some("Home"));

        let mut favorites = FavoriteCategories::default();
        favorites.toggle("Home");
        favorites.toggle("Depths");
        save_favorite_categories(&mut host, &favorites).unwrap();
        assert_eq!(
            host.storage.get(FAVORITE_CATEGORIES_KEY).map(String::as_str),
            Some("Home;Depths")
        );
        assert_eq!(load_favorite_categories(&host).order_of("depths"), Some(1));
    }
}
