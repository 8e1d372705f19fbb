//! Zone display names and category resolution.

use crate::bench::record::BenchRecord;
use crate::host::WorldQuery;

const UNKNOWN_CATEGORY: &str = "Unknown";

/// User renames of zone categories, `zoneKey -> displayName`.
///
/// Keys compare case-insensitively. Insertion order is kept so the
/// serialized form is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneNames {
    entries: Vec<(String, String)>,
    revision: u64,
}

fn sanitize(value: &str) -> String {
    value.chars().filter(|c| *c != ';' && *c != '=').collect::<String>().trim().to_string()
}

impl ZoneNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value;key=value`. Malformed pairs are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut names = Self::new();
        for pair in raw.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            names.insert(key, value);
        }
        names.revision = 0;
        names
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| (sanitize(k), sanitize(v)))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Key whose display name equals `value` (case-insensitive).
    pub fn key_for_value(&self, value: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, v)| v.eq_ignore_ascii_case(value))
            .map(|(k, _)| k.as_str())
    }

    pub fn insert(&mut self, key: &str, value: &str) {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
        self.revision = self.revision.wrapping_add(1);
    }

    /// Replace every mapping whose display name is `old` with `new`.
    /// Returns how many mappings changed.
    pub fn rename_value(&mut self, old: &str, new: &str) -> usize {
        let mut changed = 0;
        for (_, v) in self.entries.iter_mut() {
            if v.eq_ignore_ascii_case(old) {
                *v = new.to_string();
                changed += 1;
            }
        }
        if changed > 0 {
            self.revision = self.revision.wrapping_add(1);
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bumped on every change; used to invalidate derived views.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Resolves the category key of a record against the rename map and the
/// host's zone taxonomy.
pub struct CategoryResolver<'a> {
    zones: &'a ZoneNames,
    world: &'a dyn WorldQuery,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(zones: &'a ZoneNames, world: &'a dyn WorldQuery) -> Self {
        Self { zones, world }
    }

    pub fn category_for(&self, record: &BenchRecord) -> String {
        match record.parent_category.as_deref().map(str::trim) {
            Some(parent) if !parent.is_empty() => self.category_for_parent(record.scene(), parent),
            _ => self.category_for_scene(record.scene()),
        }
    }

    fn category_for_parent(&self, scene: &str, parent: &str) -> String {
        if let Some(mapped) = self.zones.get(parent) {
            return mapped.to_string();
        }
        let is_own_zone = self
            .world
            .zone_key(scene)
            .is_some_and(|zone| zone.eq_ignore_ascii_case(parent));
        if is_own_zone {
            if let Some(localized) = self.world.localized_zone_name(parent) {
                return localized;
            }
        }
        parent.to_string()
    }

    /// Category of a record with no explicit parent.
    pub fn category_for_scene(&self, scene: &str) -> String {
        let Some(zone) = self.world.zone_key(scene).filter(|z| !z.trim().is_empty()) else {
            return UNKNOWN_CATEGORY.to_string();
        };
        let localized = self.world.localized_zone_name(&zone);

        if let Some(mapped) = self.zones.get(&zone) {
            return mapped.to_string();
        }
        if let Some(mapped) = localized.as_deref().and_then(|l| self.zones.get(l)) {
            return mapped.to_string();
        }
        if let Some(mapped) = self.zones.get(&zone.replace('_', "")) {
            return mapped.to_string();
        }
        localized.unwrap_or(zone)
    }

    /// Parent assigned to a newly recorded bench.
    pub fn default_parent(&self, scene: &str) -> Option<String> {
        self.world.zone_key(scene).filter(|z| !z.trim().is_empty())
    }

    /// Prefixes older builds put in front of auto names (`<zone> #N`).
    pub fn legacy_name_prefixes(&self, scene: &str) -> Vec<String> {
        let mut prefixes = vec![self.category_for_scene(scene)];
        if let Some(zone) = self.world.zone_key(scene) {
            if let Some(localized) = self.world.localized_zone_name(&zone) {
                prefixes.push(localized);
            }
            prefixes.push(zone);
        }
        prefixes.dedup();
        prefixes
    }

    /// Resolve a display name typed by the player to the key to store as a
    /// parent: a renamed zone's display name maps back to its zone key.
    pub fn parent_for_display_name(&self, display: &str) -> String {
        self.zones
            .key_for_value(display)
            .map(str::to_string)
            .unwrap_or_else(|| display.to_string())
    }

    pub fn zones(&self) -> &ZoneNames {
        self.zones
    }

    pub fn world(&self) -> &dyn WorldQuery {
        self.world
    }
}
