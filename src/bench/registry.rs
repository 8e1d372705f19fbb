//! Bench registry - the canonical set of discovered benches.
//!
//! Records are unique by `(scene, marker)`. Within the active scene no two
//! records may resolve to positions closer than the merge radius; the
//! earliest recorded bench survives.

use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::bench::naming::{compare_display_names, default_name, legacy_prefixed_number, minimal_unused_number};
use crate::bench::record::{BenchKey, BenchRecord};
use crate::bench::zones::CategoryResolver;
use crate::config::RegistryConfig;
use crate::error::{BenchError, Result};
use crate::geometry::Vec2;
use crate::host::WorldQuery;
use crate::logging;

/// Result of [`BenchRegistry::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added(BenchKey),
    /// Marker matched an ignore pattern or was blank.
    Ignored,
    /// `(scene, marker)` already recorded.
    Duplicate,
    /// Too close to an existing bench; `pruned` further near-duplicates were removed.
    Merged { kept: BenchKey, pruned: usize },
}

#[derive(Debug, Clone)]
pub struct BenchRegistry {
    records: Vec<BenchRecord>,
    order_counter: u64,
    favorite_counter: u64,
    ignore_patterns: Vec<Regex>,
    merge_radius: Option<f32>,
    merge_radius_fallback: f32,
    revision: u64,
    dirty: bool,
}

impl BenchRegistry {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            records: Vec::new(),
            order_counter: 0,
            favorite_counter: 0,
            ignore_patterns: config.compiled_ignore_patterns(),
            merge_radius: config.merge_radius.filter(|r| *r > 0.0),
            merge_radius_fallback: config.merge_radius_fallback,
            revision: 0,
            dirty: false,
        }
    }

    /// Replace the contents with loaded records. Counters resume after the
    /// highest stored orders; exact duplicates keep the first occurrence.
    pub fn replace_records(&mut self, records: Vec<BenchRecord>) {
        self.records.clear();
        for record in records {
            if self.index_of(&record.key).is_some() {
                warn!(key = %record.key, "Dropping duplicate bench record");
                continue;
            }
            self.records.push(record);
        }
        self.order_counter = self.records.iter().map(|r| r.added_order).max().unwrap_or(0);
        self.favorite_counter = self
            .records
            .iter()
            .filter(|r| r.is_favorite)
            .map(|r| r.favorite_order)
            .max()
            .unwrap_or(0);
        self.sort();
        self.touch();
        self.dirty = false;
    }

    pub fn records(&self) -> &[BenchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &BenchKey) -> Option<&BenchRecord> {
        self.records.iter().find(|r| &r.key == key)
    }

    pub fn contains(&self, key: &BenchKey) -> bool {
        self.get(key).is_some()
    }

    fn index_of(&self, key: &BenchKey) -> Option<usize> {
        self.records.iter().position(|r| &r.key == key)
    }

    fn get_mut(&mut self, key: &BenchKey) -> Result<&mut BenchRecord> {
        self.records
            .iter_mut()
            .find(|r| &r.key == key)
            .ok_or_else(|| BenchError::lookup("bench", key.to_string()))
    }

    /// Bumped on every mutation; derived views rebuild when it changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Force a re-save without changing records (format normalization).
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        self.dirty = true;
    }

    fn sort(&mut self) {
        self.records.sort_by(|a, b| {
            compare_display_names(&a.display_name, &b.display_name)
                .then_with(|| a.key.scene.cmp(&b.key.scene))
                .then_with(|| a.key.marker.cmp(&b.key.marker))
        });
    }

    pub fn is_ignored_marker(&self, marker: &str) -> bool {
        self.ignore_patterns.iter().any(|re| re.is_match(marker))
    }

    /// Radius for spatial dedup: configured value, else the camera view width,
    /// else the fallback constant.
    pub fn merge_radius(&self, world: &dyn WorldQuery) -> f32 {
        self.merge_radius
            .or_else(|| world.camera_view_width().filter(|w| *w > 0.0))
            .unwrap_or(self.merge_radius_fallback)
    }

    /// Record a bench. `active_scene` gates the spatial check, which needs live positions.
    #[instrument(level = "debug", skip(self, resolver))]
    pub fn add(
        &mut self,
        scene: &str,
        marker: &str,
        active_scene: &str,
        resolver: &CategoryResolver<'_>,
    ) -> AddOutcome {
        let (scene, marker) = (scene.trim(), marker.trim());
        if scene.is_empty() || marker.is_empty() || self.is_ignored_marker(marker) {
            debug!("Ignoring bench");
            return AddOutcome::Ignored;
        }

        let key = BenchKey::new(scene, marker);
        if self.contains(&key) {
            return AddOutcome::Duplicate;
        }

        if scene == active_scene {
            if let Some(outcome) = self.merge_with_nearby(&key, resolver.world()) {
                return outcome;
            }
        }

        let parent = resolver.default_parent(scene);
        let mut record = BenchRecord::new(key.clone(), String::new(), 0);
        record.parent_category = parent;

        let category = resolver.category_for(&record);
        let number = minimal_unused_number(
            self.records
                .iter()
                .filter(|r| resolver.category_for(r) == category)
                .map(|r| r.display_name.as_str()),
        );

        self.order_counter += 1;
        record.added_order = self.order_counter;
        record.display_name = default_name(number);

        logging::log_bench_event("recorded", scene, marker, Some(&record.display_name));
        self.records.push(record);
        self.sort();
        self.touch();
        AddOutcome::Added(key)
    }

    fn merge_with_nearby(&mut self, key: &BenchKey, world: &dyn WorldQuery) -> Option<AddOutcome> {
        let position = world.marker_position(&key.marker)?;
        let radius = self.merge_radius(world);

        let mut nearby: Vec<(u64, BenchKey, bool)> = self
            .records
            .iter()
            .filter(|r| r.key.scene == key.scene)
            .filter_map(|r| {
                let p = world.marker_position(&r.key.marker)?;
                (p.distance_squared(position) <= radius * radius)
                    .then(|| (r.added_order, r.key.clone(), r.is_favorite))
            })
            .collect();
        if nearby.is_empty() {
            return None;
        }

        nearby.sort_by_key(|(order, _, _)| *order);
        let kept = nearby[0].1.clone();
        let extras: Vec<BenchKey> = nearby
            .into_iter()
            .skip(1)
            .filter(|(_, _, favorite)| !favorite)
            .map(|(_, k, _)| k)
            .collect();

        let pruned = extras.len();
        if pruned > 0 {
            self.records.retain(|r| !extras.contains(&r.key));
            self.touch();
        }

        logging::log_bench_event(
            "merged",
            &key.scene,
            &key.marker,
            Some(&format!("kept {} pruned {} radius {:.1}", kept.marker, pruned, radius)),
        );
        Some(AddOutcome::Merged { kept, pruned })
    }

    /// Collapse near-duplicates in the active scene to one survivor per
    /// cluster (earliest recorded wins, favorites are never removed).
    #[instrument(level = "debug", skip(self, world))]
    pub fn prune_nearby_duplicates(&mut self, active_scene: &str, world: &dyn WorldQuery) -> usize {
        let radius = self.merge_radius(world);
        let mut located: Vec<(u64, BenchKey, bool, Vec2)> = self
            .records
            .iter()
            .filter(|r| r.key.scene == active_scene)
            .filter_map(|r| {
                world
                    .marker_position(&r.key.marker)
                    .map(|p| (r.added_order, r.key.clone(), r.is_favorite, p))
            })
            .collect();
        located.sort_by_key(|(order, _, favorite, _)| (!*favorite, *order));

        let mut survivors: Vec<Vec2> = Vec::new();
        let mut doomed: Vec<BenchKey> = Vec::new();
        for (_, key, favorite, position) in located {
            let near = survivors
                .iter()
                .any(|s| s.distance_squared(position) <= radius * radius);
            if near && !favorite {
                doomed.push(key);
            } else {
                survivors.push(position);
            }
        }

        if !doomed.is_empty() {
            info!(scene = active_scene, removed = doomed.len(), "Pruned nearby duplicate benches");
            self.records.retain(|r| !doomed.contains(&r.key));
            self.touch();
        }
        doomed.len()
    }

    /// Remove a bench. Favorites are protected.
    pub fn remove(&mut self, key: &BenchKey) -> Result<BenchRecord> {
        let index = self
            .index_of(key)
            .ok_or_else(|| BenchError::lookup("bench", key.to_string()))?;
        if self.records[index].is_favorite {
            return Err(BenchError::Rejected(
                "Favorited benches cannot be deleted".to_string(),
            ));
        }
        let record = self.records.remove(index);
        self.sort();
        self.touch();
        logging::log_bench_event("removed", &key.scene, &key.marker, None);
        Ok(record)
    }

    /// Rename a bench. A blank name keeps the current one and returns `false`.
    pub fn rename(&mut self, key: &BenchKey, new_name: &str) -> Result<bool> {
        let new_name = new_name.trim();
        let record = self.get_mut(key)?;
        if new_name.is_empty() {
            return Ok(false);
        }
        record.display_name = new_name.to_string();
        record.is_renamed = true;
        self.sort();
        self.touch();
        logging::log_bench_event("renamed", &key.scene, &key.marker, Some(new_name));
        Ok(true)
    }

    /// Set (or with `None`, clear) the explicit category of a bench.
    pub fn set_category(&mut self, key: &BenchKey, parent: Option<&str>) -> Result<()> {
        let parent = parent.map(str::trim).filter(|p| !p.is_empty()).map(str::to_string);
        let record = self.get_mut(key)?;
        if record.parent_category == parent {
            return Ok(());
        }
        record.parent_category = parent;
        self.touch();
        Ok(())
    }

    /// Point every listed bench at `parent`. Returns how many changed.
    pub fn set_parents(&mut self, keys: &[BenchKey], parent: &str) -> usize {
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|r| keys.contains(&r.key)) {
            if record.parent_category.as_deref() != Some(parent) {
                record.parent_category = Some(parent.to_string());
                changed += 1;
            }
        }
        if changed > 0 {
            self.touch();
        }
        changed
    }

    /// Flip the favorite flag; returns the new state.
    pub fn toggle_favorite(&mut self, key: &BenchKey) -> Result<bool> {
        let next_order = self.favorite_counter + 1;
        let record = self.get_mut(key)?;
        record.is_favorite = !record.is_favorite;
        let now_favorite = record.is_favorite;
        if now_favorite {
            record.favorite_order = next_order;
            self.favorite_counter = next_order;
        } else {
            record.favorite_order = 0;
        }
        self.touch();
        Ok(now_favorite)
    }

    /// Drop benches in scenes the host reports as unknown. No-op while the
    /// host cannot tell.
    pub fn retain_known_scenes(&mut self, world: &dyn WorldQuery) -> usize {
        let before = self.records.len();
        self.records
            .retain(|r| world.is_known_scene(&r.key.scene) != Some(false));
        let removed = before - self.records.len();
        if removed > 0 {
            warn!(removed, "Dropped benches in unknown scenes");
            self.touch();
        }
        removed
    }

    /// Rewrite legacy `<zone> #N` auto names to `#N`. Returns how many changed.
    pub fn normalize_legacy_names(&mut self, resolver: &CategoryResolver<'_>) -> usize {
        let mut changed = 0;
        for record in self.records.iter_mut().filter(|r| !r.is_renamed) {
            let prefixes = resolver.legacy_name_prefixes(&record.key.scene);
            if let Some(bare) = legacy_prefixed_number(&record.display_name, &prefixes) {
                debug!(from = %record.display_name, to = %bare, "Normalized legacy bench name");
                record.display_name = bare;
                changed += 1;
            }
        }
        if changed > 0 {
            self.sort();
            self.touch();
        }
        changed
    }
}
