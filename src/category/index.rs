//! Two-level category view over the registry
//!
//! The view is derived state: it is rebuilt whenever the registry, the zone
//! rename map, or the favorite categories change revision, and never edited
//! in place.

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::bench::{compare_display_names, BenchKey, BenchRecord, BenchRegistry, CategoryResolver};
use crate::category::FavoriteCategories;

type Revisions = (u64, u64, u64);

/// Categories in display order, each with its records in display order.
///
/// Record references are indices into [`BenchRegistry::records`] and are only
/// valid for the registry revision the view was built from.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    category_names: Vec<String>,
    category_to_indices: HashMap<String, Vec<usize>>,
    built_from: Option<Revisions>,
    dirty: bool,
}

fn revisions(
    registry: &BenchRegistry,
    resolver: &CategoryResolver<'_>,
    favorites: &FavoriteCategories,
) -> Revisions {
    (
        registry.revision(),
        resolver.zones().revision(),
        favorites.revision(),
    )
}

/// Within a category: favorites first by favorite order, then natural name
/// order, then scene and marker.
pub fn compare_records(a: &BenchRecord, b: &BenchRecord) -> Ordering {
    match (a.is_favorite, b.is_favorite) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (true, true) => {
            let by_order = a.favorite_order.cmp(&b.favorite_order);
            if by_order != Ordering::Equal {
                return by_order;
            }
        }
        (false, false) => {}
    }
    compare_display_names(&a.display_name, &b.display_name)
        .then_with(|| a.key.scene.cmp(&b.key.scene))
        .then_with(|| a.key.marker.cmp(&b.key.marker))
}

impl CategoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a rebuild on the next read.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_stale(
        &self,
        registry: &BenchRegistry,
        resolver: &CategoryResolver<'_>,
        favorites: &FavoriteCategories,
    ) -> bool {
        self.dirty || self.built_from != Some(revisions(registry, resolver, favorites))
    }

    /// Rebuild if anything the view depends on changed. Returns whether it rebuilt.
    pub fn ensure_fresh(
        &mut self,
        registry: &BenchRegistry,
        resolver: &CategoryResolver<'_>,
        favorites: &FavoriteCategories,
    ) -> bool {
        if !self.is_stale(registry, resolver, favorites) {
            return false;
        }
        self.rebuild(registry, resolver, favorites);
        true
    }

    /// Group records by resolved category and order both levels.
    #[instrument(level = "debug", skip_all, fields(records = registry.len()))]
    pub fn rebuild(
        &mut self,
        registry: &BenchRegistry,
        resolver: &CategoryResolver<'_>,
        favorites: &FavoriteCategories,
    ) {
        let records = registry.records();

        // Group case-insensitively; the first spelling seen names the category.
        let mut names: Vec<String> = Vec::new();
        let mut by_lower: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let category = resolver.category_for(record);
            let slot = *by_lower.entry(category.to_lowercase()).or_insert_with(|| {
                names.push(category.clone());
                groups.push(Vec::new());
                names.len() - 1
            });
            groups[slot].push(i);
        }

        for group in groups.iter_mut() {
            group.sort_by(|&a, &b| compare_records(&records[a], &records[b]));
        }

        let mut order: Vec<usize> = (0..names.len()).collect();
        order.sort_by(|&a, &b| {
            let (name_a, name_b) = (&names[a], &names[b]);
            match (favorites.order_of(name_a), favorites.order_of(name_b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => name_a
                    .to_lowercase()
                    .cmp(&name_b.to_lowercase())
                    .then_with(|| name_a.cmp(name_b)),
            }
        });

        let mut groups: Vec<Option<Vec<usize>>> = groups.into_iter().map(Some).collect();
        self.category_names.clear();
        self.category_to_indices.clear();
        for slot in order {
            let name = names[slot].clone();
            let members = groups[slot].take().unwrap_or_default();
            self.category_to_indices.insert(name.clone(), members);
            self.category_names.push(name);
        }

        self.built_from = Some(revisions(registry, resolver, favorites));
        self.dirty = false;

        debug!(
            categories = self.category_names.len(),
            favorite_categories = self
                .category_names
                .iter()
                .filter(|n| favorites.contains(n))
                .count(),
            "Category index rebuilt"
        );
    }

    pub fn category_names(&self) -> &[String] {
        &self.category_names
    }

    pub fn category_count(&self) -> usize {
        self.category_names.len()
    }

    pub fn category_at(&self, index: usize) -> Option<&str> {
        self.category_names.get(index).map(String::as_str)
    }

    pub fn position_of_category(&self, name: &str) -> Option<usize> {
        self.category_names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Registry indices of a category's records, in display order.
    pub fn indices(&self, category: &str) -> &[usize] {
        self.category_names
            .iter()
            .find(|n| n.eq_ignore_ascii_case(category))
            .and_then(|n| self.category_to_indices.get(n))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn indices_at(&self, category_index: usize) -> &[usize] {
        self.category_at(category_index)
            .map(|name| self.indices(name))
            .unwrap_or(&[])
    }

    /// Records of a category in display order.
    pub fn records_in<'r>(
        &self,
        category: &str,
        registry: &'r BenchRegistry,
    ) -> Vec<&'r BenchRecord> {
        let records = registry.records();
        self.indices(category)
            .iter()
            .filter_map(|&i| records.get(i))
            .collect()
    }

    /// Keys of a category's records, in display order.
    pub fn keys_in(&self, category: &str, registry: &BenchRegistry) -> Vec<BenchKey> {
        self.records_in(category, registry)
            .into_iter()
            .map(|r| r.key.clone())
            .collect()
    }

    /// `(category position, item position)` of a record.
    pub fn locate(&self, key: &BenchKey, registry: &BenchRegistry) -> Option<(usize, usize)> {
        let records = registry.records();
        self.category_names
            .iter()
            .enumerate()
            .find_map(|(ci, name)| {
                self.category_to_indices
                    .get(name)?
                    .iter()
                    .position(|&i| records.get(i).is_some_and(|r| &r.key == key))
                    .map(|ii| (ci, ii))
            })
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
