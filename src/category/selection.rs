//! Menu cursor over the category index.

use crate::bench::{BenchKey, BenchRegistry};
use crate::category::CategoryIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuLevel {
    #[default]
    Categories,
    Items,
}

/// Category/item cursor. `item` is only meaningful at [`MenuLevel::Items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub level: MenuLevel,
    pub category: usize,
    pub item: usize,
}

fn wrap(current: usize, delta: i32, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    ((current as i64 + delta as i64).rem_euclid(len)) as usize
}

impl Selection {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move within the current level, wrapping at both ends.
    pub fn move_by(&mut self, delta: i32, index: &CategoryIndex) {
        match self.level {
            MenuLevel::Categories => {
                self.category = wrap(self.category, delta, index.category_count());
            }
            MenuLevel::Items => {
                let len = index.indices_at(self.category).len();
                self.item = wrap(self.item, delta, len);
            }
        }
    }

    /// Enter the selected category. Empty or missing categories stay at category level.
    pub fn enter(&mut self, index: &CategoryIndex) -> bool {
        if self.level == MenuLevel::Items || index.indices_at(self.category).is_empty() {
            return false;
        }
        self.level = MenuLevel::Items;
        self.item = 0;
        true
    }

    pub fn back(&mut self) {
        self.level = MenuLevel::Categories;
        self.item = 0;
    }

    pub fn selected_category<'a>(&self, index: &'a CategoryIndex) -> Option<&'a str> {
        index.category_at(self.category)
    }

    /// The selected bench, when the cursor is on an item.
    pub fn selected_key(&self, index: &CategoryIndex, registry: &BenchRegistry) -> Option<BenchKey> {
        if self.level != MenuLevel::Items {
            return None;
        }
        let &i = index.indices_at(self.category).get(self.item)?;
        registry.records().get(i).map(|r| r.key.clone())
    }

    /// Re-point the cursor after the index was rebuilt.
    ///
    /// The previously selected bench is found by identity; if it is gone the
    /// cursor stays in the same category with the item clamped, and if that
    /// category is now empty it falls back to category level.
    pub fn relocate(
        &mut self,
        index: &CategoryIndex,
        registry: &BenchRegistry,
        previous_key: Option<&BenchKey>,
        previous_category: Option<&str>,
    ) {
        if let Some((category, item)) = previous_key.and_then(|k| index.locate(k, registry)) {
            if self.level == MenuLevel::Items {
                self.category = category;
                self.item = item;
                return;
            }
        }

        let category = previous_category.and_then(|name| index.position_of_category(name));
        match (self.level, category) {
            (MenuLevel::Items, Some(category)) => {
                let len = index.indices_at(category).len();
                self.category = category;
                if len == 0 {
                    self.back();
                } else {
                    self.item = self.item.min(len - 1);
                }
            }
            (MenuLevel::Items, None) => {
                self.back();
                self.clamp_category(index);
            }
            (MenuLevel::Categories, Some(category)) => self.category = category,
            (MenuLevel::Categories, None) => self.clamp_category(index),
        }
    }

    fn clamp_category(&mut self, index: &CategoryIndex) {
        self.category = self.category.min(index.category_count().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::{BenchRecord, CategoryResolver, ZoneNames};
    use crate::category::FavoriteCategories;
    use crate::config::RegistryConfig;
    use crate::sim::SimHost;

    struct Fixture {
        host: SimHost,
        zones: ZoneNames,
        favorites: FavoriteCategories,
        registry: BenchRegistry,
        index: CategoryIndex,
    }

    impl Fixture {
        fn new() -> Self {
            let mut host = SimHost::new("Town_01");
            host.add_zone("Town_01", "TOWN");
            host.add_zone("Cave_01", "CAVE");
            let mut registry = BenchRegistry::new(&RegistryConfig::default());
            registry.replace_records(vec![
                BenchRecord::new(BenchKey::new("Cave_01", "c1"), "#1", 1),
                BenchRecord::new(BenchKey::new("Town_01", "t1"), "#1", 2),
                BenchRecord::new(BenchKey::new("Town_01", "t2"), "#2", 3),
                BenchRecord::new(BenchKey::new("Town_01", "t3"), "#3", 4),
            ]);
            let mut fixture = Self {
                host,
                zones: ZoneNames::new(),
                favorites: FavoriteCategories::default(),
                registry,
                index: CategoryIndex::new(),
            };
            fixture.rebuild();
            fixture
        }

        fn rebuild(&mut self) {
            let resolver = CategoryResolver::new(&self.zones, &self.host);
            self.index
                .ensure_fresh(&self.registry, &resolver, &self.favorites);
        }
    }

    #[test]
    fn test_move_wraps() {
        let f = Fixture::new();
        let mut sel = Selection::default();
        sel.move_by(-1, &f.index);
        assert_eq!(sel.category, 1);
        sel.move_by(1, &f.index);
        assert_eq!(sel.category, 0);

        sel.move_by(1, &f.index);
        assert!(sel.enter(&f.index));
        sel.move_by(-1, &f.index);
        assert_eq!(sel.item, 2);
        assert_eq!(
            sel.selected_key(&f.index, &f.registry),
            Some(BenchKey::new("Town_01", "t3"))
        );
    }

    #[test]
    fn test_relocate_follows_renamed_bench() {
        let mut f = Fixture::new();
        let mut sel = Selection {
            level: MenuLevel::Items,
            category: 1,
            item: 0,
        };
        let key = sel.selected_key(&f.index, &f.registry).unwrap();
        assert_eq!(key, BenchKey::new("Town_01", "t1"));

        f.registry.rename(&key, "Zzz").unwrap();
        f.rebuild();
        sel.relocate(&f.index, &f.registry, Some(&key), Some("TOWN"));
        assert_eq!((sel.category, sel.item), (1, 2));
        assert_eq!(sel.selected_key(&f.index, &f.registry), Some(key));
    }

    #[test]
    fn test_relocate_after_delete_clamps_in_category() {
        let mut f = Fixture::new();
        let mut sel = Selection {
            level: MenuLevel::Items,
            category: 1,
            item: 2,
        };
        let key = sel.selected_key(&f.index, &f.registry).unwrap();
        f.registry.remove(&key).unwrap();
        f.rebuild();

        sel.relocate(&f.index, &f.registry, Some(&key), Some("TOWN"));
        assert_eq!(sel.level, MenuLevel::Items);
        assert_eq!((sel.category, sel.item), (1, 1));
    }

    #[test]
    fn test_relocate_empty_category_returns_to_category_level() {
        let mut f = Fixture::new();
        let mut sel = Selection {
            level: MenuLevel::Items,
            category: 0,
            item: 0,
        };
        let key = sel.selected_key(&f.index, &f.registry).unwrap();
        f.registry.remove(&key).unwrap();
        f.rebuild();

        sel.relocate(&f.index, &f.registry, Some(&key), Some("CAVE"));
        assert_eq!(sel.level, MenuLevel::Categories);
        assert_eq!(sel.category, 0);
        assert_eq!(sel.selected_category(&f.index), Some("TOWN"));
    }

    #[test]
    fn test_enter_empty_index_is_refused() {
        let index = CategoryIndex::new();
        let mut sel = Selection::default();
        assert!(!sel.enter(&index));
        sel.move_by(3, &index);
        assert_eq!(sel.category, 0);
    }
}
