//! Favorited categories, in the order they were favorited.

/// Ordered, case-insensitively unique list of category names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteCategories {
    names: Vec<String>,
    revision: u64,
}

impl FavoriteCategories {
    /// Parse a `;`-separated list. Blank and repeated names are dropped.
    pub fn parse(raw: &str) -> Self {
        let mut favorites = Self::default();
        for name in raw.split(';').map(str::trim).filter(|n| !n.is_empty()) {
            if !favorites.contains(name) {
                favorites.names.push(name.to_string());
            }
        }
        favorites
    }

    pub fn serialize(&self) -> String {
        self.names
            .iter()
            .map(|n| n.replace(';', ""))
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order_of(name).is_some()
    }

    /// Position in favorite order.
    pub fn order_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    /// Favorite or unfavorite; returns whether `name` is now a favorite.
    pub fn toggle(&mut self, name: &str) -> bool {
        let name = name.trim();
        self.revision = self.revision.wrapping_add(1);
        match self.order_of(name) {
            Some(pos) => {
                self.names.remove(pos);
                false
            }
            None => {
                self.names.push(name.to_string());
                true
            }
        }
    }

    /// Follow a category rename, keeping the favorite position.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let Some(pos) = self.order_of(old) else {
            return false;
        };
        match self.order_of(new) {
            Some(existing) if existing != pos => {
                self.names.remove(pos);
            }
            _ => self.names[pos] = new.to_string(),
        }
        self.revision = self.revision.wrapping_add(1);
        true
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
