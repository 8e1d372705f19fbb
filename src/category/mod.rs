//! Category view over the bench registry
//!
//! - `index` - derived two-level view, rebuilt on revision change
//! - `favorites` - favorited category list
//! - `selection` - menu cursor with identity-based relocation

mod favorites;
mod index;
mod selection;

pub use favorites::FavoriteCategories;
pub use index::{compare_records, CategoryIndex};
pub use selection::{MenuLevel, Selection};
