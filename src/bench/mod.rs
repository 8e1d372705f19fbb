//! Bench bookkeeping
//!
//! - `record` - bench identity and record type
//! - `naming` - `#N` auto names and the natural name comparator
//! - `zones` - zone rename map and category resolution
//! - `registry` - the canonical record set with dedup rules
//! - `codec` - versioned and legacy flat encodings
//! - `store` - load/save through the host's key/value persistence

mod codec;
mod naming;
mod record;
mod registry;
mod store;
mod zones;

pub use codec::{
    decode_flat, decode_versioned, encode_flat, encode_versioned, is_versioned, DecodeReport,
    SCHEMA_VERSION,
};
pub use naming::{compare_display_names, looks_like_default_name, minimal_unused_number};
pub use record::{BenchKey, BenchRecord};
pub use registry::{AddOutcome, BenchRegistry};
pub use store::{
    load_favorite_categories, load_zone_names, save_favorite_categories, save_zone_names,
    BenchStore, LoadSummary, BENCHES_KEY, FAVORITE_CATEGORIES_KEY, ZONE_RENAMES_KEY,
};
pub use zones::{CategoryResolver, ZoneNames};
