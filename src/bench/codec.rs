//! Bench list encodings.
//!
//! Two formats are understood:
//!
//! - **Versioned** (written by this crate): a JSON document with an explicit
//!   `version` tag and named optional fields.
//! - **Flat** (legacy): records joined by `;`, fields by `|`:
//!   `scene|marker|displayName|parentCategory|isRenamed|addedOrder|isFavorite|favoriteOrder`.
//!   Older payloads carry only the first 2-3 fields, and some omit the
//!   parent; the parser tells the parent apart from the renamed flag by shape.
//!
//! Decoding is per-record best effort. Anything filled in by inference is
//! reported as an anomaly so the caller can re-save once in the normalized form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::bench::naming::{default_name, looks_like_default_name, minimal_unused_number};
use crate::bench::record::{BenchKey, BenchRecord};
use crate::bench::zones::CategoryResolver;

pub const SCHEMA_VERSION: u32 = 2;

const RECORD_DELIMITER: char = ';';
const FIELD_DELIMITER: char = '|';

/// Decoded records plus every inferred correction.
#[derive(Debug, Default)]
pub struct DecodeReport {
    pub records: Vec<BenchRecord>,
    pub anomalies: Vec<String>,
}

impl DecodeReport {
    /// Whether the payload should be re-saved in normalized form.
    pub fn needs_resave(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

// ============================================
// VERSIONED
// ============================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBench {
    #[serde(default)]
    scene: String,
    #[serde(default)]
    marker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_renamed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    added_order: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    favorite_order: Option<u64>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Serialize)]
struct StoredBenchList {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    benches: Vec<StoredBench>,
}

/// Envelope read with records left untyped, so one bad record cannot fail the list.
#[derive(Debug, Deserialize)]
struct RawBenchList {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    benches: Vec<Value>,
}

impl StoredBench {
    /// Field-by-field read of a record that failed typed decoding.
    /// Mistyped fields are dropped and later defaulted.
    fn salvage(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |k: &str| obj.get(k).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            scene: text("scene")?,
            marker: text("marker")?,
            display_name: text("displayName"),
            parent_category: text("parentCategory"),
            is_renamed: obj.get("isRenamed").and_then(Value::as_bool),
            added_order: obj.get("addedOrder").and_then(Value::as_u64),
            is_favorite: obj.get("isFavorite").and_then(Value::as_bool),
            favorite_order: obj.get("favoriteOrder").and_then(Value::as_u64),
        })
    }
}

/// Whether `raw` is a versioned payload rather than the flat format.
pub fn is_versioned(raw: &str) -> bool {
    raw.trim_start().starts_with('{')
}

pub fn encode_versioned(records: &[BenchRecord]) -> serde_json::Result<String> {
    let list = StoredBenchList {
        version: SCHEMA_VERSION,
        benches: records
            .iter()
            .map(|r| StoredBench {
                scene: r.key.scene.clone(),
                marker: r.key.marker.clone(),
                display_name: Some(r.display_name.clone()),
                parent_category: r.parent_category.clone(),
                is_renamed: Some(r.is_renamed),
                added_order: Some(r.added_order),
                is_favorite: Some(r.is_favorite),
                favorite_order: r.is_favorite.then_some(r.favorite_order),
            })
            .collect(),
    };
    serde_json::to_string(&list)
}

/// Partially decoded record; `None` fields are filled by [`finish`].
struct Draft {
    key: BenchKey,
    display_name: Option<String>,
    parent_category: Option<String>,
    is_renamed: Option<bool>,
    added_order: Option<u64>,
    is_favorite: bool,
    favorite_order: u64,
}

pub fn decode_versioned(raw: &str, resolver: &CategoryResolver<'_>) -> serde_json::Result<DecodeReport> {
    let list: RawBenchList = serde_json::from_str(raw)?;
    let mut anomalies = Vec::new();
    if list.version != SCHEMA_VERSION {
        anomalies.push(format!("schema version {} upgraded to {}", list.version, SCHEMA_VERSION));
    }

    let mut drafts = Vec::with_capacity(list.benches.len());
    for (i, value) in list.benches.into_iter().enumerate() {
        let stored = match StoredBench::deserialize(&value) {
            Ok(stored) => stored,
            Err(e) => match StoredBench::salvage(&value) {
                Some(stored) => {
                    anomalies.push(format!("record {}: malformed fields dropped ({})", i, e));
                    stored
                }
                None => {
                    anomalies.push(format!("record {}: unreadable ({})", i, e));
                    continue;
                }
            },
        };
        let (scene, marker) = (stored.scene.trim(), stored.marker.trim());
        if scene.is_empty() || marker.is_empty() {
            anomalies.push(format!("record {}: missing scene or marker", i));
            continue;
        }
        // Only the favorite order is legitimately absent (non-favorites).
        if stored.display_name.is_none()
            || stored.is_renamed.is_none()
            || stored.added_order.is_none()
            || stored.is_favorite.is_none()
        {
            anomalies.push(format!("record {}: missing fields defaulted", i));
        }
        drafts.push(Draft {
            key: BenchKey::new(scene, marker),
            display_name: stored.display_name.filter(|n| !n.trim().is_empty()),
            parent_category: stored.parent_category,
            is_renamed: stored.is_renamed,
            added_order: stored.added_order,
            is_favorite: stored.is_favorite.unwrap_or(false),
            favorite_order: stored.favorite_order.unwrap_or(0),
        });
    }

    Ok(finish(drafts, anomalies, resolver))
}

// ============================================
// FLAT (LEGACY)
// ============================================

fn looks_bool(field: &str) -> bool {
    field == "0" || field == "1" || field.eq_ignore_ascii_case("true") || field.eq_ignore_ascii_case("false")
}

fn parse_bool(field: &str) -> Option<bool> {
    if field == "1" || field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field == "0" || field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn strip_delimiters(field: &str) -> String {
    field
        .chars()
        .filter(|c| *c != RECORD_DELIMITER && *c != FIELD_DELIMITER)
        .collect()
}

/// Encode in the legacy flat format. Delimiter characters inside fields are dropped.
pub fn encode_flat(records: &[BenchRecord]) -> String {
    records
        .iter()
        .map(|r| {
            [
                strip_delimiters(&r.key.scene),
                strip_delimiters(&r.key.marker),
                strip_delimiters(&r.display_name),
                strip_delimiters(r.parent_category.as_deref().unwrap_or("")),
                if r.is_renamed { "1" } else { "0" }.to_string(),
                r.added_order.to_string(),
                if r.is_favorite { "1" } else { "0" }.to_string(),
                r.favorite_order.to_string(),
            ]
            .join(&FIELD_DELIMITER.to_string())
        })
        .collect::<Vec<_>>()
        .join(&RECORD_DELIMITER.to_string())
}

pub fn decode_flat(raw: &str, resolver: &CategoryResolver<'_>) -> DecodeReport {
    let mut anomalies = Vec::new();
    let mut drafts = Vec::new();

    for (i, token) in raw.split(RECORD_DELIMITER).enumerate() {
        if token.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = token.split(FIELD_DELIMITER).collect();
        let field = |n: usize| parts.get(n).map(|s| s.trim());

        let scene = field(0).unwrap_or("");
        let marker = field(1).unwrap_or("");
        if scene.is_empty() || marker.is_empty() {
            anomalies.push(format!("record {}: missing scene or marker", i));
            continue;
        }

        let display_name = field(2).filter(|s| !s.is_empty()).map(str::to_string);
        if display_name.is_none() {
            anomalies.push(format!("record {}: missing display name", i));
        }

        // Field 3 is either the parent (free text) or, in older payloads, the renamed flag.
        let mut idx = 3;
        let mut parent_category = None;
        if let Some(p3) = field(3) {
            if !looks_bool(p3) {
                parent_category = Some(p3.to_string()).filter(|p| !p.is_empty());
                idx = 4;
            }
        }
        if parent_category.is_none() {
            anomalies.push(format!("record {}: parent re-derived from scene", i));
        }

        let is_renamed = field(idx).and_then(parse_bool);
        if is_renamed.is_none() {
            anomalies.push(format!("record {}: renamed flag inferred", i));
        }

        let added_order = field(idx + 1).and_then(|s| s.parse::<u64>().ok());
        if added_order.is_none() {
            anomalies.push(format!("record {}: added order assigned", i));
        }

        let is_favorite = field(idx + 2).and_then(parse_bool).unwrap_or(false);
        let favorite_order = field(idx + 3)
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);

        drafts.push(Draft {
            key: BenchKey::new(scene, marker),
            display_name,
            parent_category,
            is_renamed,
            added_order,
            is_favorite,
            favorite_order,
        });
    }

    finish(drafts, anomalies, resolver)
}

/// Fill inferred defaults: parent from the scene's zone, added order after the
/// highest stored one, renamed flag by the naming convention, missing names
/// by the minimal unused `#N` in the category.
fn finish(drafts: Vec<Draft>, anomalies: Vec<String>, resolver: &CategoryResolver<'_>) -> DecodeReport {
    let mut order_counter = drafts.iter().filter_map(|d| d.added_order).max().unwrap_or(0);
    let mut records: Vec<BenchRecord> = Vec::with_capacity(drafts.len());
    let mut unnamed = Vec::new();

    for draft in drafts {
        let added_order = draft.added_order.unwrap_or_else(|| {
            order_counter += 1;
            order_counter
        });
        let parent_category = draft
            .parent_category
            .or_else(|| resolver.default_parent(&draft.key.scene));

        let mut record = BenchRecord::new(draft.key, String::new(), added_order);
        record.parent_category = parent_category;
        record.is_favorite = draft.is_favorite;
        record.favorite_order = if draft.is_favorite { draft.favorite_order } else { 0 };

        match draft.display_name {
            Some(name) => {
                record.is_renamed = draft.is_renamed.unwrap_or_else(|| {
                    let prefixes = resolver.legacy_name_prefixes(record.scene());
                    !looks_like_default_name(&name, &prefixes)
                });
                record.display_name = name;
            }
            None => unnamed.push(records.len()),
        }
        records.push(record);
    }

    for index in unnamed {
        let category = resolver.category_for(&records[index]);
        let number = minimal_unused_number(
            records
                .iter()
                .filter(|r| !r.display_name.is_empty() && resolver.category_for(r) == category)
                .map(|r| r.display_name.as_str()),
        );
        records[index].display_name = default_name(number);
        records[index].is_renamed = false;
    }

    if anomalies.is_empty() {
        debug!(count = records.len(), "Decoded bench list");
    } else {
        warn!(
            count = records.len(),
            anomalies = anomalies.len(),
            first = %anomalies[0],
            "Bench list needed repair"
        );
    }

    DecodeReport { records, anomalies }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
