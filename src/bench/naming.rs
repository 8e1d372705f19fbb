//! Display-name conventions: `#N` auto names and the natural comparator.

use std::cmp::Ordering;

/// Trailing `#<digits>` number of a name, e.g. `"Crossroads #12"` -> 12.
pub fn trailing_number(name: &str) -> Option<u32> {
    let hash = name.rfind('#')?;
    let digits = &name[hash + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Smallest positive integer not used as a trailing `#N` among `names`.
pub fn minimal_unused_number<'a>(names: impl IntoIterator<Item = &'a str>) -> u32 {
    let mut used: Vec<u32> = names
        .into_iter()
        .filter_map(trailing_number)
        .filter(|n| *n > 0)
        .collect();
    used.sort_unstable();
    used.dedup();

    let mut candidate = 1;
    for n in used {
        if n == candidate {
            candidate += 1;
        } else if n > candidate {
            break;
        }
    }
    candidate
}

pub fn default_name(number: u32) -> String {
    format!("#{}", number)
}

/// Whether `name` follows the auto-naming convention: `#N`, or the legacy
/// `<zone prefix> #N` for one of `prefixes`.
pub fn looks_like_default_name(name: &str, prefixes: &[String]) -> bool {
    let name = name.trim();
    if is_bare_default(name) {
        return true;
    }
    legacy_prefixed_number(name, prefixes).is_some()
}

fn is_bare_default(name: &str) -> bool {
    name.len() > 1
        && name.starts_with('#')
        && name[1..].bytes().all(|b| b.is_ascii_digit())
}

/// For a legacy `<prefix> #N` name, the bare `#N` it should become.
pub fn legacy_prefixed_number(name: &str, prefixes: &[String]) -> Option<String> {
    let name = name.trim();
    let hash = name.rfind('#')?;
    let suffix = &name[hash..];
    if !is_bare_default(suffix) {
        return None;
    }
    let prefix = name[..hash].trim_end();
    if prefix.is_empty() {
        return None;
    }
    prefixes
        .iter()
        .any(|p| !p.is_empty() && p.eq_ignore_ascii_case(prefix))
        .then(|| suffix.to_string())
}

fn split_name(name: &str) -> (&str, Option<i64>) {
    match name.rfind('#') {
        Some(hash) => match name[hash + 1..].trim().parse::<i64>() {
            Ok(n) => (name[..hash].trim_end(), Some(n)),
            Err(_) => (name, None),
        },
        None => (name, None),
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Natural display-name order: prefix (case-insensitive), then trailing number
/// numerically, so `#2` < `#3` < `#10`. A numbered name sorts after the bare
/// prefix; names without a numeric split compare as whole strings.
pub fn compare_display_names(a: &str, b: &str) -> Ordering {
    let (prefix_a, num_a) = split_name(a);
    let (prefix_b, num_b) = split_name(b);

    if num_a.is_none() && num_b.is_none() {
        return cmp_ignore_case(a, b);
    }

    cmp_ignore_case(prefix_a, prefix_b).then_with(|| match (num_a, num_b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    })
}
