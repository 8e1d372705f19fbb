use super::*;
use crate::bench::zones::ZoneNames;
use crate::sim::SimHost;

fn host() -> SimHost {
    let mut host = SimHost::new("Town_01");
    host.add_zone("Town_01", "TOWN");
    host.add_zone("Cave_01", "CAVE");
    host
}

fn record(scene: &str, marker: &str, name: &str, order: u64) -> BenchRecord {
    let mut r = BenchRecord::new(BenchKey::new(scene, marker), name, order);
    r.parent_category = Some("TOWN".to_string());
    r
}

fn sample() -> Vec<BenchRecord> {
    let mut home = record("Town_01", "RestBench", "Home", 1);
    home.is_renamed = true;
    home.is_favorite = true;
    home.favorite_order = 3;
    let mut cave = record("Cave_01", "RestBench (1)", "#1", 2);
    cave.parent_category = Some("Cave Route".to_string());
    vec![home, cave, record("Town_01", "RestBench (2)", "#2", 5)]
}

#[test]
fn test_flat_roundtrip() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let records = sample();
    let encoded = encode_flat(&records);
    assert_eq!(
        encoded.split(';').next().unwrap(),
        "Town_01|RestBench|Home|TOWN|1|1|1|3"
    );

    let report = decode_flat(&encoded, &resolver);
    assert!(!report.needs_resave(), "{:?}", report.anomalies);
    assert_eq!(report.records, records);
}

#[test]
fn test_versioned_roundtrip() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let records = sample();
    let encoded = encode_versioned(&records).unwrap();
    assert!(is_versioned(&encoded));
    assert!(encoded.contains("\"version\":2"));

    let report = decode_versioned(&encoded, &resolver).unwrap();
    assert!(!report.needs_resave(), "{:?}", report.anomalies);
    assert_eq!(report.records, records);
}

#[test]
fn test_legacy_two_field_records() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let report = decode_flat("Town_01|Bench_A;Town_01|Bench_B;", &resolver);
    assert!(report.needs_resave());
    assert_eq!(report.records.len(), 2);

    let a = &report.records[0];
    assert_eq!(a.display_name, "#1");
    assert_eq!(a.parent_category.as_deref(), Some("TOWN"));
    assert_eq!(a.added_order, 1);
    assert!(!a.is_renamed);
    assert_eq!(report.records[1].display_name, "#2");
    assert_eq!(report.records[1].added_order, 2);
}

#[test]
fn test_legacy_record_without_parent_field() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    // scene|marker|name|isRenamed|addedOrder|isFavorite|favoriteOrder
    let report = decode_flat("Town_01|RestBench|Home|1|15|1|2", &resolver);
    let r = &report.records[0];
    assert_eq!(r.parent_category.as_deref(), Some("TOWN"));
    assert!(r.is_renamed);
    assert_eq!(r.added_order, 15);
    assert!(r.is_favorite);
    assert_eq!(r.favorite_order, 2);
}

#[test]
fn test_renamed_flag_inferred_from_name() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let report = decode_flat("Town_01|A|#4;Town_01|B|TOWN #5;Town_01|C|Shop", &resolver);
    let renamed: Vec<bool> = report.records.iter().map(|r| r.is_renamed).collect();
    assert_eq!(renamed, vec![false, false, true]);
}

#[test]
fn test_missing_orders_continue_after_highest() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let report = decode_flat("Town_01|A|#1|TOWN|0|9;Town_01|B|#2|TOWN|0|oops", &resolver);
    assert_eq!(report.records[0].added_order, 9);
    assert_eq!(report.records[1].added_order, 10);
    assert!(report.needs_resave());
}

#[test]
fn test_bad_records_are_skipped_not_fatal() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let report = decode_flat("|Orphan;Town_01|;Town_01|Ok|#1|TOWN|0|1|0|0", &resolver);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].key.marker, "Ok");
    assert_eq!(report.anomalies.len(), 2);
}

#[test]
fn test_versioned_missing_fields_are_defaulted() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let raw = r#"{"version":2,"benches":[
        {"scene":"Town_01","marker":"A","displayName":"Shop","isRenamed":true,"addedOrder":4,"isFavorite":false},
        {"scene":"Town_01","marker":"B"},
        {"scene":"","marker":"C"}
    ]}"#;
    let report = decode_versioned(raw, &resolver).unwrap();
    assert_eq!(report.records.len(), 2);
    assert!(report.needs_resave());

    let b = &report.records[1];
    assert_eq!(b.display_name, "#1");
    assert_eq!(b.added_order, 5);
    assert_eq!(b.parent_category.as_deref(), Some("TOWN"));
}

#[test]
fn test_old_schema_version_requests_resave() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let raw = r##"{"benches":[{"scene":"Town_01","marker":"A","displayName":"#1","isRenamed":false,"addedOrder":1,"isFavorite":false}]}"##;
    let report = decode_versioned(raw, &resolver).unwrap();
    assert_eq!(report.records.len(), 1);
    assert!(report.needs_resave());
}

#[test]
fn test_delimiters_stripped_on_flat_encode() {
    let mut r = record("Town_01", "A", "Big|Bench;1", 1);
    r.is_renamed = true;
    let encoded = encode_flat(&[r]);
    assert_eq!(encoded, "Town_01|A|BigBench1|TOWN|1|1|0|0");
}

#[test]
fn test_versioned_bad_record_does_not_fail_the_list() {
    let host = host();
    let zones = ZoneNames::new();
    let resolver = CategoryResolver::new(&zones, &host);

    let raw = r##"{"version":2,"benches":[
        {"scene":"Town_01","marker":"A","displayName":"Shop","isRenamed":true,"addedOrder":3,"isFavorite":false},
        {"scene":"Town_01","marker":"B","displayName":"#1","isRenamed":"no","addedOrder":"two","isFavorite":false},
        {"scene":7,"marker":"C"},
        "garbage"
    ]}"##;
    let report = decode_versioned(raw, &resolver).unwrap();
    assert_eq!(report.records.len(), 2);
    assert!(report.needs_resave());

    let b = &report.records[1];
    assert_eq!(b.key, BenchKey::new("Town_01", "B"));
    assert_eq!(b.display_name, "#1");
    assert!(!b.is_renamed);
    assert_eq!(b.added_order, 4);
    assert!(report.anomalies.iter().any(|a| a.starts_with("record 2")));
    assert!(report.anomalies.iter().any(|a| a.starts_with("record 3")));
}
