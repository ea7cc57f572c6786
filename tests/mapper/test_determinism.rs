// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ctbal_submitter::{map_all, map_record, RawRecord};

fn sample() -> RawRecord {
    RawRecord::new("Jane Q. Doe", "Florida", "1941-03-12", "2024-01-05")
        .with_city("Tampa")
        .with_county("Hillsborough")
}

#[test]
fn test_same_input_same_bytes() {
    let first = map_record(&sample(), 7);
    let second = map_record(&sample(), 7);
    assert_eq!(first, second);
    assert_eq!(first.canonical_bytes(), second.canonical_bytes());
}

#[test]
fn test_position_changes_identity_and_metadata() {
    let at_one = map_record(&sample(), 1);
    let at_two = map_record(&sample(), 2);

    assert_ne!(at_one.pseudo_identity, at_two.pseudo_identity);
    assert_ne!(at_one.metadata_digest, at_two.metadata_digest);
    // Content does not depend on position
    assert_eq!(at_one.content_digest, at_two.content_digest);
}

#[test]
fn test_equivalent_date_spellings_digest_the_same() {
    let iso = map_record(&sample(), 1);
    let us = map_record(
        &RawRecord::new("Jane Q. Doe", "FL", "03/12/1941", "January 5, 2024")
            .with_city("  Tampa ")
            .with_county("Hillsborough"),
        1,
    );
    assert_eq!(iso.content_digest, us.content_digest);
    assert_eq!(iso.label, us.label);
}

#[test]
fn test_name_never_serialized() {
    let submission = map_record(&sample(), 3);
    let bytes = String::from_utf8(submission.canonical_bytes()).unwrap();
    assert!(!bytes.contains("Jane"));
    assert!(!bytes.contains("Doe"));
}

#[test]
fn test_digest_formats() {
    let submission = map_record(&sample(), 1);
    assert!(submission.content_digest.starts_with("bafkrei"));
    assert!(submission.metadata_digest.starts_with("bagaaiera"));
}

#[test]
fn test_map_all_uses_one_based_positions() {
    let records = vec![sample(), sample(), sample()];
    let submissions = map_all(&records);
    let indexes: Vec<u64> = submissions.iter().map(|s| s.source_index).collect();
    assert_eq!(indexes, vec![1, 2, 3]);
    assert_eq!(submissions[1], map_record(&records[1], 2));
}
