// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use ctbal_submitter::mapper::DEFAULT_AGE;
use ctbal_submitter::{map_all, map_record, Category, RawRecord};

fn aged(age: u32) -> RawRecord {
    RawRecord::new(
        "Sam Poe",
        "GA",
        &format!("{}-02-01", 2023 - age as i32),
        "2023-02-01",
    )
}

#[test]
fn test_tier_boundaries() {
    let cases = [
        (0, Category::EarlyRisk, false, 400),
        (49, Category::EarlyRisk, false, 400),
        (50, Category::MidLife, false, 300),
        (74, Category::MidLife, false, 300),
        (75, Category::Geriatric, false, 200),
        (79, Category::Geriatric, false, 200),
        (80, Category::Geriatric, true, 250),
        (104, Category::Geriatric, true, 250),
    ];

    for (age, category, elevated, reward) in cases {
        let submission = map_record(&aged(age), 1);
        assert_eq!(submission.age, age, "age {}", age);
        assert_eq!(submission.category, category, "age {}", age);
        assert_eq!(submission.elevated, elevated, "age {}", age);
        assert_eq!(submission.reward_amount, reward, "age {}", age);
    }
}

#[test]
fn test_birthday_not_yet_reached() {
    let record = RawRecord::new("Sam Poe", "GA", "1943-06-10", "2023-06-09");
    let submission = map_record(&record, 1);
    assert_eq!(submission.age, 79);
    assert!(!submission.elevated);
}

#[test]
fn test_scenario_rewards() {
    let ages = [30, 55, 76, 81, 45, 60, 77, 82, 20, 50, 70, 90];
    let records: Vec<RawRecord> = ages.iter().map(|a| aged(*a)).collect();

    let rewards: Vec<u64> = map_all(&records).iter().map(|s| s.reward_amount).collect();

    assert_eq!(
        rewards,
        vec![400, 300, 200, 250, 400, 300, 200, 250, 400, 300, 300, 250]
    );
    assert_eq!(rewards.iter().sum::<u64>(), 3550);
}

#[test]
fn test_unreadable_dates_use_default_age() {
    let record = RawRecord::new("Sam Poe", "GA", "sometime", "");
    let submission = map_record(&record, 1);
    assert_eq!(submission.age, DEFAULT_AGE);
    assert!(submission.age_defaulted);
    assert_eq!(submission.category, Category::Geriatric);
    assert_eq!(submission.reward_amount, 200);
}

#[test]
fn test_last_updated_stands_in_for_death_date() {
    let record = RawRecord::new("Sam Poe", "GA", "1960-01-01", "").with_last_updated("2021-01-02");
    let submission = map_record(&record, 1);
    assert_eq!(submission.age, 61);
    assert!(!submission.age_defaulted);
}

#[test]
fn test_labels() {
    let plain = map_record(&aged(30), 1);
    assert_eq!(plain.label, "EarlyRisk - GA");

    let veteran = map_record(
        &RawRecord::new("Al Moe", "Florida", "1930-01-01", "2020-01-01")
            .with_city("Bay Pines National Cemetery"),
        1,
    );
    assert!(veteran.veteran_signal);
    assert_eq!(veteran.label, "Geriatric (Elevated, Veteran Signal) - FL");
    // The signal only decorates the label
    assert_eq!(veteran.reward_amount, 250);
}

#[test]
fn test_unknown_region() {
    let submission = map_record(&RawRecord::new("Al Moe", "", "1950-01-01", "2020-01-01"), 1);
    assert_eq!(submission.region, "UNKNOWN");
    assert!(submission.label.ends_with("- UNKNOWN"));
}
