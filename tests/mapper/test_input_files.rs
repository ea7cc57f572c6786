// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use ctbal_submitter::{map_all, read_records};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_csv_with_alias_columns() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("TX_20251118_us_recent_deaths.csv");
    fs::write(
        &path,
        "Full Name,City,County,Birth Date,Date of Death\n\
         Ann Lee,Austin,Travis,1944-07-01,2024-03-02\n\
         Bo Kim,Dallas,Dallas,1990-01-01,2024-03-02\n",
    )?;

    let records = read_records(&path, None)?;
    let submissions = map_all(&records);

    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].label, "Geriatric - TX");
    assert_eq!(submissions[1].label, "EarlyRisk - TX");
    Ok(())
}

#[test]
fn test_json_rows_keep_their_own_state() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("batch.json");
    fs::write(
        &path,
        r#"[
            {"name": "Ann Lee", "state": "Ohio", "birth_date": "1930-01-01", "death_date": "2020-01-01"},
            {"name": "Bo Kim", "state": "", "birth_date": "1960-01-01", "death_date": "2020-01-01"}
        ]"#,
    )?;

    let submissions = map_all(&read_records(&path, Some("WA"))?);

    assert_eq!(submissions[0].region, "OH");
    assert_eq!(submissions[1].region, "WA");
    Ok(())
}
