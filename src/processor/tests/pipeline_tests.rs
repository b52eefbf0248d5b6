//! Per-country processing tests

use super::write_manifest;
use crate::config::Config;
use crate::error::PcodeError;
use crate::models::PCode;
use crate::processor::{CountryProcessor, CountryStatus, process_global, process_workbook};
use std::fs;
use tempfile::TempDir;

fn processor(temp_dir: &TempDir) -> CountryProcessor {
    CountryProcessor::new(temp_dir.path().to_path_buf(), Config::default())
}

#[test]
fn test_missing_dataset_yields_empty_result() {
    let temp_dir = TempDir::new().unwrap();

    let result = processor(&temp_dir).process_country("CMR");

    assert_eq!(result.status, CountryStatus::MissingDataset);
    assert!(result.pcodes.is_empty());
}

#[test]
fn test_missing_gazetteer_yields_empty_result() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        "CMR",
        r#"{"name": "cod-ab-cmr", "dataset_date": "2019-06-01",
            "resources": [{"name": "shapes.zip", "url": "shapes.zip"}]}"#,
    );

    let result = processor(&temp_dir).process_country("CMR");

    assert_eq!(result.status, CountryStatus::MissingGazetteer);
}

#[test]
fn test_bad_reference_date_yields_empty_result() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        "CMR",
        r#"{"name": "cod-ab-cmr", "dataset_date": "last june",
            "resources": [{"name": "cmr.xlsx", "url": "cmr.xlsx"}]}"#,
    );

    let result = processor(&temp_dir).process_country("CMR");

    assert_eq!(result.status, CountryStatus::MissingReferenceDate);
}

#[test]
fn test_unreadable_workbook_yields_empty_result() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        "CMR",
        r#"{"name": "cod-ab-cmr", "dataset_date": "2019-06-01",
            "resources": [{"name": "cmr.xlsx", "url": "cmr.xlsx"}]}"#,
    );
    fs::write(temp_dir.path().join("cod-ab-cmr").join("cmr.xlsx"), "not a zip").unwrap();

    let result = processor(&temp_dir).process_country("CMR");

    assert_eq!(result.status, CountryStatus::Unreadable);
    assert!(result.pcodes.is_empty());
}

#[test]
fn test_batch_continues_past_failures() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        "ARM",
        r#"{"name": "cod-ab-arm", "resources": []}"#,
    );
    let countries = vec!["ARM".to_string(), "CMR".to_string()];

    let (results, stats) = processor(&temp_dir).process_countries(&countries, None);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].country, "ARM");
    assert_eq!(results[0].status, CountryStatus::MissingGazetteer);
    assert_eq!(results[1].status, CountryStatus::MissingDataset);
    assert_eq!(stats.countries_processed, 2);
    assert_eq!(stats.countries_empty, 2);
    assert_eq!(stats.pcodes_extracted, 0);
}

#[test]
fn test_process_workbook_errors() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cmr.xlsx");
    fs::write(&path, "not a zip").unwrap();
    let config = Config::default();

    let bad_date = process_workbook(&path, "CMR", &config, "June");
    assert!(matches!(
        bad_date,
        Err(PcodeError::InvalidReferenceDate { .. })
    ));

    let unreadable = process_workbook(&path, "CMR", &config, "2019-06-01");
    assert!(matches!(unreadable, Err(PcodeError::Workbook { .. })));
}

#[test]
fn test_process_global_csv() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("global_pcodes.csv");
    fs::write(
        &path,
        "Location,Admin Level,P-Code,Name,Parent P-Code,Valid from date\n\
         #country+code,#geo+admin_level,#adm+code,#adm+name,#adm+code+parent,#date+start\n\
         AFG,1,AF01,Kabul,AFG,2021-11-17\n\
         AFG,2,AF0101,Kabul,AF01,2021-11-17\n",
    )
    .unwrap();

    let pcodes = process_global(&path).unwrap();

    assert_eq!(pcodes.len(), 3);
    assert_eq!(pcodes[0], PCode::hxl_tags());
    assert_eq!(pcodes[1].code, "AF01");
    assert_eq!(pcodes[2].admin_level, "2");
}

#[test]
fn test_process_global_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = process_global(&temp_dir.path().join("missing.csv"));
    assert!(result.is_err());
}
