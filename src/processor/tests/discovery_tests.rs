//! Dataset discovery and gazetteer selection tests

use super::write_manifest;
use crate::config::Config;
use crate::error::PcodeError;
use crate::processor::discovery::{
    DatasetManifest, Resource, dataset_dir, discover_countries, find_gazetteer,
    parse_reference_date,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn resource(name: &str, description: &str, url: &str) -> Resource {
    Resource {
        name: name.to_string(),
        description: description.to_string(),
        format: String::new(),
        url: url.to_string(),
    }
}

fn manifest(resources: Vec<Resource>) -> DatasetManifest {
    DatasetManifest {
        name: "cod-ab-test".to_string(),
        dataset_date: Some("[2019-06-01T00:00:00 TO 2019-06-01T23:59:59]".to_string()),
        resources,
        dir: PathBuf::from("/cache/cod-ab-test"),
    }
}

#[test]
fn test_parse_reference_date_formats() {
    assert_eq!(
        parse_reference_date("[2019-06-01T00:00:00 TO 2020-01-01T23:59:59]").unwrap(),
        "2019-06-01"
    );
    assert_eq!(parse_reference_date("2021-11-17").unwrap(), "2021-11-17");
    assert_eq!(parse_reference_date("06/01/2019").unwrap(), "2019-06-01");
    assert_eq!(
        parse_reference_date("06/01/2019-12/31/2019").unwrap(),
        "2019-06-01"
    );
}

#[test]
fn test_parse_reference_date_rejects_garbage() {
    let err = parse_reference_date("sometime in 2019").unwrap_err();
    assert!(matches!(err, PcodeError::InvalidReferenceDate { .. }));
    assert!(parse_reference_date("").is_err());
}

#[test]
fn test_resource_file_type() {
    let mut r = resource("cmr_admbnda.xlsx", "", "cmr_admbnda.XLSX");
    assert_eq!(r.file_type(), "xlsx");
    r.format = " XLS ".to_string();
    assert_eq!(r.file_type(), "xls");
    assert_eq!(resource("noext", "", "noext").file_type(), "");
}

#[test]
fn test_find_gazetteer_single_spreadsheet() {
    let config = Config::default();
    let m = manifest(vec![
        resource("cmr_admbnda_shp.zip", "Shapefiles", "cmr_admbnda_shp.zip"),
        resource("cmr_adminboundaries.xlsx", "", "cmr_adminboundaries.xlsx"),
    ]);

    let found = find_gazetteer(&m, "CMR", &config).unwrap();

    assert_eq!(found.name, "cmr_adminboundaries.xlsx");
    assert_eq!(
        m.resource_path(found),
        PathBuf::from("/cache/cod-ab-test/cmr_adminboundaries.xlsx")
    );
}

#[test]
fn test_find_gazetteer_prefers_described_gazetteer() {
    let config = Config::default();
    let m = manifest(vec![
        resource("population.xlsx", "Population statistics", "population.xlsx"),
        resource("names.xlsx", "Administrative gazetteer", "names.xlsx"),
        resource("cmr_adm_tabular_data.xlsx", "", "cmr_adm_tabular_data.xlsx"),
    ]);

    let found = find_gazetteer(&m, "CMR", &config).unwrap();

    assert_eq!(found.name, "names.xlsx");
}

#[test]
fn test_find_gazetteer_matches_tabular_data_name() {
    let config = Config::default();
    let m = manifest(vec![
        resource("population.xlsx", "Population statistics", "population.xlsx"),
        resource("arm_adm_tabulardata.xlsx", "", "arm_adm_tabulardata.xlsx"),
    ]);

    let found = find_gazetteer(&m, "ARM", &config).unwrap();

    assert_eq!(found.name, "arm_adm_tabulardata.xlsx");
}

#[test]
fn test_find_gazetteer_resource_exception() {
    let config = Config::default().with_resource_exception("moz", "moz_gazetteer_2019.xlsx");
    let m = manifest(vec![
        resource("moz_adm_tabulardata.xlsx", "gazetteer", "a.xlsx"),
        resource("moz_gazetteer_2019.xlsx", "", "b.xlsx"),
    ]);

    let found = find_gazetteer(&m, "MOZ", &config).unwrap();

    assert_eq!(found.url, "b.xlsx");
}

#[test]
fn test_find_gazetteer_none() {
    let config = Config::default();
    let m = manifest(vec![resource("shapes.zip", "", "shapes.zip")]);

    assert!(find_gazetteer(&m, "CMR", &config).is_none());
}

#[test]
fn test_manifest_load() {
    let temp_dir = TempDir::new().unwrap();
    write_manifest(
        temp_dir.path(),
        "CMR",
        r#"{
            "name": "cod-ab-cmr",
            "dataset_date": "[2019-06-01T00:00:00 TO 2019-06-01T23:59:59]",
            "resources": [
                {"name": "cmr_admbnda.xlsx", "format": "XLSX", "url": "cmr_admbnda.xlsx"}
            ]
        }"#,
    );
    let dir = dataset_dir(temp_dir.path(), "CMR");

    let m = DatasetManifest::load(&dir).unwrap();

    assert_eq!(m.name, "cod-ab-cmr");
    assert_eq!(m.reference_date().unwrap(), "2019-06-01");
    assert_eq!(m.resources[0].description, "");
    assert_eq!(m.dir, dir);
}

#[test]
fn test_manifest_load_errors() {
    let temp_dir = TempDir::new().unwrap();
    let missing = DatasetManifest::load(&temp_dir.path().join("cod-ab-xyz"));
    assert!(matches!(missing, Err(PcodeError::DatasetNotFound { .. })));

    write_manifest(temp_dir.path(), "BAD", "{ not json");
    let invalid = DatasetManifest::load(&dataset_dir(temp_dir.path(), "BAD"));
    assert!(matches!(invalid, Err(PcodeError::Manifest { .. })));
}

#[test]
fn test_manifest_without_date() {
    let m = DatasetManifest {
        dataset_date: None,
        ..manifest(Vec::new())
    };
    assert!(matches!(
        m.reference_date(),
        Err(PcodeError::InvalidReferenceDate { .. })
    ));
}

#[test]
fn test_discover_countries() {
    let temp_dir = TempDir::new().unwrap();
    let manifest = r#"{"name": "x", "resources": []}"#;
    write_manifest(temp_dir.path(), "ARM", manifest);
    write_manifest(temp_dir.path(), "CMR", manifest);
    std::fs::create_dir_all(temp_dir.path().join("cod-ab-moz")).unwrap();
    std::fs::create_dir_all(temp_dir.path().join("unrelated")).unwrap();

    let countries = discover_countries(temp_dir.path()).unwrap();

    assert_eq!(countries, vec!["ARM", "CMR"]);
}

#[test]
fn test_discover_countries_missing_cache() {
    let temp_dir = TempDir::new().unwrap();
    let result = discover_countries(&temp_dir.path().join("nope"));
    assert!(matches!(result, Err(PcodeError::DatasetNotFound { .. })));
}
