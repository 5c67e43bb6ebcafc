//! Region tag data file validation over the fixture sample trees

use wizard_core::drift_data::{find_drift_data_files, validate_drift_data, DRIFT_DATA_FILE};
use wizard_core::{AnalysisOptions, TagInventory};
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join("drift")
        .join(name)
}

fn collect(root: &std::path::Path) -> TagInventory {
    TagInventory::collect(root, AnalysisOptions::default(), None).unwrap()
}

#[test]
fn test_inventory_separates_region_and_method_tags() {
    let tags = collect(&fixture_path("valid"));
    assert_eq!(
        tags.region_tags.iter().collect::<Vec<_>>(),
        vec!["drift_quickstart", "drift_setup_only"]
    );
    assert_eq!(tags.method_tags.iter().collect::<Vec<_>>(), vec!["drift_quickstart"]);
}

#[test]
fn test_valid_tree() {
    let root = fixture_path("valid");
    let report = validate_drift_data(&root, &collect(&root)).unwrap();

    assert_eq!(report.files, vec![root.join(DRIFT_DATA_FILE)]);
    assert!(report.is_valid, "{:?}", report.messages);
    assert_eq!(report.render(), "All files are valid.\n");
}

#[test]
fn test_invalid_tree_reports_every_problem() {
    let root = fixture_path("invalid");
    let report = validate_drift_data(&root, &collect(&root)).unwrap();

    assert_eq!(
        report.files,
        vec![
            root.join(DRIFT_DATA_FILE),
            root.join("nested").join(DRIFT_DATA_FILE)
        ]
    );
    assert!(!report.is_valid);

    let expected = [
        "Parsed tag drift_parsed in file",
        "contains unparsed region tag: drift_unparsed",
        "Remove it, or label it with \"tested: false\".",
        "contains region tag not used in source files: drift_missing",
        "Region tag drift_parsed is used multiple times in .drift-data.yml files!",
        "Additions key for drift_unparsed in",
        "Invalid tested value in file",
        "missing.test.js used in",
    ];
    assert_eq!(report.messages.len(), expected.len(), "{:#?}", report.messages);
    for (message, fragment) in report.messages.iter().zip(expected) {
        assert!(message.contains(fragment), "{:?} lacks {:?}", message, fragment);
    }
    assert!(report.render().ends_with("Invalid file(s) found!\n"));
}

#[test]
fn test_sample_tree_has_no_data_files() {
    let samples = fixture_path("").parent().unwrap().join("samples");
    assert!(find_drift_data_files(&samples).unwrap().is_empty());

    let report = validate_drift_data(&samples, &TagInventory::default()).unwrap();
    assert!(report.is_valid);
}
