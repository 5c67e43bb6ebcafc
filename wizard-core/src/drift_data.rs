//! Region tag data file validation
//!
//! Sample directories describe their region tags in `.drift-data.yml` files:
//!
//! ```yaml
//! storage_list_files:
//!   system-test/files.test.js:
//!     - should list files
//!   additions:
//!     - storage_list_files_helper
//! storage_setup:
//!   tested: false
//! ```
//!
//! Every other key of a tag entry is a test file path, relative to the data
//! file unless absolute.
//!
//! Global invariants enforced:
//! - Data files are visited in sorted path order
//! - A tag may appear in at most one data file
//! - Validation never stops at the first problem; every message is reported

use crate::config::ResolvedConfig;
use crate::{analyze_with_config, collect_source_files, is_skipped_dir, region_tags, AnalysisOptions};
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// File name of region tag data files
pub const DRIFT_DATA_FILE: &str = ".drift-data.yml";

const TESTED_KEY: &str = "tested";
const ADDITIONS_KEY: &str = "additions";

/// Region tags known from the source files
#[derive(Debug, Clone, Default)]
pub struct TagInventory {
    /// Tags of every complete `[START]`/`[END]` region
    pub region_tags: BTreeSet<String>,
    /// Tags attached to at least one extracted method
    pub method_tags: BTreeSet<String>,
}

impl TagInventory {
    /// Scan `root` for region markers and extract its sample methods
    ///
    /// Markers are collected from every supported file; methods honor the
    /// include/exclude patterns of `resolved_config`.
    pub fn collect(
        root: &Path,
        options: AnalysisOptions,
        resolved_config: Option<&ResolvedConfig>,
    ) -> Result<Self> {
        let mut inventory = TagInventory::default();

        for file in collect_source_files(root)? {
            match std::fs::read_to_string(&file) {
                Ok(source) => inventory.region_tags.extend(
                    region_tags::extract_regions(&source)
                        .into_iter()
                        .map(|region| region.tag),
                ),
                Err(e) => log::warn!("skipping file {}: {}", file.display(), e),
            }
        }

        let methods = analyze_with_config(
            root,
            AnalysisOptions {
                region_tags: Some(true),
                ..options
            },
            resolved_config,
        )?;
        inventory.method_tags = methods
            .into_iter()
            .flat_map(|method| method.region_tags)
            .collect();

        log::info!(
            "{} region tag(s) in sources, {} attached to methods",
            inventory.region_tags.len(),
            inventory.method_tags.len()
        );
        Ok(inventory)
    }
}

/// Outcome of validating every data file under a directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub files: Vec<PathBuf>,
    pub messages: Vec<String>,
    pub is_valid: bool,
}

impl ValidationReport {
    /// Messages followed by the overall verdict, one per line
    pub fn render(&self) -> String {
        let verdict = if self.is_valid {
            "All files are valid."
        } else {
            "Invalid file(s) found!"
        };
        self.messages
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(verdict))
            .map(|line| format!("{}\n", line))
            .collect()
    }

    fn fail(&mut self, message: String) {
        self.messages.push(message);
        self.is_valid = false;
    }
}

/// Find all data files under `root`, sorted by path
pub fn find_drift_data_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if root.is_file() {
        if root.file_name().is_some_and(|name| name == DRIFT_DATA_FILE) {
            files.push(root.to_path_buf());
        }
    } else if root.is_dir() {
        find_recursive(root, &mut files)?;
    }
    files.sort();
    Ok(files)
}

fn find_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry_result in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let path = entry_result?.path();
        let metadata = std::fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to read metadata: {}", path.display()))?;

        if metadata.is_symlink() {
            continue;
        }

        if metadata.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_skipped_dir);
            if !skipped {
                find_recursive(&path, files)?;
            }
        } else if metadata.is_file() && path.file_name().is_some_and(|n| n == DRIFT_DATA_FILE) {
            files.push(path);
        }
    }
    Ok(())
}

/// Validate every data file under `root` against the known tags
pub fn validate_drift_data(root: &Path, tags: &TagInventory) -> Result<ValidationReport> {
    let files = find_drift_data_files(root)?;
    let mut report = ValidationReport {
        files: Vec::new(),
        messages: Vec::new(),
        is_valid: true,
    };

    let mut parsed = Vec::new();
    for path in &files {
        match load_data_file(path) {
            Ok(entries) => parsed.push((path.clone(), entries)),
            Err(e) => report.fail(format!("Yaml file {} could not be parsed: {:#}", path.display(), e)),
        }
    }

    // Tags against the sources, and uniqueness across files
    let mut seen = BTreeSet::new();
    for (path, entries) in &parsed {
        for (tag, entry) in entries {
            check_tag(&mut report, path, tag, entry, tags);
            if !seen.insert(tag.clone()) {
                report.fail(format!(
                    "Region tag {} is used multiple times in {} files!",
                    tag, DRIFT_DATA_FILE
                ));
            }
        }
    }

    // Reserved attributes and test file paths
    for (path, entries) in &parsed {
        for (tag, entry) in entries {
            check_attributes(&mut report, path, tag, entry, tags);
        }
    }
    report.files = files;

    log::debug!(
        "validated {} data file(s): {}",
        report.files.len(),
        if report.is_valid { "valid" } else { "invalid" }
    );
    Ok(report)
}

/// A tag entry of a data file
#[derive(Debug, Clone)]
enum TagEntry {
    Attributes(Mapping),
    Malformed(Value),
}

fn load_data_file(path: &Path) -> Result<Vec<(String, TagEntry)>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let document: Value = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let mapping = match document {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(mapping) => mapping,
        _ => anyhow::bail!("top level of {} is not a mapping of region tags", path.display()),
    };

    mapping
        .into_iter()
        .map(|(key, value)| {
            let tag = key
                .as_str()
                .map(str::to_string)
                .with_context(|| format!("region tag {} is not a string", describe(&key)))?;
            let entry = match value {
                Value::Null => TagEntry::Attributes(Mapping::new()),
                Value::Mapping(attributes) => TagEntry::Attributes(attributes),
                other => TagEntry::Malformed(other),
            };
            Ok((tag, entry))
        })
        .collect()
}

fn check_tag(
    report: &mut ValidationReport,
    path: &Path,
    tag: &str,
    entry: &TagEntry,
    tags: &TagInventory,
) {
    let untested = match entry {
        TagEntry::Attributes(attributes) => {
            matches!(attributes.get(TESTED_KEY), Some(Value::Bool(false)))
        }
        TagEntry::Malformed(_) => false,
    };

    if !tags.region_tags.contains(tag) {
        report.fail(format!(
            "Yaml file {} contains region tag not used in source files: {}",
            path.display(),
            tag
        ));
    } else if !untested && !tags.method_tags.contains(tag) {
        report.fail(format!(
            "Yaml file {} contains unparsed region tag: {}",
            path.display(),
            tag
        ));
        report.messages.push("  Remove it, or label it with \"tested: false\".".to_string());
    } else if untested && tags.method_tags.contains(tag) {
        report.fail(format!(
            "Parsed tag {} in file {} marked untested!",
            tag,
            path.display()
        ));
    }
}

fn check_attributes(
    report: &mut ValidationReport,
    path: &Path,
    tag: &str,
    entry: &TagEntry,
    tags: &TagInventory,
) {
    let attributes = match entry {
        TagEntry::Attributes(attributes) => attributes,
        TagEntry::Malformed(value) => {
            report.fail(format!(
                "Region tag {} in file {} is formatted incorrectly: {}",
                tag,
                path.display(),
                describe(value)
            ));
            return;
        }
    };

    if let Some(tested) = attributes.get(TESTED_KEY) {
        if !matches!(tested, Value::Bool(false)) {
            report.fail(format!(
                "Invalid {} value in file {} for tag {}: {}, expected false (or omission)",
                TESTED_KEY,
                path.display(),
                tag,
                describe(tested)
            ));
        }
    }

    if let Some(additions) = attributes.get(ADDITIONS_KEY) {
        match additions {
            Value::Sequence(added) => {
                for added_tag in added {
                    let known = added_tag
                        .as_str()
                        .is_some_and(|t| tags.region_tags.contains(t));
                    if !known {
                        report.fail(format!(
                            "Yaml file {} adds region tag not used in source files to {}: {}",
                            path.display(),
                            tag,
                            describe(added_tag)
                        ));
                    }
                }
            }
            _ => report.fail(format!(
                "Additions key for {} in {} is not a list!",
                tag,
                path.display()
            )),
        }
    }

    let data_dir = path.parent().unwrap_or_else(|| Path::new(""));
    for key in attributes.keys() {
        let Some(test_path) = key.as_str() else {
            report.fail(format!(
                "Region tag {} in file {} has a non-string key: {}",
                tag,
                path.display(),
                describe(key)
            ));
            continue;
        };
        if test_path == TESTED_KEY || test_path == ADDITIONS_KEY {
            continue;
        }

        let resolved = data_dir.join(test_path);
        if !resolved.exists() {
            report.fail(format!(
                "Test file {} used in {} not found!",
                resolved.display(),
                path.display()
            ));
        }
    }
}

/// Short textual form of a YAML value for messages
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn inventory(region: &[&str], method: &[&str]) -> TagInventory {
        TagInventory {
            region_tags: region.iter().map(|t| t.to_string()).collect(),
            method_tags: method.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn validate(yaml: &str, tags: &TagInventory) -> ValidationReport {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(DRIFT_DATA_FILE), yaml).unwrap();
        validate_drift_data(dir.path(), tags).unwrap()
    }

    #[test]
    fn test_valid_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("test")).unwrap();
        fs::write(dir.path().join("test/quickstart.test.js"), "").unwrap();
        fs::write(
            dir.path().join(DRIFT_DATA_FILE),
            "quickstart:\n  test/quickstart.test.js:\n    - runs\n  additions:\n    - setup\nsetup:\n  tested: false\n",
        )
        .unwrap();

        let report =
            validate_drift_data(dir.path(), &inventory(&["quickstart", "setup"], &["quickstart"]))
                .unwrap();
        assert!(report.is_valid, "{:?}", report.messages);
        assert!(report.messages.is_empty());
        assert_eq!(report.render(), "All files are valid.\n");
    }

    #[test]
    fn test_tag_missing_from_sources() {
        let report = validate("ghost:\n", &inventory(&[], &[]));
        assert!(!report.is_valid);
        assert!(report.messages[0].contains("not used in source files: ghost"));
        assert!(report.render().ends_with("Invalid file(s) found!\n"));
    }

    #[test]
    fn test_unparsed_tag_needs_untested_label() {
        let report = validate("setup:\n", &inventory(&["setup"], &[]));
        assert!(!report.is_valid);
        assert!(report.messages[0].contains("unparsed region tag: setup"));
        assert!(report.messages[1].contains("tested: false"));

        let labelled = validate("setup:\n  tested: false\n", &inventory(&["setup"], &[]));
        assert!(labelled.is_valid);
    }

    #[test]
    fn test_parsed_tag_marked_untested() {
        let report = validate("quickstart:\n  tested: false\n", &inventory(&["quickstart"], &["quickstart"]));
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].contains("Parsed tag quickstart"));
    }

    #[test]
    fn test_tested_must_be_false() {
        let report = validate("quickstart:\n  tested: true\n", &inventory(&["quickstart"], &["quickstart"]));
        assert!(!report.is_valid);
        assert!(report.messages[0].contains("Invalid tested value"));
        assert!(report.messages[0].contains(": true, expected false"));
    }

    #[test]
    fn test_additions_must_be_list_of_known_tags() {
        let tags = inventory(&["quickstart", "helper"], &["quickstart"]);

        let scalar = validate("quickstart:\n  additions: helper\n", &tags);
        assert!(scalar.messages[0].contains("is not a list!"));

        let unknown = validate("quickstart:\n  additions:\n    - helper\n    - ghost\n", &tags);
        assert_eq!(unknown.messages.len(), 1);
        assert!(unknown.messages[0].ends_with("to quickstart: ghost"));
    }

    #[test]
    fn test_missing_test_file() {
        let report = validate(
            "quickstart:\n  system-test/missing.test.js:\n    - runs\n",
            &inventory(&["quickstart"], &["quickstart"]),
        );
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].contains("missing.test.js"));
        assert!(report.messages[0].ends_with("not found!"));
    }

    #[test]
    fn test_malformed_entry() {
        let report = validate("quickstart: 3\n", &inventory(&["quickstart"], &["quickstart"]));
        assert!(!report.is_valid);
        assert!(report.messages[0].contains("formatted incorrectly: 3"));
    }

    #[test]
    fn test_unparseable_yaml_is_reported() {
        let report = validate("quickstart: [unclosed\n", &inventory(&[], &[]));
        assert!(!report.is_valid);
        assert!(report.messages[0].contains("could not be parsed"));
    }

    #[test]
    fn test_empty_file_is_valid() {
        assert!(validate("", &inventory(&[], &[])).is_valid);
    }

    #[test]
    fn test_find_skips_vendor_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join(DRIFT_DATA_FILE), "").unwrap();
        fs::write(dir.path().join("a").join(DRIFT_DATA_FILE), "").unwrap();
        fs::write(dir.path().join("node_modules/pkg").join(DRIFT_DATA_FILE), "").unwrap();
        fs::write(dir.path().join("a/other.yml"), "").unwrap();

        let files = find_drift_data_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join(DRIFT_DATA_FILE),
                dir.path().join("a").join(DRIFT_DATA_FILE)
            ]
        );
    }
}
