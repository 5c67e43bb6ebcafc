//! Wizard core library - finds the directly invoked sample methods of
//! JavaScript and TypeScript files, labels them with their region tags, and
//! validates the `.drift-data.yml` files describing those tags

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Syntax trees are only read, never modified
// - No global mutable state
// - Deterministic traversal order must be explicit
// - Formatting and whitespace must not affect results
// - Identical input yields byte-for-byte identical output

pub mod analysis;
pub mod ast;
pub mod config;
pub mod dialect;
pub mod direct_invocation;
pub mod drift_data;
pub mod parser;
pub mod region_tags;
pub mod report;
pub mod strategy;
pub mod wrapped_invocation;

pub use ast::SourceMethod;
pub use config::ResolvedConfig;
pub use drift_data::{TagInventory, ValidationReport};
pub use report::{render_json, render_jsonl, render_text, sort_methods};
pub use strategy::ParseStrategy;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Overrides that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub strategy: Option<ParseStrategy>,
    pub region_tags: Option<bool>,
}

/// Analyze files at the given path with default configuration
///
/// No include/exclude filtering is applied.
pub fn analyze(path: &Path, options: AnalysisOptions) -> Result<Vec<SourceMethod>> {
    analyze_with_config(path, options, None)
}

/// Analyze files at the given path with optional resolved configuration
///
/// Files that cannot be read or parsed are logged and skipped.
pub fn analyze_with_config(
    path: &Path,
    options: AnalysisOptions,
    resolved_config: Option<&ResolvedConfig>,
) -> Result<Vec<SourceMethod>> {
    let file_options = analysis::FileOptions {
        strategy: options
            .strategy
            .or(resolved_config.map(|c| c.strategy))
            .unwrap_or_default(),
        region_tags: options
            .region_tags
            .or(resolved_config.map(|c| c.region_tags))
            .unwrap_or(true),
    };

    let root = if path.is_file() {
        path.parent().unwrap_or(path)
    } else {
        path
    };

    let source_files: Vec<PathBuf> = collect_source_files(path)?
        .into_iter()
        .filter(|file| match resolved_config {
            Some(config) => config.should_include(config.relative_path(file, root)),
            None => true,
        })
        .collect();

    log::info!(
        "analyzing {} file(s) with the {} strategy",
        source_files.len(),
        file_options.strategy
    );

    let results: Vec<(PathBuf, Result<Vec<SourceMethod>>)> = source_files
        .into_par_iter()
        .map(|file| {
            let result = analysis::analyze_file(&file, file_options);
            (file, result)
        })
        .collect();

    let mut all_methods = Vec::new();
    let mut skipped_files: usize = 0;
    for (file, result) in results {
        match result {
            Ok(methods) => all_methods.extend(methods),
            Err(e) => {
                log::warn!("skipping file {}: {:#}", file.display(), e);
                skipped_files += 1;
            }
        }
    }
    if skipped_files > 0 {
        log::warn!("skipped {} file(s) due to analysis errors", skipped_files);
    }

    Ok(sort_methods(all_methods))
}

/// Check if a file is a supported source file
fn is_supported_source_file(path: &Path) -> bool {
    dialect::Dialect::from_path(path).is_some()
}

/// Collect all supported source files from a path (file or directory)
///
/// Supported extensions:
/// - JavaScript: .js, .mjs, .cjs, .jsx, .mjsx, .cjsx
/// - TypeScript: .ts, .mts, .cts, .tsx, .mtsx, .ctsx (excludes .d.ts)
pub(crate) fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    if path.is_file() {
        if is_supported_source_file(path) {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        collect_source_files_recursive(path, &mut files)?;
    }

    // Sort files for deterministic order
    files.sort();

    Ok(files)
}

/// Returns true for directory names that should not be traversed
pub(crate) fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.')
        || name == "node_modules"
        || name == "dist"
        || name == "build"
        || name == "out"
        || name == "coverage"
}

/// Recursively collect supported source files from a directory
///
/// Symlinks are not followed.
fn collect_source_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
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
                collect_source_files_recursive(&path, files)?;
            }
        } else if metadata.is_file() && is_supported_source_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}
