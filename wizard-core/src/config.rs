//! Configuration file support
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.wizardrc.json` in project root
//! 3. `wizard.config.json` in project root
//! 4. `"wizard"` key in `package.json`
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::strategy::ParseStrategy;
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default exclude patterns applied when the config names none
///
/// Tests and fixtures exercise samples; they are not samples themselves.
const DEFAULT_EXCLUDES: &[&str] = &[
    "**/test/**",
    "**/tests/**",
    "**/__tests__/**",
    "**/*.test.*",
    "**/*.spec.*",
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
];

/// Configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    /// Glob patterns for files to include (default: all supported extensions)
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns for files to exclude (default: tests, node_modules, dist, build)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Which source parsers to run (default: auto)
    #[serde(default)]
    pub strategy: Option<ParseStrategy>,

    /// Attach `[START tag]`/`[END tag]` region tags to methods (default: true)
    #[serde(default)]
    pub region_tags: Option<bool>,
}

/// Resolved configuration with compiled glob patterns
#[derive(Debug)]
pub struct ResolvedConfig {
    /// Compiled include patterns (None means include all)
    pub include: Option<GlobSet>,
    /// Compiled exclude patterns
    pub exclude: GlobSet,
    pub strategy: ParseStrategy,
    pub region_tags: bool,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl WizardConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.include {
            Glob::new(pattern).with_context(|| format!("invalid include pattern: {}", pattern))?;
        }
        for pattern in &self.exclude {
            Glob::new(pattern).with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        }
        Ok(())
    }

    /// Resolve config into compiled form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let include = if self.include.is_empty() {
            None
        } else {
            Some(build_glob_set(self.include.iter().map(String::as_str))?)
        };

        let exclude = if self.exclude.is_empty() {
            build_glob_set(DEFAULT_EXCLUDES.iter().copied())?
        } else {
            build_glob_set(self.exclude.iter().map(String::as_str))?
        };

        Ok(ResolvedConfig {
            include,
            exclude,
            strategy: self.strategy.unwrap_or_default(),
            region_tags: self.region_tags.unwrap_or(true),
            config_path: None,
        })
    }
}

fn build_glob_set<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

impl ResolvedConfig {
    /// Check if a file path should be included based on include/exclude patterns
    ///
    /// Paths are matched as given; see [`ResolvedConfig::relative_path`].
    pub fn should_include(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        if self.exclude.is_match(path_str.as_ref()) {
            return false;
        }

        if let Some(ref include) = self.include {
            return include.is_match(path_str.as_ref());
        }

        true
    }

    /// Path of `file` as seen by the include/exclude patterns
    ///
    /// Relative to the directory holding the config file when `file` lies
    /// under it, otherwise relative to `analysis_root`.
    pub fn relative_path<'a>(&self, file: &'a Path, analysis_root: &Path) -> &'a Path {
        self.config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .and_then(|dir| file.strip_prefix(dir).ok())
            .or_else(|| file.strip_prefix(analysis_root).ok())
            .unwrap_or(file)
    }

    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        WizardConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(WizardConfig, PathBuf)>> {
    for name in [".wizardrc.json", "wizard.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }

    let pkg_path = project_root.join("package.json");
    if pkg_path.exists() {
        if let Some(config) = load_from_package_json(&pkg_path)? {
            return Ok(Some((config, pkg_path)));
        }
    }

    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<WizardConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: WizardConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load config from the "wizard" key in package.json
fn load_from_package_json(path: &Path) -> Result<Option<WizardConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let pkg: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let Some(value) = pkg.get("wizard") else {
        return Ok(None);
    };

    let config: WizardConfig = serde_json::from_value(value.clone())
        .with_context(|| format!("invalid wizard config in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid wizard config in {}", path.display()))?;
    Ok(Some(config))
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        (load_config_file(path)?, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (WizardConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
