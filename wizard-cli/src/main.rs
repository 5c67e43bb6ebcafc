//! Wizard CLI - lists the directly invoked sample methods of JavaScript and TypeScript files
//! and validates their region tag data files

#![deny(warnings)]

// Global invariants enforced:
// - Deterministic output ordering
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use clap::{Parser, Subcommand};
use wizard_core::config::{self, ResolvedConfig};
use wizard_core::drift_data::{self, TagInventory};
use wizard_core::{
    analyze_with_config, render_json, render_jsonl, render_text, AnalysisOptions, ParseStrategy,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "wizard")]
#[command(about = "Finds the directly invoked sample methods of JavaScript and TypeScript files")]
#[command(version = env!("WIZARD_VERSION"))]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract sample methods from a file or directory
    Analyze {
        /// Path to source file or directory
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Source parsers to run (overrides config file)
        #[arg(long)]
        strategy: Option<StrategyArg>,

        /// Do not attach [START]/[END] region tags to methods
        #[arg(long)]
        no_region_tags: bool,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write output to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check `.drift-data.yml` files against the region tags of the sources
    ValidateYaml {
        /// Directory holding the samples and their data files
        path: PathBuf,

        /// Source parsers to run (overrides config file)
        #[arg(long)]
        strategy: Option<StrategyArg>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate or show a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without running analysis
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    Auto,
    Direct,
    Wrapped,
}

impl From<StrategyArg> for ParseStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Auto => ParseStrategy::Auto,
            StrategyArg::Direct => ParseStrategy::Direct,
            StrategyArg::Wrapped => ParseStrategy::Wrapped,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            path,
            format,
            strategy,
            no_region_tags,
            config: config_path,
            output,
        } => {
            let normalized_path = absolute_path(path)?;

            if !normalized_path.exists() {
                anyhow::bail!("Path does not exist: {}", normalized_path.display());
            }

            let project_root = find_repo_root(&normalized_path).unwrap_or_else(|_| {
                if normalized_path.is_file() {
                    normalized_path
                        .parent()
                        .map_or_else(|| normalized_path.clone(), Path::to_path_buf)
                } else {
                    normalized_path.clone()
                }
            });
            let config_path = config_path.map(absolute_path).transpose()?;
            let resolved_config = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved_config.config_path {
                log::info!("using config: {}", config_path.display());
            }

            // CLI flags override config file values
            let options = AnalysisOptions {
                strategy: strategy.map(ParseStrategy::from),
                region_tags: no_region_tags.then_some(false),
            };

            let methods = analyze_with_config(&normalized_path, options, Some(&resolved_config))?;

            let rendered = match format {
                OutputFormat::Text => render_text(&methods),
                OutputFormat::Json => render_json(&methods) + "\n",
                OutputFormat::Jsonl => render_jsonl(&methods),
            };

            match output {
                Some(output_path) => {
                    write_output(&output_path, &rendered)?;
                    log::info!(
                        "wrote {} method(s) to {}",
                        methods.len(),
                        output_path.display()
                    );
                }
                None => print!("{}", rendered),
            }
        }
        Commands::ValidateYaml {
            path,
            strategy,
            config: config_path,
            output,
        } => {
            let root = absolute_path(path)?;
            if !root.is_dir() {
                anyhow::bail!("Not a directory: {}", root.display());
            }

            let project_root = find_repo_root(&root).unwrap_or_else(|_| root.clone());
            let config_path = config_path.map(absolute_path).transpose()?;
            let resolved_config = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            let options = AnalysisOptions {
                strategy: strategy.map(ParseStrategy::from),
                region_tags: Some(true),
            };
            let tags = TagInventory::collect(&root, options, Some(&resolved_config))?;
            let report = drift_data::validate_drift_data(&root, &tags)?;
            let rendered = report.render();

            match output {
                Some(output_path) => write_output(&output_path, &rendered)?,
                None => print!("{}", rendered),
            }

            if !report.is_valid {
                std::process::exit(1);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                match config::load_and_resolve(&project_root, path.as_deref()) {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print!("{}", describe_config(&resolved));
            }
        },
    }

    Ok(())
}

/// Resolve a relative path against the current directory
fn absolute_path(path: PathBuf) -> anyhow::Result<PathBuf> {
    if path.is_relative() {
        Ok(std::env::current_dir()?.join(path))
    } else {
        Ok(path)
    }
}

/// Initialize env_logger; `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Human-readable summary of a resolved configuration
fn describe_config(resolved: &ResolvedConfig) -> String {
    let source = match resolved.config_path {
        Some(ref p) => p.display().to_string(),
        None => "defaults (no config file found)".to_string(),
    };
    format!(
        "Configuration:\n  Source: {}\n\nExtraction:\n  strategy: {}\n  region_tags: {}\n\nFilters:\n  include: {}\n",
        source,
        resolved.strategy,
        resolved.region_tags,
        if resolved.include.is_some() {
            "custom patterns"
        } else {
            "all supported files"
        },
    )
}

/// Write rendered output, creating parent directories as needed
fn write_output(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Atomic write (temp + rename pattern)
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;
    Ok(())
}

/// Find the enclosing git repository root, where config files are looked up
fn find_repo_root(start_path: &Path) -> anyhow::Result<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("invalid file path"))?
            .to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        if current.join(".git").exists() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => anyhow::bail!("not in a git repository (no .git directory found)"),
        }
    }
}
