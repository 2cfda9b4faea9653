// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! stampsort: content-addressed renaming and dated sorting for image collections

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use stampsort::config::{AppConfig, PipelineMode};
use stampsort::classify::Classifier;
use stampsort::hasher::hash_file;
use stampsort::history::AuditLog;
use stampsort::pipeline::{Pipeline, RunReport};
use stampsort::{Result, StampsortError};

/// stampsort CLI - content-addressed renamer and sorter
#[derive(Parser, Debug)]
#[command(name = "stampsort")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Rename files to <date>-<sha256> names and sort them by year, month and technique", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "stampsort.json", global = true)]
    config: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Output format for results
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rename and relocate every file under the root
    Run {
        /// Directory tree to process (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Extension filter for renaming, e.g. ".png" (overrides config)
        #[arg(short, long)]
        ext: Option<String>,

        /// Classification root (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Stage scheduling: fused or two-pass (overrides config)
        #[arg(short, long)]
        mode: Option<PipelineMode>,

        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Abort on the first failing file
        #[arg(long)]
        fail_fast: bool,
    },

    /// Rename matching files in place without moving them
    Rename {
        /// Directory tree to process (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Extension filter, e.g. ".png" (overrides config)
        #[arg(short, long)]
        ext: Option<String>,

        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Move files into their year/month/technique directory
    Relocate {
        /// Directory tree to process (overrides config)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Classification root (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Show what would happen without touching any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the SHA-256 fingerprint of a file
    Hash {
        file: PathBuf,
    },

    /// Print the target directory a file would be sorted into
    Classify {
        file: PathBuf,

        /// Classification root (overrides config)
        #[arg(short, long)]
        root: Option<PathBuf>,
    },

    /// Audit log operations
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Write a default configuration file
    Init {
        /// Directory to initialize (default: current)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    /// List recent audit entries
    List {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "stampsort.json")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    let config = AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Run { dir, ext, root, mode, dry_run, fail_fast } => {
            let mut config = apply_overrides(config, dir, ext, root);
            if let Some(mode) = mode {
                config.mode = mode;
            }
            config.fail_fast |= fail_fast;
            let report = Pipeline::new(&config, dry_run)?
                .with_excluded(&cli.config)
                .run()?;
            print_report(&report, &cli.format, dry_run)
        }
        Commands::Rename { dir, ext, dry_run } => {
            let config = apply_overrides(config, dir, ext, None);
            let report = Pipeline::new(&config, dry_run)?
                .with_excluded(&cli.config)
                .rename_only()?;
            print_report(&report, &cli.format, dry_run)
        }
        Commands::Relocate { dir, root, dry_run } => {
            let config = apply_overrides(config, dir, None, root);
            let report = Pipeline::new(&config, dry_run)?
                .with_excluded(&cli.config)
                .relocate_only()?;
            print_report(&report, &cli.format, dry_run)
        }
        Commands::Hash { file } => {
            let hash = hash_file(&file)?;
            match cli.format.as_str() {
                "json" => println!(
                    "{}",
                    serde_json::json!({ "path": file.to_string_lossy(), "sha256": hash })
                ),
                _ => println!("{}  {}", hash, file.display()),
            }
            Ok(())
        }
        Commands::Classify { file, root } => {
            let config = apply_overrides(config, None, None, root);
            run_classify(&config, &file, &cli.format)
        }
        Commands::History { action } => run_history_command(&config, action, &cli.format),
        Commands::Config { action } => run_config_command(config, action, &cli.config),
        Commands::Init { dir, force } => run_init(dir, force),
    }
}

/// Layer command-line flags over file configuration
fn apply_overrides(
    mut config: AppConfig,
    dir: Option<PathBuf>,
    ext: Option<String>,
    root: Option<PathBuf>,
) -> AppConfig {
    if let Some(dir) = dir {
        config.root = dir.to_string_lossy().into_owned();
    }
    if let Some(ext) = ext {
        config.extension = ext;
    }
    if let Some(root) = root {
        config.classify_root = Some(root.to_string_lossy().into_owned());
    }
    config
}

fn print_report(report: &RunReport, format: &str, dry_run: bool) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => {
            let prefix = if dry_run { "[DRY RUN] " } else { "" };
            println!(
                "{}{} scanned, {} renamed, {} relocated, {} unchanged, {} failed",
                prefix, report.scanned, report.renamed, report.relocated, report.unchanged, report.failed
            );
        }
    }
    Ok(())
}

/// Show the target directory for one file
fn run_classify(config: &AppConfig, file: &Path, format: &str) -> Result<()> {
    let root = std::fs::canonicalize(config.classify_root_path())?;
    let file = std::fs::canonicalize(file)?;
    let classifier = Classifier::new(root, &config.classify);
    let target = classifier.classify(&file)?;

    match format {
        "json" => println!(
            "{}",
            serde_json::json!({
                "path": file.to_string_lossy(),
                "year": target.year.as_str(),
                "month": target.month.as_str(),
                "technique": target.technique.as_str(),
                "target": classifier.root().join(target.to_path()).to_string_lossy(),
            })
        ),
        _ => println!("{}", target),
    }
    Ok(())
}

/// Run audit log commands
fn run_history_command(config: &AppConfig, action: HistoryCommands, format: &str) -> Result<()> {
    let log = AuditLog::new(config.history_path());

    match action {
        HistoryCommands::List { count } => {
            let entries = log.get_recent(count)?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            println!("Recent history ({} entries):", entries.len());
            for entry in entries {
                println!(
                    "  {} [{}] {} -> {}",
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    entry.action,
                    entry.original_path.display(),
                    entry.new_path.display()
                );
            }
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{}", json);
        }
        ConfigCommands::Generate { output } => {
            AppConfig::default().save(&output)?;
            println!("Generated config at {:?}", output);
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration at {:?} is valid", config_path);
            println!("  Root: {}", config.root);
            println!("  Classification root: {}", config.classify_root_path().display());
            println!("  Extension: {}", config.extension);
            println!("  Mode: {}", config.mode);
            println!("  Audit log: {}", config.history.path);
        }
    }

    Ok(())
}

/// Write a default configuration into a directory
fn run_init(dir: Option<PathBuf>, force: bool) -> Result<()> {
    let target = dir.unwrap_or_else(|| PathBuf::from("."));
    let config_path = target.join("stampsort.json");

    let existed = config_path.exists();
    if existed && !force {
        return Err(StampsortError::Config(
            "stampsort.json already exists. Use --force to overwrite".to_string(),
        ));
    }

    std::fs::create_dir_all(&target)?;
    let mut config = AppConfig::default();
    config.root = target.to_string_lossy().into_owned();
    config.save(&config_path)?;

    info!("Initialized stampsort in {:?}", target);
    if existed {
        warn!("Overwrote existing configuration");
    }
    println!("Created {:?}", config_path);

    Ok(())
}
