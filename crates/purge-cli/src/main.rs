//! Purge - bulk deletion for repository stores
//!
//! Usage:
//!   purge delete 'libs-release/com/acme/*'            # Confirm, then delete
//!   purge delete 'a/*' 'b/*.jar' -q --threads 8        # No prompt
//!   purge rm 'libs/*' --exclusions '*.pom' --dry-run  # Log only
//!   purge config set --threads 8 --scope global       # Persist a setting
//!   purge config show                                 # Effective settings

mod confirm;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use purge_core::commands::{DeleteCommand, DeleteOptions, DeleteReport};
use purge_core::config::{
    ConfigLayers, ConfigScope, ConfigStore, PurgeConfig, parse_purge_toml,
};
use purge_core::filter::FilterSpec;
use purge_core::remote::FsStore;

use crate::confirm::PromptConfirmer;

#[derive(Parser)]
#[command(name = "purge")]
#[command(about = "Bulk delete paths from a repository store", long_about = None)]
struct Cli {
    /// Read settings from this file instead of the global and project purge.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete every path matching the given patterns
    ///
    /// Paths inside a folder that is itself selected are not deleted
    /// separately; deleting the folder removes them.
    #[command(alias = "rm")]
    Delete(DeleteArgs),

    /// Show or change settings in purge.toml
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Print the settings a delete would run with
    Show {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Write settings to a purge.toml
    Set {
        /// Configuration scope (global, project)
        #[arg(long, default_value = "project")]
        scope: String,

        #[command(flatten)]
        settings: SettingArgs,
    },
}

#[derive(Args)]
struct SettingArgs {
    /// Concurrent delete calls
    #[arg(long, value_parser = parse_positive)]
    threads: Option<usize>,

    /// Paths kept in memory before buffering to a temp file
    #[arg(long, value_parser = parse_positive)]
    spill_threshold: Option<usize>,

    /// Directory served as the store
    #[arg(long)]
    store_root: Option<PathBuf>,

    /// Only log deletions unless overridden
    #[arg(long, action = ArgAction::Set)]
    dry_run: Option<bool>,
}

impl SettingArgs {
    /// The given settings as a config layer.
    fn to_config(&self) -> PurgeConfig {
        PurgeConfig {
            threads: self.threads,
            spill_threshold: self.spill_threshold,
            store_root: self.store_root.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Args)]
struct DeleteArgs {
    /// Wildcard patterns relative to the store root (`*` and `?`)
    #[arg(required = true, value_name = "PATTERN")]
    patterns: Vec<String>,

    /// Leave out paths matching this pattern (repeatable)
    #[arg(long, value_name = "PATTERN")]
    exclusions: Vec<String>,

    /// Let `*` match across folders
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    recursive: bool,

    /// Also delete build dependencies of matched artifacts
    #[arg(long)]
    include_deps: bool,

    /// Only delete build dependencies, not the artifacts themselves
    #[arg(long)]
    exclude_artifacts: bool,

    /// Concurrent delete calls [default: 3]
    #[arg(long, value_parser = parse_positive)]
    threads: Option<usize>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    quiet: bool,

    /// Only log what would be deleted
    #[arg(long)]
    dry_run: bool,

    /// Store root directory (defaults to the configured store_root, then the
    /// current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    format: OutputFormat,
}

impl DeleteArgs {
    fn filters(&self) -> Vec<FilterSpec> {
        self.patterns
            .iter()
            .map(|pattern| {
                FilterSpec::new(pattern)
                    .with_exclusions(self.exclusions.iter().cloned())
                    .recursive(self.recursive)
                    .include_dependencies(self.include_deps)
                    .exclude_artifacts(self.exclude_artifacts)
            })
            .collect()
    }
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable summary
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    let value: usize = s.parse().map_err(|e| format!("{e}"))?;
    if value == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(value)
}

fn parse_scope(s: &str) -> Result<ConfigScope> {
    match s.to_lowercase().as_str() {
        "global" | "g" => Ok(ConfigScope::Global),
        "project" | "p" => Ok(ConfigScope::Project),
        _ => anyhow::bail!("Invalid scope '{s}': expected 'global' or 'project'"),
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "purge=info,purge_core=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Delete(args) => run_delete(args, cli.config.as_deref()),
        Commands::Config(args) => run_config(args, cli.config.as_deref()),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<PurgeConfig> {
    if let Some(path) = explicit {
        return parse_purge_toml(path);
    }

    ConfigLayers::discover()?.load_merged()
}

fn run_config(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigSubcommand::Show { format } => {
            let config = load_config(config_path)?;
            match format {
                OutputFormat::Table => print_config_table(&config),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&config_json(&config))?);
                }
            }
        }
        ConfigSubcommand::Set { scope, settings } => {
            let changes = settings.to_config();
            if changes.is_empty() {
                anyhow::bail!("Nothing to set: pass at least one setting");
            }
            let store = match config_path {
                Some(path) => ConfigStore::from_file(path),
                None => ConfigStore::from_scope(parse_scope(&scope)?)?,
            };
            store.update(|config| config.overlay(changes))?;
            info!(path = %store.config_path().display(), "updated config");
            println!("Updated {}", store.config_path().display());
        }
    }
    Ok(())
}

fn print_config_table(config: &PurgeConfig) {
    let store_root = config
        .store_root
        .as_ref()
        .map(|root| root.display().to_string())
        .unwrap_or_else(|| "(current directory)".to_string());
    println!("threads          {}", config.threads_or_default());
    println!("spill_threshold  {}", config.spill_threshold_or_default());
    println!("store_root       {store_root}");
    println!("dry_run          {}", config.dry_run_or_default());
}

fn config_json(config: &PurgeConfig) -> serde_json::Value {
    serde_json::json!({
        "threads": config.threads_or_default(),
        "spill_threshold": config.spill_threshold_or_default(),
        "store_root": config.store_root.as_ref().map(|root| root.display().to_string()),
        "dry_run": config.dry_run_or_default(),
    })
}

fn run_delete(args: DeleteArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    let threads = args.threads.unwrap_or_else(|| config.threads_or_default());
    let dry_run = args.dry_run || config.dry_run_or_default();
    let spill_threshold = config.spill_threshold_or_default();
    let root = match args.root.clone().or_else(|| config.store_root.clone()) {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let options = DeleteOptions::new(args.filters())
        .with_threads(threads)
        .with_quiet(args.quiet)
        .with_dry_run(dry_run);

    let store = Arc::new(FsStore::new(&root).with_spill_threshold(spill_threshold));
    let cmd = DeleteCommand::new(store.clone(), store).with_spill_threshold(spill_threshold);
    info!(root = %root.display(), threads, dry_run, "starting delete");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let mut confirmer = PromptConfirmer::new();
    let report = runtime.block_on(cmd.execute(&options, &mut confirmer))?;

    match args.format {
        OutputFormat::Table => print_table(&report, dry_run),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report_json(&report, dry_run))?
            );
        }
    }

    if let Some(fatal) = &report.execution.fatal {
        anyhow::bail!("Delete stopped early: {fatal}");
    }
    if report.execution.outcome.fail_count() > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn status_label(report: &DeleteReport) -> &'static str {
    if report.total == 0 {
        "nothing_to_delete"
    } else if !report.confirmed {
        "cancelled"
    } else if report.execution.is_success() {
        "success"
    } else {
        "failure"
    }
}

fn print_table(report: &DeleteReport, dry_run: bool) {
    if report.total == 0 {
        println!("No paths matched, nothing to delete");
        return;
    }
    if !report.confirmed {
        println!("Delete cancelled, {} path(s) left in place", report.total);
        return;
    }

    let outcome = report.execution.outcome;
    if dry_run {
        println!("✓ [Dry run] Would delete {} path(s)", outcome.success_count());
    } else {
        println!("✓ Deleted {} path(s)", outcome.success_count());
    }
    if outcome.fail_count() > 0 {
        println!("✗ Failed to delete {} path(s)", outcome.fail_count());
    }
    if report.execution.not_attempted > 0 {
        println!(
            "⚠ {} path(s) were not attempted",
            report.execution.not_attempted
        );
    }
}

fn report_json(report: &DeleteReport, dry_run: bool) -> serde_json::Value {
    let outcome = report.execution.outcome;
    serde_json::json!({
        "status": status_label(report),
        "totals": {
            "success": outcome.success_count(),
            "failure": outcome.fail_count(),
        },
        "not_attempted": report.execution.not_attempted,
        "dry_run": dry_run,
        "error": report.execution.fatal.as_ref().map(|e| e.to_string()),
    })
}
