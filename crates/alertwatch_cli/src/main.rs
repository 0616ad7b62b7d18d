//! `alertwatch` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, load config and initialize logging.
//! - Dispatch to the run / normalize / select commands.

mod fetch;
mod pipeline;

use alertwatch_core::{
    decode_feed, init_logging, init_stderr_logging, AlertSelector, MonitorConfig,
    StrategyRegistry,
};
use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alertwatch")]
#[command(version, about = "Republishes a transit disruption's active periods as a static page")]
struct Cli {
    /// JSON config file; every field is optional.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `log_level` from the config.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, select, normalize, diff and render.
    Run(RunArgs),
    /// Normalize one active-period string and print the periods as JSON.
    Normalize(NormalizeArgs),
    /// Print route/phrase selection signals for every alert in a feed.
    Select(SelectArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Read the feed from a file instead of the configured URL.
    #[arg(long)]
    feed_file: Option<PathBuf>,
    /// Year applied to month/day tokens.
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    state_db: Option<PathBuf>,
    /// Normalization strategy id (`grammar` or `raw`).
    #[arg(long)]
    strategy: Option<String>,
    /// Fail on malformed date/time tokens instead of falling back.
    #[arg(long)]
    strict: bool,
    /// Require the route sort-order match in addition to the header phrase.
    #[arg(long)]
    require_route: bool,
    /// Classify changes without updating the stored snapshot.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct NormalizeArgs {
    /// Agency active-period text.
    text: String,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    strict: bool,
    #[arg(long)]
    strategy: Option<String>,
}

#[derive(Args)]
struct SelectArgs {
    /// Read the feed from a file instead of the configured URL.
    #[arg(long)]
    feed_file: Option<PathBuf>,
    #[arg(long)]
    require_route: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MonitorConfig::load(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }

    match cli.command {
        Command::Run(args) => {
            apply_run_overrides(&mut config, &args);
            start(&config)?;
            pipeline::run(
                &config,
                resolve_year(&config),
                args.feed_file.as_deref(),
                args.dry_run,
            )
        }
        Command::Normalize(args) => {
            config.assumed_year = args.year.or(config.assumed_year);
            config.strict_tokens |= args.strict;
            if let Some(strategy) = args.strategy {
                config.strategy = strategy;
            }
            start(&config)?;
            normalize_command(&config, &args.text)
        }
        Command::Select(args) => {
            if args.require_route {
                config.selection_policy = alertwatch_core::SelectionPolicy::RouteAndPhrase;
            }
            start(&config)?;
            select_command(&config, args.feed_file.as_deref())
        }
    }
}

fn apply_run_overrides(config: &mut MonitorConfig, args: &RunArgs) {
    if let Some(year) = args.year {
        config.assumed_year = Some(year);
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(state_db) = &args.state_db {
        config.state_db_path = state_db.clone();
    }
    if let Some(strategy) = &args.strategy {
        config.strategy = strategy.clone();
    }
    config.strict_tokens |= args.strict;
    if args.require_route {
        config.selection_policy = alertwatch_core::SelectionPolicy::RouteAndPhrase;
    }
}

/// Validates config and brings up logging.
fn start(config: &MonitorConfig) -> Result<()> {
    config.validate()?;
    match &config.log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .ok_or_else(|| anyhow!("log_dir is not valid UTF-8: {}", dir.display()))?;
            init_logging(&config.log_level, dir).map_err(|err| anyhow!(err))
        }
        None => init_stderr_logging(&config.log_level).map_err(|err| anyhow!(err)),
    }
}

fn resolve_year(config: &MonitorConfig) -> i32 {
    config.resolved_year(chrono::Local::now().year())
}

/// Builds the registry and selects the configured strategy.
pub(crate) fn strategy_registry(config: &MonitorConfig) -> Result<StrategyRegistry> {
    let mut registry = StrategyRegistry::with_builtin(config.normalize_options());
    registry
        .select_active(&config.strategy)
        .with_context(|| format!("available strategies: {:?}", registry.strategy_ids()))?;
    Ok(registry)
}

fn normalize_command(config: &MonitorConfig, text: &str) -> Result<()> {
    let registry = strategy_registry(config)?;
    let strategy = registry.active_strategy()?;
    let periods = strategy.normalize(text, resolve_year(config))?;
    println!("{}", serde_json::to_string_pretty(&periods)?);
    Ok(())
}

fn select_command(config: &MonitorConfig, feed_file: Option<&std::path::Path>) -> Result<()> {
    let body = fetch::load_feed(config, feed_file)?;
    let alerts = decode_feed(&body)?;
    let selector = AlertSelector::new(config.selection_criteria());

    for alert in &alerts {
        let signals = selector.evaluate(alert);
        let line = json!({
            "id": alert.id,
            "header": alert.header_text,
            "route_match": signals.route_match,
            "phrase_match": signals.phrase_match,
            "included": selector.admits(signals),
        });
        println!("{line}");
    }
    Ok(())
}
