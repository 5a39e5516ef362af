//! peskas-data - load and inspect dashboard data snapshots
//!
//! Thin command-line front end over the `peskas_data` loader.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use peskas_data::{
    DataLoader, LoaderConfig, MultiBinding, ResourceBinding, ResourceLocator, ResourceName,
};

/// CLI command
#[derive(Debug, PartialEq)]
enum Command {
    /// Load resources and print them
    Load { names: Vec<ResourceName> },
    /// Warm the cache for resources and report what was cached
    Prefetch { names: Vec<ResourceName> },
    /// List known resources and their locations
    List,
    /// Show help
    Help,
}

fn print_help() {
    eprintln!(
        r#"peskas-data - Load Timor-Leste fisheries dashboard snapshots

USAGE:
    peskas-data load <name>...
    peskas-data prefetch <name>...
    peskas-data list
    peskas-data help

COMMANDS:
    load      Load one or more resources and print them as JSON
    prefetch  Warm the cache for resources, ignoring failures
    list      List known resources and where they are read from
    help      Show this help message

RESOURCES:
    aggregated, summary_data, taxa_aggregated, municipal_aggregated,
    predicted_tracks

ENVIRONMENT:
    PESKAS_DATA_SOURCE           Base URL or directory (default: /data)
    PESKAS_CACHE_TTL_SECS        Cache freshness window (default: 300)
    PESKAS_REQUEST_TIMEOUT_SECS  HTTP timeout (default: 30)
    RUST_LOG                     Log level (trace, debug, info, warn, error)
"#
    );
}

fn parse_names(args: &[String]) -> Result<Vec<ResourceName>> {
    if args.is_empty() {
        return Err(anyhow!("At least one resource name is required"));
    }
    args.iter()
        .map(|arg| arg.parse::<ResourceName>().map_err(anyhow::Error::from))
        .collect()
}

fn parse_args(args: &[String]) -> Result<Command> {
    if args.len() < 2 {
        return Ok(Command::Help);
    }

    match args[1].as_str() {
        "load" => Ok(Command::Load {
            names: parse_names(&args[2..])?,
        }),
        "prefetch" => Ok(Command::Prefetch {
            names: parse_names(&args[2..])?,
        }),
        "list" => Ok(Command::List),
        "help" | "--help" | "-h" => Ok(Command::Help),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            Ok(Command::Help)
        }
    }
}

async fn run_load(loader: Arc<DataLoader>, names: Vec<ResourceName>) -> Result<()> {
    if let [name] = names.as_slice() {
        let binding = ResourceBinding::new(loader, *name, true);
        let state = binding.settled().await;
        if let Some(error) = state.error {
            return Err(anyhow!("{}", error));
        }
        let payload = state
            .data
            .ok_or_else(|| anyhow!("Load of {} settled without data", name))?;
        println!("{}", serde_json::to_string_pretty(&*payload)?);
        return Ok(());
    }

    let binding = MultiBinding::new(loader, names);
    let state = binding.settled().await;
    if let Some(error) = state.error {
        return Err(anyhow!("{}", error));
    }
    let data = state
        .data
        .ok_or_else(|| anyhow!("Multi-resource load settled without data"))?;

    let mut output = serde_json::Map::new();
    for name in binding.resources() {
        if let Some(payload) = data.get(name) {
            output.insert(name.to_string(), serde_json::Value::clone(payload));
        }
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_prefetch(loader: Arc<DataLoader>, names: Vec<ResourceName>) -> Result<()> {
    loader
        .prefetch(names.iter().copied())
        .await
        .context("Prefetch task failed")?;

    let cached = loader.cache().cached_names();
    for name in &names {
        let status = if cached.contains(name) { "cached" } else { "failed" };
        println!("  {:<22} {}", name.as_str(), status);
    }

    let stats = loader.cache().stats();
    println!(
        "Cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
        stats.entries, stats.hits, stats.misses, stats.hit_rate
    );
    loader.cache().log_metrics();
    Ok(())
}

fn run_list(config: &LoaderConfig) {
    let locator = ResourceLocator::new(config.source.clone());
    println!("Resources ({}):", config.source);
    for name in ResourceName::ALL {
        println!("  {:<22} {}", name.as_str(), locator.locate(name));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let log_level = env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Parse command
    let args: Vec<String> = env::args().collect();
    let command = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };

    let config = LoaderConfig::from_env().context("Failed to read configuration")?;

    match command {
        Command::Load { names } => {
            let loader = Arc::new(DataLoader::from_config(&config)?);
            if let Err(e) = run_load(loader, names).await {
                error!(error = %e, "Load failed");
                std::process::exit(1);
            }
        }
        Command::Prefetch { names } => {
            let loader = Arc::new(DataLoader::from_config(&config)?);
            info!(count = names.len(), "Prefetching resources");
            run_prefetch(loader, names).await?;
        }
        Command::List => run_list(&config),
        Command::Help => print_help(),
    }

    Ok(())
}
