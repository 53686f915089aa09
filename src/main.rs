//! Confscout main entry point
//!
//! Command-line interface for the conference outreach discovery pipeline.

use anyhow::Context;
use clap::Parser;
use confscout::config::{load_config_with_hash, Config};
use confscout::output::{export_csv, print_run_summary};
use confscout::pipeline::Coordinator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Confscout: conference discovery and outreach contact pipeline
///
/// Discovers conferences on the configured listing sites, mines each
/// conference's own website for organizer contact details, and exports a
/// deduplicated CSV ready for outreach.
#[derive(Parser, Debug)]
#[command(name = "confscout")]
#[command(version)]
#[command(about = "Conference discovery and outreach contact pipeline", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be searched without any network
    /// activity
    #[arg(long)]
    dry_run: bool,

    /// Override the configured output CSV path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Override the configured candidate cap
    #[arg(long, value_name = "N")]
    max_conferences: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded (hash: {})", config_hash);

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }
    if let Some(max) = cli.max_conferences {
        config.search.max_conferences = max;
    }

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    run_pipeline(config).await
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("confscout=info,warn"),
            1 => EnvFilter::new("confscout=debug,info"),
            2 => EnvFilter::new("confscout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Shows what a run would do, without touching the network
fn print_dry_run(config: &Config) {
    println!("=== Confscout Dry Run ===\n");

    println!("Search:");
    println!("  Sources: {}", config.search.sources.join(", "));
    println!("  Keywords: {}", config.search.keywords.join(", "));
    println!("  Location: {}", config.search.location);
    match (config.search.start_date, config.search.end_date) {
        (Some(start), Some(end)) => println!("  Date range: {} to {}", start, end),
        (Some(start), None) => println!("  Date range: {} onwards", start),
        (None, Some(end)) => println!("  Date range: until {}", end),
        (None, None) => println!("  Date range: unbounded"),
    }
    println!("  Max conferences: {}", config.search.max_conferences);

    println!("\nPacing:");
    println!(
        "  Delay: {}..{} ms per domain",
        config.pacing.delay_min_ms, config.pacing.delay_max_ms
    );
    println!(
        "  Identity pool: {} user agents, rotating every {} requests",
        config.identity.user_agents.len(),
        config.pacing.rotate_after_requests
    );
    println!(
        "  Circuit breaker: {} consecutive failures",
        config.pacing.failure_threshold
    );

    println!("\nPipeline:");
    println!(
        "  Listing concurrency: {}",
        config.pipeline.listing_concurrency
    );
    println!(
        "  Extraction concurrency: {}",
        config.pipeline.extraction_concurrency
    );

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
}

/// Runs the pipeline and exports the results
async fn run_pipeline(config: Config) -> anyhow::Result<()> {
    let csv_path = PathBuf::from(&config.output.csv_path);

    let coordinator = Coordinator::new(config)?;
    let report = coordinator.report();

    let contacts = match coordinator.run().await {
        Ok(contacts) => contacts,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    export_csv(&contacts, &csv_path).context("failed to export results")?;
    println!("✓ Exported {} records to {}", contacts.len(), csv_path.display());

    print_run_summary(&report, contacts.len());

    Ok(())
}
