//! UTXO User-Graph Pipeline CLI
//!
//! Batch pipeline that clusters ledger addresses by the multi-input heuristic
//! and builds the cluster-to-cluster value-flow graph.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use utxo_usergraph::build_usergraph::UserGraph;
use utxo_usergraph::config::PipelineConfig;
use utxo_usergraph::find_clusters::find_clusters;
use utxo_usergraph::load_transactions::read_transactions_file;
use utxo_usergraph::report::{write_edge_list, write_stats_report};
use utxo_usergraph::schemas::RunMetadata;

#[derive(Parser)]
#[command(name = "utxo-usergraph")]
#[command(version)]
#[command(about = "Entity clustering and user-graph construction over ledger transaction dumps", long_about = None)]
struct Cli {
    /// Path to configuration file (optional, uses defaults if not provided)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output directory for data files
    #[arg(short, long, global = true, default_value = "data")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute clusters, build the user graph, and write both reports
    Run {
        /// Input transactions file (one JSON record per line)
        #[arg(short, long, default_value = "data/raw/transactions.txt")]
        transactions: PathBuf,

        /// Edge list output file name (relative to processed dir)
        #[arg(short, long, default_value = "usergraph_edges.txt")]
        edges: String,

        /// Statistics report output file name (relative to reports dir)
        #[arg(short, long, default_value = "usergraph_stats.txt")]
        stats: String,
    },

    /// Show pipeline status and output file sizes
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => PipelineConfig::default(),
    };
    config.analytics.validate()?;

    // Override output directory if specified
    config.paths.data_dir = cli.output_dir.clone();
    config.paths.raw_dir = cli.output_dir.join("raw");
    config.paths.processed_dir = cli.output_dir.join("processed");
    config.paths.reports_dir = cli.output_dir.join("reports");
    config.paths.metadata_dir = cli.output_dir.join("metadata");

    // Ensure directories exist
    config.ensure_directories()?;

    match cli.command {
        Commands::Run {
            transactions,
            edges,
            stats,
        } => {
            cmd_run(&config, &transactions, &edges, &stats)?;
        }
        Commands::Status => {
            cmd_status(&config)?;
        }
    }

    Ok(())
}

fn cmd_run(
    config: &PipelineConfig,
    transactions_path: &Path,
    edges_output: &str,
    stats_output: &str,
) -> Result<()> {
    info!("=== Loading Transactions ===");

    if !transactions_path.exists() {
        anyhow::bail!(
            "Transactions file not found: {:?}. Point --transactions at a crawler dump.",
            transactions_path
        );
    }

    let (txs, addresses) =
        read_transactions_file(transactions_path).context("Failed to read transactions")?;

    info!("=== Finding Clusters ===");
    let clustering =
        find_clusters(addresses.len(), &txs).context("Failed to compute clusters")?;

    info!("=== Building User Graph ===");
    let graph = UserGraph::build(&clustering, &txs).context("Failed to build user graph")?;

    info!("=== Writing Reports ===");
    let edges_path = config.paths.processed_dir.join(edges_output);
    write_edge_list(&edges_path, &graph).context("Failed to write edge list")?;

    let stats_path = config.paths.reports_dir.join(stats_output);
    write_stats_report(
        &stats_path,
        txs.len(),
        addresses.len(),
        &clustering,
        &graph,
        config.analytics.top_k,
    )
    .context("Failed to write statistics report")?;

    // Write metadata
    let mut metadata = RunMetadata::new();
    metadata.record_counts.transactions = txs.len();
    metadata.record_counts.unique_addresses = addresses.len();
    metadata.record_counts.clusters = clustering.num_clusters();
    metadata.record_counts.usergraph_edges = graph.edge_count();
    let metadata_path = config.paths.metadata_dir.join("run_metadata.json");
    metadata.save(&metadata_path)?;

    info!("Edge list saved to {:?}", edges_path);
    info!("Statistics saved to {:?}", stats_path);
    info!("Metadata saved to {:?}", metadata_path);

    Ok(())
}

fn cmd_status(config: &PipelineConfig) -> Result<()> {
    info!("=== Pipeline Status ===");
    info!("Data directory: {:?}", config.paths.data_dir);

    let files = [
        (
            "Transactions",
            config.paths.raw_dir.join("transactions.txt"),
        ),
        (
            "Edge list",
            config.paths.processed_dir.join("usergraph_edges.txt"),
        ),
        (
            "Statistics",
            config.paths.reports_dir.join("usergraph_stats.txt"),
        ),
        (
            "Run metadata",
            config.paths.metadata_dir.join("run_metadata.json"),
        ),
    ];

    for (name, path) in files {
        if path.exists() {
            let metadata = std::fs::metadata(&path)?;
            let size_kb = metadata.len() / 1024;
            info!("  {} {}: {:?} ({} KB)", "✓", name, path, size_kb);
        } else {
            info!("  {} {}: not found", "✗", name);
        }
    }

    Ok(())
}
