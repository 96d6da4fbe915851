//! Report emitters.
//!
//! Writes the aggregated edge list and the human-readable statistics report.
//! Both formats are fixed: downstream tooling parses these files, so the
//! header line and the per-line layouts must not drift.

use crate::build_usergraph::UserGraph;
use crate::cluster_stats;
use crate::find_clusters::Clustering;
use crate::schemas::ClusterId;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the aggregated edge list: a `from to weight` header followed by one
/// line per edge. Outer order is source cluster id; entries within a cluster
/// are sorted by target id for reproducible output.
pub fn write_edge_list(path: &Path, graph: &UserGraph) -> Result<(), ReportError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "from to weight")?;
    for (from, edges) in graph.aggregated().iter().enumerate() {
        let mut targets: Vec<(ClusterId, f64)> =
            edges.iter().map(|(&to, &weight)| (to, weight)).collect();
        // Sort for determinism
        targets.sort_by_key(|&(to, _)| to);
        for (to, weight) in targets {
            writeln!(out, "{} {} {}", from, to, weight)?;
        }
    }
    out.flush()?;

    info!("Wrote {} edges to {:?}", graph.edge_count(), path);
    Ok(())
}

/// Writes the statistics report: transaction, address, cluster, and edge
/// counts, plus the top-K largest and richest clusters.
pub fn write_stats_report(
    path: &Path,
    num_transactions: usize,
    num_addresses: usize,
    clustering: &Clustering,
    graph: &UserGraph,
    top_k: usize,
) -> Result<(), ReportError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "Number of transactions: {}", num_transactions)?;
    writeln!(out, "Number of unique addresses: {}", num_addresses)?;
    writeln!(out, "Number of clusters: {}", clustering.num_clusters())?;

    writeln!(out, "Largest clusters and number of addresses:")?;
    for cluster in cluster_stats::largest_clusters(&clustering.clusters, top_k) {
        writeln!(
            out,
            "  {}:{}",
            cluster,
            clustering.clusters[cluster as usize].len()
        )?;
    }

    writeln!(out, "Number of User Graph edges: {}", graph.edge_count())?;

    let richness = cluster_stats::cluster_richness(graph.aggregated());
    writeln!(out, "Richest clusters and input-output total:")?;
    for (cluster, totals) in cluster_stats::richest_clusters(&richness, top_k) {
        writeln!(out, "  {} {} {}", cluster, totals.inflow, totals.outflow)?;
    }

    out.flush()?;

    info!("Wrote statistics report to {:?}", path);
    Ok(())
}
