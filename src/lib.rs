//! UTXO User-Graph Pipeline Library
//!
//! A batch pipeline that derives a real-world-entity graph from a dump of
//! public ledger transactions: addresses that co-occur as inputs of the same
//! transaction are grouped into clusters (multi-input heuristic), and value
//! flow between clusters forms a weighted user graph.
//!
//! # Pipeline Stages
//!
//! 1. **Loading** ([`load_transactions`]): Parses the crawler's transaction dump into id-based light transactions, interning addresses
//! 2. **Clustering** ([`find_clusters`]): Builds the co-spend graph and computes its connected components
//! 3. **User Graph** ([`build_usergraph`]): Maps per-transaction value flow onto clusters, in aggregated and multigraph form
//! 4. **Analytics** ([`cluster_stats`]): Ranks the largest and richest clusters
//! 5. **Reports** ([`report`]): Writes the edge list and the statistics report
//!
//! # Output Files
//!
//! - `usergraph_edges.txt`: aggregated edge list with a `from to weight` header
//! - `usergraph_stats.txt`: statistics report (counts, largest and richest clusters)
//!
//! # Example
//!
//! ```no_run
//! use utxo_usergraph::build_usergraph::UserGraph;
//! use utxo_usergraph::find_clusters::find_clusters;
//! use utxo_usergraph::load_transactions::read_transactions_file;
//!
//! fn main() -> anyhow::Result<()> {
//!     let (txs, addresses) = read_transactions_file("data/raw/transactions.txt".as_ref())?;
//!     let clustering = find_clusters(addresses.len(), &txs)?;
//!     let graph = UserGraph::build(&clustering, &txs)?;
//!     println!("{} clusters, {} edges", clustering.num_clusters(), graph.edge_count());
//!     Ok(())
//! }
//! ```

pub mod build_usergraph;
pub mod cluster_stats;
pub mod config;
pub mod find_clusters;
pub mod interner;
pub mod load_transactions;
pub mod report;
pub mod schemas;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use schemas::{AddressId, ClusterId, LightTransaction, RunMetadata, TxEntry};
