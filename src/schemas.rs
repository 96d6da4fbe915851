//! Data schemas for the user-graph pipeline.
//!
//! All stages share these types. The split between raw (string-addressed) and
//! light (id-addressed) transactions exists for memory economy: an address
//! string is stored once in the address table, and every downstream structure
//! refers to it by dense integer id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version for tracking changes
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Pseudo-address carried by coinbase transactions (newly issued value).
/// Interned like any other address string.
pub const COINBASE_ADDRESS: &str = "coinbase";

/// Dense address id, assigned in first-seen order over `[0, N)`.
///
/// u32 keeps the per-entry footprint small at tens of millions of addresses.
pub type AddressId = u32;

/// Dense cluster id, assigned in discovery order over `[0, C)`.
pub type ClusterId = u32;

// ============================================================================
// PART A: Transaction Schema
// ============================================================================

/// Raw transaction record, one JSON line of crawler output.
///
/// Inputs and outputs are ordered lists of `[address, value]` pairs.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTxRecord {
    pub inputs: Vec<(String, f64)>,
    pub outputs: Vec<(String, f64)>,
}

/// One input or output of a light transaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxEntry {
    /// Index into the address table
    pub address: AddressId,

    /// Monetary amount, non-negative
    pub value: f64,
}

/// Id-based transaction, the unit the core engine works on.
///
/// Input and output order is preserved from the raw record: the first input
/// determines the transaction's owning cluster, and multigraph entry order
/// follows output order. Empty lists are legal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightTransaction {
    pub inputs: Vec<TxEntry>,
    pub outputs: Vec<TxEntry>,
}

// ============================================================================
// Metadata Schema
// ============================================================================

/// Run metadata for reproducibility and auditing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Schema version used
    pub schema_version: String,

    /// Pipeline run timestamp
    pub run_timestamp: DateTime<Utc>,

    /// Record counts by type
    pub record_counts: RecordCounts,

    /// Git commit hash (if available)
    pub git_commit: Option<String>,

    /// Pipeline version
    pub pipeline_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecordCounts {
    pub transactions: usize,
    pub unique_addresses: usize,
    pub clusters: usize,
    pub usergraph_edges: usize,
}

impl RunMetadata {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            run_timestamp: Utc::now(),
            record_counts: RecordCounts::default(),
            git_commit: get_git_commit(),
            pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self::new()
    }
}

fn get_git_commit() -> Option<String> {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
}
