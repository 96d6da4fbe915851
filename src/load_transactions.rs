//! Transaction loading and interning.
//!
//! Parses the crawler's transaction dump (one JSON record per line) into the
//! id-based light-transaction list, building the address table in the same
//! forward pass. A record that fails to parse aborts the whole run: skipping
//! it would silently corrupt the cluster state derived from the rest.

use crate::interner::AddressInterner;
use crate::schemas::{LightTransaction, RawTxRecord, TxEntry};
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Longest slice of an offending line echoed back in a parse error.
const ERROR_CONTEXT_CHARS: usize = 120;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed transaction record at line {line}: {source} (record: {context})")]
    Parse {
        /// 1-based line number of the offending record
        line: usize,
        /// Truncated copy of the offending line
        context: String,
        source: serde_json::Error,
    },
}

/// Reads all transaction records from `reader`, interning every input and
/// output address. Returns the light transaction list and the final
/// id-ordered address table.
pub fn read_transactions<R: BufRead>(
    reader: R,
) -> Result<(Vec<LightTransaction>, Vec<String>), LoadError> {
    let mut interner = AddressInterner::new();
    let mut txs = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let record: RawTxRecord =
            serde_json::from_str(&line).map_err(|source| LoadError::Parse {
                line: idx + 1,
                context: truncate_context(&line),
                source,
            })?;

        let mut tx = LightTransaction {
            inputs: Vec::with_capacity(record.inputs.len()),
            outputs: Vec::with_capacity(record.outputs.len()),
        };
        for (address, value) in &record.inputs {
            tx.inputs.push(TxEntry {
                address: interner.intern(address),
                value: *value,
            });
        }
        for (address, value) in &record.outputs {
            tx.outputs.push(TxEntry {
                address: interner.intern(address),
                value: *value,
            });
        }
        txs.push(tx);
    }

    info!(
        "Loaded {} transactions over {} unique addresses",
        txs.len(),
        interner.len()
    );

    Ok((txs, interner.into_table()))
}

/// Convenience wrapper: open `path` and read all records from it.
pub fn read_transactions_file(
    path: &Path,
) -> Result<(Vec<LightTransaction>, Vec<String>), LoadError> {
    info!("Reading transactions from {:?}", path);
    let file = std::fs::File::open(path)?;
    read_transactions(std::io::BufReader::new(file))
}

fn truncate_context(line: &str) -> String {
    if line.chars().count() <= ERROR_CONTEXT_CHARS {
        line.to_string()
    } else {
        let mut context: String = line.chars().take(ERROR_CONTEXT_CHARS).collect();
        context.push_str("...");
        context
    }
}
