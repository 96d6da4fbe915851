//! User-graph construction.
//!
//! Maps each transaction's value flow from its owning cluster to the cluster
//! of every output, filling both aggregation variants in a single pass:
//!
//! - **aggregated**: at most one summed weight per ordered cluster pair,
//!   self-transfers dropped;
//! - **multigraph**: one entry per output, self-loops and duplicates kept.
//!
//! The two must not be confused: the aggregated graph feeds the edge list and
//! the richness analytics, the multigraph preserves per-flow statistics.

use crate::find_clusters::{Clustering, GraphError};
use crate::schemas::{AddressId, ClusterId, LightTransaction};
use std::collections::HashMap;
use tracing::info;

/// Cluster-to-cluster value-flow graph in both aggregation variants.
#[derive(Debug)]
pub struct UserGraph {
    /// Summed weight per ordered pair of distinct clusters, indexed by source
    aggregated: Vec<HashMap<ClusterId, f64>>,

    /// One `(target, value)` entry per qualifying output, indexed by source
    multigraph: Vec<Vec<(ClusterId, f64)>>,
}

impl UserGraph {
    /// Builds both variants from one traversal of `txs`.
    ///
    /// A transaction's owning cluster is the cluster of its first input; any
    /// input would give the same answer post-union, the first is convention.
    /// Transactions with no inputs contribute no flow and are skipped.
    pub fn build(
        clustering: &Clustering,
        txs: &[LightTransaction],
    ) -> Result<Self, GraphError> {
        let num_clusters = clustering.num_clusters();
        let mut graph = Self {
            aggregated: vec![HashMap::new(); num_clusters],
            multigraph: vec![Vec::new(); num_clusters],
        };

        for tx in txs {
            let Some(first_input) = tx.inputs.first() else {
                continue;
            };
            let owning = lookup_cluster(clustering, first_input.address, num_clusters)?;

            for output in &tx.outputs {
                let target = lookup_cluster(clustering, output.address, num_clusters)?;
                graph.add_aggregated(owning, target, output.value);
                graph.add_multigraph(owning, target, output.value);
            }
        }

        info!(
            "Built user graph: {} aggregated edges, {} multigraph entries over {} clusters",
            graph.edge_count(),
            graph.multigraph_entry_count(),
            num_clusters
        );

        Ok(graph)
    }

    /// Self-transfers never appear in the aggregated graph.
    fn add_aggregated(&mut self, from: ClusterId, to: ClusterId, value: f64) {
        if from == to {
            return;
        }
        *self.aggregated[from as usize].entry(to).or_insert(0.0) += value;
    }

    /// The multigraph keeps every flow event, self-loops included.
    fn add_multigraph(&mut self, from: ClusterId, to: ClusterId, value: f64) {
        self.multigraph[from as usize].push((to, value));
    }

    pub fn aggregated(&self) -> &[HashMap<ClusterId, f64>] {
        &self.aggregated
    }

    pub fn multigraph(&self) -> &[Vec<(ClusterId, f64)>] {
        &self.multigraph
    }

    pub fn num_clusters(&self) -> usize {
        self.aggregated.len()
    }

    /// Total number of aggregated edges across all clusters.
    pub fn edge_count(&self) -> usize {
        self.aggregated.iter().map(HashMap::len).sum()
    }

    /// Total number of multigraph entries across all clusters.
    pub fn multigraph_entry_count(&self) -> usize {
        self.multigraph.iter().map(Vec::len).sum()
    }
}

fn lookup_cluster(
    clustering: &Clustering,
    address: AddressId,
    num_clusters: usize,
) -> Result<ClusterId, GraphError> {
    let cluster = clustering
        .cluster_of(address)
        .ok_or(GraphError::AddressOutOfRange {
            id: address,
            len: clustering.num_addresses(),
        })?;
    if (cluster as usize) >= num_clusters {
        return Err(GraphError::ClusterOutOfRange {
            id: cluster,
            len: num_clusters,
        });
    }
    Ok(cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::find_clusters::find_clusters;
    use crate::schemas::TxEntry;

    fn tx(inputs: &[(AddressId, f64)], outputs: &[(AddressId, f64)]) -> LightTransaction {
        LightTransaction {
            inputs: inputs
                .iter()
                .map(|&(address, value)| TxEntry { address, value })
                .collect(),
            outputs: outputs
                .iter()
                .map(|&(address, value)| TxEntry { address, value })
                .collect(),
        }
    }

    /// Addresses A=0, B=1, C=2, D=3, E=4:
    ///   tx1: in [(A,1.0)]         out [(B,0.5), (C,0.5)]
    ///   tx2: in [(B,1.0),(D,1.0)] out [(E,2.0)]
    ///   tx3: in [(C,1.0)]         out [(D,0.3)]
    /// Clusters: {A}=0, {B,D}=1, {C}=2, {E}=3.
    fn scenario() -> (Clustering, Vec<LightTransaction>) {
        let txs = vec![
            tx(&[(0, 1.0)], &[(1, 0.5), (2, 0.5)]),
            tx(&[(1, 1.0), (3, 1.0)], &[(4, 2.0)]),
            tx(&[(2, 1.0)], &[(3, 0.3)]),
        ];
        let clustering = find_clusters(5, &txs).unwrap();
        (clustering, txs)
    }

    #[test]
    fn test_scenario_clusters() {
        let (clustering, _) = scenario();
        assert_eq!(clustering.cluster_map, vec![0, 1, 2, 1, 3]);
    }

    #[test]
    fn test_scenario_aggregated_edges() {
        let (clustering, txs) = scenario();
        let graph = UserGraph::build(&clustering, &txs).unwrap();

        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.aggregated()[0].get(&1), Some(&0.5));
        assert_eq!(graph.aggregated()[0].get(&2), Some(&0.5));
        assert_eq!(graph.aggregated()[1].get(&3), Some(&2.0));
        assert_eq!(graph.aggregated()[2].get(&1), Some(&0.3));
        assert!(graph.aggregated()[3].is_empty());
    }

    #[test]
    fn test_aggregated_sums_repeated_pairs() {
        // Two transactions from cluster of 0 to cluster of 1, plus a repeated
        // output within one transaction: a single summed weight remains.
        let txs = vec![
            tx(&[(0, 1.0)], &[(1, 0.25), (1, 0.25)]),
            tx(&[(0, 1.0)], &[(1, 0.5)]),
        ];
        let clustering = find_clusters(2, &txs).unwrap();
        let graph = UserGraph::build(&clustering, &txs).unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.aggregated()[0].get(&1), Some(&1.0));
        // The multigraph keeps all three flow events.
        assert_eq!(graph.multigraph()[0], vec![(1, 0.25), (1, 0.25), (1, 0.5)]);
    }

    #[test]
    fn test_self_transfers_dropped_from_aggregated_kept_in_multigraph() {
        // 0 and 1 are co-spent into one cluster; the payment back to 1 is a
        // self-transfer of that cluster.
        let txs = vec![tx(&[(0, 1.0), (1, 1.0)], &[(1, 0.7), (2, 0.3)])];
        let clustering = find_clusters(3, &txs).unwrap();
        let graph = UserGraph::build(&clustering, &txs).unwrap();

        assert_eq!(clustering.cluster_of(1), Some(0));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.aggregated()[0].get(&1), Some(&0.3));
        assert_eq!(graph.multigraph()[0], vec![(0, 0.7), (1, 0.3)]);
    }

    #[test]
    fn test_zero_input_transactions_contribute_no_flow() {
        let txs = vec![tx(&[], &[(0, 5.0), (1, 5.0)])];
        let clustering = find_clusters(2, &txs).unwrap();
        let graph = UserGraph::build(&clustering, &txs).unwrap();

        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.multigraph_entry_count(), 0);
    }

    #[test]
    fn test_multigraph_order_follows_transaction_then_output_order() {
        let txs = vec![
            tx(&[(0, 1.0)], &[(1, 0.1), (2, 0.2)]),
            tx(&[(0, 1.0)], &[(2, 0.3), (1, 0.4)]),
        ];
        let clustering = find_clusters(3, &txs).unwrap();
        let graph = UserGraph::build(&clustering, &txs).unwrap();

        assert_eq!(
            graph.multigraph()[0],
            vec![(1, 0.1), (2, 0.2), (2, 0.3), (1, 0.4)]
        );
    }

    #[test]
    fn test_empty_run_builds_empty_graph() {
        let clustering = find_clusters(0, &[]).unwrap();
        let graph = UserGraph::build(&clustering, &[]).unwrap();
        assert_eq!(graph.num_clusters(), 0);
        assert_eq!(graph.edge_count(), 0);
    }
}
