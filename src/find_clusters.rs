//! Co-spend graph construction and connected-component clustering.
//!
//! Addresses that ever appear as inputs of the same transaction are linked
//! (multi-input heuristic); the connected components of that graph are the
//! real-world-entity clusters. Only integer ids are stored, so a mapping from
//! id to address must be kept externally (see [`crate::interner`]).

use crate::schemas::{AddressId, ClusterId, LightTransaction};
use thiserror::Error;
use tracing::info;

/// Sentinel for a cluster-map slot that no traversal has assigned yet. Kept
/// loud so a missed slot cannot alias cluster 0.
const UNASSIGNED: ClusterId = ClusterId::MAX;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("address id {id} out of range for address table of length {len}")]
    AddressOutOfRange { id: AddressId, len: usize },

    #[error("cluster id {id} out of range for {len} clusters")]
    ClusterOutOfRange { id: ClusterId, len: usize },
}

/// Undirected graph over dense address ids.
///
/// The vertex set is fixed at construction; each vertex is referred to by
/// index in `[0, num_vertices)`. Every vertex is implicitly connected to
/// itself, so self-loops are never stored.
#[derive(Debug)]
pub struct CospendGraph {
    num_vertices: usize,
    adj: Vec<Vec<AddressId>>,
}

impl CospendGraph {
    pub fn new(num_vertices: usize) -> Self {
        Self {
            num_vertices,
            adj: vec![Vec::new(); num_vertices],
        }
    }

    /// Adds an edge in both directions. Self-edges are a no-op. Parallel
    /// edges from repeated co-spends are tolerated; the visited check during
    /// traversal makes them harmless.
    pub fn add_undirected_edge(&mut self, a: AddressId, b: AddressId) {
        if a == b {
            return;
        }
        self.adj[a as usize].push(b);
        self.adj[b as usize].push(a);
    }

    /// Builds the co-spend graph for `txs`: one edge per consecutive input
    /// pair of each transaction. Transactions with zero or one input
    /// contribute no edges and are not an error.
    pub fn from_transactions(
        num_addresses: usize,
        txs: &[LightTransaction],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new(num_addresses);

        for tx in txs {
            for pair in tx.inputs.windows(2) {
                let (a, b) = (pair[0].address, pair[1].address);
                graph.check_vertex(a)?;
                graph.check_vertex(b)?;
                graph.add_undirected_edge(a, b);
            }
        }

        Ok(graph)
    }

    /// An out-of-range id here is an interning or loader bug, never a user
    /// data problem.
    fn check_vertex(&self, id: AddressId) -> Result<(), GraphError> {
        if (id as usize) < self.num_vertices {
            Ok(())
        } else {
            Err(GraphError::AddressOutOfRange {
                id,
                len: self.num_vertices,
            })
        }
    }

    /// Depth-first traversal with an explicit stack, so component size is
    /// bounded by memory rather than call depth at tens of millions of
    /// vertices.
    fn traverse_from(&self, start: AddressId, visited: &mut [bool]) -> Vec<AddressId> {
        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start as usize] = true;

        while let Some(curr) = stack.pop() {
            component.push(curr);
            for &next in &self.adj[curr as usize] {
                if !visited[next as usize] {
                    visited[next as usize] = true;
                    stack.push(next);
                }
            }
        }

        component
    }

    /// Computes the connected components, consuming the graph.
    ///
    /// Traversals start from the lowest unvisited id, so cluster ids are
    /// assigned in increasing order of each component's lowest-numbered
    /// vertex. That numbering is what makes output reproducible across runs.
    pub fn connected_components(self) -> Clustering {
        let mut clusters: Vec<Vec<AddressId>> = Vec::new();
        let mut cluster_map = vec![UNASSIGNED; self.num_vertices];
        let mut visited = vec![false; self.num_vertices];

        for v in 0..self.num_vertices {
            if visited[v] {
                continue;
            }

            let component = self.traverse_from(v as AddressId, &mut visited);
            let cluster_id = clusters.len() as ClusterId;
            for &member in &component {
                cluster_map[member as usize] = cluster_id;
            }
            clusters.push(component);
        }

        Clustering {
            clusters,
            cluster_map,
        }
    }
}

/// The partition of all address ids into entity clusters.
///
/// Clusters are pairwise disjoint and their union is exactly `[0, N)`.
/// Immutable once computed; the user-graph builder and the analytics share it
/// read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Member address ids per cluster, in visit order
    pub clusters: Vec<Vec<AddressId>>,

    /// Total map from address id to cluster id
    pub cluster_map: Vec<ClusterId>,
}

impl Clustering {
    pub fn num_clusters(&self) -> usize {
        self.clusters.len()
    }

    pub fn num_addresses(&self) -> usize {
        self.cluster_map.len()
    }

    pub fn cluster_of(&self, address: AddressId) -> Option<ClusterId> {
        self.cluster_map.get(address as usize).copied()
    }
}

/// Clusters all addresses in `[0, num_addresses)` by the multi-input
/// heuristic over `txs`.
pub fn find_clusters(
    num_addresses: usize,
    txs: &[LightTransaction],
) -> Result<Clustering, GraphError> {
    let graph = CospendGraph::from_transactions(num_addresses, txs)?;
    let clustering = graph.connected_components();

    info!(
        "Found {} clusters over {} addresses",
        clustering.num_clusters(),
        num_addresses
    );

    Ok(clustering)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::TxEntry;

    fn tx(inputs: &[AddressId], outputs: &[AddressId]) -> LightTransaction {
        LightTransaction {
            inputs: inputs
                .iter()
                .map(|&address| TxEntry { address, value: 1.0 })
                .collect(),
            outputs: outputs
                .iter()
                .map(|&address| TxEntry { address, value: 1.0 })
                .collect(),
        }
    }

    #[test]
    fn test_transitive_closure_across_transactions() {
        // tx A co-spends {0,1}, tx B co-spends {1,2}: all three end up in one
        // cluster even though 0 and 2 never share a transaction.
        let txs = vec![tx(&[0, 1], &[]), tx(&[1, 2], &[])];
        let clustering = find_clusters(4, &txs).unwrap();

        assert_eq!(clustering.num_clusters(), 2);
        assert_eq!(clustering.cluster_of(0), clustering.cluster_of(2));
        assert_eq!(clustering.cluster_of(0), Some(0));
        assert_eq!(clustering.cluster_of(3), Some(1));
    }

    #[test]
    fn test_clusters_partition_the_address_range() {
        let txs = vec![tx(&[0, 2], &[]), tx(&[4, 5], &[]), tx(&[2, 4], &[])];
        let clustering = find_clusters(7, &txs).unwrap();

        // Every id appears in exactly one cluster.
        let mut seen = vec![0usize; 7];
        for (cluster_id, members) in clustering.clusters.iter().enumerate() {
            for &member in members {
                seen[member as usize] += 1;
                assert_eq!(clustering.cluster_of(member), Some(cluster_id as ClusterId));
            }
        }
        assert!(seen.iter().all(|&count| count == 1));

        let total: usize = clustering.clusters.iter().map(Vec::len).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn test_cluster_ids_follow_lowest_unvisited_vertex() {
        // {1, 3} are linked; singletons keep first-seen order around them.
        let txs = vec![tx(&[1, 3], &[])];
        let clustering = find_clusters(5, &txs).unwrap();

        assert_eq!(clustering.cluster_map, vec![0, 1, 2, 1, 3]);
        assert_eq!(clustering.clusters[1], vec![1, 3]);
    }

    #[test]
    fn test_zero_and_single_input_transactions_add_no_edges() {
        let txs = vec![tx(&[], &[1]), tx(&[2], &[0])];
        let clustering = find_clusters(3, &txs).unwrap();
        assert_eq!(clustering.num_clusters(), 3);
    }

    #[test]
    fn test_self_spend_does_not_link_anything() {
        let txs = vec![tx(&[1, 1], &[])];
        let clustering = find_clusters(3, &txs).unwrap();
        assert_eq!(clustering.num_clusters(), 3);
    }

    #[test]
    fn test_repeated_co_spend_is_harmless() {
        let txs = vec![tx(&[0, 1], &[]), tx(&[0, 1], &[]), tx(&[1, 0], &[])];
        let clustering = find_clusters(2, &txs).unwrap();
        assert_eq!(clustering.num_clusters(), 1);
        assert_eq!(clustering.clusters[0].len(), 2);
    }

    #[test]
    fn test_out_of_range_input_is_invariant_violation() {
        let txs = vec![tx(&[0, 9], &[])];
        let err = find_clusters(2, &txs).unwrap_err();
        assert!(matches!(
            err,
            GraphError::AddressOutOfRange { id: 9, len: 2 }
        ));
    }

    #[test]
    fn test_empty_run_produces_empty_clustering() {
        let clustering = find_clusters(0, &[]).unwrap();
        assert_eq!(clustering.num_clusters(), 0);
        assert_eq!(clustering.num_addresses(), 0);
    }
}
