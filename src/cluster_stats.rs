//! Cluster-level analytics.
//!
//! Ranks clusters by member count and by richness (value in minus value out
//! of the aggregated user graph). Both rankings keep a sorted list of at most
//! K candidates and re-sort only the inserted tail, which costs O(K) per
//! candidate and O(N*K) overall. Fine at K=10; a small binary heap would be
//! the move if K ever grows.

use crate::schemas::{AddressId, ClusterId};
use std::collections::HashMap;

/// Value flowing into and out of one cluster in the aggregated graph.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlowTotals {
    pub inflow: f64,
    pub outflow: f64,
}

impl FlowTotals {
    /// Richness is inflow minus outflow.
    pub fn richness(&self) -> f64 {
        self.inflow - self.outflow
    }
}

/// Returns the ids of the up-to-`k` largest clusters by member count,
/// descending. All comparisons are strict, so ties resolve to the
/// earliest cluster id.
pub fn largest_clusters(clusters: &[Vec<AddressId>], k: usize) -> Vec<ClusterId> {
    if k == 0 {
        return Vec::new();
    }

    let mut largest: Vec<ClusterId> = Vec::with_capacity(k);
    for id in 0..clusters.len() {
        if largest.len() < k {
            largest.push(id as ClusterId);
            bubble_up(&mut largest, |a, b| {
                clusters[a as usize].len() > clusters[b as usize].len()
            });
        } else if clusters[id].len() > clusters[largest[k - 1] as usize].len() {
            largest[k - 1] = id as ClusterId;
            bubble_up(&mut largest, |a, b| {
                clusters[a as usize].len() > clusters[b as usize].len()
            });
        }
    }
    largest
}

/// Computes per-cluster flow totals from the aggregated graph: every edge
/// `(i, j, w)` adds `w` to cluster i's outflow and cluster j's inflow.
/// Clusters without aggregated edges stay at zero.
pub fn cluster_richness(aggregated: &[HashMap<ClusterId, f64>]) -> Vec<FlowTotals> {
    let mut totals = vec![FlowTotals::default(); aggregated.len()];

    for (payer, edges) in aggregated.iter().enumerate() {
        for (&payee, &value) in edges {
            totals[payer].outflow += value;
            totals[payee as usize].inflow += value;
        }
    }

    totals
}

/// Returns the up-to-`k` richest clusters with their flow totals, descending
/// by richness, ties to the earliest cluster id.
pub fn richest_clusters(richness: &[FlowTotals], k: usize) -> Vec<(ClusterId, FlowTotals)> {
    if k == 0 {
        return Vec::new();
    }

    let mut richest: Vec<(ClusterId, FlowTotals)> = Vec::with_capacity(k);
    for (id, &totals) in richness.iter().enumerate() {
        if richest.len() < k {
            richest.push((id as ClusterId, totals));
            bubble_up(&mut richest, |a, b| a.1.richness() > b.1.richness());
        } else if totals.richness() > richest[k - 1].1.richness() {
            richest[k - 1] = (id as ClusterId, totals);
            bubble_up(&mut richest, |a, b| a.1.richness() > b.1.richness());
        }
    }
    richest
}

/// Restores descending order after the last slot changed. The rest of the
/// list is already sorted, so one bubbling pass from the tail is enough.
fn bubble_up<T: Copy>(list: &mut [T], greater: impl Fn(T, T) -> bool) {
    for i in (1..list.len()).rev() {
        if greater(list[i], list[i - 1]) {
            list.swap(i, i - 1);
        } else {
            break;
        }
    }
}
