//! Graph algorithm capabilities.
//!
//! The profiling core consumes algorithms through the [`Algorithm`] trait:
//! construct, `run()`, then pull node scores or a partition out of the
//! finished instance. The implementations here are the default capability
//! set; the registry is the only place that names them.

mod centrality;
mod distance;
mod partition;

pub use centrality::{
    ApproxCloseness, CoreDecomposition, DegreeCentrality, EstimateBetweenness, KPathCentrality,
    KatzCentrality, LocalClusteringCoefficient, PageRank,
};
pub use distance::{diameter_range, effective_diameter};
pub use partition::{ConnectedComponents, LabelPropagation};

use crate::graph::Graph;
use crate::Result;

/// A runnable graph algorithm.
///
/// `run` computes the result; the accessors expose it afterwards. An
/// algorithm produces node scores, a partition, or both (core decomposition
/// backs one measure of each kind).
pub trait Algorithm: Send {
    /// Execute the algorithm. Must be called before the accessors.
    fn run(&mut self) -> Result<()>;

    /// One score per node, if this algorithm produces node scores.
    fn scores(&self) -> Option<Vec<f64>> {
        None
    }

    /// Partition block sizes, if this algorithm produces a partition.
    fn partition_sizes(&self) -> Option<Vec<usize>> {
        None
    }

    /// Centralization of the score distribution, if defined for this
    /// algorithm. Defaults to undefined (reported as NaN).
    fn centralization(&self) -> Option<f64> {
        None
    }
}

/// Adjacency lists for BFS-style traversal.
///
/// Respects edge direction unless `symmetric` is set, which yields the
/// undirected view used by distance estimators.
pub(crate) fn adjacency(g: &Graph, symmetric: bool) -> Vec<Vec<usize>> {
    let mut adj = vec![Vec::new(); g.node_count()];
    for (u, v, _) in g.edges() {
        adj[u].push(v);
        if u != v && (symmetric || !g.is_directed()) {
            adj[v].push(u);
        }
    }
    adj
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::graph::Graph;

    /// Path graph `0 - 1 - ... - (n-1)`.
    pub fn path(n: usize) -> Graph {
        let mut g = Graph::new(false, false);
        for i in 0..n.saturating_sub(1) {
            g.add_edge(i, i + 1, 1.0);
        }
        g
    }

    /// Star graph with hub 0 and `leaves` leaves.
    pub fn star(leaves: usize) -> Graph {
        let mut g = Graph::new(false, false);
        for i in 1..=leaves {
            g.add_edge(0, i, 1.0);
        }
        g
    }

    /// Two disjoint triangles: `{0,1,2}` and `{3,4,5}`.
    pub fn two_triangles() -> Graph {
        let mut g = Graph::new(false, false);
        for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            g.add_edge(u, v, 1.0);
        }
        g
    }
}
