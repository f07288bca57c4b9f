//! Partition-producing algorithms.

use super::{adjacency, Algorithm};
use crate::graph::Graph;
use crate::Result;
use petgraph::algo::tarjan_scc;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

fn uf_find(parent: &mut [usize], i: usize) -> usize {
    if parent[i] != i {
        parent[i] = uf_find(parent, parent[i]); // path compression
    }
    parent[i]
}

fn uf_union(parent: &mut [usize], rank: &mut [usize], x: usize, y: usize) {
    let px = uf_find(parent, x);
    let py = uf_find(parent, y);
    if px == py {
        return;
    }
    match rank[px].cmp(&rank[py]) {
        Ordering::Less => parent[px] = py,
        Ordering::Greater => parent[py] = px,
        Ordering::Equal => {
            parent[py] = px;
            rank[px] += 1;
        }
    }
}

/// Connected components: union-find for undirected graphs, Tarjan's
/// strongly connected components for directed ones.
pub struct ConnectedComponents {
    graph: Arc<Graph>,
    sizes: Vec<usize>,
}

impl ConnectedComponents {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            sizes: Vec::new(),
        }
    }

    /// Number of components after [`Algorithm::run`].
    pub fn count(&self) -> usize {
        self.sizes.len()
    }
}

impl Algorithm for ConnectedComponents {
    fn run(&mut self) -> Result<()> {
        let n = self.graph.node_count();
        if n == 0 {
            self.sizes = Vec::new();
            return Ok(());
        }

        if self.graph.is_directed() {
            let sccs = tarjan_scc(self.graph.petgraph());
            self.sizes = sccs.into_iter().map(|c| c.len()).collect();
        } else {
            let mut parent: Vec<usize> = (0..n).collect();
            let mut rank: Vec<usize> = vec![0; n];
            for (u, v, _) in self.graph.edges() {
                uf_union(&mut parent, &mut rank, u, v);
            }
            let mut sizes: HashMap<usize, usize> = HashMap::new();
            for u in 0..n {
                let root = uf_find(&mut parent, u);
                *sizes.entry(root).or_default() += 1;
            }
            self.sizes = sizes.into_values().collect();
        }
        Ok(())
    }

    fn partition_sizes(&self) -> Option<Vec<usize>> {
        Some(self.sizes.clone())
    }
}

/// Community detection by asynchronous label propagation.
///
/// Labels start unique and each sweep adopts the most frequent label in the
/// neighborhood (lowest label wins ties, which keeps the sweep
/// deterministic). Converges when a sweep changes nothing.
pub struct LabelPropagation {
    graph: Arc<Graph>,
    max_sweeps: usize,
    sizes: Vec<usize>,
}

impl LabelPropagation {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            max_sweeps: 100,
            sizes: Vec::new(),
        }
    }
}

impl Algorithm for LabelPropagation {
    fn run(&mut self) -> Result<()> {
        let adj = adjacency(&self.graph, true);
        let n = adj.len();
        let mut labels: Vec<usize> = (0..n).collect();

        for _sweep in 0..self.max_sweeps {
            let mut changed = false;
            for u in 0..n {
                if adj[u].is_empty() {
                    continue;
                }
                let mut counts: HashMap<usize, usize> = HashMap::new();
                for &v in &adj[u] {
                    *counts.entry(labels[v]).or_default() += 1;
                }
                let best = counts
                    .into_iter()
                    .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
                    .map(|(label, _)| label)
                    .unwrap_or(labels[u]);
                if best != labels[u] {
                    labels[u] = best;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        let mut sizes: HashMap<usize, usize> = HashMap::new();
        for &label in &labels {
            *sizes.entry(label).or_default() += 1;
        }
        self.sizes = sizes.into_values().collect();
        Ok(())
    }

    fn partition_sizes(&self) -> Option<Vec<usize>> {
        Some(self.sizes.clone())
    }
}
