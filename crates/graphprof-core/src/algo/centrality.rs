//! Node centrality algorithms.
//!
//! All of them score every node of the graph; the sampled estimators
//! (betweenness, closeness, k-path) use a fixed seed so that profiling the
//! same graph twice yields the same estimates.

use super::{adjacency, Algorithm};
use crate::graph::Graph;
use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::sync::Arc;

const SAMPLING_SEED: u64 = 0x6772_6170_6870_726f; // stable across runs

/// Degree centrality: out-degree for directed graphs, degree otherwise.
pub struct DegreeCentrality {
    graph: Arc<Graph>,
    scores: Vec<f64>,
}

impl DegreeCentrality {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for DegreeCentrality {
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self) -> Result<()> {
        let n = self.graph.node_count();
        self.scores = (0..n).map(|u| self.graph.degree(u) as f64).collect();
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }

    /// Freeman centralization: `Σ(max - c) / ((n-1) · max)`.
    #[allow(clippy::cast_precision_loss)]
    fn centralization(&self) -> Option<f64> {
        let n = self.scores.len();
        if n < 2 {
            return None;
        }
        let max = self.scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max <= 0.0 {
            return None;
        }
        let sum: f64 = self.scores.iter().map(|c| max - c).sum();
        Some(sum / ((n - 1) as f64 * max))
    }
}

/// k-core decomposition via iterative peeling.
///
/// Produces both a per-node score (the core number) and a partition into
/// shells, so it backs one measure in each category.
pub struct CoreDecomposition {
    graph: Arc<Graph>,
    core: Vec<usize>,
}

impl CoreDecomposition {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            core: Vec::new(),
        }
    }
}

impl Algorithm for CoreDecomposition {
    fn run(&mut self) -> Result<()> {
        let adj = adjacency(&self.graph, true);
        let n = adj.len();
        let mut degree: Vec<usize> = adj.iter().map(Vec::len).collect();
        let max_degree = degree.iter().copied().max().unwrap_or(0);

        // Bucket sort nodes by degree, then peel in nondecreasing order.
        let mut buckets: Vec<Vec<usize>> = vec![Vec::new(); max_degree + 1];
        for (u, &d) in degree.iter().enumerate() {
            buckets[d].push(u);
        }

        let mut core = vec![0usize; n];
        let mut removed = vec![false; n];
        for d in 0..=max_degree {
            while let Some(u) = buckets[d].pop() {
                // Nodes are re-bucketed as their degree drops; skip stale entries.
                if removed[u] || degree[u] != d {
                    continue;
                }
                core[u] = d;
                removed[u] = true;
                for &v in &adj[u] {
                    if !removed[v] && degree[v] > d {
                        degree[v] -= 1;
                        buckets[degree[v]].push(v);
                    }
                }
            }
        }
        self.core = core;
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.core.iter().map(|&c| c as f64).collect())
    }

    fn partition_sizes(&self) -> Option<Vec<usize>> {
        let max_core = self.core.iter().copied().max()?;
        let mut shells = vec![0usize; max_core + 1];
        for &c in &self.core {
            shells[c] += 1;
        }
        Some(shells.into_iter().filter(|&s| s > 0).collect())
    }
}

/// Local clustering coefficient: closed triangles over possible triangles
/// in each node's neighborhood. Edge directions are ignored.
pub struct LocalClusteringCoefficient {
    graph: Arc<Graph>,
    scores: Vec<f64>,
}

impl LocalClusteringCoefficient {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for LocalClusteringCoefficient {
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self) -> Result<()> {
        let adj = adjacency(&self.graph, true);
        let n = adj.len();
        let neighbor_sets: Vec<std::collections::HashSet<usize>> = adj
            .iter()
            .enumerate()
            .map(|(u, vs)| vs.iter().copied().filter(|&v| v != u).collect())
            .collect();

        self.scores = (0..n)
            .map(|u| {
                let neighbors: Vec<usize> = neighbor_sets[u].iter().copied().collect();
                let k = neighbors.len();
                if k < 2 {
                    return 0.0;
                }
                let mut links = 0usize;
                for (i, &a) in neighbors.iter().enumerate() {
                    for &b in &neighbors[i + 1..] {
                        if neighbor_sets[a].contains(&b) {
                            links += 1;
                        }
                    }
                }
                2.0 * links as f64 / (k * (k - 1)) as f64
            })
            .collect();
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }
}

/// PageRank via power iteration with uniform dangling-mass redistribution.
pub struct PageRank {
    graph: Arc<Graph>,
    damping: f64,
    max_iterations: usize,
    tolerance: f64,
    scores: Vec<f64>,
}

impl PageRank {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            damping: 0.85,
            max_iterations: 100,
            tolerance: 1e-9,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for PageRank {
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self) -> Result<()> {
        let adj = adjacency(&self.graph, false);
        let n = adj.len();
        if n == 0 {
            self.scores = Vec::new();
            return Ok(());
        }

        let n_f64 = n as f64;
        let d = self.damping;
        let teleport = (1.0 - d) / n_f64;
        let out_degrees: Vec<usize> = adj.iter().map(Vec::len).collect();

        let mut scores = vec![1.0 / n_f64; n];
        let mut new_scores = vec![0.0; n];

        for _iter in 0..self.max_iterations {
            let dangling_sum: f64 = out_degrees
                .iter()
                .enumerate()
                .filter(|(_, &deg)| deg == 0)
                .map(|(i, _)| scores[i])
                .sum();
            let dangling_contrib = d * dangling_sum / n_f64;

            new_scores.fill(teleport + dangling_contrib);
            for u in 0..n {
                let deg = out_degrees[u];
                if deg > 0 {
                    let share = d * scores[u] / deg as f64;
                    for &v in &adj[u] {
                        new_scores[v] += share;
                    }
                }
            }

            let diff: f64 = scores
                .iter()
                .zip(new_scores.iter())
                .map(|(old, new)| (old - new).abs())
                .sum();
            std::mem::swap(&mut scores, &mut new_scores);
            if diff < self.tolerance {
                break;
            }
        }
        self.scores = scores;
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }
}

/// Randomized k-path centrality estimate.
///
/// Counts visits over seeded random walks of bounded length from every
/// node, normalized to the maximum count.
pub struct KPathCentrality {
    graph: Arc<Graph>,
    walks_per_node: usize,
    scores: Vec<f64>,
}

impl KPathCentrality {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            walks_per_node: 20,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for KPathCentrality {
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self) -> Result<()> {
        let adj = adjacency(&self.graph, false);
        let n = adj.len();
        if n == 0 {
            self.scores = Vec::new();
            return Ok(());
        }
        let k = ((n as f64).ln().ceil() as usize).max(3);
        let mut rng = StdRng::seed_from_u64(SAMPLING_SEED);
        let mut counts = vec![0u64; n];

        for start in 0..n {
            for _ in 0..self.walks_per_node {
                let mut u = start;
                for _ in 0..k {
                    if adj[u].is_empty() {
                        break;
                    }
                    u = adj[u][rng.gen_range(0..adj[u].len())];
                    counts[u] += 1;
                }
            }
        }

        let max = counts.iter().copied().max().unwrap_or(0);
        self.scores = if max == 0 {
            vec![0.0; n]
        } else {
            counts.iter().map(|&c| c as f64 / max as f64).collect()
        };
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }
}

/// Katz centrality via power iteration: `x = α Aᵀ x + β`.
///
/// α must stay below the reciprocal of the largest eigenvalue for the
/// iteration to contract; the conservative default keeps the focus local.
pub struct KatzCentrality {
    graph: Arc<Graph>,
    alpha: f64,
    beta: f64,
    max_iterations: usize,
    tolerance: f64,
    scores: Vec<f64>,
}

impl KatzCentrality {
    pub fn new(graph: Arc<Graph>) -> Self {
        Self {
            graph,
            alpha: 0.1,
            beta: 1.0,
            max_iterations: 100,
            tolerance: 1e-9,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for KatzCentrality {
    fn run(&mut self) -> Result<()> {
        let n = self.graph.node_count();
        if n == 0 {
            self.scores = Vec::new();
            return Ok(());
        }
        let mut scores = vec![self.beta; n];
        let mut new_scores = vec![0.0; n];

        for _iter in 0..self.max_iterations {
            for u in 0..n {
                let pred_sum: f64 = self
                    .graph
                    .predecessors(u)
                    .iter()
                    .map(|&p| scores[p])
                    .sum();
                new_scores[u] = self.alpha * pred_sum + self.beta;
            }

            let diff: f64 = scores
                .iter()
                .zip(new_scores.iter())
                .map(|(old, new)| (old - new).abs())
                .sum();
            std::mem::swap(&mut scores, &mut new_scores);
            if diff < self.tolerance {
                break;
            }
        }

        // Normalize to [0, 1] by the maximum.
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if max > 0.0 {
            for s in &mut scores {
                *s /= max;
            }
        }
        self.scores = scores;
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }
}

/// Betweenness estimate: Brandes dependency accumulation from a seeded
/// sample of source nodes, scaled to the full graph.
pub struct EstimateBetweenness {
    graph: Arc<Graph>,
    samples: usize,
    scores: Vec<f64>,
}

impl EstimateBetweenness {
    pub fn new(graph: Arc<Graph>, samples: usize) -> Self {
        Self {
            graph,
            samples,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for EstimateBetweenness {
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self) -> Result<()> {
        let adj = adjacency(&self.graph, false);
        let n = adj.len();
        if n == 0 {
            self.scores = Vec::new();
            return Ok(());
        }
        let samples = self.samples.min(n).max(1);
        let mut rng = StdRng::seed_from_u64(SAMPLING_SEED);
        let mut sources: Vec<usize> = (0..n).collect();
        // Partial Fisher-Yates: the first `samples` entries become the sample.
        for i in 0..samples {
            let j = rng.gen_range(i..n);
            sources.swap(i, j);
        }

        let mut betweenness = vec![0.0f64; n];
        for &s in &sources[..samples] {
            // Brandes: BFS phase.
            let mut stack = Vec::with_capacity(n);
            let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut sigma = vec![0.0f64; n];
            let mut dist = vec![-1i64; n];
            sigma[s] = 1.0;
            dist[s] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(s);
            while let Some(v) = queue.pop_front() {
                stack.push(v);
                for &w in &adj[v] {
                    if dist[w] < 0 {
                        dist[w] = dist[v] + 1;
                        queue.push_back(w);
                    }
                    if dist[w] == dist[v] + 1 {
                        sigma[w] += sigma[v];
                        preds[w].push(v);
                    }
                }
            }
            // Dependency accumulation.
            let mut delta = vec![0.0f64; n];
            while let Some(w) = stack.pop() {
                for &v in &preds[w] {
                    delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
                }
                if w != s {
                    betweenness[w] += delta[w];
                }
            }
        }

        // Scale sample contributions up, then normalize to pair counts.
        let scale = n as f64 / samples as f64;
        let pairs = if self.graph.is_directed() {
            ((n - 1) * (n.saturating_sub(2))).max(1) as f64
        } else {
            (((n - 1) * (n.saturating_sub(2))) as f64 / 2.0).max(1.0)
        };
        self.scores = betweenness.iter().map(|b| b * scale / pairs).collect();
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }
}

/// Closeness estimate from a seeded sample of pivot nodes.
///
/// Approximates `c(v) = k / Σ_p d(p, v)` over the sampled pivots;
/// nodes unreachable from every pivot score 0.
pub struct ApproxCloseness {
    graph: Arc<Graph>,
    samples: usize,
    scores: Vec<f64>,
}

impl ApproxCloseness {
    pub fn new(graph: Arc<Graph>, samples: usize) -> Self {
        Self {
            graph,
            samples,
            scores: Vec::new(),
        }
    }
}

impl Algorithm for ApproxCloseness {
    #[allow(clippy::cast_precision_loss)]
    fn run(&mut self) -> Result<()> {
        // Pivots reach nodes over the symmetric view so that directed
        // sinks still receive distances.
        let adj = adjacency(&self.graph, true);
        let n = adj.len();
        if n == 0 {
            self.scores = Vec::new();
            return Ok(());
        }
        let samples = self.samples.min(n).max(1);
        let mut rng = StdRng::seed_from_u64(SAMPLING_SEED);
        let mut pivots: Vec<usize> = (0..n).collect();
        for i in 0..samples {
            let j = rng.gen_range(i..n);
            pivots.swap(i, j);
        }

        let mut dist_sum = vec![0.0f64; n];
        let mut reached = vec![0usize; n];
        for &p in &pivots[..samples] {
            let mut dist = vec![-1i64; n];
            dist[p] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(p);
            while let Some(v) = queue.pop_front() {
                for &w in &adj[v] {
                    if dist[w] < 0 {
                        dist[w] = dist[v] + 1;
                        queue.push_back(w);
                    }
                }
            }
            for v in 0..n {
                if dist[v] > 0 {
                    dist_sum[v] += dist[v] as f64;
                    reached[v] += 1;
                }
            }
        }

        self.scores = (0..n)
            .map(|v| {
                if dist_sum[v] > 0.0 {
                    reached[v] as f64 / dist_sum[v]
                } else {
                    0.0
                }
            })
            .collect();
        Ok(())
    }

    fn scores(&self) -> Option<Vec<f64>> {
        Some(self.scores.clone())
    }
}
