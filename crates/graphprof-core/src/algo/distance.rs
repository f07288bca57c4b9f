//! Diameter estimators.
//!
//! Both estimators work on the undirected view of the graph and on finite
//! distances only, so disconnected graphs are handled per component rather
//! than reported as infinite.

use super::adjacency;
use crate::graph::Graph;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

const ESTIMATOR_SEED: u64 = 0x6469_616d;
const SWEEPS: usize = 4;

fn bfs(adj: &[Vec<usize>], source: usize) -> Vec<i64> {
    let mut dist = vec![-1i64; adj.len()];
    dist[source] = 0;
    let mut queue = VecDeque::new();
    queue.push_back(source);
    while let Some(v) = queue.pop_front() {
        for &w in &adj[v] {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
        }
    }
    dist
}

fn eccentricity(dist: &[i64]) -> (usize, usize) {
    let mut farthest = 0;
    let mut ecc = 0i64;
    for (v, &d) in dist.iter().enumerate() {
        if d > ecc {
            ecc = d;
            farthest = v;
        }
    }
    (farthest, ecc as usize)
}

/// Estimate a `[lower, upper]` range for the graph diameter.
///
/// Double sweeps from a few seeded starting nodes: the eccentricity of the
/// far end of a sweep is a lower bound, and twice any eccentricity is an
/// upper bound.
pub fn diameter_range(graph: &Graph) -> Result<(usize, usize)> {
    let n = graph.node_count();
    if n == 0 {
        return Err(Error::MeasureComputation {
            key: "Diameter".into(),
            reason: "empty graph".into(),
        });
    }
    let adj = adjacency(graph, true);
    let mut rng = StdRng::seed_from_u64(ESTIMATOR_SEED);

    let mut lower = 0usize;
    let mut upper = usize::MAX;
    for _ in 0..SWEEPS.min(n) {
        let start = rng.gen_range(0..n);
        let (far, ecc_start) = eccentricity(&bfs(&adj, start));
        let (_, ecc_far) = eccentricity(&bfs(&adj, far));
        lower = lower.max(ecc_far).max(ecc_start);
        upper = upper.min(2 * ecc_start.max(ecc_far));
    }
    Ok((lower, upper.max(lower)))
}

/// Approximate the effective diameter: the distance within which 90% of
/// reachable node pairs lie, estimated from BFS over a node sample.
pub fn effective_diameter(graph: &Graph) -> Result<f64> {
    let n = graph.node_count();
    if n == 0 {
        return Err(Error::MeasureComputation {
            key: "EffectiveDiameter".into(),
            reason: "empty graph".into(),
        });
    }
    let adj = adjacency(graph, true);
    let samples = n.min(64);
    let mut rng = StdRng::seed_from_u64(ESTIMATOR_SEED);
    let mut sources: Vec<usize> = (0..n).collect();
    for i in 0..samples {
        let j = rng.gen_range(i..n);
        sources.swap(i, j);
    }

    let mut distances: Vec<i64> = Vec::new();
    for &s in &sources[..samples] {
        for &d in bfs(&adj, s).iter() {
            if d > 0 {
                distances.push(d);
            }
        }
    }
    if distances.is_empty() {
        return Ok(0.0);
    }
    distances.sort_unstable();
    let idx = ((distances.len() as f64) * 0.9).ceil() as usize;
    Ok(distances[idx.min(distances.len()) - 1] as f64)
}
