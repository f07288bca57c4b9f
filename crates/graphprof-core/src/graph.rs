use crate::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A graph under profiling.
///
/// Uses petgraph's directed graph internally; an undirected graph stores each
/// edge once and traverses both directions. The handle is read-only for the
/// whole profiling pipeline: algorithms borrow it, never mutate it.
///
/// Nodes are dense indices `0..node_count()`.
///
/// # Example
///
/// ```rust
/// use graphprof_core::Graph;
///
/// let mut g = Graph::new(false, false);
/// g.add_edge(0, 1, 1.0);
/// g.add_edge(1, 2, 1.0);
///
/// assert_eq!(g.node_count(), 3);
/// assert_eq!(g.edge_count(), 2);
/// assert_eq!(g.degree(1), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    /// The underlying directed graph. For undirected graphs each edge is
    /// stored once and both endpoints see it via undirected traversal.
    inner: DiGraph<(), f64>,
    directed: bool,
    weighted: bool,
    self_loops: usize,
}

/// Supported on-disk graph formats for the batch walker and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphFormat {
    /// Whitespace-separated `u v [w]` lines, undirected. `#` and `%` start comments.
    EdgeList,
    /// Same syntax as [`GraphFormat::EdgeList`], edges directed `u -> v`.
    EdgeListDirected,
    /// METIS adjacency format: header `n m [fmt]`, then one 1-indexed
    /// neighbor list per node. Always undirected.
    Metis,
}

impl Graph {
    /// Create an empty graph.
    pub fn new(directed: bool, weighted: bool) -> Self {
        Self {
            inner: DiGraph::new(),
            directed,
            weighted,
            self_loops: 0,
        }
    }

    /// Grow the node set so `id` is a valid node.
    pub fn ensure_node(&mut self, id: usize) {
        while self.inner.node_count() <= id {
            self.inner.add_node(());
        }
    }

    /// Add an edge, growing the node set as needed.
    ///
    /// For unweighted graphs the weight argument is ignored and stored as 1.0.
    pub fn add_edge(&mut self, u: usize, v: usize, weight: f64) {
        self.ensure_node(u.max(v));
        if u == v {
            self.self_loops += 1;
        }
        let w = if self.weighted { weight } else { 1.0 };
        self.inner
            .add_edge(NodeIndex::new(u), NodeIndex::new(v), w);
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges (each undirected edge counted once).
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Number of self-loop edges.
    pub fn self_loop_count(&self) -> usize {
        self.self_loops
    }

    /// Edge density: `m / (n (n-1))` directed, `2m / (n (n-1))` undirected.
    #[allow(clippy::cast_precision_loss)]
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let pairs = (n * (n - 1)) as f64;
        let m = self.edge_count() as f64;
        if self.directed {
            m / pairs
        } else {
            2.0 * m / pairs
        }
    }

    /// Neighbors of `u`: successors for directed graphs, all adjacent nodes
    /// for undirected graphs.
    pub fn neighbors(&self, u: usize) -> Vec<usize> {
        let idx = NodeIndex::new(u);
        if self.directed {
            self.inner.neighbors(idx).map(|n| n.index()).collect()
        } else {
            self.inner
                .neighbors_undirected(idx)
                .map(|n| n.index())
                .collect()
        }
    }

    /// Predecessors of `u` (equals [`Graph::neighbors`] for undirected graphs).
    pub fn predecessors(&self, u: usize) -> Vec<usize> {
        let idx = NodeIndex::new(u);
        if self.directed {
            self.inner
                .neighbors_directed(idx, petgraph::Direction::Incoming)
                .map(|n| n.index())
                .collect()
        } else {
            self.inner
                .neighbors_undirected(idx)
                .map(|n| n.index())
                .collect()
        }
    }

    /// Degree of `u`: out-degree for directed graphs, adjacent-edge count
    /// for undirected graphs.
    pub fn degree(&self, u: usize) -> usize {
        let idx = NodeIndex::new(u);
        if self.directed {
            self.inner.neighbors(idx).count()
        } else {
            self.inner.neighbors_undirected(idx).count()
        }
    }

    /// Access the underlying petgraph storage.
    pub(crate) fn petgraph(&self) -> &DiGraph<(), f64> {
        &self.inner
    }

    /// All edges as `(source, target, weight)` triples, each stored edge once.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.inner.edge_indices().map(move |e| {
            let (a, b) = self.inner.edge_endpoints(e).expect("edge endpoints");
            (a.index(), b.index(), self.inner[e])
        })
    }

    /// Read a graph file in the given format.
    pub fn read(path: impl AsRef<Path>, format: GraphFormat) -> Result<Self> {
        match format {
            GraphFormat::EdgeList => Self::from_edge_list(path, false),
            GraphFormat::EdgeListDirected => Self::from_edge_list(path, true),
            GraphFormat::Metis => Self::from_metis(path),
        }
    }

    /// Load from an edge-list file: `u v [w]` per line.
    ///
    /// A third column makes the graph weighted. Empty lines and lines
    /// starting with `#` or `%` are skipped.
    pub fn from_edge_list(path: impl AsRef<Path>, directed: bool) -> Result<Self> {
        let display = path.as_ref().display().to_string();
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut edges: Vec<(usize, usize, f64)> = Vec::new();
        let mut weighted = false;
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let parse = |tok: Option<&str>, what: &str| -> Result<usize> {
                tok.and_then(|t| t.parse().ok()).ok_or_else(|| Error::GraphParse {
                    path: display.clone(),
                    reason: format!("line {}: expected {what}", lineno + 1),
                })
            };
            let u = parse(parts.next(), "source node id")?;
            let v = parse(parts.next(), "target node id")?;
            let w = match parts.next() {
                Some(tok) => {
                    weighted = true;
                    tok.parse::<f64>().map_err(|_| Error::GraphParse {
                        path: display.clone(),
                        reason: format!("line {}: bad edge weight {tok:?}", lineno + 1),
                    })?
                }
                None => 1.0,
            };
            edges.push((u, v, w));
        }

        let mut g = Graph::new(directed, weighted);
        for (u, v, w) in edges {
            g.add_edge(u, v, w);
        }
        Ok(g)
    }

    /// Load from a METIS adjacency file.
    pub fn from_metis(path: impl AsRef<Path>) -> Result<Self> {
        let display = path.as_ref().display().to_string();
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines().filter_map(|l| match l {
            Ok(s) => {
                let t = s.trim().to_string();
                if t.is_empty() || t.starts_with('%') {
                    None
                } else {
                    Some(Ok(t))
                }
            }
            Err(e) => Some(Err(e)),
        });

        let header = lines.next().transpose()?.ok_or_else(|| Error::GraphParse {
            path: display.clone(),
            reason: "missing METIS header".into(),
        })?;
        let mut head = header.split_whitespace();
        let n: usize = head
            .next()
            .and_then(|t| t.parse().ok())
            .ok_or_else(|| Error::GraphParse {
                path: display.clone(),
                reason: "bad node count in header".into(),
            })?;

        let mut g = Graph::new(false, false);
        if n > 0 {
            g.ensure_node(n - 1);
        }
        for u in 0..n {
            let Some(line) = lines.next().transpose()? else {
                return Err(Error::GraphParse {
                    path: display,
                    reason: format!("expected {n} adjacency lines, got {u}"),
                });
            };
            for tok in line.split_whitespace() {
                let v: usize = tok.parse().map_err(|_| Error::GraphParse {
                    path: display.clone(),
                    reason: format!("node {}: bad neighbor {tok:?}", u + 1),
                })?;
                if v == 0 || v > n {
                    return Err(Error::GraphParse {
                        path: display.clone(),
                        reason: format!("node {}: neighbor {v} out of range", u + 1),
                    });
                }
                // METIS lists every edge twice; keep the canonical orientation.
                if v - 1 >= u {
                    g.add_edge(u, v - 1, 1.0);
                }
            }
        }
        Ok(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn undirected_degree_and_density() {
        let mut g = Graph::new(false, false);
        // Triangle
        g.add_edge(0, 1, 1.0);
        g.add_edge(1, 2, 1.0);
        g.add_edge(2, 0, 1.0);

        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 3);
        for u in 0..3 {
            assert_eq!(g.degree(u), 2);
        }
        assert!((g.density() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn directed_neighbors() {
        let mut g = Graph::new(true, false);
        g.add_edge(0, 1, 1.0);
        g.add_edge(0, 2, 1.0);
        g.add_edge(2, 0, 1.0);

        let mut out: Vec<_> = g.neighbors(0);
        out.sort_unstable();
        assert_eq!(out, vec![1, 2]);
        assert_eq!(g.predecessors(0), vec![2]);
        assert_eq!(g.degree(1), 0);
    }

    #[test]
    fn self_loops_counted() {
        let mut g = Graph::new(false, false);
        g.add_edge(0, 0, 1.0);
        g.add_edge(0, 1, 1.0);
        assert_eq!(g.self_loop_count(), 1);
    }

    #[test]
    fn edge_list_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.edges");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f, "0 1").unwrap();
        writeln!(f, "1 2").unwrap();
        writeln!(f, "").unwrap();
        writeln!(f, "2 3").unwrap();
        drop(f);

        let g = Graph::read(&path, GraphFormat::EdgeList).unwrap();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        assert!(!g.is_directed());
        assert!(!g.is_weighted());
    }

    #[test]
    fn weighted_edge_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.edges");
        std::fs::write(&path, "0 1 2.5\n1 2 0.5\n").unwrap();

        let g = Graph::read(&path, GraphFormat::EdgeList).unwrap();
        assert!(g.is_weighted());
        let weights: Vec<f64> = g.edges().map(|(_, _, w)| w).collect();
        assert!(weights.contains(&2.5));
    }

    #[test]
    fn bad_edge_list_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.edges");
        std::fs::write(&path, "0 not-a-node\n").unwrap();

        let err = Graph::read(&path, GraphFormat::EdgeList).unwrap_err();
        assert!(matches!(err, Error::GraphParse { .. }));
    }

    #[test]
    fn metis_parses_symmetric_lists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.metis");
        // Path graph 1-2-3 in METIS (1-indexed, each edge listed twice)
        std::fs::write(&path, "3 2\n2\n1 3\n2\n").unwrap();

        let g = Graph::read(&path, GraphFormat::Metis).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree(1), 2);
    }
}
