//! Static measure catalog.
//!
//! Every measure the profiler can compute is one variant of [`MeasureKey`].
//! A variant resolves to a [`MeasureSpec`]: category, display name,
//! correlation eligibility, axis label, and the construction/extraction
//! strategies that bind the measure to its [`Algorithm`](crate::algo::Algorithm)
//! capability. The catalog is fixed at compile time and never mutated.

use crate::algo::{self, Algorithm};
use crate::graph::Graph;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Grouping of measures for correlation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    NodeCentrality,
    Partition,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::NodeCentrality => write!(f, "Node Centrality"),
            Category::Partition => write!(f, "Partition"),
        }
    }
}

/// One computable measure. Ordering follows registration order, which fixes
/// report ordering and the canonical orientation of correlation pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MeasureKey {
    Degree,
    CoreDecomposition,
    ClusteringCoefficient,
    PageRank,
    KPath,
    Katz,
    Betweenness,
    Closeness,
    Communities,
    ConnectedComponents,
    CoreShells,
}

/// All measures in registration order.
pub const ALL_MEASURES: [MeasureKey; 11] = [
    MeasureKey::Degree,
    MeasureKey::CoreDecomposition,
    MeasureKey::ClusteringCoefficient,
    MeasureKey::PageRank,
    MeasureKey::KPath,
    MeasureKey::Katz,
    MeasureKey::Betweenness,
    MeasureKey::Closeness,
    MeasureKey::Communities,
    MeasureKey::ConnectedComponents,
    MeasureKey::CoreShells,
];

/// How a measure's raw sample is pulled out of its finished algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// One score per node.
    Scores,
    /// Sorted partition block sizes.
    PartitionSizes,
}

/// Registry entry for one measure.
#[derive(Debug, Clone, Copy)]
pub struct MeasureSpec {
    pub key: MeasureKey,
    pub category: Category,
    /// Human-readable measure name used in reports.
    pub display_name: &'static str,
    /// Whether the measure participates in within-category correlation.
    pub correlate: bool,
    /// Axis label for distribution plots.
    pub axis_label: &'static str,
    /// Display name of the backing algorithm.
    pub algorithm_name: &'static str,
    pub extraction: Extraction,
}

impl MeasureKey {
    /// The stable string key, e.g. `"Centrality.Degree"`.
    pub fn name(self) -> &'static str {
        match self {
            MeasureKey::Degree => "Centrality.Degree",
            MeasureKey::CoreDecomposition => "Centrality.CoreDecomposition",
            MeasureKey::ClusteringCoefficient => "Centrality.ClusteringCoefficient",
            MeasureKey::PageRank => "Centrality.PageRank",
            MeasureKey::KPath => "Centrality.KPath",
            MeasureKey::Katz => "Centrality.Katz",
            MeasureKey::Betweenness => "Centrality.Betweenness",
            MeasureKey::Closeness => "Centrality.Closeness",
            MeasureKey::Communities => "Partition.Communities",
            MeasureKey::ConnectedComponents => "Partition.ConnectedComponents",
            MeasureKey::CoreShells => "Partition.CoreDecomposition",
        }
    }

    /// Reverse of [`MeasureKey::name`]; `None` for unknown keys.
    pub fn parse(name: &str) -> Option<Self> {
        ALL_MEASURES.iter().copied().find(|k| k.name() == name)
    }

    /// The registry entry for this measure.
    pub fn spec(self) -> MeasureSpec {
        match self {
            MeasureKey::Degree => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "Degree",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "DegreeCentrality",
                extraction: Extraction::Scores,
            },
            MeasureKey::CoreDecomposition => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "k-Core Decomposition",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "CoreDecomposition",
                extraction: Extraction::Scores,
            },
            MeasureKey::ClusteringCoefficient => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "Local Clustering Coefficient",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "LocalClusteringCoefficient",
                extraction: Extraction::Scores,
            },
            MeasureKey::PageRank => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "PageRank",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "PageRank",
                extraction: Extraction::Scores,
            },
            MeasureKey::KPath => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "k-Path Centrality",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "KPathCentrality",
                extraction: Extraction::Scores,
            },
            MeasureKey::Katz => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "Katz Centrality",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "KatzCentrality",
                extraction: Extraction::Scores,
            },
            MeasureKey::Betweenness => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "Betweenness",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "EstimateBetweenness",
                extraction: Extraction::Scores,
            },
            MeasureKey::Closeness => MeasureSpec {
                key: self,
                category: Category::NodeCentrality,
                display_name: "Closeness",
                correlate: true,
                axis_label: "Score",
                algorithm_name: "ApproxCloseness",
                extraction: Extraction::Scores,
            },
            MeasureKey::Communities => MeasureSpec {
                key: self,
                category: Category::Partition,
                display_name: "Communities",
                correlate: false,
                axis_label: "Nodes per Community",
                algorithm_name: "LabelPropagation",
                extraction: Extraction::PartitionSizes,
            },
            MeasureKey::ConnectedComponents => MeasureSpec {
                key: self,
                category: Category::Partition,
                display_name: "Connected Components",
                correlate: false,
                axis_label: "Nodes per Component",
                algorithm_name: "ConnectedComponents",
                extraction: Extraction::PartitionSizes,
            },
            MeasureKey::CoreShells => MeasureSpec {
                key: self,
                category: Category::Partition,
                display_name: "k-Core Decomposition",
                correlate: false,
                axis_label: "Nodes per Shell",
                algorithm_name: "CoreDecomposition",
                extraction: Extraction::PartitionSizes,
            },
        }
    }

    /// Construct the algorithm capability bound to `graph`.
    ///
    /// Construction can fail (an algorithm may reject the graph up front);
    /// the orchestrator treats that as a dropped measure, not a fatal error.
    pub fn construct(self, graph: &Arc<Graph>) -> Result<Box<dyn Algorithm>> {
        let g = Arc::clone(graph);
        let algo: Box<dyn Algorithm> = match self {
            MeasureKey::Degree => Box::new(algo::DegreeCentrality::new(g)),
            MeasureKey::CoreDecomposition | MeasureKey::CoreShells => {
                Box::new(algo::CoreDecomposition::new(g))
            }
            MeasureKey::ClusteringCoefficient => {
                Box::new(algo::LocalClusteringCoefficient::new(g))
            }
            MeasureKey::PageRank => Box::new(algo::PageRank::new(g)),
            MeasureKey::KPath => Box::new(algo::KPathCentrality::new(g)),
            MeasureKey::Katz => Box::new(algo::KatzCentrality::new(g)),
            MeasureKey::Betweenness => Box::new(algo::EstimateBetweenness::new(g, 10)),
            MeasureKey::Closeness => {
                let samples = graph.node_count().min(10);
                Box::new(algo::ApproxCloseness::new(g, samples))
            }
            MeasureKey::Communities => Box::new(algo::LabelPropagation::new(g)),
            MeasureKey::ConnectedComponents => Box::new(algo::ConnectedComponents::new(g)),
        };
        Ok(algo)
    }

    /// Apply this measure's extraction strategy to a finished algorithm.
    pub fn extract(self, algo: &dyn Algorithm) -> Result<Vec<f64>> {
        let spec = self.spec();
        match spec.extraction {
            Extraction::Scores => algo.scores().ok_or_else(|| Error::MeasureComputation {
                key: self.name().to_string(),
                reason: "algorithm produced no node scores".into(),
            }),
            Extraction::PartitionSizes => {
                let mut sizes = algo.partition_sizes().ok_or_else(|| {
                    Error::MeasureComputation {
                        key: self.name().to_string(),
                        reason: "algorithm produced no partition".into(),
                    }
                })?;
                sizes.sort_unstable();
                Ok(sizes.into_iter().map(|s| s as f64).collect())
            }
        }
    }
}

impl fmt::Display for MeasureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_roundtrip_through_names() {
        for key in ALL_MEASURES {
            assert_eq!(MeasureKey::parse(key.name()), Some(key));
        }
        assert_eq!(MeasureKey::parse("Centrality.Bogus"), None);
    }

    #[test]
    fn categories_are_consistent_with_extraction() {
        for key in ALL_MEASURES {
            let spec = key.spec();
            match spec.category {
                Category::NodeCentrality => {
                    assert_eq!(spec.extraction, Extraction::Scores, "{key}");
                    assert!(spec.correlate, "{key}");
                }
                Category::Partition => {
                    assert_eq!(spec.extraction, Extraction::PartitionSizes, "{key}");
                    assert!(!spec.correlate, "{key}");
                }
            }
        }
    }

    #[test]
    fn registration_order_is_stable() {
        assert_eq!(ALL_MEASURES[0], MeasureKey::Degree);
        assert_eq!(ALL_MEASURES[10], MeasureKey::CoreShells);
        // Ord matches registration order, which fixes canonical pair keys.
        assert!(MeasureKey::Degree < MeasureKey::PageRank);
        assert!(MeasureKey::PageRank < MeasureKey::Katz);
    }
}
