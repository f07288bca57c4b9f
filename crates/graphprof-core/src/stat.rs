//! Descriptive statistics over a measure's raw sample.
//!
//! Everything here is a pure function of its inputs, which is what lets the
//! orchestrator run statistics as independent concurrent jobs.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};

/// Statistics bundle for one measure.
///
/// Quantile markers, skewness and kurtosis are only computed for
/// score-valued (non-partition) measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub stddev: f64,
    /// 25th, 50th and 75th percentile.
    pub quartiles: Option<[f64; 3]>,
    /// 10th through 90th percentile in steps of ten.
    pub deciles: Option<Vec<f64>>,
    pub skewness: Option<f64>,
    pub kurtosis: Option<f64>,
}

impl Stats {
    /// Empty-sample sentinel: all NaN, count 0.
    fn empty() -> Self {
        Stats {
            count: 0,
            min: f64::NAN,
            max: f64::NAN,
            mean: f64::NAN,
            median: f64::NAN,
            variance: f64::NAN,
            stddev: f64::NAN,
            quartiles: None,
            deciles: None,
            skewness: None,
            kurtosis: None,
        }
    }
}

/// Rank mapping: each element's 1-based position in sorted order, ties
/// broken by stable original order.
#[allow(clippy::cast_precision_loss)]
pub fn ranked(sample: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..sample.len()).collect();
    order.sort_by(|&a, &b| {
        sample[a]
            .partial_cmp(&sample[b])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut ranks = vec![0.0; sample.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = (position + 1) as f64;
    }
    ranks
}

/// Linear-interpolation percentile over a sorted slice, `p` in `[0, 1]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Compute the statistics bundle for one measure.
///
/// `sorted` must be the ascending copy of `sample`; `is_partition`
/// suppresses the shape statistics that make no sense for block sizes.
#[allow(clippy::cast_precision_loss)]
pub fn compute(sample: &[f64], sorted: &[f64], _ranks: &[f64], is_partition: bool) -> Stats {
    let n = sample.len();
    if n == 0 {
        return Stats::empty();
    }
    let n_f64 = n as f64;
    let mean = sample.iter().sum::<f64>() / n_f64;
    let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n_f64;
    let stddev = variance.sqrt();
    let median = percentile(sorted, 0.5);

    let (quartiles, deciles, skewness, kurtosis) = if is_partition {
        (None, None, None, None)
    } else {
        let quartiles = [
            percentile(sorted, 0.25),
            percentile(sorted, 0.5),
            percentile(sorted, 0.75),
        ];
        let deciles: Vec<f64> = (1..=9).map(|i| percentile(sorted, i as f64 / 10.0)).collect();
        let (skewness, kurtosis) = if stddev > 0.0 {
            let m3 = sample.iter().map(|x| ((x - mean) / stddev).powi(3)).sum::<f64>() / n_f64;
            let m4 = sample.iter().map(|x| ((x - mean) / stddev).powi(4)).sum::<f64>() / n_f64;
            (Some(m3), Some(m4 - 3.0))
        } else {
            (Some(0.0), Some(0.0))
        };
        (Some(quartiles), Some(deciles), skewness, kurtosis)
    };

    Stats {
        count: n,
        min: sorted[0],
        max: sorted[n - 1],
        mean,
        median,
        variance,
        stddev,
        quartiles,
        deciles,
        skewness,
        kurtosis,
    }
}

/// Assortativity of a node score: the Pearson correlation of the score
/// across edge endpoints. Undirected edges contribute both orientations.
/// NaN when degenerate (no edges or zero variance).
pub fn assortativity(graph: &Graph, scores: &[f64]) -> f64 {
    let mut xs: Vec<f64> = Vec::new();
    let mut ys: Vec<f64> = Vec::new();
    for (u, v, _) in graph.edges() {
        if u >= scores.len() || v >= scores.len() {
            continue;
        }
        xs.push(scores[u]);
        ys.push(scores[v]);
        if !graph.is_directed() {
            xs.push(scores[v]);
            ys.push(scores[u]);
        }
    }
    crate::correlation::pearson(&xs, &ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_is_stable_on_ties() {
        let sample = [2.0, 1.0, 2.0, 0.5];
        // Sorted order: 0.5 (idx 3), 1.0 (idx 1), 2.0 (idx 0), 2.0 (idx 2)
        assert_eq!(ranked(&sample), vec![3.0, 2.0, 4.0, 1.0]);
    }

    #[test]
    fn ranked_empty() {
        assert!(ranked(&[]).is_empty());
    }

    #[test]
    fn stats_on_known_sample() {
        let sample = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut sorted = sample.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let ranks = ranked(&sample);
        let stats = compute(&sample, &sorted, &ranks, false);

        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.median - 3.0).abs() < 1e-12);
        assert!((stats.variance - 2.0).abs() < 1e-12);
        let q = stats.quartiles.unwrap();
        assert!((q[0] - 2.0).abs() < 1e-12);
        assert!((q[2] - 4.0).abs() < 1e-12);
        // Symmetric sample: no skew.
        assert!(stats.skewness.unwrap().abs() < 1e-12);
    }

    #[test]
    fn partition_stats_skip_shape_markers() {
        let sample = [3.0, 7.0];
        let sorted = [3.0, 7.0];
        let ranks = ranked(&sample);
        let stats = compute(&sample, &sorted, &ranks, true);
        assert!(stats.quartiles.is_none());
        assert!(stats.deciles.is_none());
        assert!(stats.skewness.is_none());
        assert_eq!(stats.count, 2);
        assert!((stats.median - 5.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sample_is_nan_bundle() {
        let stats = compute(&[], &[], &[], false);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
    }

    #[test]
    fn constant_sample_zero_spread() {
        let sample = [2.0; 8];
        let sorted = sample.to_vec();
        let ranks = ranked(&sample);
        let stats = compute(&sample, &sorted, &ranks, false);
        assert_eq!(stats.stddev, 0.0);
        assert_eq!(stats.skewness, Some(0.0));
    }

    #[test]
    fn assortativity_of_degree_on_star_is_negative() {
        use crate::graph::Graph;
        let mut g = Graph::new(false, false);
        for leaf in 1..=5 {
            g.add_edge(0, leaf, 1.0);
        }
        let scores: Vec<f64> = (0..g.node_count()).map(|u| g.degree(u) as f64).collect();
        let r = assortativity(&g, &scores);
        // Hubs connect exclusively to leaves: perfectly disassortative.
        assert!((r + 1.0).abs() < 1e-9, "r = {r}");
    }

    #[test]
    fn assortativity_degenerate_is_nan() {
        use crate::graph::Graph;
        let g = Graph::new(false, false);
        assert!(assortativity(&g, &[]).is_nan());
    }
}
