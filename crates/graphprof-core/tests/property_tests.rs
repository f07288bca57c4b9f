//! Property-based tests for the statistics and correlation kernels.

use graphprof_core::{ordered_pair, MeasureKey, ALL_MEASURES};
use proptest::prelude::*;

fn arb_sample() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 2..64)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn pearson_is_symmetric(xs in arb_sample(), ys in arb_sample()) {
        let n = xs.len().min(ys.len());
        let (xs, ys) = (&xs[..n], &ys[..n]);
        let forward = graphprof_core::correlation::pearson(xs, ys);
        let backward = graphprof_core::correlation::pearson(ys, xs);
        prop_assert_eq!(forward.to_bits(), backward.to_bits());
    }

    #[test]
    fn pearson_self_is_one_for_varying_samples(xs in arb_sample()) {
        prop_assume!(xs.iter().any(|&x| x != xs[0]));
        let r = graphprof_core::correlation::pearson(&xs, &xs);
        prop_assert!((r - 1.0).abs() < 1e-9, "r = {}", r);
    }

    #[test]
    fn pearson_is_bounded(xs in arb_sample(), ys in arb_sample()) {
        let n = xs.len().min(ys.len());
        let r = graphprof_core::correlation::pearson(&xs[..n], &ys[..n]);
        prop_assert!(r.is_nan() || (-1.0 - 1e-9..=1.0 + 1e-9).contains(&r));
    }

    #[test]
    fn ranks_are_a_permutation(xs in arb_sample()) {
        let ranks = graphprof_core::stat::ranked(&xs);
        let mut sorted = ranks.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (1..=xs.len()).map(|i| i as f64).collect();
        prop_assert_eq!(sorted, expected);
    }

    #[test]
    fn ranks_respect_order(xs in arb_sample()) {
        let ranks = graphprof_core::stat::ranked(&xs);
        for i in 0..xs.len() {
            for j in 0..xs.len() {
                if xs[i] < xs[j] {
                    prop_assert!(ranks[i] < ranks[j]);
                }
            }
        }
    }

    #[test]
    fn fechner_is_bounded_and_symmetric(xs in arb_sample(), ys in arb_sample()) {
        let n = xs.len().min(ys.len());
        let (xs, ys) = (&xs[..n], &ys[..n]);
        let forward = graphprof_core::correlation::fechner(xs, ys);
        let backward = graphprof_core::correlation::fechner(ys, xs);
        prop_assert_eq!(forward.to_bits(), backward.to_bits());
        prop_assert!(forward.is_nan() || (-1.0..=1.0).contains(&forward));
    }

    #[test]
    fn stats_bounds_hold(xs in arb_sample()) {
        let mut sorted = xs.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let ranks = graphprof_core::stat::ranked(&xs);
        let stats = graphprof_core::stat::compute(&xs, &sorted, &ranks, false);
        prop_assert_eq!(stats.count, xs.len());
        prop_assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.stddev >= 0.0);
    }
}

proptest! {
    #[test]
    fn ordered_pair_is_canonical(i in 0usize..11, j in 0usize..11) {
        let (a, b) = (ALL_MEASURES[i], ALL_MEASURES[j]);
        let forward = ordered_pair(a, b);
        let backward = ordered_pair(b, a);
        prop_assert_eq!(forward, backward);
        prop_assert!(forward.0 <= forward.1);
    }
}

#[test]
fn measure_key_names_are_unique() {
    let mut names: Vec<&str> = ALL_MEASURES.iter().map(|k| k.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), ALL_MEASURES.len());
    assert!(MeasureKey::parse("Partition.CoreDecomposition").is_some());
}
