//! Pairwise correlation between measures of the same category.
//!
//! Storage is symmetric: every unordered pair is stored exactly once under
//! its canonical orientation ([`ordered_pair`]), and lookups canonicalize
//! before touching the map, so `(b, a)` transparently resolves to the entry
//! for `(a, b)`.

use crate::config::CorrelationKind;
use crate::registry::{Category, MeasureKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Pearson product-moment correlation coefficient.
///
/// NaN when the inputs are degenerate (empty, mismatched, or zero
/// variance on either side).
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return f64::NAN;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    cov / denom
}

/// Spearman's rank correlation: Pearson over the rank mappings.
pub fn spearman(ranks_x: &[f64], ranks_y: &[f64]) -> f64 {
    pearson(ranks_x, ranks_y)
}

/// Fechner's correlation: concordance of signs about the means,
/// `(concordant - discordant) / n` over pairs with a definite sign.
pub fn fechner(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.is_empty() || xs.len() != ys.len() {
        return f64::NAN;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut concordant = 0i64;
    let mut discordant = 0i64;
    let mut counted = 0i64;
    for (x, y) in xs.iter().zip(ys.iter()) {
        let sx = (x - mean_x).signum();
        let sy = (y - mean_y).signum();
        if sx == 0.0 || sy == 0.0 {
            continue;
        }
        counted += 1;
        if sx == sy {
            concordant += 1;
        } else {
            discordant += 1;
        }
    }
    if counted == 0 {
        return f64::NAN;
    }
    (concordant - discordant) as f64 / counted as f64
}

/// Compute `kind` over the appropriate representation of two measures.
pub fn coefficient(
    kind: CorrelationKind,
    sample_a: &[f64],
    ranks_a: &[f64],
    sample_b: &[f64],
    ranks_b: &[f64],
) -> f64 {
    match kind {
        CorrelationKind::Pearson => pearson(sample_a, sample_b),
        CorrelationKind::Spearman => spearman(ranks_a, ranks_b),
        CorrelationKind::Fechner => fechner(sample_a, sample_b),
    }
}

/// Canonical orientation for an unordered measure pair.
pub fn ordered_pair(a: MeasureKey, b: MeasureKey) -> (MeasureKey, MeasureKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// One stored correlation entry: a scalar per enabled correlation kind,
/// plus an optional rendered scatter image.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub values: BTreeMap<CorrelationKind, f64>,
    pub image: Option<String>,
}

/// Symmetric correlation cache keyed by `(category, a, b)` with canonical
/// pair orientation.
#[derive(Debug, Clone, Default)]
pub struct CorrelationMatrix {
    entries: HashMap<(Category, MeasureKey, MeasureKey), CorrelationEntry>,
}

impl CorrelationMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; the pair is canonicalized first.
    pub fn insert(&mut self, category: Category, a: MeasureKey, b: MeasureKey, entry: CorrelationEntry) {
        let (first, second) = ordered_pair(a, b);
        self.entries.insert((category, first, second), entry);
    }

    /// Look up `(a, b)` or, transparently, `(b, a)`.
    pub fn get(&self, category: Category, a: MeasureKey, b: MeasureKey) -> Option<&CorrelationEntry> {
        let (first, second) = ordered_pair(a, b);
        self.entries.get(&(category, first, second))
    }

    pub fn get_mut(
        &mut self,
        category: Category,
        a: MeasureKey,
        b: MeasureKey,
    ) -> Option<&mut CorrelationEntry> {
        let (first, second) = ordered_pair(a, b);
        self.entries.get_mut(&(category, first, second))
    }

    /// Synthesize the self-correlation entry: exactly 1 for every enabled
    /// kind, no computation, no image.
    pub fn insert_self_pair(&mut self, category: Category, key: MeasureKey, kinds: &[CorrelationKind]) {
        let mut entry = CorrelationEntry::default();
        for &kind in kinds {
            entry.values.insert(kind, 1.0);
        }
        self.insert(category, key, key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
