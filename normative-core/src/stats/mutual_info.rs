//! Normalized mutual information between two discrete label sequences.
//!
//! Arithmetic-mean normalisation: `NMI = MI / ((H(U) + H(V)) / 2)`, natural log.
//! Conventions for degenerate inputs:
//! - both sequences constant (or both empty): 1.0, the labelings are identical;
//! - zero mutual information: 0.0.

use std::collections::HashMap;

/// Normalized mutual information of two aligned label sequences, in `[0, 1]`.
///
/// # Panics
///
/// Panics if the sequences differ in length.
pub fn normalized_mutual_info(labels_a: &[u32], labels_b: &[u32]) -> f64 {
    assert_eq!(
        labels_a.len(),
        labels_b.len(),
        "label sequences must be aligned"
    );

    let n = labels_a.len();
    let counts_a = histogram(labels_a.iter().copied());
    let counts_b = histogram(labels_b.iter().copied());

    if (counts_a.len() == 1 && counts_b.len() == 1) || n == 0 {
        return 1.0;
    }

    let joint = histogram(labels_a.iter().copied().zip(labels_b.iter().copied()));
    let n_f = n as f64;
    let log_n = n_f.ln();

    let mut mi = 0.0;
    for (&(a, b), &nij) in &joint {
        let nij = nij as f64;
        let outer = (counts_a[&a] as f64) * (counts_b[&b] as f64);
        mi += nij / n_f * (nij.ln() - log_n - outer.ln() + 2.0 * log_n);
    }
    let mi = mi.max(0.0);
    if mi == 0.0 {
        return 0.0;
    }

    let normalizer = (entropy(&counts_a, n_f) + entropy(&counts_b, n_f)) / 2.0;
    let normalizer = normalizer.max(f64::EPSILON);
    (mi / normalizer).clamp(0.0, 1.0)
}

fn histogram<K: Eq + std::hash::Hash>(items: impl Iterator<Item = K>) -> HashMap<K, usize> {
    let mut counts = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    counts
}

fn entropy<K>(counts: &HashMap<K, usize>, n: f64) -> f64 {
    counts
        .values()
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum()
}
