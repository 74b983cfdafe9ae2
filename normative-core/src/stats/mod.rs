//! Statistical primitives used by the checkers.
//!
//! Both work on discrete label sequences: normalized mutual information for
//! proxy strength and a chi-squared contingency test for disparity significance.

pub mod contingency;
pub mod mutual_info;

pub use contingency::{chi2_contingency, ContingencyTest};
pub use mutual_info::normalized_mutual_info;

use std::collections::HashMap;
use std::hash::Hash;

/// Dense label codes `0..k` for a sequence of values, in first-seen order.
pub fn encode_labels<T: Eq + Hash>(values: impl IntoIterator<Item = T>) -> Vec<u32> {
    let mut codes: HashMap<T, u32> = HashMap::new();
    values
        .into_iter()
        .map(|v| {
            let next = codes.len() as u32;
            *codes.entry(v).or_insert(next)
        })
        .collect()
}

/// Joint labels of two aligned label sequences: rows share a code iff they
/// agree on both inputs.
pub fn joint_labels(left: &[u32], right: &[u32]) -> Vec<u32> {
    encode_labels(left.iter().copied().zip(right.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_labels_first_seen() {
        assert_eq!(encode_labels(["b", "a", "b", "c"]), vec![0, 1, 0, 2]);
        assert!(encode_labels(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_joint_labels_distinguish_pairs() {
        let a = [0, 0, 1, 1];
        let b = [0, 1, 0, 1];
        assert_eq!(joint_labels(&a, &b), vec![0, 1, 2, 3]);
        assert_eq!(joint_labels(&a, &a), vec![0, 0, 1, 1]);
    }
}
