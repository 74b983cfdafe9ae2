//! Lazy generation of column combinations for the proxy search.
//!
//! Combinations are index lists into the declared input columns, produced in
//! lexicographic order, size by size. Nothing is materialised up front.

/// Effective combination ceiling: `None` explores every size up to `n`,
/// otherwise the requested size clamped to `n`.
pub fn resolve_ceiling(max_combo_size: Option<usize>, n: usize) -> usize {
    max_combo_size.map_or(n, |m| m.min(n))
}

/// Binomial coefficient `C(n, k)`, saturating on overflow.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    acc as usize
}

/// Number of multi-column combinations (sizes `2..=ceiling`) over `n` columns.
pub fn multi_column_count(n: usize, ceiling: usize) -> usize {
    (2..=ceiling.min(n)).fold(0usize, |acc, k| acc.saturating_add(binomial(n, k)))
}

/// Iterator over all combinations of `0..n` with sizes `min_size..=max_size`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    max_size: usize,
    current: Vec<usize>,
    exhausted: bool,
}

impl Combinations {
    pub fn new(n: usize, min_size: usize, max_size: usize) -> Self {
        let min_size = min_size.max(1);
        let max_size = max_size.min(n);
        let exhausted = min_size > max_size;
        Self {
            n,
            max_size,
            current: (0..min_size).collect(),
            exhausted,
        }
    }

    /// Combinations of two or more columns, up to `ceiling`.
    pub fn multi_column(n: usize, ceiling: usize) -> Self {
        Self::new(n, 2, ceiling)
    }

    fn advance(&mut self) {
        let k = self.current.len();
        // Rightmost position that can still move forward.
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.current[i] < self.n - k + i {
                self.current[i] += 1;
                for j in i + 1..k {
                    self.current[j] = self.current[j - 1] + 1;
                }
                return;
            }
        }
        if k < self.max_size {
            self.current = (0..k + 1).collect();
        } else {
            self.exhausted = true;
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let item = self.current.clone();
        self.advance();
        Some(item)
    }
}
