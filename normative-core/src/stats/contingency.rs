//! Pearson chi-squared test of independence on a contingency table.
//!
//! Expected frequencies come from the table margins. With one degree of
//! freedom the Yates continuity correction is applied. A table without any
//! degree of freedom yields statistic 0 and p-value 1.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Result of a contingency-table test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContingencyTest {
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: usize,
}

/// Run the test on a rectangular table of observed counts.
///
/// Returns `None` when the test is undefined: an empty or ragged table, or a
/// zero expected frequency (a row or column with no observations).
pub fn chi2_contingency(observed: &[Vec<u64>]) -> Option<ContingencyTest> {
    let rows = observed.len();
    let cols = observed.first().map_or(0, Vec::len);
    if rows == 0 || cols == 0 || observed.iter().any(|r| r.len() != cols) {
        return None;
    }

    let row_totals: Vec<f64> = observed
        .iter()
        .map(|r| r.iter().sum::<u64>() as f64)
        .collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|j| observed.iter().map(|r| r[j]).sum::<u64>() as f64)
        .collect();
    let total: f64 = row_totals.iter().sum();

    if row_totals.iter().chain(col_totals.iter()).any(|&t| t == 0.0) {
        return None;
    }

    let dof = (rows - 1) * (cols - 1);
    if dof == 0 {
        return Some(ContingencyTest {
            statistic: 0.0,
            p_value: 1.0,
            degrees_of_freedom: 0,
        });
    }

    let mut statistic = 0.0;
    for (i, row) in observed.iter().enumerate() {
        for (j, &count) in row.iter().enumerate() {
            let expected = row_totals[i] * col_totals[j] / total;
            let mut obs = count as f64;
            if dof == 1 {
                let diff = expected - obs;
                obs += diff.signum() * diff.abs().min(0.5);
            }
            statistic += (obs - expected).powi(2) / expected;
        }
    }

    if !statistic.is_finite() {
        return None;
    }

    let distribution = ChiSquared::new(dof as f64).ok()?;
    let p_value = distribution.sf(statistic);
    if !p_value.is_finite() {
        return None;
    }

    Some(ContingencyTest {
        statistic,
        p_value,
        degrees_of_freedom: dof,
    })
}
