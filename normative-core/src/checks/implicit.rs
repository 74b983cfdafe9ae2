//! Implicit discrimination: input columns, alone or combined, acting as
//! proxies for a protected column.
//!
//! Every raw input column and every combination of 2..=ceiling input columns
//! is scored against each protected column with normalized mutual
//! information. Combined columns are built in a private feature matrix; the
//! dataset itself is never touched.

use super::{AuditContext, CheckOutcome, Checker, DiscriminationClass};
use crate::combinations::{Combinations, multi_column_count, resolve_ceiling};
use crate::dataset::Dataset;
use crate::error::{AuditError, DatasetError};
use crate::exceptions::ImplicitException;
use crate::finding::{ImplicitFinding, round4};
use crate::stats::{encode_labels, joint_labels, normalized_mutual_info};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fmt::Write as _;

/// Separator used when naming a combined column (`age+education`).
pub const COMBO_SEPARATOR: &str = "+";

/// Candidates scored per parallel batch.
const BATCH_SIZE: usize = 256;

/// Above this many input columns the proxy search space gets expensive.
pub const LARGE_INPUT_ADVISORY: usize = 5;

/// Proxy scores: one row per candidate column, one column per protected column.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    candidates: Vec<Vec<String>>,
    protected: Vec<String>,
    scores: Vec<f64>,
}

impl CorrelationMatrix {
    /// Candidate columns, each as its constituent input columns, in generation order.
    pub fn candidates(&self) -> &[Vec<String>] {
        &self.candidates
    }

    pub fn protected(&self) -> &[String] {
        &self.protected
    }

    /// Score at `row` (candidate) and `col` (protected column).
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.scores[row * self.protected.len() + col]
    }

    /// Score for a candidate (by constituents) against a protected column.
    pub fn score(&self, inputs: &[&str], protected: &str) -> Option<f64> {
        let row = self
            .candidates
            .iter()
            .position(|c| c.iter().map(String::as_str).eq(inputs.iter().copied()))?;
        let col = self.protected.iter().position(|p| p == protected)?;
        Some(self.get(row, col))
    }

    /// `(candidate, protected, score)` for every score strictly above `threshold`,
    /// row by row.
    pub fn above(&self, threshold: f64) -> impl Iterator<Item = (&[String], &str, f64)> + '_ {
        self.candidates.iter().enumerate().flat_map(move |(row, candidate)| {
            self.protected
                .iter()
                .enumerate()
                .map(move |(col, p)| (candidate.as_slice(), p.as_str(), self.get(row, col)))
                .filter(move |&(_, _, score)| score > threshold)
        })
    }

    /// Plain-text table for debug logging.
    pub fn render(&self) -> String {
        let names: Vec<String> = self
            .candidates
            .iter()
            .map(|c| c.join(COMBO_SEPARATOR))
            .collect();
        let width = names.iter().map(String::len).max().unwrap_or(0);
        let mut out = format!("{:width$}", "");
        for p in &self.protected {
            let _ = write!(out, " {p:>12}");
        }
        for (row, name) in names.iter().enumerate() {
            let _ = write!(out, "\n{name:width$}");
            for col in 0..self.protected.len() {
                let _ = write!(out, " {:>12.4}", self.get(row, col));
            }
        }
        out
    }
}

/// Label-encoded working copy of the columns the proxy search reads.
struct FeatureMatrix<'a> {
    input_names: &'a [String],
    inputs: Vec<Vec<u32>>,
    protected_names: &'a [String],
    protected: Vec<Vec<u32>>,
}

impl<'a> FeatureMatrix<'a> {
    fn new(
        dataset: &Dataset,
        input_names: &'a [String],
        protected_names: &'a [String],
    ) -> Result<Self, DatasetError> {
        let encode = |names: &[String]| {
            names
                .iter()
                .map(|n| Ok(encode_labels(dataset.column(n)?.iter().map(String::as_str))))
                .collect::<Result<Vec<_>, DatasetError>>()
        };
        Ok(Self {
            inputs: encode(input_names)?,
            protected: encode(protected_names)?,
            input_names,
            protected_names,
        })
    }

    /// Labels of a (possibly combined) candidate column.
    fn candidate_labels(&self, members: &[usize]) -> Cow<'_, [u32]> {
        match members {
            [single] => Cow::Borrowed(self.inputs[*single].as_slice()),
            [first, rest @ ..] => Cow::Owned(
                rest.iter()
                    .fold(self.inputs[*first].clone(), |acc, &m| joint_labels(&acc, &self.inputs[m])),
            ),
            [] => Cow::Owned(Vec::new()),
        }
    }

    fn score_row(&self, members: &[usize]) -> Vec<f64> {
        let labels = self.candidate_labels(members);
        self.protected_names
            .iter()
            .zip(&self.protected)
            .map(|(p_name, p_labels)| match members {
                // A raw column never counts as a proxy for itself
                [single] if self.input_names[*single] == *p_name => 0.0,
                _ => normalized_mutual_info(&labels, p_labels),
            })
            .collect()
    }
}

/// Score every candidate column against every protected column.
///
/// Candidates are the raw input columns followed by all combinations of size
/// `2..=ceiling`, where the ceiling is `max_combo_size` clamped to `|inputs|`
/// (all sizes when `None`).
pub fn correlation_matrix(
    dataset: &Dataset,
    inputs: &[String],
    protected: &[String],
    max_combo_size: Option<usize>,
) -> Result<CorrelationMatrix, DatasetError> {
    let n = inputs.len();
    let ceiling = resolve_ceiling(max_combo_size, n);
    if n > LARGE_INPUT_ADVISORY {
        tracing::warn!(
            inputs = n,
            ceiling,
            combinations = multi_column_count(n, ceiling),
            "Large proxy search space; consider a small implicit_max_combo_size (3 or less)"
        );
    }

    let features = FeatureMatrix::new(dataset, inputs, protected)?;
    let mut candidates = (0..n).map(|i| vec![i]).chain(Combinations::multi_column(n, ceiling));

    let mut matrix = CorrelationMatrix {
        candidates: Vec::new(),
        protected: protected.to_vec(),
        scores: Vec::new(),
    };

    loop {
        let batch: Vec<Vec<usize>> = candidates.by_ref().take(BATCH_SIZE).collect();
        if batch.is_empty() {
            break;
        }
        let rows: Vec<Vec<f64>> = batch.par_iter().map(|m| features.score_row(m)).collect();
        for (members, row) in batch.iter().zip(rows) {
            matrix
                .candidates
                .push(members.iter().map(|&m| inputs[m].clone()).collect());
            matrix.scores.extend(row);
        }
    }

    Ok(matrix)
}

/// Proxy findings above `threshold` that no exception covers.
pub fn check(
    dataset: &Dataset,
    inputs: &[String],
    protected: &[String],
    exceptions: &[ImplicitException],
    threshold: f64,
    max_combo_size: Option<usize>,
) -> Result<Vec<ImplicitFinding>, DatasetError> {
    let matrix = correlation_matrix(dataset, inputs, protected, max_combo_size)?;
    tracing::debug!(
        threshold,
        "Mutual information between input and protected columns:\n{}",
        matrix.render()
    );

    let findings = matrix
        .above(threshold)
        .filter(|(candidate, p, _)| !exceptions.iter().any(|ex| ex.covers(candidate, p)))
        .map(|(candidate, p, score)| ImplicitFinding {
            inputs: candidate.to_vec(),
            protected: p.to_string(),
            corr: round4(score),
        })
        .collect();
    Ok(findings)
}

pub struct ImplicitChecker;

impl Checker for ImplicitChecker {
    fn name(&self) -> &'static str {
        "implicit"
    }

    fn class(&self) -> DiscriminationClass {
        DiscriminationClass::Implicit
    }

    fn check(&self, context: &AuditContext<'_>) -> Result<CheckOutcome, AuditError> {
        let findings = check(
            context.dataset,
            &context.roles.inputs,
            &context.roles.protected,
            &context.exceptions.implicit,
            context.thresholds.implicit_min_corr,
            context.thresholds.implicit_max_combo_size,
        )?;
        Ok(CheckOutcome::Implicit(findings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// `x` and `y` are each independent of `p`, but together determine it (XOR).
    fn xor_dataset() -> Dataset {
        Dataset::from_columns(vec![
            ("x", vec!["0", "0", "1", "1", "0", "0", "1", "1"]),
            ("y", vec!["0", "1", "0", "1", "0", "1", "0", "1"]),
            ("z", vec!["a", "a", "a", "a", "b", "b", "b", "b"]),
            ("p", vec!["n", "y", "y", "n", "n", "y", "y", "n"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_single_input_perfect_proxy() {
        let ds = Dataset::from_columns(vec![
            ("age", vec!["young", "young", "old", "old", "mid"]),
            ("income_bracket", vec!["low", "low", "high", "high", "mid"]),
        ])
        .unwrap();
        let findings = check(&ds, &strings(&["age"]), &strings(&["income_bracket"]), &[], 0.6, None)
            .unwrap();
        assert_eq!(
            findings,
            vec![ImplicitFinding {
                inputs: strings(&["age"]),
                protected: "income_bracket".into(),
                corr: 1.0,
            }]
        );
    }

    #[test]
    fn test_combination_reveals_hidden_proxy() {
        let ds = xor_dataset();
        let inputs = strings(&["x", "y", "z"]);
        let p = strings(&["p"]);

        let raw_only = check(&ds, &inputs, &p, &[], 0.6, Some(1)).unwrap();
        assert!(raw_only.is_empty());

        // H(p) / mean(H(x+y), H(p)) = ln2 / 1.5 ln2
        let findings = check(&ds, &inputs, &p, &[], 0.6, Some(2)).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].inputs, strings(&["x", "y"]));
        assert_eq!(findings[0].corr, 0.6667);

        // x+y+z only reaches 0.5
        let all_sizes = check(&ds, &inputs, &p, &[], 0.6, None).unwrap();
        assert_eq!(all_sizes, findings);
    }

    #[test]
    fn test_matrix_shape_follows_ceiling() {
        let ds = xor_dataset();
        let inputs = strings(&["x", "y", "z"]);
        let p = strings(&["p"]);
        assert_eq!(correlation_matrix(&ds, &inputs, &p, Some(0)).unwrap().candidates().len(), 3);
        assert_eq!(correlation_matrix(&ds, &inputs, &p, Some(2)).unwrap().candidates().len(), 6);
        assert_eq!(correlation_matrix(&ds, &inputs, &p, None).unwrap().candidates().len(), 7);
        assert_eq!(correlation_matrix(&ds, &inputs, &p, Some(10)).unwrap().candidates().len(), 7);
    }

    #[test]
    fn test_scores_are_bounded() {
        let ds = xor_dataset();
        let matrix =
            correlation_matrix(&ds, &strings(&["x", "y", "z"]), &strings(&["p", "z"]), None).unwrap();
        for row in 0..matrix.candidates().len() {
            for col in 0..matrix.protected().len() {
                let s = matrix.get(row, col);
                assert!((0.0..=1.0).contains(&s), "score {s} out of range");
            }
        }
    }

    #[test]
    fn test_self_pair_scores_zero() {
        let ds = xor_dataset();
        let matrix = correlation_matrix(&ds, &strings(&["z"]), &strings(&["z"]), None).unwrap();
        assert_eq!(matrix.score(&["z"], "z"), Some(0.0));
    }

    #[test]
    fn test_combined_candidate_named_like_protected_is_scored() {
        // `a+b` is a real column fully determined by the (a, b) pair
        let ds = Dataset::from_columns(vec![
            ("a", vec!["0", "0", "1", "1"]),
            ("b", vec!["0", "1", "0", "1"]),
            ("a+b", vec!["w", "x", "y", "z"]),
        ])
        .unwrap();
        let inputs = strings(&["a", "b"]);
        let p = strings(&["a+b"]);

        let matrix = correlation_matrix(&ds, &inputs, &p, None).unwrap();
        let score = matrix.score(&["a", "b"], "a+b").unwrap();
        assert!((score - 1.0).abs() < 1e-9, "combined score {score}");

        let findings = check(&ds, &inputs, &p, &[], 0.8, None).unwrap();
        assert_eq!(
            findings,
            vec![ImplicitFinding {
                inputs: inputs.clone(),
                protected: "a+b".into(),
                corr: 1.0,
            }]
        );
    }

    #[test]
    #[should_panic]
    fn test_get_out_of_bounds_panics() {
        let ds = xor_dataset();
        let matrix = correlation_matrix(&ds, &strings(&["x"]), &strings(&["p"]), None).unwrap();
        matrix.get(1, 0);
    }

    #[test]
    fn test_exception_is_order_sensitive() {
        let ds = xor_dataset();
        let inputs = strings(&["x", "y"]);
        let p = strings(&["p"]);

        let exact = [ImplicitException::new(["x", "y"], "p")];
        assert!(check(&ds, &inputs, &p, &exact, 0.6, None).unwrap().is_empty());

        let reversed = [ImplicitException::new(["y", "x"], "p")];
        assert_eq!(check(&ds, &inputs, &p, &reversed, 0.6, None).unwrap().len(), 1);
    }

    #[test]
    fn test_threshold_is_strict() {
        let ds = Dataset::from_columns(vec![("a", vec!["1", "2", "1"]), ("b", vec!["x", "y", "x"])])
            .unwrap();
        let findings = check(&ds, &strings(&["a"]), &strings(&["b"]), &[], 1.0, None).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn test_unknown_column() {
        let ds = xor_dataset();
        let err = check(&ds, &strings(&["nope"]), &strings(&["p"]), &[], 0.5, None).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownColumn(c) if c == "nope"));
    }

    #[test]
    fn test_render_contains_combined_names() {
        let ds = xor_dataset();
        let matrix = correlation_matrix(&ds, &strings(&["x", "y"]), &strings(&["p"]), None).unwrap();
        let text = matrix.render();
        assert!(text.contains("x+y"));
        assert!(text.contains("0.6667"));
    }
}
