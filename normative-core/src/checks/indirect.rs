//! Indirect discrimination (disparate impact).
//!
//! For each protected column, every pair of its values is compared on every
//! outcome value, in both directions. A comparison is a candidate when
//! `rate(v1, o) * ratio_threshold > rate(v2, o)`; it becomes a finding when the
//! chi-squared test over the pair's outcome distribution gives
//! `p_value < min_pvalue` and no exception covers it.
//!
//! A subpopulation with no rows has no defined rate; such comparisons are
//! skipped and never produce a finding.

use super::{AuditContext, CheckOutcome, Checker, DiscriminationClass};
use crate::dataset::Dataset;
use crate::error::{AuditError, DatasetError};
use crate::exceptions::IndirectException;
use crate::finding::{ChiSquaredSummary, DisparityRatio, IndirectFinding, ValuePair};
use crate::stats::{ContingencyTest, chi2_contingency};
use std::collections::{BTreeMap, BTreeSet};

/// Outcome counts per value of one protected column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subpopulations<'a> {
    counts: BTreeMap<&'a str, BTreeMap<&'a str, u64>>,
    totals: BTreeMap<&'a str, u64>,
}

impl<'a> Subpopulations<'a> {
    /// Tally `(protected value, outcome value)` pairs row by row. Values are trimmed.
    pub fn tally(protected: &'a [String], outcome: &'a [String]) -> Self {
        let mut subpops = Self::default();
        for (p, o) in protected.iter().zip(outcome) {
            let (p, o) = (p.trim(), o.trim());
            *subpops.counts.entry(p).or_default().entry(o).or_insert(0) += 1;
            *subpops.totals.entry(p).or_insert(0) += 1;
        }
        subpops
    }

    /// Observed values of the protected column, sorted.
    pub fn values(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.totals.keys().copied()
    }

    pub fn count(&self, value: &str, outcome: &str) -> u64 {
        self.counts
            .get(value)
            .and_then(|c| c.get(outcome))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self, value: &str) -> u64 {
        self.totals.get(value).copied().unwrap_or(0)
    }

    /// Share of `value` rows with outcome `outcome`; `None` if `value` has no rows.
    pub fn rate(&self, value: &str, outcome: &str) -> Option<f64> {
        match self.total(value) {
            0 => None,
            total => Some(self.count(value, outcome) as f64 / total as f64),
        }
    }

    /// 2 × k table of outcome counts for the two values, over the outcome values
    /// observed in their rows.
    pub fn contingency_table(&self, first: &str, second: &str) -> Vec<Vec<u64>> {
        let outcomes: BTreeSet<&str> = [first, second]
            .iter()
            .filter_map(|v| self.counts.get(*v))
            .flat_map(|c| c.keys().copied())
            .collect();
        [first, second]
            .iter()
            .map(|v| outcomes.iter().map(|o| self.count(v, o)).collect())
            .collect()
    }
}

/// Disparate-impact findings not covered by an exception.
pub fn check(
    dataset: &Dataset,
    protected: &[String],
    outcome: &str,
    exceptions: &[IndirectException],
    ratio_threshold: f64,
    min_pvalue: f64,
) -> Result<Vec<IndirectFinding>, DatasetError> {
    let outcome_column = dataset.column(outcome)?;
    let outcome_values: BTreeSet<&str> = outcome_column.iter().map(|o| o.trim()).collect();
    let outcome_name = outcome.trim();

    let mut findings = Vec::new();
    for p in protected {
        let subpops = Subpopulations::tally(dataset.column(p)?, outcome_column);
        let p_name = p.trim();
        let values: Vec<&str> = subpops.values().collect();

        for (i, &a) in values.iter().enumerate() {
            for &b in &values[i + 1..] {
                let mut significance: Option<Option<ContingencyTest>> = None;

                for (v1, v2) in [(a, b), (b, a)] {
                    for &o in &outcome_values {
                        let (Some(r1), Some(r2)) = (subpops.rate(v1, o), subpops.rate(v2, o)) else {
                            tracing::debug!(protected = p_name, v1, v2, "Skipping empty subpopulation");
                            continue;
                        };
                        if r1 * ratio_threshold <= r2 {
                            continue;
                        }

                        let test = *significance
                            .get_or_insert_with(|| chi2_contingency(&subpops.contingency_table(a, b)));
                        let Some(test) = test else {
                            tracing::debug!(
                                protected = p_name,
                                v1,
                                v2,
                                "Chi-squared test undefined for subpopulations; no finding"
                            );
                            continue;
                        };
                        if test.p_value >= min_pvalue {
                            continue;
                        }

                        let pair = ValuePair::new(v1, v2);
                        if exceptions
                            .iter()
                            .any(|ex| ex.covers(p_name, &pair, outcome_name, o))
                        {
                            continue;
                        }

                        findings.push(IndirectFinding {
                            protected: p_name.to_string(),
                            values: pair,
                            outcome: outcome_name.to_string(),
                            outcome_value: o.to_string(),
                            ratio: DisparityRatio::between(r1, r2),
                            chi2: ChiSquaredSummary {
                                pvalue: test.p_value,
                                chi2: test.statistic,
                                degrees_of_freedom: test.degrees_of_freedom,
                            },
                        });
                    }
                }
            }
        }
    }

    Ok(findings)
}

pub struct IndirectChecker;

impl Checker for IndirectChecker {
    fn name(&self) -> &'static str {
        "indirect"
    }

    fn class(&self) -> DiscriminationClass {
        DiscriminationClass::Indirect
    }

    fn check(&self, context: &AuditContext<'_>) -> Result<CheckOutcome, AuditError> {
        let findings = check(
            context.dataset,
            &context.roles.protected,
            &context.roles.outcome,
            &context.exceptions.indirect,
            context.thresholds.indirect_threshold,
            context.thresholds.indirect_min_pvalue,
        )?;
        Ok(CheckOutcome::Indirect(findings))
    }
}
