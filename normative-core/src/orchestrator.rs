//! Audit orchestration: validate inputs, run each checker, merge the report.

use crate::checks::{
    AuditContext, Checker, DiscriminationClass, ExplicitChecker, ImplicitChecker, IndirectChecker,
};
use crate::config::{AuditConfig, Thresholds};
use crate::dataset::Dataset;
use crate::error::AuditError;
use crate::exceptions::ExceptionRegistry;
use crate::finding::AuditReport;
use crate::schema::ColumnRoles;
use serde::Serialize;

/// Result from a single checker execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckerExecution {
    pub checker: &'static str,
    pub class: DiscriminationClass,
    pub findings_count: usize,
    pub duration_ms: u64,
}

/// A merged report plus per-checker timing.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRun {
    pub report: AuditReport,
    pub executions: Vec<CheckerExecution>,
    pub duration_ms: u64,
}

/// Runs an ordered list of checkers over one dataset.
pub struct Auditor {
    checkers: Vec<Box<dyn Checker>>,
}

impl Auditor {
    /// An auditor with no checkers.
    pub fn new() -> Self {
        Self {
            checkers: Vec::new(),
        }
    }

    /// Explicit, implicit and indirect checkers, in that order.
    pub fn standard() -> Self {
        Self::new()
            .with_checker(ExplicitChecker)
            .with_checker(ImplicitChecker)
            .with_checker(IndirectChecker)
    }

    pub fn with_checker(mut self, checker: impl Checker + 'static) -> Self {
        self.checkers.push(Box::new(checker));
        self
    }

    /// Names of the registered checkers, in run order.
    pub fn checker_names(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|c| c.name()).collect()
    }

    /// Validate the schema and thresholds, then run every checker.
    ///
    /// The first error aborts the run; no partial report is returned.
    pub fn run(
        &self,
        dataset: &Dataset,
        roles: &ColumnRoles,
        exceptions: &ExceptionRegistry,
        thresholds: &Thresholds,
    ) -> Result<AuditRun, AuditError> {
        let start = std::time::Instant::now();
        roles.validate(dataset)?;
        thresholds.validate()?;

        tracing::info!(
            rows = dataset.row_count(),
            inputs = roles.inputs.len(),
            protected = roles.protected.len(),
            outcome = %roles.outcome,
            "Starting discrimination audit"
        );

        let context = AuditContext {
            dataset,
            roles,
            exceptions,
            thresholds,
        };
        let mut report = AuditReport::default();
        let mut executions = Vec::with_capacity(self.checkers.len());

        for checker in &self.checkers {
            let checker_start = std::time::Instant::now();
            let outcome = checker.check(&context).map_err(|e| {
                tracing::warn!(checker = checker.name(), error = %e, "Checker failed");
                e
            })?;
            let execution = CheckerExecution {
                checker: checker.name(),
                class: checker.class(),
                findings_count: outcome.len(),
                duration_ms: checker_start.elapsed().as_millis() as u64,
            };
            tracing::info!(
                checker = execution.checker,
                findings = execution.findings_count,
                duration_ms = execution.duration_ms,
                "Checker complete"
            );
            outcome.merge_into(&mut report);
            executions.push(execution);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            findings = report.total_findings(),
            duration_ms,
            "Audit complete"
        );

        Ok(AuditRun {
            report,
            executions,
            duration_ms,
        })
    }

    /// Run against a loaded configuration document.
    pub fn run_config(&self, dataset: &Dataset, config: &AuditConfig) -> Result<AuditRun, AuditError> {
        self.run(dataset, &config.columns, &config.exceptions, &config.thresholds)
    }
}

impl Default for Auditor {
    fn default() -> Self {
        Self::standard()
    }
}

/// Run the standard audit and return the merged report.
pub fn run(
    dataset: &Dataset,
    roles: &ColumnRoles,
    exceptions: &ExceptionRegistry,
    thresholds: &Thresholds,
) -> Result<AuditReport, AuditError> {
    Auditor::standard()
        .run(dataset, roles, exceptions, thresholds)
        .map(|run| run.report)
}
