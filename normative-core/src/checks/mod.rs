//! Checker interface and the three discrimination checkers.

pub mod explicit;
pub mod implicit;
pub mod indirect;

pub use explicit::ExplicitChecker;
pub use implicit::{CorrelationMatrix, ImplicitChecker};
pub use indirect::{IndirectChecker, Subpopulations};

use crate::config::Thresholds;
use crate::dataset::Dataset;
use crate::error::AuditError;
use crate::exceptions::ExceptionRegistry;
use crate::finding::{AuditReport, ImplicitFinding, IndirectFinding};
use crate::schema::ColumnRoles;
use serde::{Deserialize, Serialize};

/// The three classes of discrimination signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscriminationClass {
    Explicit,
    Implicit,
    Indirect,
}

impl DiscriminationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscriminationClass::Explicit => "explicit",
            DiscriminationClass::Implicit => "implicit",
            DiscriminationClass::Indirect => "indirect",
        }
    }
}

impl std::fmt::Display for DiscriminationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only inputs shared by every checker during a run.
#[derive(Debug, Clone, Copy)]
pub struct AuditContext<'a> {
    pub dataset: &'a Dataset,
    pub roles: &'a ColumnRoles,
    pub exceptions: &'a ExceptionRegistry,
    pub thresholds: &'a Thresholds,
}

/// Findings produced by one checker.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Explicit(Vec<String>),
    Implicit(Vec<ImplicitFinding>),
    Indirect(Vec<IndirectFinding>),
}

impl CheckOutcome {
    pub fn len(&self) -> usize {
        match self {
            CheckOutcome::Explicit(v) => v.len(),
            CheckOutcome::Implicit(v) => v.len(),
            CheckOutcome::Indirect(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move the findings into their slot of the report.
    pub fn merge_into(self, report: &mut AuditReport) {
        match self {
            CheckOutcome::Explicit(v) => report.explicit.extend(v),
            CheckOutcome::Implicit(v) => report.implicit.extend(v),
            CheckOutcome::Indirect(v) => report.indirect.extend(v),
        }
    }
}

/// A discrimination checker. Checkers are independent of each other and
/// never mutate the dataset.
pub trait Checker: Send + Sync {
    /// Unique name for this checker.
    fn name(&self) -> &'static str;

    /// Class of findings this checker produces.
    fn class(&self) -> DiscriminationClass;

    /// Run the check and return its findings.
    fn check(&self, context: &AuditContext<'_>) -> Result<CheckOutcome, AuditError>;
}
