//! Exception registry: previously reviewed findings accepted as non-discriminatory.
//!
//! Matching is exact structural equality. There is no fuzzy matching: an
//! exception only suppresses a finding of identical shape.

use crate::finding::{ImplicitFinding, IndirectFinding, ValuePair};
use serde::{Deserialize, Serialize};

/// An accepted (proxy columns, protected column) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImplicitException {
    #[serde(rename = "I")]
    pub inputs: Vec<String>,
    #[serde(rename = "P")]
    pub protected: String,
}

impl ImplicitException {
    pub fn new(
        inputs: impl IntoIterator<Item = impl Into<String>>,
        protected: impl Into<String>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            protected: protected.into(),
        }
    }

    /// Ordered comparison of `I`: `[a, b]` does not cover `[b, a]`.
    pub fn covers(&self, inputs: &[String], protected: &str) -> bool {
        self.inputs.as_slice() == inputs && self.protected == protected
    }
}

impl From<&ImplicitFinding> for ImplicitException {
    fn from(finding: &ImplicitFinding) -> Self {
        Self {
            inputs: finding.inputs.clone(),
            protected: finding.protected.clone(),
        }
    }
}

/// An accepted subpopulation/outcome comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndirectException {
    #[serde(rename = "P")]
    pub protected: String,
    #[serde(rename = "Pv")]
    pub values: ValuePair,
    #[serde(rename = "O")]
    pub outcome: String,
    #[serde(rename = "Ov")]
    pub outcome_value: String,
}

impl IndirectException {
    pub fn new(
        protected: impl Into<String>,
        values: ValuePair,
        outcome: impl Into<String>,
        outcome_value: impl Into<String>,
    ) -> Self {
        Self {
            protected: protected.into(),
            values,
            outcome: outcome.into(),
            outcome_value: outcome_value.into(),
        }
    }

    /// `Pv` is compared as an unordered pair; every field is trimmed first.
    pub fn covers(
        &self,
        protected: &str,
        values: &ValuePair,
        outcome: &str,
        outcome_value: &str,
    ) -> bool {
        self.protected.trim() == protected.trim()
            && self.values.same_members(values)
            && self.outcome.trim() == outcome.trim()
            && self.outcome_value.trim() == outcome_value.trim()
    }
}

impl From<&IndirectFinding> for IndirectException {
    fn from(finding: &IndirectFinding) -> Self {
        Self {
            protected: finding.protected.clone(),
            values: finding.values.clone(),
            outcome: finding.outcome.clone(),
            outcome_value: finding.outcome_value.clone(),
        }
    }
}

/// The three exception lists, one per discrimination class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionRegistry {
    #[serde(rename = "Explicit", alias = "explicit", default)]
    pub explicit: Vec<String>,
    #[serde(rename = "Implicit", alias = "implicit", default)]
    pub implicit: Vec<ImplicitException>,
    #[serde(rename = "Indirect", alias = "indirect", default)]
    pub indirect: Vec<IndirectException>,
}

impl ExceptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_explicit(mut self, column: impl Into<String>) -> Self {
        self.explicit.push(column.into());
        self
    }

    pub fn with_implicit(mut self, exception: ImplicitException) -> Self {
        self.implicit.push(exception);
        self
    }

    pub fn with_indirect(mut self, exception: IndirectException) -> Self {
        self.indirect.push(exception);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty() && self.implicit.is_empty() && self.indirect.is_empty()
    }
}
