//! Column-role schema: the declared partition of dataset columns into inputs,
//! protected attributes, protected-not-used attributes and the outcome.

use crate::dataset::Dataset;
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Role assignment for dataset columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    /// Input (non-protected) columns.
    #[serde(rename = "I", default)]
    pub inputs: Vec<String>,
    /// Protected columns.
    #[serde(rename = "P", default)]
    pub protected: Vec<String>,
    /// Protected columns not used by the audited system. Informational only.
    #[serde(rename = "PNU", default)]
    pub protected_not_used: Vec<String>,
    /// Outcome column.
    #[serde(rename = "O", default)]
    pub outcome: String,
}

impl ColumnRoles {
    pub fn new(
        inputs: impl IntoIterator<Item = impl Into<String>>,
        protected: impl IntoIterator<Item = impl Into<String>>,
        outcome: impl Into<String>,
    ) -> Self {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            protected: protected.into_iter().map(Into::into).collect(),
            protected_not_used: Vec::new(),
            outcome: outcome.into(),
        }
    }

    pub fn with_protected_not_used(
        mut self,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.protected_not_used = columns.into_iter().map(Into::into).collect();
        self
    }

    /// `I ++ P ++ [O]`, in declaration order.
    pub fn required_columns(&self) -> Vec<&str> {
        self.inputs
            .iter()
            .chain(self.protected.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.outcome.as_str()))
            .collect()
    }

    /// Validate the roles against the dataset header.
    ///
    /// Checks run in a fixed order and the first failure is returned: duplicate
    /// inputs, duplicate protected columns, cross-role collisions, then missing
    /// columns.
    pub fn validate(&self, dataset: &Dataset) -> Result<(), SchemaError> {
        let dup_inputs = duplicates(&self.inputs);
        if !dup_inputs.is_empty() {
            return Err(SchemaError::DuplicateInputs(dup_inputs));
        }
        let dup_protected = duplicates(&self.protected);
        if !dup_protected.is_empty() {
            return Err(SchemaError::DuplicateProtected(dup_protected));
        }
        if self.outcome.trim().is_empty() {
            return Err(SchemaError::MissingOutcome);
        }

        let required = self.required_columns();
        let collisions = duplicates(&required);
        if !collisions.is_empty() {
            return Err(SchemaError::RoleCollision(collisions));
        }

        let missing: Vec<String> = required
            .iter()
            .filter(|c| !dataset.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        Ok(())
    }
}

/// Names occurring more than once, sorted and deduplicated.
fn duplicates<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dups = BTreeSet::new();
    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            dups.insert(name.to_string());
        }
    }
    dups.into_iter().collect()
}
