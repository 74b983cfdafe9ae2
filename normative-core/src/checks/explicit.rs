//! Explicit discrimination: protected columns used without an exception.

use super::{AuditContext, CheckOutcome, Checker, DiscriminationClass};
use crate::error::AuditError;
use std::collections::HashSet;

/// `P \ E`, in the declaration order of `P`.
pub fn check(protected: &[String], exceptions: &[String]) -> Vec<String> {
    let exempt: HashSet<&str> = exceptions.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    protected
        .iter()
        .filter(|p| !exempt.contains(p.as_str()) && seen.insert(p.as_str()))
        .cloned()
        .collect()
}

pub struct ExplicitChecker;

impl Checker for ExplicitChecker {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn class(&self) -> DiscriminationClass {
        DiscriminationClass::Explicit
    }

    fn check(&self, context: &AuditContext<'_>) -> Result<CheckOutcome, AuditError> {
        Ok(CheckOutcome::Explicit(check(
            &context.roles.protected,
            &context.exceptions.explicit,
        )))
    }
}
