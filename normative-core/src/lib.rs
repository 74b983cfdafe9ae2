//! # normative-core: normative discrimination audit
//!
//! Audits a tabular dataset for three classes of discrimination signal:
//!
//! - **Explicit**: protected columns used directly (`checks::explicit`)
//! - **Implicit**: input columns, alone or combined, that act as proxies for a
//!   protected column, scored with normalized mutual information (`checks::implicit`)
//! - **Indirect**: disproportionate outcome rates between subpopulations of a
//!   protected column, gated by a chi-squared test (`checks::indirect`)
//!
//! Reviewed findings are suppressed through an [`ExceptionRegistry`]; every
//! finding serializes to the same shape its exception is written in.

pub mod checks;
pub mod combinations;
pub mod config;
pub mod dataset;
pub mod error;
pub mod exceptions;
pub mod finding;
pub mod orchestrator;
pub mod schema;
pub mod stats;

pub use checks::{Checker, DiscriminationClass};
pub use config::{AuditConfig, Thresholds, load_config};
pub use dataset::Dataset;
pub use error::{AuditError, ConfigError, DatasetError, SchemaError};
pub use exceptions::{ExceptionRegistry, ImplicitException, IndirectException};
pub use finding::{
    AuditReport, ChiSquaredSummary, DisparityRatio, ImplicitFinding, IndirectFinding, ValuePair,
};
pub use orchestrator::{AuditRun, Auditor, run};
pub use schema::ColumnRoles;
