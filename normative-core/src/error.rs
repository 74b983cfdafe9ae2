//! Error types for the audit crate.

use thiserror::Error;

/// Top-level audit error. Any variant aborts the run; no partial report is produced.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("dataset error: {0}")]
    Dataset(#[from] DatasetError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("checker '{checker}' failed: {message}")]
    CheckerFailed { checker: String, message: String },
}

/// Errors raised while validating the column-role schema against a dataset.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("input columns (I) contain duplicates: {}", .0.join(", "))]
    DuplicateInputs(Vec<String>),
    #[error("protected columns (P) contain duplicates: {}", .0.join(", "))]
    DuplicateProtected(Vec<String>),
    #[error("columns appear in more than one role (I, P, O): {}", .0.join(", "))]
    RoleCollision(Vec<String>),
    #[error("outcome column (O) is not set")]
    MissingOutcome,
    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Errors from loading or querying a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("empty dataset: no header row")]
    Empty,
    #[error("duplicate column '{0}' in header")]
    DuplicateColumn(String),
    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unterminated quoted field on line {0}")]
    UnterminatedQuote(usize),
    #[error("column '{0}' not found")]
    UnknownColumn(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from loading or validating the audit configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("unsupported configuration format for '{0}' (expected .toml or .json)")]
    UnsupportedFormat(String),
    #[error("configuration file '{0}' does not exist")]
    NotFound(String),
    #[error("threshold '{name}' must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
}

impl AuditError {
    pub fn checker(checker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckerFailed {
            checker: checker.into(),
            message: message.into(),
        }
    }
}
