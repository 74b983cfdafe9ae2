//! Audit configuration: column roles, exceptions and thresholds.
//!
//! Uses `figment` for layered loading: built-in defaults -> user config
//! (`~/.config/normative/config.toml`, thresholds shared across audits) ->
//! the audit document (TOML or JSON) -> `NORMATIVE_`-prefixed environment.

use crate::error::ConfigError;
use crate::exceptions::ExceptionRegistry;
use crate::schema::ColumnRoles;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete audit configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Column-role schema.
    #[serde(rename = "config", alias = "CONFIG", default)]
    pub columns: ColumnRoles,
    /// Previously reviewed findings to suppress.
    #[serde(alias = "EXCEPTIONS", default)]
    pub exceptions: ExceptionRegistry,
    /// Detection thresholds.
    #[serde(default)]
    pub thresholds: Thresholds,
}

/// Detection thresholds. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Largest number of input columns combined into one proxy candidate.
    /// `None` (written as `"all"`) explores every size.
    #[serde(default = "default_max_combo_size", with = "combo_size")]
    pub implicit_max_combo_size: Option<usize>,
    /// Normalized mutual information above which a candidate is a proxy (0.0-1.0).
    #[serde(default = "default_min_corr")]
    pub implicit_min_corr: f64,
    /// Allowed disproportion between subpopulation outcome rates (0.0-1.0).
    #[serde(default = "default_indirect_threshold")]
    pub indirect_threshold: f64,
    /// Chi-squared p-value a disparity must stay below to be reported (0.0-1.0).
    #[serde(default = "default_min_pvalue")]
    pub indirect_min_pvalue: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            implicit_max_combo_size: default_max_combo_size(),
            implicit_min_corr: default_min_corr(),
            indirect_threshold: default_indirect_threshold(),
            indirect_min_pvalue: default_min_pvalue(),
        }
    }
}

impl Thresholds {
    /// Every ratio threshold must be a finite value in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("implicit_min_corr", self.implicit_min_corr),
            ("indirect_threshold", self.indirect_threshold),
            ("indirect_min_pvalue", self.indirect_min_pvalue),
        ];
        for (name, value) in checks {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

fn default_max_combo_size() -> Option<usize> {
    Some(3)
}

fn default_min_corr() -> f64 {
    0.6
}

fn default_indirect_threshold() -> f64 {
    0.8
}

fn default_min_pvalue() -> f64 {
    0.05
}

/// `implicit_max_combo_size` accepts a non-negative integer or `"all"`.
mod combo_size {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(n) => serializer.serialize_u64(*n as u64),
            None => serializer.serialize_str("all"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Size(i64),
            Text(String),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Size(n)) if n < 0 => Err(D::Error::custom(format!(
                "implicit_max_combo_size must be non-negative, got {n}"
            ))),
            Some(Repr::Size(n)) => Ok(Some(n as usize)),
            Some(Repr::Text(s)) if s.eq_ignore_ascii_case("all") => Ok(None),
            Some(Repr::Text(s)) => Err(D::Error::custom(format!(
                "implicit_max_combo_size must be an integer or \"all\", got '{s}'"
            ))),
        }
    }
}

/// Load an audit configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (`NORMATIVE_THRESHOLDS__IMPLICIT_MIN_CORR`, ...)
/// 2. The audit document at `path` (`.toml` or `.json`)
/// 3. User config (`~/.config/normative/config.toml`)
/// 4. Built-in defaults
pub fn load_config(path: &Path) -> Result<AuditConfig, ConfigError> {
    let mut figment = defaults();

    if let Some(dirs) = directories::ProjectDirs::from("org", "normative", "normative") {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            tracing::debug!(path = %user_config.display(), "Merging user configuration");
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    figment = merge_document(figment, path)?;
    figment = figment.merge(Env::prefixed("NORMATIVE_").split("__"));

    let config: AuditConfig = figment.extract().map_err(Box::new)?;
    config.thresholds.validate()?;
    Ok(config)
}

/// Load a single audit document without user config or environment layers.
pub fn load_document(path: &Path) -> Result<AuditConfig, ConfigError> {
    let figment = merge_document(defaults(), path)?;
    let config: AuditConfig = figment.extract().map_err(Box::new)?;
    config.thresholds.validate()?;
    Ok(config)
}

/// Seed only the thresholds; sections with aliased keys fall back to serde defaults.
fn defaults() -> Figment {
    Figment::from(Serialized::default("thresholds", Thresholds::default()))
}

fn merge_document(figment: Figment, path: &Path) -> Result<Figment, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        Some("json") => Ok(figment.merge(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Commented starting point for a new audit document.
pub const TEMPLATE: &str = r#"# Normative discrimination audit configuration.
#
# [config]
#   I   : input (non-protected) columns
#   P   : protected columns
#   PNU : protected columns not used by the audited system
#   O   : outcome column
[config]
I = []
P = []
PNU = []
O = ""

# [exceptions]
#   Explicit : protected columns accepted as explicitly used, e.g. ["gender"]
#   Implicit : accepted proxies, e.g. [{ I = ["strength", "age"], P = "gender" }]
#              I is compared as an ordered list
#   Indirect : accepted disparities,
#              e.g. [{ P = "ethnicity", Pv = ["white", "caucasian"], O = "salary", Ov = ">50k" }]
[exceptions]
Explicit = []
Implicit = []
Indirect = []

# [thresholds]
#   implicit_max_combo_size : largest input-column combination tested as a proxy
#                             (with I = a, b, c and 2: a, b, c, a+b, a+c, b+c), or "all"
#   implicit_min_corr       : normalized mutual information above which a proxy is reported
#   indirect_threshold      : disproportion allowed between subpopulation outcome rates
#   indirect_min_pvalue     : disparities with a chi-squared p-value at or above this are ignored
[thresholds]
implicit_max_combo_size = 3
implicit_min_corr = 0.6
indirect_threshold = 0.8
indirect_min_pvalue = 0.05
"#;
