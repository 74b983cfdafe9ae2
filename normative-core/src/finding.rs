//! Finding schema: the result document produced by an audit run.
//!
//! Field names follow the published result contract (`Ve`, `Vi`, `Vd`, ...)
//! so downstream reporting can consume the JSON unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Two values of the same column, in comparison order.
///
/// Derived equality is ordered; exception matching uses [`ValuePair::same_members`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValuePair(pub String, pub String);

impl ValuePair {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self(first.into(), second.into())
    }

    /// Unordered comparison on trimmed members.
    pub fn same_members(&self, other: &ValuePair) -> bool {
        let (a, b) = (self.0.trim(), self.1.trim());
        let (c, d) = (other.0.trim(), other.1.trim());
        (a == c && b == d) || (a == d && b == c)
    }
}

/// An implicit (proxy) discrimination finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImplicitFinding {
    /// Input columns forming the proxy, in generation order.
    #[serde(rename = "I")]
    pub inputs: Vec<String>,
    /// Protected column the proxy determines.
    #[serde(rename = "P")]
    pub protected: String,
    /// Normalized mutual information, rounded to 4 decimals.
    pub corr: f64,
}

/// Outcome of the chi-squared independence test backing an indirect finding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquaredSummary {
    pub pvalue: f64,
    pub chi2: f64,
    pub degrees_of_freedom: usize,
}

/// Ratio between two outcome rates. May be infinite when the compared rate is zero.
///
/// Serialized as a number, or as the string `"inf"` since JSON has no infinity.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DisparityRatio(f64);

impl DisparityRatio {
    pub const INFINITE: DisparityRatio = DisparityRatio(f64::INFINITY);

    /// `numerator / denominator`, rounded to 4 decimals; infinite if `denominator` is zero.
    pub fn between(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::INFINITE
        } else {
            Self(round4(numerator / denominator))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_infinite(self) -> bool {
        self.0.is_infinite()
    }
}

impl fmt::Display for DisparityRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            f.write_str("inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl Serialize for DisparityRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_infinite() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for DisparityRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(Self(n)),
            Repr::Text(s) if matches!(s.as_str(), "inf" | "Infinity" | "∞") => Ok(Self::INFINITE),
            Repr::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid disparity ratio '{s}'"
            ))),
        }
    }
}

/// An indirect (disparate impact) discrimination finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndirectFinding {
    /// Protected column defining the subpopulations.
    #[serde(rename = "P")]
    pub protected: String,
    /// The favoured and disfavoured subpopulation values, in that order.
    #[serde(rename = "Pv")]
    pub values: ValuePair,
    /// Outcome column.
    #[serde(rename = "O")]
    pub outcome: String,
    /// Outcome value compared.
    #[serde(rename = "Ov")]
    pub outcome_value: String,
    pub ratio: DisparityRatio,
    pub chi2: ChiSquaredSummary,
}

/// Aggregated result of one audit run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Explicit violations: protected columns without an exception.
    #[serde(rename = "Ve", default)]
    pub explicit: Vec<String>,
    /// Implicit (proxy) violations.
    #[serde(rename = "Vi", default)]
    pub implicit: Vec<ImplicitFinding>,
    /// Indirect (disparate impact) violations.
    #[serde(rename = "Vd", default)]
    pub indirect: Vec<IndirectFinding>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.explicit.is_empty() && self.implicit.is_empty() && self.indirect.is_empty()
    }

    pub fn total_findings(&self) -> usize {
        self.explicit.len() + self.implicit.len() + self.indirect.len()
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_pair_unordered_match() {
        let a = ValuePair::new("M", "F");
        assert!(a.same_members(&ValuePair::new("F", "M")));
        assert!(a.same_members(&ValuePair::new(" M", "F ")));
        assert!(!a.same_members(&ValuePair::new("M", "X")));
        assert_ne!(a, ValuePair::new("F", "M"));
    }

    #[test]
    fn test_disparity_ratio_rounding_and_infinity() {
        assert_eq!(DisparityRatio::between(0.8, 0.3).value(), 2.6667);
        assert!(DisparityRatio::between(0.5, 0.0).is_infinite());
        assert_eq!(DisparityRatio::INFINITE.to_string(), "inf");
    }

    #[test]
    fn test_disparity_ratio_json() {
        let json = serde_json::to_string(&DisparityRatio::INFINITE).unwrap();
        assert_eq!(json, "\"inf\"");
        let back: DisparityRatio = serde_json::from_str(&json).unwrap();
        assert!(back.is_infinite());
        let finite: DisparityRatio = serde_json::from_str("1.25").unwrap();
        assert_eq!(finite.value(), 1.25);
        assert!(serde_json::from_str::<DisparityRatio>("\"lots\"").is_err());
    }

    #[test]
    fn test_report_uses_contract_keys() {
        let report = AuditReport {
            explicit: vec!["race".into()],
            implicit: vec![ImplicitFinding {
                inputs: vec!["age".into()],
                protected: "income_bracket".into(),
                corr: 1.0,
            }],
            indirect: vec![IndirectFinding {
                protected: "gender".into(),
                values: ValuePair::new("M", "F"),
                outcome: "approved".into(),
                outcome_value: "yes".into(),
                ratio: DisparityRatio::between(0.8, 0.3),
                chi2: ChiSquaredSummary {
                    pvalue: 0.004,
                    chi2: 8.18,
                    degrees_of_freedom: 1,
                },
            }],
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["Ve"][0], "race");
        assert_eq!(value["Vi"][0]["I"][0], "age");
        assert_eq!(value["Vd"][0]["Pv"][1], "F");
        assert_eq!(value["Vd"][0]["Ov"], "yes");
        assert_eq!(value["Vd"][0]["chi2"]["degrees_of_freedom"], 1);
        assert_eq!(report.total_findings(), 3);
        assert!(!report.is_clean());
    }
}
