use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical severity levels understood by the ranking engine.
///
/// Findings carry severity as a free-form string because external rule files
/// and external drivers may emit anything; this enum is the interpretation
/// layer used for scoring and SARIF level mapping. Parsing is case-insensitive
/// and unrecognized strings fall back to medium-equivalent behavior at the
/// call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            _ => None,
        }
    }

    /// Base exploitability score used by the ranking engine.
    pub fn base_score(&self) -> f64 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.5,
            Self::High => 0.9,
        }
    }

    /// SARIF result level for this severity.
    pub fn sarif_level(&self) -> &'static str {
        match self {
            Self::High => "error",
            Self::Medium => "warning",
            Self::Low => "note",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base score for a raw severity string; unrecognized severities score as medium.
pub fn base_score_for(severity: &str) -> f64 {
    Severity::parse(severity).map_or(0.5, |s| s.base_score())
}

/// SARIF level for a raw severity string; unrecognized severities map to "warning".
pub fn sarif_level_for(severity: &str) -> &'static str {
    Severity::parse(severity).map_or("warning", |s| s.sarif_level())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Severity::parse("high"), Some(Severity::High));
        assert_eq!(Severity::parse("Medium"), Some(Severity::Medium));
        assert_eq!(Severity::parse("LOW"), Some(Severity::Low));
        assert_eq!(Severity::parse("critical"), None);
    }

    #[test]
    fn base_scores_are_monotonic() {
        assert!(Severity::High.base_score() >= Severity::Medium.base_score());
        assert!(Severity::Medium.base_score() >= Severity::Low.base_score());
    }

    #[test]
    fn unknown_severity_defaults_to_medium_score() {
        assert_eq!(base_score_for("WHATEVER"), 0.5);
        assert_eq!(sarif_level_for("WHATEVER"), "warning");
    }
}
