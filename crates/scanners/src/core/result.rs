use serde::{Deserialize, Serialize};

/// A single reported issue, the common currency of every analyzer.
///
/// `severity` is kept as the raw string the producing analyzer or rule file
/// supplied. Scoring normalizes it case-insensitively, but the raw value is
/// preserved because the ranking tie-break compares it lexicographically and
/// the serialized report must round-trip it untouched.
///
/// Field order matters: the report checksum hashes the compact JSON
/// serialization of the ranked finding list, so the declaration order here is
/// part of the output contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: String,
    /// Free-form location: `file:line`, a qualified function key, or a
    /// logical identifier such as `storage`.
    pub location: String,
    /// Human-readable context: the matched source line or the analyzer's reason.
    pub snippet: String,
    pub remediation: String,
    /// Qualified `Contract.function` key when the finding is function-scoped.
    /// Ranking uses this as the corroboration grouping key.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub func: Option<String>,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        severity: impl Into<String>,
        location: impl Into<String>,
        snippet: impl Into<String>,
        remediation: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            severity: severity.into(),
            location: location.into(),
            snippet: snippet.into(),
            remediation: remediation.into(),
            func: None,
        }
    }

    pub fn with_func(mut self, func: impl Into<String>) -> Self {
        self.func = Some(func.into());
        self
    }

    /// Key used to count corroborating findings: the function key when
    /// present, otherwise the file portion of the location, otherwise a
    /// global bucket.
    pub fn grouping_key(&self) -> String {
        if let Some(func) = &self.func {
            return func.clone();
        }
        if !self.location.is_empty() {
            return self
                .location
                .split(':')
                .next()
                .unwrap_or(&self.location)
                .to_string();
        }
        "global".to_string()
    }
}

/// A finding plus its computed rank score, produced by the ranking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFinding {
    #[serde(flatten)]
    pub finding: Finding,
    /// Confidence/exploitability estimate in [0.0, 1.0], rounded to 3 decimals.
    pub rank_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_key_prefers_func() {
        let f = Finding::new("SC-001", "HIGH", "a.sol:3", "tx.origin", "").with_func("Bank.pay");
        assert_eq!(f.grouping_key(), "Bank.pay");
    }

    #[test]
    fn grouping_key_strips_line_from_location() {
        let f = Finding::new("SC-001", "HIGH", "contracts/a.sol:3", "tx.origin", "");
        assert_eq!(f.grouping_key(), "contracts/a.sol");
    }

    #[test]
    fn grouping_key_defaults_to_global() {
        let f = Finding::new("SC-001", "HIGH", "", "", "");
        assert_eq!(f.grouping_key(), "global");
    }

    #[test]
    fn func_is_omitted_from_serialization_when_absent() {
        let f = Finding::new("SC-001", "HIGH", "a.sol:1", "x", "fix");
        let json = serde_json::to_string(&f).unwrap();
        assert!(!json.contains("\"func\""));
    }
}
