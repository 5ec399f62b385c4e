//! Data-driven regex rule engine.
//!
//! Rules load from an external JSON file (`{"rules": [...]}`); a missing or
//! malformed file degrades to the built-in table, and an individually invalid
//! pattern is dropped rather than failing the set. The scan operates on raw
//! source files, not the IR, since it predates IR construction in the
//! pipeline.

use crate::core::Finding;
use crate::parser::is_source_file;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

const SNIPPET_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    pub pattern: String,
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub remediation: String,
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<Rule>,
}

pub struct RuleSet {
    compiled: Vec<(Rule, Regex)>,
}

impl RuleSet {
    /// The fixed fallback table used whenever no external file is usable.
    pub fn builtin() -> Self {
        Self::compile(vec![
            Rule {
                rule_id: "SC-001".to_string(),
                pattern: r"tx\.origin".to_string(),
                severity: "HIGH".to_string(),
                description: "tx.origin used for auth".to_string(),
                remediation: "Use msg.sender for authentication instead of tx.origin.".to_string(),
            },
            Rule {
                rule_id: "SC-002".to_string(),
                pattern: r"delegatecall\s*\(".to_string(),
                severity: "HIGH".to_string(),
                description: "delegatecall usage".to_string(),
                remediation: "Avoid delegatecall or strictly validate target and context."
                    .to_string(),
            },
            Rule {
                rule_id: "SC-003".to_string(),
                pattern: r"(selfdestruct|suicide)\s*\(".to_string(),
                severity: "MEDIUM".to_string(),
                description: "selfdestruct present".to_string(),
                remediation: "Remove selfdestruct or gate it with strict owner-only logic."
                    .to_string(),
            },
            Rule {
                rule_id: "SC-004".to_string(),
                // `\s*\{` after `.call` already excludes `.callcode`.
                pattern: r"\.call\s*\{|call\.value\s*\(".to_string(),
                severity: "HIGH".to_string(),
                description: "low-level call/value pattern".to_string(),
                remediation: "Use checks-effects-interactions and reentrancy guards.".to_string(),
            },
        ])
    }

    /// Load rules from a JSON file, degrading to the built-in set on any failure.
    pub fn load(path: &Path) -> Self {
        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| Ok(serde_json::from_str::<RuleFile>(&text)?));
        match parsed {
            Ok(file) if !file.rules.is_empty() => Self::compile(file.rules),
            Ok(_) => {
                warn!("rule file {} contains no rules, using builtins", path.display());
                Self::builtin()
            }
            Err(e) => {
                warn!("failed to load rule file {}: {}, using builtins", path.display(), e);
                Self::builtin()
            }
        }
    }

    fn compile(rules: Vec<Rule>) -> Self {
        let compiled = rules
            .into_iter()
            .filter_map(|rule| match Regex::new(&rule.pattern) {
                Ok(re) => Some((rule, re)),
                Err(e) => {
                    warn!("dropping rule {} with invalid pattern: {}", rule.rule_id, e);
                    None
                }
            })
            .collect();
        Self { compiled }
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.compiled.iter().map(|(rule, _)| rule)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// Apply every rule line-by-line over each source file beneath `root`.
    ///
    /// Unreadable files are skipped; locations are `relative/path:line`.
    pub fn scan_tree(&self, root: &Path) -> Vec<Finding> {
        let mut findings = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    debug!("skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_source_file(entry.path()) {
                continue;
            }
            let text = match fs::read(entry.path()) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    debug!("skipping unreadable file {}: {}", entry.path().display(), e);
                    continue;
                }
            };
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();

            for (lineno, line) in text.lines().enumerate() {
                for (rule, re) in &self.compiled {
                    if re.is_match(line) {
                        findings.push(Finding::new(
                            rule.rule_id.clone(),
                            rule.severity.clone(),
                            format!("{}:{}", rel, lineno + 1),
                            truncate_chars(line.trim(), SNIPPET_MAX_CHARS),
                            rule.remediation.clone(),
                        ));
                    }
                }
            }
        }

        findings
    }
}

pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        dir
    }

    #[test]
    fn builtin_rules_flag_the_classic_patterns() {
        let dir = write_tree(&[(
            "Auth.sol",
            "contract Auth {\n\
             function check() public { require(tx.origin == owner); }\n\
             function fwd(address t) public { t.delegatecall(data); }\n\
             function boom() public { selfdestruct(payable(owner)); }\n\
             }\n",
        )]);

        let findings = RuleSet::builtin().scan_tree(dir.path());
        let ids: Vec<_> = findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert!(ids.contains(&"SC-001"));
        assert!(ids.contains(&"SC-002"));
        assert!(ids.contains(&"SC-003"));
    }

    #[test]
    fn locations_are_relative_with_line_numbers() {
        let dir = write_tree(&[("sub/Auth.sol", "line one\ntx.origin\n")]);
        let findings = RuleSet::builtin().scan_tree(dir.path());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, "sub/Auth.sol:2");
    }

    #[test]
    fn call_value_rule_does_not_match_callcode() {
        let dir = write_tree(&[(
            "C.sol",
            "a.callcode{gas: 1}();\nb.call{value: amount}(\"\");\n",
        )]);
        let findings = RuleSet::builtin().scan_tree(dir.path());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "SC-004");
        assert_eq!(findings[0].location, "C.sol:2");
    }

    #[test]
    fn malformed_rule_file_falls_back_to_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(&path, "{ not json").unwrap();
        let set = RuleSet::load(&path);
        assert_eq!(set.len(), RuleSet::builtin().len());
    }

    #[test]
    fn external_rule_file_replaces_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(
            &path,
            r#"{"rules": [{"rule_id": "X-1", "pattern": "unchecked", "severity": "LOW"}]}"#,
        )
        .unwrap();
        let set = RuleSet::load(&path);
        assert_eq!(set.len(), 1);
        assert_eq!(set.rules().next().unwrap().rule_id, "X-1");
    }

    #[test]
    fn invalid_patterns_are_dropped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        fs::write(
            &path,
            r#"{"rules": [
                {"rule_id": "BAD", "pattern": "([", "severity": "LOW"},
                {"rule_id": "OK", "pattern": "x", "severity": "LOW"}
            ]}"#,
        )
        .unwrap();
        let set = RuleSet::load(&path);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn snippets_are_truncated() {
        let long = format!("tx.origin {}", "a".repeat(400));
        let dir = write_tree(&[("L.sol", &long)]);
        let findings = RuleSet::builtin().scan_tree(dir.path());
        assert_eq!(findings[0].snippet.chars().count(), 200);
    }
}
