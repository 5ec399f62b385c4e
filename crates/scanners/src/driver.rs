//! Baseline scan drivers.
//!
//! The pipeline's baseline findings come from a `ScanDriver`: either the
//! built-in regex rule scanner or an external tool normalized into the same
//! finding shape. Fallback selection lives in the pipeline, not here; a
//! driver that fails or finds nothing simply returns an empty list.

use crate::core::Finding;
use crate::rules::{truncate_chars, RuleSet};
use anyhow::Result;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::warn;

const RULE_ID_MAX_CHARS: usize = 32;
const SNIPPET_MAX_CHARS: usize = 200;
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Strategy seam for producing baseline findings from a source tree.
pub trait ScanDriver: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, root: &Path) -> Result<Vec<Finding>>;
}

/// The built-in regex rule scanner.
pub struct BuiltinDriver {
    rules: RuleSet,
}

impl BuiltinDriver {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }
}

impl ScanDriver for BuiltinDriver {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn run(&self, root: &Path) -> Result<Vec<Finding>> {
        Ok(self.rules.scan_tree(root))
    }
}

/// Invokes Slither as a subprocess and normalizes its JSON report.
///
/// Every failure mode here (tool missing, non-zero exit, bad JSON, timeout)
/// degrades to an empty finding list; the pipeline then falls back to the
/// built-in scanner.
pub struct SlitherDriver {
    timeout: Duration,
}

impl SlitherDriver {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ScanDriver for SlitherDriver {
    fn name(&self) -> &'static str {
        "slither"
    }

    fn run(&self, root: &Path) -> Result<Vec<Finding>> {
        let mut child = match Command::new("slither")
            .arg(root)
            .arg("--json")
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!("slither unavailable: {}", e);
                return Ok(Vec::new());
            }
        };

        // Drain stdout on a separate thread so a chatty child cannot block on
        // a full pipe while we poll for exit.
        let mut stdout = match child.stdout.take() {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };
        let reader = std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = stdout.read_to_string(&mut buf);
            buf
        });

        let deadline = Instant::now() + self.timeout;
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!("slither exceeded timeout of {:?}, killing", self.timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return Ok(Vec::new());
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    warn!("failed to poll slither: {}", e);
                    let _ = child.kill();
                    return Ok(Vec::new());
                }
            }
        }

        let output = reader.join().unwrap_or_default();
        let data: Value = match serde_json::from_str(&output) {
            Ok(v) => v,
            Err(e) => {
                warn!("unparseable slither output: {}", e);
                return Ok(Vec::new());
            }
        };

        Ok(normalize_report(&data))
    }
}

/// Map Slither's detector report into the common finding shape.
fn normalize_report(data: &Value) -> Vec<Finding> {
    let mut findings = Vec::new();
    let Some(detectors) = data.pointer("/results/detectors").and_then(Value::as_array) else {
        return findings;
    };

    for det in detectors {
        let Some(element) = det
            .get("elements")
            .and_then(Value::as_array)
            .and_then(|els| els.first())
        else {
            continue;
        };

        let rule_id = truncate_chars(
            det.get("check").and_then(Value::as_str).unwrap_or("SLITHER"),
            RULE_ID_MAX_CHARS,
        );
        let severity = det
            .get("impact")
            .and_then(Value::as_str)
            .unwrap_or("MEDIUM")
            .to_ascii_uppercase();

        let mapping = element.get("source_mapping");
        let filename = mapping
            .and_then(|m| m.get("filename_relative").and_then(Value::as_str))
            .or_else(|| mapping.and_then(|m| m.get("filename").and_then(Value::as_str)));
        let line = mapping
            .and_then(|m| m.get("lines"))
            .and_then(Value::as_array)
            .and_then(|lines| lines.first())
            .and_then(Value::as_u64)
            .unwrap_or(1);
        let location = match filename {
            Some(file) => format!("{}:{}", file, line),
            None => "unknown:1".to_string(),
        };

        let snippet = element
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| det.get("description").and_then(Value::as_str))
            .unwrap_or("");
        let remediation = det
            .get("markdown")
            .and_then(Value::as_str)
            .unwrap_or("See external analyzer report.");

        findings.push(Finding::new(
            rule_id,
            severity,
            location,
            truncate_chars(snippet.trim(), SNIPPET_MAX_CHARS),
            remediation,
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_detectors_into_findings() {
        let report = json!({
            "results": {
                "detectors": [{
                    "check": "reentrancy-eth",
                    "impact": "High",
                    "description": "Reentrancy in withdraw",
                    "markdown": "Apply checks-effects-interactions.",
                    "elements": [{
                        "name": "withdraw",
                        "source_mapping": {
                            "filename_relative": "Vault.sol",
                            "lines": [12, 13]
                        }
                    }]
                }]
            }
        });

        let findings = normalize_report(&report);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.rule_id, "reentrancy-eth");
        assert_eq!(f.severity, "HIGH");
        assert_eq!(f.location, "Vault.sol:12");
        assert_eq!(f.snippet, "withdraw");
        assert_eq!(f.remediation, "Apply checks-effects-interactions.");
    }

    #[test]
    fn missing_source_mapping_yields_unknown_location() {
        let report = json!({
            "results": {
                "detectors": [{
                    "check": "pragma",
                    "impact": "Informational",
                    "elements": [{"name": "solc"}]
                }]
            }
        });

        let findings = normalize_report(&report);
        assert_eq!(findings[0].location, "unknown:1");
        assert_eq!(findings[0].severity, "INFORMATIONAL");
    }

    #[test]
    fn detectors_without_elements_are_skipped() {
        let report = json!({
            "results": { "detectors": [{"check": "x", "elements": []}] }
        });
        assert!(normalize_report(&report).is_empty());
    }

    #[test]
    fn long_check_names_are_truncated() {
        let report = json!({
            "results": {
                "detectors": [{
                    "check": "a".repeat(64),
                    "elements": [{"name": "n"}]
                }]
            }
        });
        let findings = normalize_report(&report);
        assert_eq!(findings[0].rule_id.len(), 32);
    }

    #[test]
    fn missing_tool_is_not_an_error() {
        let driver = SlitherDriver::new(Duration::from_secs(1));
        // Running against an empty dir: either the tool is absent (spawn
        // fails) or it errors out; both must degrade to no findings.
        let dir = tempfile::tempdir().unwrap();
        let findings = driver.run(dir.path()).unwrap();
        assert!(findings.is_empty());
    }
}
