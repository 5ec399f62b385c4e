//! Report assembly: SARIF 2.1.0 serialization and the content checksum.
//!
//! The checksum is the SHA-256 of the compact JSON serialization of the
//! ranked finding list, so any consumer can re-serialize the `findings`
//! array and verify integrity byte-for-byte.

use crate::core::{sarif_level_for, RankedFinding};
use anyhow::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const TOOL_NAME: &str = "CodeShield";
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://json.schemastore.org/sarif-2.1.0.json";

#[derive(Debug, Clone, Serialize)]
pub struct SarifDocument {
    pub version: &'static str,
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifTool {
    pub driver: SarifToolDriver,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifToolDriver {
    pub name: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: &'static str,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub properties: SarifProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifactLocation,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifArtifactLocation {
    pub uri: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SarifProperties {
    pub rank_score: f64,
}

/// The terminal artifact of one scan: ranked findings, their SARIF rendering,
/// and the integrity checksum. Both representations are precomputed so
/// callers serve either by plain field selection.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub findings: Vec<RankedFinding>,
    pub sarif: SarifDocument,
    pub checksum: String,
}

impl Report {
    pub fn new(findings: Vec<RankedFinding>) -> Result<Self> {
        let sarif = to_sarif(&findings);
        let checksum = checksum(&findings)?;
        Ok(Self {
            findings,
            sarif,
            checksum,
        })
    }

    pub fn findings_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.findings)?)
    }

    pub fn sarif_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.sarif)?)
    }
}

pub fn to_sarif(findings: &[RankedFinding]) -> SarifDocument {
    let results = findings
        .iter()
        .map(|ranked| {
            let finding = &ranked.finding;
            let uri = if finding.location.is_empty() {
                "unknown".to_string()
            } else {
                finding.location.clone()
            };
            SarifResult {
                rule_id: finding.rule_id.clone(),
                level: sarif_level_for(&finding.severity),
                message: SarifMessage {
                    text: finding.snippet.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation { uri },
                    },
                }],
                properties: SarifProperties {
                    rank_score: ranked.rank_score,
                },
            }
        })
        .collect();

    SarifDocument {
        version: SARIF_VERSION,
        schema: SARIF_SCHEMA,
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifToolDriver {
                    name: TOOL_NAME,
                    version: TOOL_VERSION,
                },
            },
            results,
        }],
    }
}

/// SHA-256 hex digest of the compact serialization of the ranked findings.
pub fn checksum(findings: &[RankedFinding]) -> Result<String> {
    let json = serde_json::to_string(findings)?;
    let digest = Sha256::digest(json.as_bytes());
    Ok(format!("{:x}", digest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Finding;

    fn ranked(rule_id: &str, severity: &str, location: &str, score: f64) -> RankedFinding {
        RankedFinding {
            finding: Finding::new(rule_id, severity, location, "snippet text", "fix it"),
            rank_score: score,
        }
    }

    #[test]
    fn sarif_levels_map_from_severity() {
        let findings = vec![
            ranked("A", "HIGH", "a.sol:1", 0.9),
            ranked("B", "MEDIUM", "a.sol:2", 0.5),
            ranked("C", "LOW", "a.sol:3", 0.2),
            ranked("D", "CRITICAL", "a.sol:4", 0.5),
        ];
        let sarif = to_sarif(&findings);
        let levels: Vec<_> = sarif.runs[0].results.iter().map(|r| r.level).collect();
        assert_eq!(levels, vec!["error", "warning", "note", "warning"]);
    }

    #[test]
    fn empty_location_becomes_unknown_uri() {
        let findings = vec![ranked("A", "HIGH", "", 0.9)];
        let sarif = to_sarif(&findings);
        let uri = &sarif.runs[0].results[0].locations[0]
            .physical_location
            .artifact_location
            .uri;
        assert_eq!(uri, "unknown");
    }

    #[test]
    fn rank_score_is_echoed_in_properties() {
        let findings = vec![ranked("A", "HIGH", "a.sol:1", 0.7)];
        let sarif = to_sarif(&findings);
        assert_eq!(sarif.runs[0].results[0].properties.rank_score, 0.7);
    }

    #[test]
    fn checksum_matches_independent_serialization() {
        let findings = vec![ranked("A", "HIGH", "a.sol:1", 0.9)];
        let report = Report::new(findings.clone()).unwrap();

        let json = serde_json::to_string(&findings).unwrap();
        let digest = Sha256::digest(json.as_bytes());
        assert_eq!(report.checksum, format!("{:x}", digest));
    }

    #[test]
    fn empty_findings_still_produce_a_report() {
        let report = Report::new(Vec::new()).unwrap();
        assert!(report.findings.is_empty());
        assert!(report.sarif.runs[0].results.is_empty());
        let digest = Sha256::digest(b"[]");
        assert_eq!(report.checksum, format!("{:x}", digest));
    }

    #[test]
    fn sarif_serializes_with_expected_field_names() {
        let report = Report::new(vec![ranked("A", "HIGH", "a.sol:1", 0.9)]).unwrap();
        let json = report.sarif_json().unwrap();
        assert!(json.contains("\"$schema\""));
        assert!(json.contains("\"ruleId\""));
        assert!(json.contains("\"physicalLocation\""));
        assert!(json.contains("\"artifactLocation\""));
        assert!(json.contains("\"CodeShield\""));
    }
}
