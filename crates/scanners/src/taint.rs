//! Source-to-sink position heuristic.
//!
//! No variable identity is tracked: a function is flagged whenever an
//! untrusted-input pattern appears at or before the first sensitive-sink
//! pattern in node order. A coarse over-approximation by design.

use crate::core::{Finding, IrScanner};
use crate::ir::Ir;
use anyhow::Result;

const TAINT_SOURCES: &[&str] = &["msg.sender", "tx.origin", "msg.value"];
const TAINT_SINKS: &[&str] = &[".call(", "transfer(", "send(", "delegatecall("];

const REMEDIATION: &str = "Validate inputs and reorder state updates after external calls";

pub struct TaintAnalyzer;

impl TaintAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TaintAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl IrScanner for TaintAnalyzer {
    fn id(&self) -> &'static str {
        "TAINT-001"
    }

    fn name(&self) -> &'static str {
        "Taint Flow Analyzer"
    }

    fn description(&self) -> &'static str {
        "Flags functions where untrusted input patterns precede sensitive sinks"
    }

    fn scan(&self, ir: &Ir) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (func, nodes) in &ir.cfg {
            let first_source = nodes
                .iter()
                .find(|n| TAINT_SOURCES.iter().any(|p| n.text.contains(p)))
                .map(|n| n.idx);
            let first_sink = nodes
                .iter()
                .find(|n| TAINT_SINKS.iter().any(|p| n.text.contains(p)))
                .map(|n| n.idx);

            if let (Some(src), Some(sink)) = (first_source, first_sink) {
                if src <= sink {
                    findings.push(
                        Finding::new(
                            "TAINT-001",
                            "HIGH",
                            func.clone(),
                            format!(
                                "untrusted input at node {} may reach sink at node {}",
                                src, sink
                            ),
                            REMEDIATION,
                        )
                        .with_func(func.clone()),
                    );
                }
            }
        }

        Ok(findings)
    }
}
