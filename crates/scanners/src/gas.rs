//! Gas-cost heuristics.
//!
//! Two independent per-function triggers over the concatenated node text:
//! external transfer calls inside loop constructs, and heavy use of the
//! assignment operator suggesting repeated storage reads worth caching.

use crate::core::{Finding, IrScanner};
use crate::ir::Ir;
use anyhow::Result;

const LOOP_PATTERNS: &[&str] = &["for(", "while("];
const EXT_CALL_PATTERNS: &[&str] = &[".call(", ".send(", ".transfer("];

const ASSIGNMENT_THRESHOLD: usize = 5;

pub struct GasAnalyzer;

impl GasAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GasAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl IrScanner for GasAnalyzer {
    fn id(&self) -> &'static str {
        "GAS"
    }

    fn name(&self) -> &'static str {
        "Gas Analyzer"
    }

    fn description(&self) -> &'static str {
        "Heuristics for expensive patterns: external calls in loops, redundant storage reads"
    }

    fn scan(&self, ir: &Ir) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (func, nodes) in &ir.cfg {
            let joined: String = nodes
                .iter()
                .map(|n| n.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");

            let has_loop = LOOP_PATTERNS.iter().any(|p| joined.contains(p));
            let has_ext_call = EXT_CALL_PATTERNS.iter().any(|p| joined.contains(p));
            if has_loop && has_ext_call {
                findings.push(
                    Finding::new(
                        "GAS-LOOP-EXTCALL",
                        "MEDIUM",
                        func.clone(),
                        "external call inside loop construct",
                        "Batch transfers or use a pull-payment pattern instead of \
                         calling out from a loop",
                    )
                    .with_func(func.clone()),
                );
            }

            let assignments = joined.matches('=').count();
            if assignments > ASSIGNMENT_THRESHOLD {
                findings.push(
                    Finding::new(
                        "GAS-REDUNDANT-SLOAD",
                        "LOW",
                        func.clone(),
                        format!("{} assignments in one function body", assignments),
                        "Cache storage reads in local variables to avoid repeated SLOADs",
                    )
                    .with_func(func.clone()),
                );
            }
        }

        Ok(findings)
    }
}
