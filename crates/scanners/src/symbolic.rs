//! Bounded ordering-hazard pass.
//!
//! Walks each function's nodes in order, capped at `MAX_NODES`, looking for
//! an external-call pattern followed by a state write. That is the classic
//! checks-effects-interactions violation, detected positionally rather than
//! through actual symbolic state. Only the first violation per function is
//! reported.

use crate::core::{Finding, IrScanner};
use crate::ir::Ir;
use anyhow::Result;

const MAX_NODES: usize = 200;

const CALL_PATTERNS: &[&str] = &[".call(", "delegatecall(", ".send(", ".transfer("];

const REMEDIATION: &str = "Validate inputs and reorder state updates after external calls";

pub struct SymbolicExecutor;

impl SymbolicExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SymbolicExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_external_call(text: &str) -> bool {
    CALL_PATTERNS.iter().any(|p| text.contains(p))
}

fn is_state_write(text: &str) -> bool {
    text.contains('=') || text.contains("++") || text.contains("--")
}

impl IrScanner for SymbolicExecutor {
    fn id(&self) -> &'static str {
        "EXEC-REENTRANCY"
    }

    fn name(&self) -> &'static str {
        "Symbolic Executor"
    }

    fn description(&self) -> &'static str {
        "Detects external calls preceding state writes (checks-effects-interactions)"
    }

    fn scan(&self, ir: &Ir) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for (func, nodes) in &ir.cfg {
            let mut call_seen = false;
            for node in nodes.iter().take(MAX_NODES) {
                if call_seen && is_state_write(&node.text) {
                    findings.push(
                        Finding::new(
                            "EXEC-REENTRANCY",
                            "HIGH",
                            func.clone(),
                            format!("state write at node {} after external call", node.idx),
                            REMEDIATION,
                        )
                        .with_func(func.clone()),
                    );
                    break;
                }
                if is_external_call(&node.text) {
                    call_seen = true;
                }
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build_ir;
    use crate::parser::SourceParser;
    use std::path::Path;

    fn scan(src: &str) -> Vec<Finding> {
        let unit = SourceParser::new().parse_unit(Path::new("t.sol"), src);
        SymbolicExecutor::new().scan(&build_ir(&[unit])).unwrap()
    }

    #[test]
    fn call_before_write_is_flagged() {
        let findings = scan(
            "contract C { function w() public {\n\
             target.call(data);\n\
             balance -= amount;\n\
             } }",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, "EXEC-REENTRANCY");
        assert_eq!(findings[0].func.as_deref(), Some("C.w"));
    }

    #[test]
    fn write_before_call_is_not_flagged() {
        let findings = scan(
            "contract C { function w() public {\n\
             balance -= amount;\n\
             target.call(data);\n\
             } }",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn increment_counts_as_state_write() {
        let findings = scan(
            "contract C { function w() public {\n\
             target.transfer(amount);\n\
             nonce++;\n\
             } }",
        );
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn only_first_violation_is_reported() {
        let findings = scan(
            "contract C { function w() public {\n\
             target.call(data);\n\
             a = 1;\n\
             b = 2;\n\
             } }",
        );
        assert_eq!(findings.len(), 1);
    }
}
