//! Analysis-facing intermediate representation.
//!
//! One `CfgNode` per source line, in declaration order, with a single
//! sequential successor edge. Branching is not structurally modeled; the
//! analyzers reason over linear order and text matching. The map-of-ordered-
//! nodes shape is the stable contract a branch-aware builder could slot into
//! later without touching any analyzer.

use crate::parser::{Contract, SourceUnit};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CfgNode {
    /// Owning function key, `Contract.function`.
    pub func: String,
    /// Trimmed line text.
    pub text: String,
    /// Zero-based position within the function.
    pub idx: usize,
    /// Successor indices. Sequential construction gives each node at most one.
    pub edges: Vec<usize>,
}

/// Aggregated IR over every parsed unit.
///
/// Ordered maps keep analyzer iteration deterministic, which the report
/// checksum depends on. Contract name collisions across units are
/// last-write-wins; the `Contract.function` key is assumed unique for
/// analysis purposes.
#[derive(Debug, Default, Clone)]
pub struct Ir {
    pub contracts: BTreeMap<String, Contract>,
    pub cfg: BTreeMap<String, Vec<CfgNode>>,
}

pub fn build_ir(units: &[SourceUnit]) -> Ir {
    let mut ir = Ir::default();

    for unit in units {
        for contract in &unit.contracts {
            ir.contracts.insert(contract.name.clone(), contract.clone());
            for function in &contract.functions {
                let key = format!("{}.{}", contract.name, function.name);
                let mut nodes: Vec<CfgNode> = function
                    .lines
                    .iter()
                    .enumerate()
                    .map(|(idx, line)| CfgNode {
                        func: key.clone(),
                        text: line.trim().to_string(),
                        idx,
                        edges: Vec::new(),
                    })
                    .collect();
                let count = nodes.len();
                for (idx, node) in nodes.iter_mut().enumerate() {
                    if idx + 1 < count {
                        node.edges.push(idx + 1);
                    }
                }
                ir.cfg.insert(key, nodes);
            }
        }
    }

    ir
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceParser;
    use std::path::Path;

    fn ir_for(src: &str) -> Ir {
        let unit = SourceParser::new().parse_unit(Path::new("t.sol"), src);
        build_ir(&[unit])
    }

    #[test]
    fn nodes_are_sequential_per_function() {
        let ir = ir_for("contract C { function f() public { a = 1;\n b = 2;\n c = 3; } }");
        let nodes = &ir.cfg["C.f"];
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].text, "a = 1;");
        assert_eq!(nodes[0].edges, vec![1]);
        assert_eq!(nodes[1].edges, vec![2]);
        assert!(nodes[2].edges.is_empty(), "last node has no successor");
    }

    #[test]
    fn functions_are_keyed_by_contract_and_name() {
        let ir = ir_for(
            "contract A { function f() public { x = 1; } }\n\
             contract B { function f() public { y = 2; } }",
        );
        assert!(ir.cfg.contains_key("A.f"));
        assert!(ir.cfg.contains_key("B.f"));
        assert_eq!(ir.contracts.len(), 2);
    }

    #[test]
    fn contract_name_collision_is_last_write_wins() {
        let parser = SourceParser::new();
        let first = parser.parse_unit(Path::new("a.sol"), "contract C { uint256 a; }");
        let second = parser.parse_unit(Path::new("b.sol"), "contract C { uint256 b; }");
        let ir = build_ir(&[first, second]);
        assert_eq!(ir.contracts["C"].variables[0].name, "b");
    }
}
