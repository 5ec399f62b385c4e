//! CodeShield Scanners - Smart-Contract Static-Analysis Pipeline
//!
//! A multi-stage scanner for smart-contract source trees: a regex-assisted
//! parser feeds a per-function IR, several independent heuristic analyzers
//! run over that IR (plus a raw-file rule engine and an optional storage
//! layout diff), and a ranking engine merges their findings into a
//! deterministic, checksummed report in JSON and SARIF form.
//!
//! The whole pipeline is a pure function from a source tree to a [`Report`];
//! it holds no process-wide state and absorbs per-file and per-analyzer
//! failures internally. An empty findings list is a valid outcome, not an
//! error.

pub mod core;

pub mod driver;
pub mod gas;
pub mod ir;
pub mod parser;
pub mod pipeline;
pub mod ranking;
pub mod report;
pub mod rules;
pub mod storage_diff;
pub mod symbolic;
pub mod taint;

pub use crate::core::{Finding, IrScanner, RankedFinding, Severity};

pub use driver::{BuiltinDriver, ScanDriver, SlitherDriver};
pub use gas::GasAnalyzer;
pub use ir::{build_ir, CfgNode, Ir};
pub use parser::{parse_sources, Contract, Function, SourceUnit, Variable};
pub use pipeline::{DriverKind, Pipeline, PipelineConfig, PipelineError};
pub use ranking::rank_findings;
pub use report::{Report, SarifDocument};
pub use rules::{Rule, RuleSet};
pub use storage_diff::storage_diff;
pub use symbolic::SymbolicExecutor;
pub use taint::TaintAnalyzer;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
