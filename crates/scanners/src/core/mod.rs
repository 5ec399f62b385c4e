//! Core abstractions shared by every stage of the pipeline.
//!
//! The `Finding` type is the common output shape across the rule scanner, the
//! IR analyzers, and the storage diff; `Severity` interprets the raw severity
//! strings they carry; `IrScanner` is the seam that lets the engine treat the
//! IR analyzers uniformly (and run them in parallel).

pub mod result;
pub mod scanner;
pub mod severity;

pub use result::{Finding, RankedFinding};
pub use scanner::IrScanner;
pub use severity::{base_score_for, sarif_level_for, Severity};
