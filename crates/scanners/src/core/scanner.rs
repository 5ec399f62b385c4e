use crate::core::Finding;
use crate::ir::Ir;
use anyhow::Result;

/// Common interface for analyzers that walk the IR.
///
/// Scanners are read-only over the shared IR and write only to their own
/// finding lists, so the engine is free to run them in parallel. A scanner
/// returning an error is logged and skipped; it never aborts the scan.
pub trait IrScanner: Send + Sync {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn scan(&self, ir: &Ir) -> Result<Vec<Finding>>;
}
