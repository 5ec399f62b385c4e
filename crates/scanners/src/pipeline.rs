//! Pipeline orchestration.
//!
//! One invocation is a pure function from (source tree, config) to `Report`:
//! parse, build IR, gather baseline findings through the configured driver,
//! run the IR scanners, optionally diff storage layouts, then rank and
//! assemble the report. The IR scanners are read-only over the shared IR, so
//! they run in parallel by default; a failing scanner is logged and skipped.

use crate::core::{Finding, IrScanner};
use crate::driver::{BuiltinDriver, ScanDriver, SlitherDriver};
use crate::gas::GasAnalyzer;
use crate::ir::build_ir;
use crate::parser::parse_sources;
use crate::ranking::rank_findings;
use crate::report::Report;
use crate::rules::RuleSet;
use crate::storage_diff::storage_diff;
use crate::symbolic::SymbolicExecutor;
use crate::taint::TaintAnalyzer;
use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source root does not exist: {0}")]
    MissingRoot(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// Built-in regex rule scanner.
    Basic,
    /// External Slither invocation, falling back to `Basic` when it yields
    /// nothing.
    Slither,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// External rule file; `None` or an unusable file means built-in rules.
    pub rules_path: Option<PathBuf>,
    pub driver: DriverKind,
    /// Kill deadline for the external driver.
    pub external_timeout: Duration,
    /// Relative paths within the scanned tree naming the old/new versions
    /// for the storage diff pass. The pass runs only when both resolve.
    pub storage_diff_old: Option<String>,
    pub storage_diff_new: Option<String>,
    /// Run the IR scanners on the rayon pool. Safe because scanners share no
    /// mutable state; results are merged in scanner registration order.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            driver: DriverKind::Basic,
            external_timeout: Duration::from_secs(60),
            storage_diff_old: None,
            storage_diff_new: None,
            parallel: true,
        }
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    scanners: Vec<Arc<dyn IrScanner>>,
}

impl Pipeline {
    /// Pipeline with the standard scanner set: taint, symbolic, gas.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            scanners: vec![
                Arc::new(TaintAnalyzer::new()),
                Arc::new(SymbolicExecutor::new()),
                Arc::new(GasAnalyzer::new()),
            ],
        }
    }

    /// Pipeline with no registered IR scanners.
    pub fn empty(config: PipelineConfig) -> Self {
        Self {
            config,
            scanners: Vec::new(),
        }
    }

    pub fn add_scanner<S: IrScanner + 'static>(mut self, scanner: S) -> Self {
        self.scanners.push(Arc::new(scanner));
        self
    }

    /// Run the full pipeline over an extracted source tree.
    pub fn run(&self, root: &Path) -> Result<Report> {
        if !root.is_dir() {
            return Err(PipelineError::MissingRoot(root.to_path_buf()).into());
        }

        let units = parse_sources(root)?;
        let ir = build_ir(&units);
        debug!(
            units = units.len(),
            contracts = ir.contracts.len(),
            functions = ir.cfg.len(),
            "built IR"
        );

        let mut findings = self.baseline_findings(root);

        let scanned: Vec<Finding> = if self.config.parallel {
            self.scanners
                .par_iter()
                .filter_map(|scanner| match scanner.scan(&ir) {
                    Ok(found) => Some(found),
                    Err(e) => {
                        warn!("scanner {} failed: {}", scanner.id(), e);
                        None
                    }
                })
                .flatten()
                .collect()
        } else {
            let mut all = Vec::new();
            for scanner in &self.scanners {
                match scanner.scan(&ir) {
                    Ok(found) => all.extend(found),
                    Err(e) => warn!("scanner {} failed: {}", scanner.id(), e),
                }
            }
            all
        };
        findings.extend(scanned);

        if let (Some(old), Some(new)) = (
            self.config.storage_diff_old.as_deref(),
            self.config.storage_diff_new.as_deref(),
        ) {
            let old_path = root.join(old);
            let new_path = root.join(new);
            if old_path.exists() && new_path.exists() {
                findings.extend(storage_diff(&old_path, &new_path));
            } else {
                debug!("storage diff paths missing, skipping pass");
            }
        }

        Report::new(rank_findings(findings))
    }

    /// Baseline findings via the configured driver, with builtin fallback.
    fn baseline_findings(&self, root: &Path) -> Vec<Finding> {
        if self.config.driver == DriverKind::Slither {
            let external = SlitherDriver::new(self.config.external_timeout);
            match external.run(root) {
                Ok(found) if !found.is_empty() => return found,
                Ok(_) => debug!("external driver found nothing, using builtin scanner"),
                Err(e) => warn!("external driver failed: {}, using builtin scanner", e),
            }
        }

        let rules = match &self.config.rules_path {
            Some(path) => RuleSet::load(path),
            None => RuleSet::builtin(),
        };
        BuiltinDriver::new(rules).run(root).unwrap_or_default()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
