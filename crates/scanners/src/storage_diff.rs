//! Cross-version storage layout comparison.
//!
//! Upgradeable contracts break when the order or type of persisted state
//! variables drifts between versions. This pass extracts `(name, type)`
//! declaration pairs from an old and a new source file with its own
//! lightweight pattern match (independent of the main parser) and reports
//! order drift and per-variable type changes.

use crate::core::Finding;
use crate::parser::VAR_DECL_PATTERN;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Declaration-ordered `(name, type)` pairs from one source file.
///
/// Unreadable files yield an empty layout; the caller has already checked
/// existence, and a vanished file must not abort the scan.
pub fn extract_layout(path: &Path) -> Vec<(String, String)> {
    let text = match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            debug!("cannot read {} for storage diff: {}", path.display(), e);
            return Vec::new();
        }
    };
    let decl = Regex::new(VAR_DECL_PATTERN).expect("variable declaration pattern");
    decl.captures_iter(&text)
        .map(|c| (c[2].to_string(), c[1].to_string()))
        .collect()
}

/// Compare the storage layouts of two file versions.
///
/// One `STOR-DIFF-ORDER` finding if the ordered name lists differ at all,
/// plus one `STOR-DIFF-TYPE` finding per variable present in both versions
/// whose declared type string changed.
pub fn storage_diff(old_path: &Path, new_path: &Path) -> Vec<Finding> {
    let old = extract_layout(old_path);
    let new = extract_layout(new_path);

    let mut findings = Vec::new();

    let old_names: Vec<&String> = old.iter().map(|(name, _)| name).collect();
    let new_names: Vec<&String> = new.iter().map(|(name, _)| name).collect();
    if old_names != new_names {
        findings.push(Finding::new(
            "STOR-DIFF-ORDER",
            "HIGH",
            "storage",
            "storage layout diff",
            "Review storage layout compatibility before upgrading",
        ));
    }

    // Last declaration wins when a name repeats, matching the extraction order.
    let new_types: HashMap<&String, &String> =
        new.iter().map(|(name, ty)| (name, ty)).collect();
    for (name, old_ty) in &old {
        if let Some(new_ty) = new_types.get(name) {
            if *new_ty != old_ty {
                findings.push(Finding::new(
                    "STOR-DIFF-TYPE",
                    "HIGH",
                    name.clone(),
                    "storage layout diff",
                    format!("Type of `{}` changed from {} to {}", name, old_ty, new_ty),
                ));
            }
        }
    }

    findings
}
