//! Regex-assisted source extraction.
//!
//! This is deliberately not a grammar-based front end. The analyzers only
//! need contracts, their storage declarations, and function bodies as ordered
//! lines, so extraction is pattern matching plus brace counting. The whole
//! layer sits behind `parse_sources` so it can be swapped for a real parser
//! without touching any analyzer.

use anyhow::{bail, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Storage variable declaration pattern shared with the storage-diff pass:
/// `<type> <identifier>;` for the primitive/compound types we care about.
pub const VAR_DECL_PATTERN: &str =
    r"(uint\d*|int\d*|address|bool|bytes\d*|string|mapping\s*\([^;]+\))\s+(\w+)\s*;";

const SOURCE_EXTENSION: &str = ".sol";

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: String,
    /// Slot assignment is an extension point; the base pipeline never fills it.
    pub storage_slot: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub visibility: String,
    pub mutability: String,
    pub body: String,
    /// Body split into right-trimmed lines, declaration order preserved.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub name: String,
    pub variables: Vec<Variable>,
    pub functions: Vec<Function>,
    /// Inheritance is recorded but never resolved or flattened.
    pub parents: Vec<String>,
}

/// One parsed file. Discarded after IR construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub contracts: Vec<Contract>,
}

pub struct SourceParser {
    contract_header: Regex,
    function_header: Regex,
    var_decl: Regex,
    visibility: Regex,
    mutability: Regex,
}

impl SourceParser {
    pub fn new() -> Self {
        Self {
            contract_header: Regex::new(r"contract\s+(\w+)\s*(?:is\s+([^{]+))?\{")
                .expect("contract header pattern"),
            function_header: Regex::new(r"function\s+(\w+)\s*\(([^)]*)\)([^{;]*)\{")
                .expect("function header pattern"),
            var_decl: Regex::new(VAR_DECL_PATTERN).expect("variable declaration pattern"),
            visibility: Regex::new(r"\b(public|external|internal|private)\b")
                .expect("visibility pattern"),
            mutability: Regex::new(r"\b(payable|view|pure|nonpayable)\b")
                .expect("mutability pattern"),
        }
    }

    pub fn parse_unit(&self, path: &Path, text: &str) -> SourceUnit {
        let mut contracts = Vec::new();

        for header in self.contract_header.captures_iter(text) {
            let whole = header.get(0).expect("capture 0 always present");
            // The header regex ends on '{'; the matching close brace bounds the body.
            let open = whole.end() - 1;
            let Some(body) = matched_block(text, open) else {
                continue;
            };

            let name = header[1].to_string();
            let parents = header
                .get(2)
                .map(|m| {
                    m.as_str()
                        .split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            contracts.push(Contract {
                name,
                variables: self.parse_variables(body),
                functions: self.parse_functions(body),
                parents,
            });
        }

        SourceUnit {
            path: path.to_path_buf(),
            contracts,
        }
    }

    fn parse_variables(&self, body: &str) -> Vec<Variable> {
        self.var_decl
            .captures_iter(body)
            .map(|c| Variable {
                name: c[2].to_string(),
                ty: c[1].to_string(),
                storage_slot: None,
            })
            .collect()
    }

    fn parse_functions(&self, body: &str) -> Vec<Function> {
        let mut functions = Vec::new();

        for header in self.function_header.captures_iter(body) {
            let whole = header.get(0).expect("capture 0 always present");
            let open = whole.end() - 1;
            let Some(fbody) = matched_block(body, open) else {
                continue;
            };

            let modifiers = &header[3];
            let visibility = self
                .visibility
                .captures(modifiers)
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| "public".to_string());
            let mutability = self
                .mutability
                .captures(modifiers)
                .map(|c| c[1].to_string())
                .unwrap_or_default();

            let lines = fbody.lines().map(|ln| ln.trim_end().to_string()).collect();

            functions.push(Function {
                name: header[1].to_string(),
                visibility,
                mutability,
                body: fbody.to_string(),
                lines,
            });
        }

        functions
    }
}

impl Default for SourceParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the text between the brace at `open` and its matching close brace.
fn matched_block(text: &str, open: usize) -> Option<&str> {
    let mut depth = 0usize;
    for (offset, ch) in text[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[open + 1..open + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Walk `root` and parse every source file with the target extension.
///
/// Individual unreadable files are skipped; a missing root is the one fatal
/// condition. A tree with no matching files yields an empty list, not an
/// error. Files are visited in sorted order so downstream finding order is
/// reproducible.
pub fn parse_sources(root: &Path) -> Result<Vec<SourceUnit>> {
    if !root.is_dir() {
        bail!("source root does not exist: {}", root.display());
    }

    let parser = SourceParser::new();
    let mut units = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }
        let text = match fs::read(entry.path()) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                debug!("skipping unreadable file {}: {}", entry.path().display(), e);
                continue;
            }
        };
        units.push(parser.parse_unit(entry.path(), &text));
    }

    Ok(units)
}

pub fn is_source_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.to_ascii_lowercase().ends_with(SOURCE_EXTENSION))
}
