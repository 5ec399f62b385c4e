//! The `rules` command: print the rule table a scan would apply.

use anyhow::Result;
use clap::Args;
use codeshield_scanners::RuleSet;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Clone)]
pub struct RulesArgs {
    /// External rule file (JSON). Omit to show the built-in table.
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

pub fn execute(args: RulesArgs) -> Result<()> {
    let set = match &args.rules {
        Some(path) => RuleSet::load(path),
        None => RuleSet::builtin(),
    };

    println!("{} rules active:\n", set.len());
    for rule in set.rules() {
        println!(
            "{}  [{}]  {}",
            rule.rule_id.bold(),
            rule.severity,
            rule.pattern
        );
        if !rule.description.is_empty() {
            println!("    {}", rule.description.dimmed());
        }
    }

    Ok(())
}
