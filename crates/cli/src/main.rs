use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::{rules::RulesArgs, scan::ScanArgs};

#[derive(Parser)]
#[command(name = "codeshield")]
#[command(about = "Multi-stage static analysis for smart-contract source trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline over a source tree.
    Scan(ScanArgs),

    /// Show the rule set a scan would use.
    Rules(RulesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => commands::scan::execute(args),
        Commands::Rules(args) => commands::rules::execute(args),
    }
}
