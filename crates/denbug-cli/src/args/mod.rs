// NOTE: Command Organization Rationale
//
// Two namespaces mirror the two file kinds the tool works on:
// `traces` for exported trace arrays and `snapshot` for saved domain state.

mod commands;
mod enums;

pub use commands::*;
pub use enums::*;

use clap::Parser;

#[derive(Parser)]
#[command(name = "denbug")]
#[command(about = "Inspect exported debug traces and domain snapshots", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "plain", global = true)]
    pub format: OutputFormat,

    #[arg(long, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Commands,
}
