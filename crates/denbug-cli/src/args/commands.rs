use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Filter, decode and summarize an exported trace file")]
    Traces {
        #[command(subcommand)]
        command: TracesCommand,
    },

    #[command(about = "Inspect or edit a saved domain snapshot")]
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommand,
    },
}

#[derive(Subcommand)]
pub enum TracesCommand {
    #[command(about = "List traces matching the given filters")]
    Show {
        #[arg(help = "JSON array of traces")]
        file: PathBuf,

        #[arg(long, help = "Domain glob, `*` matches any run of characters")]
        pattern: Option<String>,

        #[arg(long, help = "Earliest timestamp (ms since epoch, inclusive)")]
        from: Option<i64>,

        #[arg(long, help = "Latest timestamp (ms since epoch, inclusive)")]
        to: Option<i64>,

        #[arg(
            long,
            value_name = "KEY=VALUE",
            help = "Structured metadata match, repeatable"
        )]
        structured: Vec<String>,

        #[arg(long, help = "Snapshot file applied before --enabled-only")]
        snapshot: Option<PathBuf>,

        #[arg(long, help = "Keep only traces whose domain is effectively enabled")]
        enabled_only: bool,
    },

    #[command(about = "Decode traces with readable timestamps and parsed stack frames")]
    Decode {
        #[arg(help = "JSON array of traces")]
        file: PathBuf,
    },

    #[command(about = "Per-domain counts and time span")]
    Stats {
        #[arg(help = "JSON array of traces")]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum SnapshotCommand {
    #[command(about = "Show local and effective state of every domain")]
    Show {
        #[arg(help = "Snapshot file (.toml or .json)")]
        file: PathBuf,
    },

    #[command(about = "Load a snapshot, apply patterns in order, save it")]
    Apply {
        #[arg(help = "Snapshot file (.toml or .json)")]
        file: PathBuf,

        #[arg(long, help = "Write here instead of overwriting FILE")]
        out: Option<PathBuf>,

        #[arg(
            required = true,
            allow_hyphen_values = true,
            help = "Patterns such as `app:**` or `-app:ui`"
        )]
        patterns: Vec<String>,
    },
}
