use super::args::{Cli, Commands, SnapshotCommand, TracesCommand};
use super::handlers;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Traces { command } => match command {
            TracesCommand::Show {
                file,
                pattern,
                from,
                to,
                structured,
                snapshot,
                enabled_only,
            } => {
                let query = handlers::traces_show::Query {
                    pattern,
                    from,
                    to,
                    structured,
                    snapshot,
                    enabled_only,
                };
                handlers::traces_show::handle(&file, &query, format)
            }
            TracesCommand::Decode { file } => handlers::traces_decode::handle(&file, format),
            TracesCommand::Stats { file } => handlers::traces_stats::handle(&file, format),
        },

        Commands::Snapshot { command } => match command {
            SnapshotCommand::Show { file } => handlers::snapshot_show::handle(&file, format),
            SnapshotCommand::Apply {
                file,
                out,
                patterns,
            } => handlers::snapshot_apply::handle(&file, out.as_deref(), &patterns, format),
        },
    }
}
