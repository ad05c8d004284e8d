// NOTE: Offline CLI Rationale
//
// Why replay files instead of attaching to a live process?
// - Traces already round-trip through JSON (`post`), so an exported buffer is
//   the whole state needed for filtering and decoding
// - Snapshots carry only local flags; effective state is recomputed on load,
//   which makes `snapshot show` an exact preview of what a process would see
// - No IPC surface to version or secure

mod args;
mod commands;
mod handlers;
mod logging;
mod output;

pub use args::{Cli, Commands, LogLevel, OutputFormat, SnapshotCommand, TracesCommand};
pub use commands::run;
pub use logging::init_logging;
