use anyhow::{Context, Result};
use denbug_sdk::Denbug;
use denbug_types::Trace;
use std::path::Path;

/// Scratch instance holding whatever a command loaded from disk.
pub struct Workspace {
    pub denbug: Denbug,
}

impl Workspace {
    pub fn new() -> Self {
        let denbug = Denbug::builder().capture_stacks(false).build();
        Self { denbug }
    }

    /// Import a trace export. Unknown domains are created as they appear.
    ///
    /// The returned list is complete even when the buffer evicts.
    pub fn load_traces(&self, path: &Path) -> Result<Vec<Trace>> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read trace file: {}", path.display()))?;
        let traces = self
            .denbug
            .post(&text)
            .with_context(|| format!("Failed to parse trace file: {}", path.display()))?;

        tracing::info!(count = traces.len(), path = %path.display(), "loaded traces");
        Ok(traces)
    }

    pub fn load_snapshot(&self, path: &Path) -> Result<()> {
        self.denbug
            .load_file(path)
            .with_context(|| format!("Failed to load snapshot: {}", path.display()))?;

        tracing::info!(path = %path.display(), "loaded snapshot");
        Ok(())
    }
}
