use crate::args::OutputFormat;
use crate::handlers::Workspace;
use crate::output;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

/// Load `file`, apply `patterns` in order, save to `out` (default: `file`).
pub fn handle(
    file: &Path,
    out: Option<&Path>,
    patterns: &[String],
    format: OutputFormat,
) -> Result<()> {
    let workspace = Workspace::new();
    workspace.load_snapshot(file)?;

    for pattern in patterns {
        tracing::debug!(pattern = %pattern, "applying pattern");
        workspace.denbug.apply_pattern(pattern);
    }

    let target = out.unwrap_or(file);
    workspace
        .denbug
        .save_file(target)
        .with_context(|| format!("Failed to save snapshot: {}", target.display()))?;

    let domains = workspace.denbug.domains().len();
    match format {
        OutputFormat::Json => output::print_json(&json!({
            "path": target.display().to_string(),
            "patterns": patterns,
            "domains": domains,
        })),
        OutputFormat::Plain => {
            println!(
                "Applied {} pattern(s), saved {} domain(s) to {}",
                patterns.len(),
                domains,
                target.display()
            );
            Ok(())
        }
    }
}
