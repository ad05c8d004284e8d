use crate::args::OutputFormat;
use crate::handlers::Workspace;
use crate::output;
use anyhow::Result;
use denbug_types::Trace;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Serialize, PartialEq)]
pub struct TraceStats {
    pub total: usize,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub domains: BTreeMap<String, usize>,
}

impl TraceStats {
    pub fn collect(traces: &[Trace]) -> Self {
        let mut domains = BTreeMap::new();
        for trace in traces {
            *domains.entry(trace.domain.clone()).or_insert(0) += 1;
        }

        Self {
            total: traces.len(),
            from: traces.iter().map(|t| t.timestamp).min(),
            to: traces.iter().map(|t| t.timestamp).max(),
            domains,
        }
    }

    pub fn span_millis(&self) -> i64 {
        match (self.from, self.to) {
            (Some(from), Some(to)) => to.saturating_sub(from),
            _ => 0,
        }
    }
}

pub fn handle(file: &Path, format: OutputFormat) -> Result<()> {
    let workspace = Workspace::new();
    let stats = TraceStats::collect(&workspace.load_traces(file)?);

    match format {
        OutputFormat::Json => output::print_json(&stats),
        OutputFormat::Plain => {
            print!("{}", render(&stats));
            Ok(())
        }
    }
}

fn render(stats: &TraceStats) -> String {
    let mut text = format!("Traces: {}\n", stats.total);
    if let (Some(from), Some(to)) = (stats.from, stats.to) {
        text.push_str(&format!(
            "Span:   {} .. {} ({} ms)\n",
            output::format_millis(from),
            output::format_millis(to),
            stats.span_millis()
        ));
    }

    let width = stats.domains.keys().map(String::len).max().unwrap_or(0);
    for (domain, count) in &stats.domains {
        text.push_str(&format!("  {:<width$}  {}\n", domain, count, width = width));
    }
    text
}
