use crate::args::OutputFormat;
use crate::handlers::Workspace;
use crate::output;
use anyhow::{Result, bail};
use denbug_types::FilterOptions;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub struct Query {
    pub pattern: Option<String>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub structured: Vec<String>,
    pub snapshot: Option<PathBuf>,
    pub enabled_only: bool,
}

impl Query {
    fn to_options(&self) -> Result<FilterOptions> {
        let mut options = FilterOptions::new();
        if let Some(pattern) = &self.pattern {
            options = options.pattern(pattern.clone());
        }
        if let Some(from) = self.from {
            options = options.since(from);
        }
        if let Some(to) = self.to {
            options = options.until(to);
        }
        for pair in &self.structured {
            let (key, value) = parse_pair(pair)?;
            options = options.structured(key, value);
        }
        if self.enabled_only {
            options = options.enabled_only();
        }
        Ok(options)
    }
}

/// `key=value`. The value is read as JSON when it parses, else as a string.
fn parse_pair(pair: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = pair.split_once('=') else {
        bail!("Invalid --structured value {:?}: expected KEY=VALUE", pair);
    };
    if key.is_empty() {
        bail!("Invalid --structured value {:?}: empty key", pair);
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

pub fn handle(file: &Path, query: &Query, format: OutputFormat) -> Result<()> {
    let options = query.to_options()?;

    let workspace = Workspace::new();
    let traces = workspace.load_traces(file)?;
    if let Some(snapshot) = &query.snapshot {
        workspace.load_snapshot(snapshot)?;
    }

    let hits = workspace.denbug.filter(&traces, &options);
    tracing::debug!(total = traces.len(), matched = hits.len(), "filtered traces");

    match format {
        OutputFormat::Json => output::print_json(&hits),
        OutputFormat::Plain => {
            let color = output::use_color();
            for trace in &hits {
                println!("{}", output::trace_line(trace, color));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pair_reads_json_or_string() {
        assert_eq!(
            parse_pair("severity=high").unwrap(),
            ("severity".to_string(), json!("high"))
        );
        assert_eq!(parse_pair("retries=3").unwrap(), ("retries".to_string(), json!(3)));
        assert_eq!(parse_pair("ok=true").unwrap(), ("ok".to_string(), json!(true)));
        assert_eq!(parse_pair("note=a=b").unwrap(), ("note".to_string(), json!("a=b")));
    }

    #[test]
    fn test_parse_pair_rejects_bad_input() {
        assert!(parse_pair("severity").is_err());
        assert!(parse_pair("=high").is_err());
    }
}
