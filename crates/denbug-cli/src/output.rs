use anyhow::Result;
use chrono::{DateTime, SecondsFormat};
use denbug_types::Trace;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::Value;

/// Colors only when stdout is an interactive terminal and `NO_COLOR` is unset.
pub fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| millis.to_string())
}

/// Strings print bare, everything else as compact JSON.
pub fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn trace_line(trace: &Trace, color: bool) -> String {
    let timestamp = format_millis(trace.timestamp);
    let args = render_args(&trace.args);
    if color {
        format!("{} {} {}", timestamp.dimmed(), trace.domain.cyan(), args)
    } else {
        format!("{} {} {}", timestamp, trace.domain, args)
    }
}

pub fn state_label(on: bool, color: bool) -> String {
    match (on, color) {
        (true, true) => "on".green().to_string(),
        (false, true) => "off".red().to_string(),
        (true, false) => "on".to_string(),
        (false, false) => "off".to_string(),
    }
}
