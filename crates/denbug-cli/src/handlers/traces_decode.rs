use crate::args::OutputFormat;
use crate::handlers::Workspace;
use crate::output;
use anyhow::Result;
use denbug_types::DecodedTrace;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn handle(file: &Path, format: OutputFormat) -> Result<()> {
    let workspace = Workspace::new();
    let decoded: Vec<DecodedTrace> = workspace
        .load_traces(file)?
        .iter()
        .map(|trace| workspace.denbug.decode(trace))
        .collect();

    match format {
        OutputFormat::Json => output::print_json(&decoded),
        OutputFormat::Plain => {
            let color = output::use_color();
            for (i, trace) in decoded.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                render(trace, color);
            }
            Ok(())
        }
    }
}

fn render(trace: &DecodedTrace, color: bool) {
    let domain = if color {
        trace.domain.cyan().to_string()
    } else {
        trace.domain.clone()
    };
    println!("{} {} {}", trace.timestamp, domain, output::render_args(&trace.args));

    if trace.stack.is_empty() {
        println!("  (no stack frames)");
        return;
    }
    for frame in &trace.stack {
        let location = format!("{}:{}:{}", frame.file, frame.line, frame.column);
        if color {
            println!("  at {} ({})", frame.function, location.dimmed());
        } else {
            println!("  at {} ({})", frame.function, location);
        }
    }
}
