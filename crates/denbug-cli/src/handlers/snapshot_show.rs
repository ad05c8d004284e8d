use crate::args::OutputFormat;
use crate::handlers::Workspace;
use crate::output;
use anyhow::Result;
use denbug_sdk::Denbug;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainRow {
    pub name: String,
    pub local_state: bool,
    pub effective_state: bool,
}

/// Rows in creation order.
pub fn rows(denbug: &Denbug) -> Vec<DomainRow> {
    denbug
        .domains()
        .into_iter()
        .map(|name| DomainRow {
            local_state: denbug.state(&name).unwrap_or(false),
            effective_state: denbug.enabled(&name),
            name,
        })
        .collect()
}

pub fn handle(file: &Path, format: OutputFormat) -> Result<()> {
    let workspace = Workspace::new();
    workspace.load_snapshot(file)?;
    let rows = rows(&workspace.denbug);

    match format {
        OutputFormat::Json => output::print_json(&rows),
        OutputFormat::Plain => {
            print!("{}", render(&rows, output::use_color()));
            Ok(())
        }
    }
}

fn render(rows: &[DomainRow], color: bool) -> String {
    let width = rows
        .iter()
        .map(|row| row.name.len())
        .chain(std::iter::once("DOMAIN".len()))
        .max()
        .unwrap_or(0);

    let mut text = format!("{:<width$}  LOCAL  EFFECTIVE\n", "DOMAIN", width = width);
    for row in rows {
        // Pad by hand so escape codes do not skew the columns.
        let padding = if row.local_state { 3 } else { 2 };
        text.push_str(&format!(
            "{:<width$}  {}{}  {}\n",
            row.name,
            output::state_label(row.local_state, color),
            " ".repeat(padding),
            output::state_label(row.effective_state, color),
            width = width
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_reflect_parent_state() {
        let denbug = Denbug::new();
        denbug.domain("app:ui").unwrap();
        denbug.disable("app").unwrap();

        let rows = rows(&denbug);
        let ui = rows.iter().find(|row| row.name == "app:ui").unwrap();
        assert!(ui.local_state);
        assert!(!ui.effective_state);
    }

    #[test]
    fn test_render_plain_table() {
        let denbug = Denbug::new();
        denbug.domain("app:ui").unwrap();
        denbug.disable("app:ui").unwrap();

        insta::assert_snapshot!(render(&rows(&denbug), false), @r"
        DOMAIN       LOCAL  EFFECTIVE
        app          on     on
        app:echo     on     on
        app:ui       off    off
        app:ui:echo  on     off
        ");
    }
}
