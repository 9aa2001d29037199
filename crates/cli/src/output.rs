use serde::Serialize;
use tscope_core::{Node, NodeBody};
use tscope_outline::outline_label;

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// One rendered row.
#[derive(Debug, Serialize)]
pub struct RowView {
    pub id: String,
    pub depth: usize,
    pub kind: &'static str,
    pub label: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub children: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

pub fn node_kind(node: &Node) -> &'static str {
    match &node.body {
        NodeBody::Event(event) => event.kind().as_str(),
        NodeBody::Turn { .. } => "turn",
        NodeBody::TurnRun { .. } => "turn_run",
        NodeBody::Scoring { .. } => "scoring",
    }
}

pub fn row_views(rows: &[Node], selected: Option<&str>) -> Vec<RowView> {
    rows.iter()
        .map(|node| RowView {
            id: node.id.clone(),
            depth: node.depth,
            kind: node_kind(node),
            label: outline_label(node),
            children: node.children.len(),
            selected: selected == Some(node.id.as_str()),
        })
        .collect()
}

pub fn print_rows(rows: &[RowView], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Text => {
            for row in rows {
                let marker = if row.selected { ">" } else { " " };
                println!(
                    "{marker} {}{}  [{}]",
                    "  ".repeat(row.depth),
                    row.label,
                    row.id
                );
            }
        }
    }
    Ok(())
}
