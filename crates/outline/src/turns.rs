use tscope_core::{EventKind, Node, NodeBody};

use crate::fold::fold_adjacent_runs;
use crate::visitor::{BoxedVisitor, Visitor};

/// Groups each model call with the tool calls that follow it.
///
/// A turn node takes the model's id and depth; its children are the model
/// followed by its tools. Turn labels count from 1 on every run.
/// A tool with no model before it stays in place as a plain row.
#[derive(Debug, Clone, Default)]
pub struct GroupIntoTurns;

struct PendingTurn {
    model: Option<Node>,
    tools: Vec<Node>,
    counter: usize,
}

impl PendingTurn {
    fn flush(&mut self, out: &mut Vec<Node>) {
        let Some(model) = self.model.take() else {
            return;
        };
        self.counter += 1;
        let mut children = Vec::with_capacity(self.tools.len() + 1);
        let id = model.id.clone();
        let depth = model.depth;
        children.push(model);
        children.append(&mut self.tools);
        out.push(Node::synthetic(
            id,
            depth,
            NodeBody::Turn {
                label: format!("turn {}", self.counter),
            },
            children,
        ));
    }
}

impl Visitor for GroupIntoTurns {
    fn name(&self) -> &'static str {
        "group_into_turns"
    }

    fn visit(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut pending = PendingTurn {
            model: None,
            tools: Vec::new(),
            counter: 0,
        };

        for node in nodes {
            match node.event_kind() {
                Some(EventKind::Model) => {
                    pending.flush(&mut out);
                    pending.model = Some(node);
                }
                Some(EventKind::Tool) if pending.model.is_some() => pending.tools.push(node),
                _ => {
                    pending.flush(&mut out);
                    out.push(node);
                }
            }
        }

        pending.flush(&mut out);
        out
    }
}

pub fn group_into_turns() -> BoxedVisitor {
    Box::new(GroupIntoTurns)
}

/// Folds adjacent turn nodes at the same depth into one `"N turns"` node
/// keyed by the first turn's id.
#[derive(Debug, Clone, Default)]
pub struct CollapseAdjacentTurns;

pub fn turn_run_label(count: usize) -> String {
    if count == 1 {
        "1 turn".to_string()
    } else {
        format!("{count} turns")
    }
}

impl Visitor for CollapseAdjacentTurns {
    fn name(&self) -> &'static str {
        "collapse_adjacent_turns"
    }

    fn visit(&self, nodes: Vec<Node>) -> Vec<Node> {
        fold_adjacent_runs(nodes, Node::is_turn, |run| {
            let id = run[0].id.clone();
            let depth = run[0].depth;
            let count = run.len();
            Node::synthetic(
                id,
                depth,
                NodeBody::TurnRun {
                    count,
                    label: turn_run_label(count),
                },
                run,
            )
        })
    }
}

pub fn collapse_adjacent_turns() -> BoxedVisitor {
    Box::new(CollapseAdjacentTurns)
}
