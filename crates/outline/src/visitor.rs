//! Structural rewrites over an already-flat node sequence.
//!
//! Visitors only see the flat list, so nesting is inferred from `depth`
//! alone. Each visitor builds its scan state inside `visit`, which keeps a
//! rerun over the same input byte-for-byte identical.

use tracing::trace;
use tscope_core::{EventKind, Node};

pub trait Visitor {
    fn name(&self) -> &'static str;

    /// Order-preserving rewrite. May drop nodes or replace adjacent runs with
    /// fewer synthetic nodes.
    fn visit(&self, nodes: Vec<Node>) -> Vec<Node>;
}

pub type BoxedVisitor = Box<dyn Visitor + Send + Sync>;

/// Apply `visitors` left to right, each over the previous output.
pub fn run_pipeline(nodes: Vec<Node>, visitors: &[BoxedVisitor]) -> Vec<Node> {
    visitors.iter().fold(nodes, |acc, visitor| {
        let before = acc.len();
        let out = visitor.visit(acc);
        trace!(visitor = visitor.name(), before, after = out.len(), "visitor applied");
        out
    })
}

/// Drops nodes whose event discriminator is `kind`. Descendants are not
/// touched: in a flat list they are plain siblings.
#[derive(Debug, Clone)]
pub struct RemoveByEventType {
    kind: EventKind,
}

impl Visitor for RemoveByEventType {
    fn name(&self) -> &'static str {
        "remove_by_event_type"
    }

    fn visit(&self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
            .into_iter()
            .filter(|node| !node.is_kind(self.kind))
            .collect()
    }
}

pub fn remove_by_event_type(kind: EventKind) -> BoxedVisitor {
    Box::new(RemoveByEventType { kind })
}

/// Drops `step` / `span_begin` nodes declaring `name`.
#[derive(Debug, Clone)]
pub struct RemoveNamedSpan {
    name: String,
}

impl Visitor for RemoveNamedSpan {
    fn name(&self) -> &'static str {
        "remove_named_span"
    }

    fn visit(&self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
            .into_iter()
            .filter(|node| {
                let Some(event) = node.event() else {
                    return true;
                };
                let span_like = matches!(event.kind(), EventKind::Step | EventKind::SpanBegin);
                !(span_like && event.declared_name() == Some(self.name.as_str()))
            })
            .collect()
    }
}

pub fn remove_named_span(name: impl Into<String>) -> BoxedVisitor {
    Box::new(RemoveNamedSpan { name: name.into() })
}

pub const SCORER_GROUP_TYPE: &str = "scorers";
pub const SCORER_TYPE: &str = "scorer";

/// Inside a scorer group, drops the direct children of each scorer.
///
/// Only nodes at exactly `scorer_depth + 1` go; grandchildren stay visible.
#[derive(Debug, Clone, Default)]
pub struct HideScorerChildren;

impl Visitor for HideScorerChildren {
    fn name(&self) -> &'static str {
        "hide_scorer_children"
    }

    fn visit(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut group_depth: Option<usize> = None;
        let mut scorer_depth: Option<usize> = None;
        let mut out = Vec::with_capacity(nodes.len());

        for node in nodes {
            let event = node.event();
            let is_group = event.is_some_and(|event| {
                event.kind() == EventKind::SpanBegin
                    && event.declared_type() == Some(SCORER_GROUP_TYPE)
            });
            let is_scorer = event.is_some_and(|event| {
                matches!(event.kind(), EventKind::SpanBegin | EventKind::Step)
                    && event.declared_type() == Some(SCORER_TYPE)
            });

            if let Some(depth) = group_depth {
                if node.depth <= depth && !is_group {
                    group_depth = None;
                    scorer_depth = None;
                }
            }

            if is_group {
                group_depth = Some(node.depth);
                scorer_depth = None;
                out.push(node);
                continue;
            }

            if group_depth.is_some() && is_scorer {
                scorer_depth = Some(node.depth);
                out.push(node);
                continue;
            }

            if let Some(depth) = scorer_depth {
                if node.depth == depth + 1 {
                    continue;
                }
            }
            out.push(node);
        }

        out
    }
}

pub fn hide_scorer_children() -> BoxedVisitor {
    Box::new(HideScorerChildren)
}
