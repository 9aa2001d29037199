use tscope_core::{flatten_tree, CollapseState, EventBody, EventKind, Node, NodeBody};

use crate::scores::{collapse_adjacent_scores, SCORING_LABEL};
use crate::turns::{collapse_adjacent_turns, group_into_turns};
use crate::visitor::{
    hide_scorer_children, remove_by_event_type, remove_named_span, run_pipeline, BoxedVisitor,
};

pub const DEFAULT_REMOVED_EVENT_TYPES: &[EventKind] = &[
    EventKind::Logger,
    EventKind::Info,
    EventKind::State,
    EventKind::Store,
    EventKind::Approval,
    EventKind::Input,
    EventKind::Sandbox,
    EventKind::SampleInit,
];

pub const DEFAULT_REMOVED_SPAN_NAMES: &[&str] = &["init", "sample_init"];

/// What the outline hides before aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineOptions {
    pub removed_event_types: Vec<EventKind>,
    pub removed_span_names: Vec<String>,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            removed_event_types: DEFAULT_REMOVED_EVENT_TYPES.to_vec(),
            removed_span_names: DEFAULT_REMOVED_SPAN_NAMES
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

/// Standard outline composition.
///
/// Removals run first so the aggregators never group around nodes that are
/// about to disappear.
pub fn outline_visitors(options: &OutlineOptions) -> Vec<BoxedVisitor> {
    let mut visitors: Vec<BoxedVisitor> = Vec::new();
    for kind in &options.removed_event_types {
        visitors.push(remove_by_event_type(*kind));
    }
    for name in &options.removed_span_names {
        visitors.push(remove_named_span(name.clone()));
    }
    visitors.push(hide_scorer_children());
    visitors.push(group_into_turns());
    visitors.push(collapse_adjacent_turns());
    visitors.push(collapse_adjacent_scores());
    visitors
}

/// Flatten `roots` honoring `collapse`, then run `visitors` over the result.
pub fn flatten(
    roots: &[Node],
    collapse: Option<&CollapseState>,
    default_collapsed: bool,
    visitors: &[BoxedVisitor],
) -> Vec<Node> {
    run_pipeline(flatten_tree(roots, collapse, default_collapsed), visitors)
}

/// Text shown for a node in the outline.
pub fn outline_label(node: &Node) -> String {
    let event = match &node.body {
        NodeBody::Event(event) => event,
        NodeBody::Turn { label } | NodeBody::TurnRun { label, .. } | NodeBody::Scoring { label } => {
            return label.clone();
        }
    };
    match &event.body {
        EventBody::Model { model, .. } => model.clone(),
        EventBody::Tool { function, .. } => function.clone(),
        EventBody::Score { .. } => SCORING_LABEL.to_string(),
        EventBody::SpanBegin { name, .. }
        | EventBody::Step { name, .. }
        | EventBody::Subtask { name, .. } => name.clone(),
        EventBody::SampleLimit { limit_type, .. } => format!("limit: {limit_type}"),
        _ => event.kind().as_str().to_string(),
    }
}
