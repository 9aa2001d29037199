//! Raw event log -> parent/child tree -> flattened sequence.
//!
//! `span_begin` opens a node and every later event naming that span becomes
//! its child. `span_end` markers carry no content and are dropped. Events that
//! name an unknown span attach at the root, so a truncated log still renders.

use std::collections::{HashMap, HashSet};

use crate::collapse::CollapseState;
use crate::node::{stable_event_id, Node};
use crate::trace::{Event, EventBody};

struct Slot {
    node: Option<Node>,
    children: Vec<usize>,
}

/// Build the event tree for a raw log. Depths are assigned from the result.
pub fn build_tree(events: &[Event]) -> Vec<Node> {
    let mut slots: Vec<Slot> = Vec::with_capacity(events.len());
    let mut roots: Vec<usize> = Vec::new();
    let mut span_slots: HashMap<&str, usize> = HashMap::new();
    let mut used_ids: HashSet<String> = HashSet::new();

    for (index, event) in events.iter().enumerate() {
        if matches!(event.body, EventBody::SpanEnd { .. }) {
            continue;
        }

        let mut id = stable_event_id(event, index);
        if !used_ids.insert(id.clone()) {
            id = format!("{id}-{index}");
            used_ids.insert(id.clone());
        }

        let parent_span = match &event.body {
            EventBody::SpanBegin { id, parent_id, .. } => parent_id
                .as_deref()
                .or(event.span_id.as_deref().filter(|span| *span != id.as_str())),
            _ => event.span_id.as_deref(),
        };
        let parent = parent_span.and_then(|span| span_slots.get(span).copied());

        let slot = slots.len();
        slots.push(Slot {
            node: Some(Node::from_event(id, 0, event.clone())),
            children: Vec::new(),
        });
        match parent {
            Some(parent) => slots[parent].children.push(slot),
            None => roots.push(slot),
        }

        if let EventBody::SpanBegin { id, .. } = &event.body {
            span_slots.insert(id.as_str(), slot);
        }
    }

    roots
        .into_iter()
        .filter_map(|slot| assemble(&mut slots, slot, 0))
        .collect()
}

fn assemble(slots: &mut [Slot], slot: usize, depth: usize) -> Option<Node> {
    let mut node = slots[slot].node.take()?;
    let children = std::mem::take(&mut slots[slot].children);
    node.depth = depth;
    node.children = children
        .into_iter()
        .filter_map(|child| assemble(slots, child, depth + 1))
        .collect();
    Some(node)
}

/// Pre-order flatten of `roots`.
///
/// A collapsed node is emitted but its descendants are not. `collapse = None`
/// means fully expanded, which is what position tracking needs.
pub fn flatten_tree(
    roots: &[Node],
    collapse: Option<&CollapseState>,
    default_collapsed: bool,
) -> Vec<Node> {
    let mut out = Vec::new();
    let mut stack: Vec<&Node> = roots.iter().rev().collect();

    while let Some(node) = stack.pop() {
        out.push(node.clone());
        let collapsed = collapse
            .map(|state| node.has_children() && state.is_collapsed(&node.id, default_collapsed))
            .unwrap_or(false);
        if !collapsed {
            stack.extend(node.children.iter().rev());
        }
    }

    out
}

/// Ids of the fully expanded flattened sequence, in order.
pub fn flattened_ids(roots: &[Node]) -> Vec<String> {
    let mut ids = Vec::new();
    for root in roots {
        root.walk(&mut |node| ids.push(node.id.clone()));
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn ids(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|node| node.id.as_str()).collect()
    }

    fn sample_log() -> Vec<Event> {
        vec![
            testing::span_begin("solvers", "solvers", None, None),
            testing::in_span(testing::model("m1", "gpt"), "solvers"),
            testing::in_span(testing::tool("t1", "bash"), "solvers"),
            testing::span_end("solvers"),
            testing::span_begin("scorers", "scorers", None, Some("scorers")),
            testing::span_begin("acc", "accuracy", Some("scorers"), Some("scorer")),
            testing::in_span(testing::score("s1"), "acc"),
            testing::span_end("acc"),
            testing::span_end("scorers"),
        ]
    }

    #[test]
    fn spans_nest_their_events_and_end_markers_vanish() {
        let roots = build_tree(&sample_log());
        assert_eq!(ids(&roots), vec!["solvers", "scorers"]);
        assert_eq!(ids(&roots[0].children), vec!["m1", "t1"]);
        assert_eq!(roots[0].children[0].depth, 1);

        let acc = &roots[1].children[0];
        assert_eq!(acc.id, "acc");
        assert_eq!(acc.depth, 1);
        assert_eq!(acc.children[0].id, "s1");
        assert_eq!(acc.children[0].depth, 2);
    }

    #[test]
    fn unknown_span_attaches_at_root() {
        let events = vec![testing::in_span(testing::model("m1", "gpt"), "missing")];
        let roots = build_tree(&events);
        assert_eq!(ids(&roots), vec!["m1"]);
        assert_eq!(roots[0].depth, 0);
    }

    #[test]
    fn duplicate_uuids_get_distinct_ids() {
        let events = vec![testing::model("dup", "a"), testing::model("dup", "b")];
        let roots = build_tree(&events);
        assert_eq!(ids(&roots), vec!["dup", "dup-1"]);
    }

    #[test]
    fn flatten_without_collapse_map_is_fully_expanded() {
        let roots = build_tree(&sample_log());
        let flat = flatten_tree(&roots, None, true);
        assert_eq!(
            ids(&flat),
            vec!["solvers", "m1", "t1", "scorers", "acc", "s1"]
        );
        assert_eq!(
            flattened_ids(&roots),
            vec!["solvers", "m1", "t1", "scorers", "acc", "s1"]
        );
    }

    #[test]
    fn collapsed_node_stays_but_hides_descendants() {
        let roots = build_tree(&sample_log());
        let mut collapse = CollapseState::new();
        collapse.set("scorers", true);
        let flat = flatten_tree(&roots, Some(&collapse), false);
        assert_eq!(ids(&flat), vec!["solvers", "m1", "t1", "scorers"]);
    }

    #[test]
    fn default_collapsed_applies_to_missing_ids() {
        let roots = build_tree(&sample_log());
        let mut collapse = CollapseState::new();
        collapse.set("solvers", false);
        let flat = flatten_tree(&roots, Some(&collapse), true);
        assert_eq!(ids(&flat), vec!["solvers", "m1", "t1", "scorers"]);
    }
}
