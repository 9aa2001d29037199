use std::sync::Arc;

use crate::trace::{Event, EventBody, EventKind};

/// One position in the event tree.
///
/// Real nodes wrap a recorded [`Event`]; synthetic nodes are produced by the
/// outline aggregators and never appear in a freshly built tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    /// Nesting level, root = 0
    pub depth: usize,
    pub body: NodeBody,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Event(Arc<Event>),
    /// One model call plus the tool calls it triggered.
    Turn { label: String },
    /// A run of adjacent turns at the same depth.
    TurnRun { count: usize, label: String },
    /// A run of adjacent score events at the same depth.
    Scoring { label: String },
}

impl Node {
    pub fn from_event(id: impl Into<String>, depth: usize, event: Event) -> Self {
        Self {
            id: id.into(),
            depth,
            body: NodeBody::Event(Arc::new(event)),
            children: Vec::new(),
        }
    }

    pub fn synthetic(id: impl Into<String>, depth: usize, body: NodeBody, children: Vec<Node>) -> Self {
        Self {
            id: id.into(),
            depth,
            body,
            children,
        }
    }

    pub fn event(&self) -> Option<&Event> {
        match &self.body {
            NodeBody::Event(event) => Some(event),
            _ => None,
        }
    }

    /// Discriminator of the wrapped event; `None` for synthetic nodes.
    pub fn event_kind(&self) -> Option<EventKind> {
        self.event().map(Event::kind)
    }

    pub fn is_kind(&self, kind: EventKind) -> bool {
        self.event_kind() == Some(kind)
    }

    pub fn is_turn(&self) -> bool {
        matches!(self.body, NodeBody::Turn { .. })
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self.body, NodeBody::Event(_))
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Pre-order walk over this node and every descendant.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Stable id for the event at `index` of the raw log.
///
/// Prefers the recorded uuid, then the span id for span openers, then the
/// log position. The same log always yields the same ids.
pub fn stable_event_id(event: &Event, index: usize) -> String {
    if let Some(uuid) = event.uuid.as_deref().filter(|uuid| !uuid.is_empty()) {
        return uuid.to_string();
    }
    if let EventBody::SpanBegin { id, .. } = &event.body {
        if !id.is_empty() {
            return id.clone();
        }
    }
    format!("event-{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_id_prefers_uuid_then_span_id_then_index() {
        let mut with_uuid = Event::new(EventBody::Error {
            message: "boom".to_string(),
        });
        with_uuid.uuid = Some("u-1".to_string());
        assert_eq!(stable_event_id(&with_uuid, 7), "u-1");

        let span = Event::new(EventBody::SpanBegin {
            id: "span-9".to_string(),
            parent_id: None,
            name: "solvers".to_string(),
            span_type: None,
        });
        assert_eq!(stable_event_id(&span, 3), "span-9");

        let plain = Event::new(EventBody::Input {
            input: String::new(),
        });
        assert_eq!(stable_event_id(&plain, 4), "event-4");
    }

    #[test]
    fn synthetic_nodes_report_no_event_kind() {
        let turn = Node::synthetic(
            "m1",
            2,
            NodeBody::Turn {
                label: "turn 1".to_string(),
            },
            Vec::new(),
        );
        assert!(turn.is_turn());
        assert!(turn.is_synthetic());
        assert_eq!(turn.event_kind(), None);
    }
}
