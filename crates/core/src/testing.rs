use crate::{Event, EventBody, Node, StepAction};
use serde_json::Value;

/// Event with a fixed uuid.
pub fn event(uuid: &str, body: EventBody) -> Event {
    let mut event = Event::new(body);
    event.uuid = Some(uuid.to_string());
    event
}

/// Attach `event` to the span `span_id`.
pub fn in_span(mut event: Event, span_id: &str) -> Event {
    event.span_id = Some(span_id.to_string());
    event
}

pub fn model(uuid: &str, model: &str) -> Event {
    event(
        uuid,
        EventBody::Model {
            model: model.to_string(),
            role: None,
            output: Value::Null,
        },
    )
}

pub fn tool(uuid: &str, function: &str) -> Event {
    event(
        uuid,
        EventBody::Tool {
            function: function.to_string(),
            id: None,
            arguments: Value::Null,
            error: None,
        },
    )
}

pub fn score(uuid: &str) -> Event {
    event(
        uuid,
        EventBody::Score {
            score: Value::from(1.0),
            intermediate: false,
        },
    )
}

pub fn info(uuid: &str) -> Event {
    event(
        uuid,
        EventBody::Info {
            source: None,
            data: Value::Null,
        },
    )
}

pub fn error(uuid: &str, message: &str) -> Event {
    event(
        uuid,
        EventBody::Error {
            message: message.to_string(),
        },
    )
}

/// `span_begin` whose uuid equals its span id.
pub fn span_begin(id: &str, name: &str, parent_id: Option<&str>, span_type: Option<&str>) -> Event {
    event(
        id,
        EventBody::SpanBegin {
            id: id.to_string(),
            parent_id: parent_id.map(str::to_string),
            name: name.to_string(),
            span_type: span_type.map(str::to_string),
        },
    )
}

pub fn span_end(id: &str) -> Event {
    Event::new(EventBody::SpanEnd { id: id.to_string() })
}

pub fn step(uuid: &str, name: &str, step_type: Option<&str>) -> Event {
    event(
        uuid,
        EventBody::Step {
            action: StepAction::Begin,
            name: name.to_string(),
            step_type: step_type.map(str::to_string),
        },
    )
}

/// Childless node at `depth`, id taken from the event's uuid.
pub fn node(depth: usize, event: Event) -> Node {
    let id = event.uuid.clone().unwrap_or_default();
    Node::from_event(id, depth, event)
}
