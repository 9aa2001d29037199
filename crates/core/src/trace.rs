use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A recorded transcript: the complete event history of one agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Transcript identifier (sample id, log id, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw event log in recording order
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Transcript {
    pub fn new(events: Vec<Event>) -> Self {
        Self { id: None, events }
    }
}

/// A single event of the raw log.
///
/// Common fields live on the struct; the type-specific payload is the
/// flattened [`EventBody`], tagged by the `"event"` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable event identifier, when the producer recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Enclosing span, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
    #[serde(flatten)]
    pub body: EventBody,
}

impl Event {
    pub fn new(body: EventBody) -> Self {
        Self {
            uuid: None,
            span_id: None,
            timestamp: None,
            metadata: HashMap::new(),
            body,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.body.kind()
    }

    /// Declared name of a span-like event (span, step, subtask).
    pub fn declared_name(&self) -> Option<&str> {
        match &self.body {
            EventBody::SpanBegin { name, .. }
            | EventBody::Step { name, .. }
            | EventBody::Subtask { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Declared `type` of a span-like event, e.g. `"scorers"` or `"scorer"`.
    pub fn declared_type(&self) -> Option<&str> {
        match &self.body {
            EventBody::SpanBegin { span_type, .. } => span_type.as_deref(),
            EventBody::Step { step_type, .. } => step_type.as_deref(),
            EventBody::Subtask { subtask_type, .. } => subtask_type.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Begin,
    End,
}

/// Type-specific event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventBody {
    Model {
        model: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        output: Value,
    },
    Tool {
        function: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Value::is_null")]
        arguments: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Score {
        #[serde(default)]
        score: Value,
        #[serde(default)]
        intermediate: bool,
    },
    SpanBegin {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<String>,
        name: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        span_type: Option<String>,
    },
    SpanEnd {
        id: String,
    },
    Subtask {
        name: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        subtask_type: Option<String>,
    },
    Approval {
        approver: String,
        decision: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        explanation: Option<String>,
    },
    Step {
        action: StepAction,
        name: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        step_type: Option<String>,
    },
    SampleLimit {
        #[serde(rename = "type")]
        limit_type: String,
        #[serde(default)]
        message: String,
    },
    SampleInit {
        #[serde(default, skip_serializing_if = "Value::is_null")]
        sample: Value,
    },
    Error {
        message: String,
    },
    Info {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(default)]
        data: Value,
    },
    State {
        #[serde(default)]
        changes: Vec<Value>,
    },
    Store {
        #[serde(default)]
        changes: Vec<Value>,
    },
    Sandbox {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cmd: Option<String>,
    },
    Input {
        #[serde(default)]
        input: String,
    },
    Logger {
        #[serde(default)]
        message: Value,
    },
    /// Discriminator this build does not know about. Kept so the rest of
    /// the transcript still renders.
    #[serde(other)]
    Unknown,
}

impl EventBody {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Model { .. } => EventKind::Model,
            Self::Tool { .. } => EventKind::Tool,
            Self::Score { .. } => EventKind::Score,
            Self::SpanBegin { .. } => EventKind::SpanBegin,
            Self::SpanEnd { .. } => EventKind::SpanEnd,
            Self::Subtask { .. } => EventKind::Subtask,
            Self::Approval { .. } => EventKind::Approval,
            Self::Step { .. } => EventKind::Step,
            Self::SampleLimit { .. } => EventKind::SampleLimit,
            Self::SampleInit { .. } => EventKind::SampleInit,
            Self::Error { .. } => EventKind::Error,
            Self::Info { .. } => EventKind::Info,
            Self::State { .. } => EventKind::State,
            Self::Store { .. } => EventKind::Store,
            Self::Sandbox { .. } => EventKind::Sandbox,
            Self::Input { .. } => EventKind::Input,
            Self::Logger { .. } => EventKind::Logger,
            Self::Unknown => EventKind::Unknown,
        }
    }
}

/// Event discriminator without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Model,
    Tool,
    Score,
    SpanBegin,
    SpanEnd,
    Subtask,
    Approval,
    Step,
    SampleLimit,
    SampleInit,
    Error,
    Info,
    State,
    Store,
    Sandbox,
    Input,
    Logger,
    Unknown,
}

impl EventKind {
    pub const ALL: [EventKind; 18] = [
        Self::Model,
        Self::Tool,
        Self::Score,
        Self::SpanBegin,
        Self::SpanEnd,
        Self::Subtask,
        Self::Approval,
        Self::Step,
        Self::SampleLimit,
        Self::SampleInit,
        Self::Error,
        Self::Info,
        Self::State,
        Self::Store,
        Self::Sandbox,
        Self::Input,
        Self::Logger,
        Self::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Tool => "tool",
            Self::Score => "score",
            Self::SpanBegin => "span_begin",
            Self::SpanEnd => "span_end",
            Self::Subtask => "subtask",
            Self::Approval => "approval",
            Self::Step => "step",
            Self::SampleLimit => "sample_limit",
            Self::SampleInit => "sample_init",
            Self::Error => "error",
            Self::Info => "info",
            Self::State => "state",
            Self::Store => "store",
            Self::Sandbox => "sandbox",
            Self::Input => "input",
            Self::Logger => "logger",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::UnknownEventKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_event_roundtrip_keeps_common_fields() {
        let json = r#"{
            "event": "model",
            "uuid": "ev-1",
            "span_id": "span-a",
            "timestamp": "2025-01-01T00:00:00Z",
            "model": "gpt-4o",
            "role": "solver"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind(), EventKind::Model);
        assert_eq!(event.uuid.as_deref(), Some("ev-1"));
        assert_eq!(event.span_id.as_deref(), Some("span-a"));
        match &event.body {
            EventBody::Model { model, role, .. } => {
                assert_eq!(model, "gpt-4o");
                assert_eq!(role.as_deref(), Some("solver"));
            }
            other => panic!("expected model, got {other:?}"),
        }

        let encoded = serde_json::to_string(&event).unwrap();
        assert!(encoded.contains("\"event\":\"model\""));
        let parsed: Event = serde_json::from_str(&encoded).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn unrecognized_discriminator_passes_through_as_unknown() {
        let json = r#"{"event": "telepathy", "uuid": "x", "payload": {"a": 1}}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind(), EventKind::Unknown);
        assert_eq!(event.uuid.as_deref(), Some("x"));
    }

    #[test]
    fn span_type_field_maps_to_declared_type() {
        let json = r#"{"event": "span_begin", "id": "s1", "name": "accuracy", "type": "scorer"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.declared_name(), Some("accuracy"));
        assert_eq!(event.declared_type(), Some("scorer"));
    }

    #[test]
    fn step_event_parses_action() {
        let json = r#"{"event": "step", "action": "begin", "name": "init"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        match event.body {
            EventBody::Step { action, .. } => assert_eq!(action, StepAction::Begin),
            other => panic!("expected step, got {other:?}"),
        }
    }

    #[test]
    fn event_kind_parses_case_insensitively() {
        assert_eq!("SPAN_BEGIN".parse::<EventKind>().unwrap(), EventKind::SpanBegin);
        assert_eq!(" sample_limit ".parse::<EventKind>().unwrap(), EventKind::SampleLimit);
        assert!("nope".parse::<EventKind>().is_err());
    }
}
