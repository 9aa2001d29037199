//! Transcript loading.
//!
//! Accepted documents:
//! - a JSON array of events
//! - a JSON object with an `events` array (and optional `id`)
//! - JSONL, one event per line (blank lines skipped)
//!
//! Invalid JSON fails the load. Valid JSON that does not fit the event
//! schema is kept as an [`EventBody::Unknown`] event so the rest of the
//! transcript still renders.

use crate::error::{CoreError, Result};
use crate::trace::{Event, EventBody, Transcript};
use serde::Deserialize;
use serde_json::Value;
use std::io::BufRead;
use std::path::Path;
use tracing::warn;

/// Decode one event, degrading a schema mismatch to an unknown event that
/// keeps its `uuid` and `span_id`.
pub fn decode_event(value: Value, position: usize) -> Event {
    match Event::deserialize(&value) {
        Ok(event) => event,
        Err(e) => {
            let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
            warn!(
                position,
                event = field("event").as_deref().unwrap_or("-"),
                "event does not match its schema, keeping it as unknown: {e}"
            );
            let mut event = Event::new(EventBody::Unknown);
            event.uuid = field("uuid");
            event.span_id = field("span_id");
            event
        }
    }
}

fn decode_events(values: Vec<Value>) -> Vec<Event> {
    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| decode_event(value, idx + 1))
        .collect()
}

/// Parse a JSON transcript document.
pub fn parse_transcript(text: &str) -> Result<Transcript> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(values) => Ok(Transcript::new(decode_events(values))),
        Value::Object(mut object) => {
            let Some(Value::Array(values)) = object.remove("events") else {
                return Err(CoreError::UnsupportedDocument(
                    "object without an `events` array",
                ));
            };
            let id = object.get("id").and_then(Value::as_str).map(str::to_string);
            Ok(Transcript {
                id,
                events: decode_events(values),
            })
        }
        _ => Err(CoreError::UnsupportedDocument(
            "expected an array or an object",
        )),
    }
}

/// Read a JSONL event stream.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Transcript> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(&line).map_err(|source| CoreError::JsonLine {
            line: idx + 1,
            source,
        })?;
        events.push(decode_event(value, idx + 1));
    }
    Ok(Transcript::new(events))
}

/// Load a transcript from disk; `.jsonl` files are read line by line.
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));
    if is_jsonl {
        let file = std::fs::File::open(path)?;
        return read_jsonl(std::io::BufReader::new(file));
    }
    let text = std::fs::read_to_string(path)?;
    parse_transcript(&text)
}
