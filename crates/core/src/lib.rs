//! Transcript data model: events, the event tree, flattening and collapse state.

pub mod collapse;
pub mod error;
pub mod jsonl;
pub mod node;
pub mod trace;
pub mod tree;

pub use collapse::CollapseState;
pub use error::{CoreError, Result};
pub use node::{stable_event_id, Node, NodeBody};
pub use trace::*;
pub use tree::{build_tree, flatten_tree, flattened_ids};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
