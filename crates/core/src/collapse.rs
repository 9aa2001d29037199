use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Which nodes of one view are collapsed.
///
/// Ids missing from the map fall back to a caller-supplied default.
///
/// `version` is drawn from a process-wide counter on construction, on
/// deserialize and on every real change. Two states with the same version
/// therefore hold the same entries, so callers can key memoized work on it.
/// It is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollapseState {
    #[serde(default)]
    entries: HashMap<String, bool>,
    #[serde(skip, default = "next_version")]
    version: u64,
}

impl Default for CollapseState {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            version: next_version(),
        }
    }
}

impl PartialEq for CollapseState {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for CollapseState {}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.entries.get(id).copied()
    }

    pub fn is_collapsed(&self, id: &str, default_collapsed: bool) -> bool {
        self.get(id).unwrap_or(default_collapsed)
    }

    pub fn set(&mut self, id: impl Into<String>, collapsed: bool) {
        let id = id.into();
        if self.entries.get(&id) == Some(&collapsed) {
            return;
        }
        self.entries.insert(id, collapsed);
        self.version = next_version();
    }

    /// Flip `id` relative to its effective state and return the new value.
    pub fn toggle(&mut self, id: &str, default_collapsed: bool) -> bool {
        let next = !self.is_collapsed(id, default_collapsed);
        self.set(id.to_string(), next);
        next
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.version = next_version();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
