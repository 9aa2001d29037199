//! Outline <-> detail scroll synchronization.
//!
//! The detail list is finer-grained than the outline, so a detail position is
//! resolved against the full expanded id list and then snapped back to the
//! nearest id the outline actually shows.

use std::collections::{HashMap, HashSet};

use tracing::trace;
use tscope_core::{flattened_ids, Node};

use crate::list::VirtualList;

/// Position index over the fully expanded flattened sequence.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ScrollTracker {
    pub fn new(full_ids: Vec<String>) -> Self {
        let mut positions = HashMap::with_capacity(full_ids.len());
        for (idx, id) in full_ids.iter().enumerate() {
            positions.entry(id.clone()).or_insert(idx);
        }
        Self {
            ids: full_ids,
            positions,
        }
    }

    pub fn from_roots(roots: &[Node]) -> Self {
        Self::new(flattened_ids(roots))
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Nearest id at or before `index` that `outline_ids` contains.
    pub fn nearest_outline_id(&self, index: usize, outline_ids: &HashSet<String>) -> Option<&str> {
        let end = index.min(self.ids.len().checked_sub(1)?);
        self.ids[..=end]
            .iter()
            .rev()
            .find(|id| outline_ids.contains(id.as_str()))
            .map(String::as_str)
    }
}

/// Outline selection plus the programmatic-scroll guard.
///
/// While `is_programmatic_scroll` is set, detail position callbacks are
/// ignored: the scroll was caused by an outline activation whose selection is
/// already stored. The guard clears on scroll completion.
#[derive(Debug, Clone, Default)]
pub struct OutlineSync {
    selected_outline_id: Option<String>,
    is_programmatic_scroll: bool,
}

impl OutlineSync {
    pub fn selected_outline_id(&self) -> Option<&str> {
        self.selected_outline_id.as_deref()
    }

    pub fn is_programmatic_scroll(&self) -> bool {
        self.is_programmatic_scroll
    }

    /// Detail viewport callback: `id` is the item nearest the top.
    ///
    /// Returns true when the stored selection changed. Ids the tracker does
    /// not know leave the selection untouched.
    pub fn on_position_changed(
        &mut self,
        tracker: &ScrollTracker,
        outline_ids: &HashSet<String>,
        id: &str,
    ) -> bool {
        if self.is_programmatic_scroll {
            trace!(id, "position change ignored during programmatic scroll");
            return false;
        }
        let Some(index) = tracker.position(id) else {
            trace!(id, "position change for unknown id");
            return false;
        };
        let next = tracker
            .nearest_outline_id(index, outline_ids)
            .map(str::to_string);
        if next == self.selected_outline_id {
            return false;
        }
        trace!(id, selected = ?next, "outline selection follows detail scroll");
        self.selected_outline_id = next;
        true
    }

    /// Outline row activation: select it and scroll the detail list there.
    pub fn activate_outline_row(&mut self, id: &str, list: &mut dyn VirtualList) {
        self.selected_outline_id = Some(id.to_string());
        self.is_programmatic_scroll = list.scroll_to_id(id);
        trace!(
            id,
            programmatic = self.is_programmatic_scroll,
            "outline row activated"
        );
    }

    /// The detail list finished the scroll started by an activation.
    pub fn on_scroll_complete(&mut self) {
        self.is_programmatic_scroll = false;
    }

    /// Row to highlight. Falls back to the first row for display only; the
    /// stored selection stays empty.
    pub fn displayed_selection<'a>(&'a self, outline_rows: &'a [Node]) -> Option<&'a str> {
        self.selected_outline_id
            .as_deref()
            .or_else(|| outline_rows.first().map(|node| node.id.as_str()))
    }

    /// Drop a selection that no longer names an outline row.
    pub fn retain_if_present(&mut self, outline_ids: &HashSet<String>) {
        if let Some(id) = self.selected_outline_id.as_deref() {
            if !outline_ids.contains(id) {
                self.selected_outline_id = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::RecordingList;
    use tscope_core::testing;

    fn tracker() -> ScrollTracker {
        ScrollTracker::new(["a", "b", "c", "d", "e"].map(String::from).to_vec())
    }

    fn outline(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    #[test]
    fn backward_search_snaps_to_nearest_outline_id() {
        let tracker = tracker();
        let outline_ids = outline(&["a", "c"]);
        let mut sync = OutlineSync::default();

        assert!(sync.on_position_changed(&tracker, &outline_ids, "d"));
        assert_eq!(sync.selected_outline_id(), Some("c"));

        assert!(sync.on_position_changed(&tracker, &outline_ids, "a"));
        assert_eq!(sync.selected_outline_id(), Some("a"));
    }

    #[test]
    fn position_before_any_outline_id_clears_selection() {
        let tracker = tracker();
        let outline_ids = outline(&["c", "e"]);
        let mut sync = OutlineSync::default();

        sync.on_position_changed(&tracker, &outline_ids, "d");
        assert_eq!(sync.selected_outline_id(), Some("c"));
        sync.on_position_changed(&tracker, &outline_ids, "b");
        assert_eq!(sync.selected_outline_id(), None);

        let rows = vec![
            testing::node(0, testing::model("c", "gpt")),
            testing::node(0, testing::model("e", "gpt")),
        ];
        assert_eq!(sync.displayed_selection(&rows), Some("c"));
        assert_eq!(sync.selected_outline_id(), None);
    }

    #[test]
    fn programmatic_scroll_suppresses_tracking_until_complete() {
        let tracker = tracker();
        let outline_ids = outline(&["a", "c", "e"]);
        let mut sync = OutlineSync::default();
        let mut list = RecordingList::with_ids(["a", "b", "c", "d", "e"]);

        sync.activate_outline_row("e", &mut list);
        assert!(sync.is_programmatic_scroll());
        assert_eq!(list.scrolled_to, vec!["e".to_string()]);

        for id in ["a", "b", "c", "d"] {
            assert!(!sync.on_position_changed(&tracker, &outline_ids, id));
            assert_eq!(sync.selected_outline_id(), Some("e"));
        }

        sync.on_scroll_complete();
        assert!(sync.on_position_changed(&tracker, &outline_ids, "d"));
        assert_eq!(sync.selected_outline_id(), Some("c"));
    }

    #[test]
    fn failed_scroll_does_not_arm_the_guard() {
        let mut sync = OutlineSync::default();
        let mut list = RecordingList::with_ids(["a"]);
        sync.activate_outline_row("zzz", &mut list);
        assert_eq!(sync.selected_outline_id(), Some("zzz"));
        assert!(!sync.is_programmatic_scroll());
    }

    #[test]
    fn empty_full_list_is_a_noop() {
        let tracker = ScrollTracker::default();
        let mut sync = OutlineSync::default();
        assert!(!sync.on_position_changed(&tracker, &outline(&["a"]), "a"));
        assert_eq!(tracker.nearest_outline_id(0, &outline(&["a"])), None);
        assert_eq!(sync.selected_outline_id(), None);
    }

    #[test]
    fn unknown_id_keeps_selection() {
        let tracker = tracker();
        let outline_ids = outline(&["a"]);
        let mut sync = OutlineSync::default();
        sync.on_position_changed(&tracker, &outline_ids, "b");
        assert!(!sync.on_position_changed(&tracker, &outline_ids, "nope"));
        assert_eq!(sync.selected_outline_id(), Some("a"));
    }

    #[test]
    fn retain_drops_vanished_selection() {
        let mut sync = OutlineSync::default();
        let mut list = RecordingList::with_ids(["a"]);
        sync.activate_outline_row("a", &mut list);
        sync.retain_if_present(&outline(&["b"]));
        assert_eq!(sync.selected_outline_id(), None);
    }
}
