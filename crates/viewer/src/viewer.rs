use std::collections::HashSet;

use tracing::debug;
use tscope_core::{build_tree, flatten_tree, Event, Node};
use tscope_outline::{outline_visitors, OutlineOptions, OutlinePipeline};

use crate::error::Result;
use crate::list::VirtualList;
use crate::state::{CollapseScope, CollapseStore, ViewerState};
use crate::sticky::StickyHeader;
use crate::sync::ScrollTracker;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerOptions {
    pub outline: OutlineOptions,
    pub default_collapsed: bool,
    pub sticky_offset_px: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            outline: OutlineOptions::default(),
            default_collapsed: false,
            sticky_offset_px: 0.0,
        }
    }
}

/// One outline/detail view over a transcript.
///
/// The outline is the memoized pipeline output over the outline collapse
/// scope. The detail list is the plain flattening over the detail scope.
/// Scroll tracking always resolves against the fully expanded tree.
pub struct TranscriptViewer {
    roots: Vec<Node>,
    state: ViewerState,
    pipeline: OutlinePipeline,
    tracker: ScrollTracker,
    default_collapsed: bool,
    outline_ids: HashSet<String>,
    outline_ids_run: Option<u64>,
}

impl TranscriptViewer {
    pub fn new(events: &[Event], options: &ViewerOptions) -> Self {
        let roots = build_tree(events);
        let tracker = ScrollTracker::from_roots(&roots);
        debug!(
            events = events.len(),
            full_rows = tracker.ids().len(),
            "transcript viewer created"
        );
        Self {
            roots,
            state: ViewerState::new(StickyHeader::new(options.sticky_offset_px)),
            pipeline: OutlinePipeline::new(outline_visitors(&options.outline)),
            tracker,
            default_collapsed: options.default_collapsed,
            outline_ids: HashSet::new(),
            outline_ids_run: None,
        }
    }

    /// Swap in a new event list, keeping collapse and selection state.
    pub fn replace_events(&mut self, events: &[Event]) {
        self.roots = build_tree(events);
        // same ids can carry new payloads
        self.pipeline.invalidate();
        self.tracker = ScrollTracker::from_roots(&self.roots);
        self.sync_outline_ids();
        self.state.sync.retain_if_present(&self.outline_ids);
    }

    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn pipeline_runs(&self) -> u64 {
        self.pipeline.runs()
    }

    pub fn outline_rows(&mut self) -> &[Node] {
        self.pipeline.outline(
            &self.roots,
            self.state.collapse(&CollapseScope::Outline),
            self.default_collapsed,
        )
    }

    pub fn detail_rows(&self) -> Vec<Node> {
        flatten_tree(
            &self.roots,
            self.state.collapse(&CollapseScope::Detail),
            self.default_collapsed,
        )
    }

    /// Ids of the fully expanded tree in pre-order.
    pub fn full_ids(&self) -> &[String] {
        self.tracker.ids()
    }

    pub fn on_detail_position_changed(&mut self, id: &str) -> bool {
        self.sync_outline_ids();
        self.state
            .sync
            .on_position_changed(&self.tracker, &self.outline_ids, id)
    }

    pub fn activate_outline_row(&mut self, id: &str, list: &mut dyn VirtualList) {
        self.state.sync.activate_outline_row(id, list);
    }

    pub fn on_scroll_complete(&mut self) {
        self.state.sync.on_scroll_complete();
    }

    /// Flip `id` in `scope`. Returns the new collapsed value.
    pub fn toggle_collapsed(&mut self, scope: CollapseScope, id: &str) -> bool {
        let collapsed = self
            .state
            .collapse_mut(&scope)
            .toggle(id, self.default_collapsed);
        if scope == CollapseScope::Outline {
            self.sync_outline_ids();
            self.state.sync.retain_if_present(&self.outline_ids);
        }
        collapsed
    }

    pub fn select_next_outline_row(&mut self, list: &mut dyn VirtualList) -> Option<String> {
        self.step_selection(true, list)
    }

    pub fn select_previous_outline_row(&mut self, list: &mut dyn VirtualList) -> Option<String> {
        self.step_selection(false, list)
    }

    pub fn displayed_outline_selection(&mut self) -> Option<&str> {
        let rows = self.pipeline.outline(
            &self.roots,
            self.state.collapse(&CollapseScope::Outline),
            self.default_collapsed,
        );
        self.state.sync.displayed_selection(rows)
    }

    pub fn restore_collapse(&mut self, store: &dyn CollapseStore) {
        self.state
            .restore(store, &[CollapseScope::Outline, CollapseScope::Detail]);
        self.pipeline.invalidate();
        self.sync_outline_ids();
        self.state.sync.retain_if_present(&self.outline_ids);
    }

    pub fn persist_collapse(&self, store: &mut dyn CollapseStore) -> Result<()> {
        self.state.persist(store, &CollapseScope::Outline)?;
        self.state.persist(store, &CollapseScope::Detail)
    }

    fn step_selection(&mut self, forward: bool, list: &mut dyn VirtualList) -> Option<String> {
        let rows = self.pipeline.outline(
            &self.roots,
            self.state.collapse(&CollapseScope::Outline),
            self.default_collapsed,
        );
        let last = rows.len().checked_sub(1)?;
        let current = self
            .state
            .sync
            .selected_outline_id()
            .and_then(|id| rows.iter().position(|row| row.id == id))
            .unwrap_or(0);
        let next = if forward {
            (current + 1).min(last)
        } else {
            current.saturating_sub(1)
        };
        let id = rows[next].id.clone();
        self.state.sync.activate_outline_row(&id, list);
        Some(id)
    }

    fn sync_outline_ids(&mut self) {
        self.pipeline.outline(
            &self.roots,
            self.state.collapse(&CollapseScope::Outline),
            self.default_collapsed,
        );
        let runs = self.pipeline.runs();
        if self.outline_ids_run == Some(runs) {
            return;
        }
        let rows = self.pipeline.outline(
            &self.roots,
            self.state.collapse(&CollapseScope::Outline),
            self.default_collapsed,
        );
        self.outline_ids = rows.iter().map(|row| row.id.clone()).collect();
        self.outline_ids_run = Some(runs);
    }
}
