//! Sticky header geometry.
//!
//! A zero-size sentinel sits where the header would be in normal flow. Once
//! the sentinel scrolls above the ancestor's visible top plus `offset_px`,
//! the header is pinned as a fixed overlay sized like its in-flow slot.
//! Measurements arrive from the host's resize observers; until both the
//! sentinel and the scroll ancestor are known nothing is computed.

use tracing::debug;

/// Axis-aligned box in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Observed elements whose size changes trigger a geometry recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    HeaderContent,
    ScrollAncestor,
    WidthProbe,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderPlacement {
    InFlow,
    Fixed { left: f32, top: f32, width: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickyTransition {
    Stuck,
    Unstuck,
}

#[derive(Debug, Clone, Default)]
pub struct StickyHeader {
    offset_px: f32,
    scroll_top: f32,
    /// Sentinel offset within the scroll content, independent of scrolling.
    sentinel_offset: Option<f32>,
    ancestor: Option<Rect>,
    header: Option<Rect>,
    probe_width: Option<f32>,
    stuck: bool,
}

impl StickyHeader {
    pub fn new(offset_px: f32) -> Self {
        Self {
            offset_px,
            ..Self::default()
        }
    }

    pub fn offset_px(&self) -> f32 {
        self.offset_px
    }

    pub fn is_stuck(&self) -> bool {
        self.stuck
    }

    /// Sentinel mounted (`Some`) or unmounted (`None`).
    pub fn observe_sentinel(&mut self, offset: Option<f32>) -> Option<StickyTransition> {
        self.sentinel_offset = offset;
        self.reevaluate()
    }

    pub fn observe_scroll(&mut self, scroll_top: f32) -> Option<StickyTransition> {
        self.scroll_top = scroll_top;
        self.reevaluate()
    }

    /// A watched region changed size, or its handle went away (`None`).
    pub fn observe_resize(&mut self, region: Region, rect: Option<Rect>) -> Option<StickyTransition> {
        match region {
            Region::HeaderContent => self.header = rect,
            Region::ScrollAncestor => self.ancestor = rect,
            Region::WidthProbe => self.probe_width = rect.map(|r| r.width),
        }
        self.reevaluate()
    }

    pub fn placement(&self) -> HeaderPlacement {
        if !self.stuck {
            return HeaderPlacement::InFlow;
        }
        let (Some(ancestor), Some(header)) = (self.ancestor, self.header) else {
            return HeaderPlacement::InFlow;
        };
        HeaderPlacement::Fixed {
            left: header.left,
            top: ancestor.top + self.offset_px,
            width: self.probe_width.unwrap_or(header.width),
        }
    }

    /// Height the in-flow slot keeps while the header is pinned, so content
    /// below does not jump.
    pub fn placeholder_height(&self) -> f32 {
        match (self.stuck, self.header) {
            (true, Some(header)) => header.height,
            _ => 0.0,
        }
    }

    fn reevaluate(&mut self) -> Option<StickyTransition> {
        let (Some(sentinel), Some(ancestor)) = (self.sentinel_offset, self.ancestor) else {
            return None;
        };
        let sentinel_top = ancestor.top + sentinel - self.scroll_top;
        let should_stick = sentinel_top < ancestor.top + self.offset_px;
        if should_stick == self.stuck {
            return None;
        }
        self.stuck = should_stick;
        let transition = if should_stick {
            StickyTransition::Stuck
        } else {
            StickyTransition::Unstuck
        };
        debug!(?transition, scroll_top = self.scroll_top, "sticky header transition");
        Some(transition)
    }
}
