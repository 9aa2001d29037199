//! Viewer-side state for a transcript outline/detail view: scoped collapse
//! persistence, outline <-> detail scroll synchronization and the sticky
//! header.

pub mod error;
pub mod list;
pub mod state;
pub mod sticky;
pub mod sync;
pub mod viewer;

pub use error::{Result, StoreError};
pub use list::VirtualList;
pub use state::{CollapseScope, CollapseStore, FileCollapseStore, MemoryCollapseStore, ViewerState};
pub use sticky::{HeaderPlacement, Rect, Region, StickyHeader, StickyTransition};
pub use sync::{OutlineSync, ScrollTracker};
pub use viewer::{TranscriptViewer, ViewerOptions};
