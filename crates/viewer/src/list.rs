/// Seam to the host's virtualized list.
///
/// The list renders only its visible window; the viewer needs nothing from it
/// beyond a programmatic scroll. Position changes flow the other way, through
/// [`crate::TranscriptViewer::on_detail_position_changed`].
pub trait VirtualList {
    /// Scroll so `id` is at the top. Returns false if the list has no such id.
    fn scroll_to_id(&mut self, id: &str) -> bool;
}

/// List double that records scroll requests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingList {
    pub ids: Vec<String>,
    pub scrolled_to: Vec<String>,
}

#[cfg(test)]
impl RecordingList {
    pub fn with_ids<const N: usize>(ids: [&str; N]) -> Self {
        Self {
            ids: ids.iter().map(|id| (*id).to_string()).collect(),
            scrolled_to: Vec::new(),
        }
    }
}

#[cfg(test)]
impl VirtualList for RecordingList {
    fn scroll_to_id(&mut self, id: &str) -> bool {
        if !self.ids.iter().any(|known| known == id) {
            return false;
        }
        self.scrolled_to.push(id.to_string());
        true
    }
}
