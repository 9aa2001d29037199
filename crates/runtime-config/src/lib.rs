//! Viewer configuration types.
//!
//! The `tscope` binary reads and writes `tscope.toml` using these types. Event
//! kinds are kept as strings here; the binary parses them against the event
//! model and reports anything it does not recognize.

use serde::{Deserialize, Serialize};

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "tscope.toml";

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;

/// Top-level configuration (persisted as `tscope.toml`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ViewerConfig {
    #[serde(default)]
    pub outline: OutlineSettings,
    #[serde(default)]
    pub detail: DetailSettings,
    #[serde(default)]
    pub pager: PagerSettings,
    #[serde(default)]
    pub sticky: StickySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineSettings {
    /// Event kinds dropped from the outline before turns are grouped.
    #[serde(default = "default_removed_event_types")]
    pub removed_event_types: Vec<String>,
    /// Span and step names dropped from the outline.
    #[serde(default = "default_removed_span_names")]
    pub removed_span_names: Vec<String>,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            removed_event_types: default_removed_event_types(),
            removed_span_names: default_removed_span_names(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DetailSettings {
    /// Collapse every expandable node until the user opens it.
    #[serde(default = "default_false")]
    pub default_collapsed: bool,
    /// Where collapse state is persisted. Defaults to `collapse/` next to the
    /// config file.
    #[serde(default)]
    pub collapse_store_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PagerSettings {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub ordering: ListOrdering,
}

impl Default for PagerSettings {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            page_size: DEFAULT_PAGE_SIZE,
            ordering: ListOrdering::Newest,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ListOrdering {
    #[default]
    #[serde(alias = "desc", alias = "latest")]
    Newest,
    #[serde(alias = "asc", alias = "earliest")]
    Oldest,
    /// Unknown/invalid values are normalized by compatibility fallbacks.
    #[serde(other)]
    Unknown,
}

impl ListOrdering {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StickySettings {
    /// Distance below the scroll container's top edge at which the header pins.
    #[serde(default)]
    pub offset_px: f32,
}

// ── Serde default functions ─────────────────────────────────────────────

fn default_false() -> bool {
    false
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_server_url() -> String {
    "http://localhost:8080".to_string()
}

pub const DEFAULT_REMOVED_EVENT_TYPES: &[&str] = &[
    "logger",
    "info",
    "state",
    "store",
    "approval",
    "input",
    "sandbox",
    "sample_init",
];

pub const DEFAULT_REMOVED_SPAN_NAMES: &[&str] = &["init", "sample_init"];

pub fn default_removed_event_types() -> Vec<String> {
    DEFAULT_REMOVED_EVENT_TYPES
        .iter()
        .map(|kind| (*kind).to_string())
        .collect()
}

pub fn default_removed_span_names() -> Vec<String> {
    DEFAULT_REMOVED_SPAN_NAMES
        .iter()
        .map(|name| (*name).to_string())
        .collect()
}

/// Apply compatibility fallbacks after loading raw TOML.
/// Returns true when any field was updated.
pub fn apply_compat_fallbacks(config: &mut ViewerConfig) -> bool {
    let mut changed = false;

    if config.pager.ordering == ListOrdering::Unknown {
        config.pager.ordering = ListOrdering::Newest;
        changed = true;
    }

    if config.pager.page_size == 0 {
        config.pager.page_size = DEFAULT_PAGE_SIZE;
        changed = true;
    } else if config.pager.page_size > MAX_PAGE_SIZE {
        config.pager.page_size = MAX_PAGE_SIZE;
        changed = true;
    }

    if config.pager.server_url.trim().is_empty() {
        config.pager.server_url = default_server_url();
        changed = true;
    }

    if !config.sticky.offset_px.is_finite() || config.sticky.offset_px < 0.0 {
        config.sticky.offset_px = 0.0;
        changed = true;
    }

    if config
        .detail
        .collapse_store_dir
        .as_deref()
        .is_some_and(|dir| dir.trim().is_empty())
    {
        config.detail.collapse_store_dir = None;
        changed = true;
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg: ViewerConfig = toml::from_str("").expect("parse toml");
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.pager.page_size, 50);
        assert!(cfg.outline.removed_event_types.contains(&"info".to_string()));
        assert_eq!(cfg.outline.removed_span_names, vec!["init", "sample_init"]);
    }

    #[test]
    fn apply_compat_fallbacks_repairs_out_of_range_values() {
        let mut cfg: ViewerConfig = toml::from_str(
            r#"
[pager]
server_url = "  "
page_size = 0
ordering = "sideways"

[sticky]
offset_px = -4.0

[detail]
collapse_store_dir = ""
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.pager.ordering, ListOrdering::Unknown);

        assert!(apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg.pager.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(cfg.pager.ordering, ListOrdering::Newest);
        assert_eq!(cfg.pager.server_url, "http://localhost:8080");
        assert_eq!(cfg.sticky.offset_px, 0.0);
        assert_eq!(cfg.detail.collapse_store_dir, None);
    }

    #[test]
    fn oversized_pages_are_clamped() {
        let mut cfg = ViewerConfig::default();
        cfg.pager.page_size = 10_000;
        assert!(apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg.pager.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn apply_compat_fallbacks_is_noop_for_modern_values() {
        let mut cfg: ViewerConfig = toml::from_str(
            r#"
[pager]
page_size = 20
ordering = "oldest"
"#,
        )
        .expect("parse toml");

        let before = cfg.clone();
        assert!(!apply_compat_fallbacks(&mut cfg));
        assert_eq!(cfg, before);
    }

    #[test]
    fn ordering_aliases_are_accepted() {
        let cfg: ViewerConfig = toml::from_str(
            r#"
[pager]
ordering = "asc"
"#,
        )
        .expect("parse toml");
        assert_eq!(cfg.pager.ordering, ListOrdering::Oldest);
    }

    #[test]
    fn empty_removal_lists_are_kept() {
        let mut cfg: ViewerConfig = toml::from_str(
            r#"
[outline]
removed_event_types = []
removed_span_names = []
"#,
        )
        .expect("parse toml");
        assert!(!apply_compat_fallbacks(&mut cfg));
        assert!(cfg.outline.removed_event_types.is_empty());
        assert!(cfg.outline.removed_span_names.is_empty());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let mut cfg = ViewerConfig::default();
        cfg.detail.default_collapsed = true;
        cfg.detail.collapse_store_dir = Some("/tmp/collapse".to_string());
        let encoded = toml::to_string(&cfg).expect("serialize config");
        assert!(encoded.contains("[pager]"));
        let decoded: ViewerConfig = toml::from_str(&encoded).expect("parse config");
        assert_eq!(decoded, cfg);
    }
}
