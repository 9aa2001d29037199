use serde::{Deserialize, Serialize};

/// Anything listed in a page that carries a stable id.
pub trait PageItem {
    fn item_id(&self) -> &str;
}

impl PageItem for String {
    fn item_id(&self) -> &str {
        self
    }
}

/// A listed entry as the server sends it: an id plus whatever else the
/// listing includes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteItem {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl PageItem for RemoteItem {
    fn item_id(&self) -> &str {
        &self.id
    }
}

/// One fetched batch. `next_cursor` is opaque; `None` means the listing is
/// exhausted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }
}

/// Cache key: pages fetched under different parameters never mix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageQuery {
    pub location: String,
    #[serde(default)]
    pub filter: String,
    #[serde(default)]
    pub ordering: String,
    pub page_size: usize,
}

impl PageQuery {
    pub fn new(location: impl Into<String>, page_size: usize) -> Self {
        Self {
            location: location.into(),
            filter: String::new(),
            ordering: String::new(),
            page_size,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = ordering.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchDirection {
    #[default]
    Forward,
    Backward,
}

impl FetchDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: PageQuery,
    pub cursor: Option<String>,
    pub limit: usize,
    pub direction: FetchDirection,
}
