use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;
use tscope_core::CollapseState;

use crate::error::{Result, StoreError};
use crate::sticky::StickyHeader;
use crate::sync::OutlineSync;

/// Independent collapse namespace. The outline and the detail list never
/// share collapse state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CollapseScope {
    Outline,
    Detail,
    Named(String),
}

impl CollapseScope {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Outline => "outline",
            Self::Detail => "detail",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for CollapseScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-provided persistence for collapse maps. Durability is the host's call.
pub trait CollapseStore {
    fn load(&self, scope: &CollapseScope) -> Result<Option<CollapseState>>;
    fn save(&mut self, scope: &CollapseScope, state: &CollapseState) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryCollapseStore {
    scopes: HashMap<CollapseScope, CollapseState>,
}

impl CollapseStore for MemoryCollapseStore {
    fn load(&self, scope: &CollapseScope) -> Result<Option<CollapseState>> {
        Ok(self.scopes.get(scope).cloned())
    }

    fn save(&mut self, scope: &CollapseScope, state: &CollapseState) -> Result<()> {
        self.scopes.insert(scope.clone(), state.clone());
        Ok(())
    }
}

/// One JSON file per scope under `dir`.
#[derive(Debug, Clone)]
pub struct FileCollapseStore {
    dir: PathBuf,
}

impl FileCollapseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, scope: &CollapseScope) -> PathBuf {
        let file_stem: String = scope
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_stem}.collapse.json"))
    }
}

impl CollapseStore for FileCollapseStore {
    fn load(&self, scope: &CollapseScope) -> Result<Option<CollapseState>> {
        let path = self.path_for(scope);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let state = serde_json::from_str(&content)
            .map_err(|source| StoreError::Json { path, source })?;
        Ok(Some(state))
    }

    fn save(&mut self, scope: &CollapseScope, state: &CollapseState) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(scope);
        let content = serde_json::to_string_pretty(state).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| StoreError::Io { path, source })
    }
}

/// Mutable UI state of one viewer instance.
///
/// Construct one per viewer and pass it by reference; nothing here is
/// process-global, so several viewers can coexist.
#[derive(Debug, Default)]
pub struct ViewerState {
    collapse: HashMap<CollapseScope, CollapseState>,
    pub sync: OutlineSync,
    pub sticky: StickyHeader,
}

impl ViewerState {
    pub fn new(sticky: StickyHeader) -> Self {
        Self {
            collapse: HashMap::new(),
            sync: OutlineSync::default(),
            sticky,
        }
    }

    pub fn collapse(&self, scope: &CollapseScope) -> Option<&CollapseState> {
        self.collapse.get(scope)
    }

    pub fn collapse_mut(&mut self, scope: &CollapseScope) -> &mut CollapseState {
        self.collapse.entry(scope.clone()).or_default()
    }

    /// Pull every listed scope from `store`. Unreadable scopes start empty.
    pub fn restore(&mut self, store: &dyn CollapseStore, scopes: &[CollapseScope]) {
        for scope in scopes {
            match store.load(scope) {
                Ok(Some(state)) => {
                    self.collapse.insert(scope.clone(), state);
                }
                Ok(None) => {}
                Err(e) => warn!("collapse state for {scope} unreadable, starting empty: {e}"),
            }
        }
    }

    pub fn persist(&self, store: &mut dyn CollapseStore, scope: &CollapseScope) -> Result<()> {
        match self.collapse.get(scope) {
            Some(state) => store.save(scope, state),
            None => Ok(()),
        }
    }
}
