use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::debug;
use tscope_core::jsonl::load_transcript;
use tscope_viewer::{CollapseScope, FileCollapseStore, TranscriptViewer};

use crate::config::{collapse_store_dir, load_config, viewer_options};
use crate::output::{print_rows, row_views, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum ScopeArg {
    Outline,
    Detail,
}

impl From<ScopeArg> for CollapseScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Outline => CollapseScope::Outline,
            ScopeArg::Detail => CollapseScope::Detail,
        }
    }
}

/// Collapse maps are stored per transcript, under its id or file stem.
fn store_key(transcript_id: Option<&str>, file: &Path) -> String {
    let raw = transcript_id
        .map(str::to_string)
        .or_else(|| {
            file.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "transcript".to_string());
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn open_viewer(file: &Path) -> Result<(TranscriptViewer, FileCollapseStore)> {
    let config = load_config()?;
    let transcript = load_transcript(file)
        .with_context(|| format!("Failed to load transcript {}", file.display()))?;
    let key = store_key(transcript.id.as_deref(), file);
    let store = FileCollapseStore::new(collapse_store_dir(&config)?.join(&key));
    debug!(events = transcript.events.len(), store = %store.dir().display(), "transcript loaded");

    let mut viewer = TranscriptViewer::new(&transcript.events, &viewer_options(&config));
    viewer.restore_collapse(&store);
    Ok((viewer, store))
}

/// Print outline rows. `at` simulates the detail list resting on that id.
pub fn run_outline(file: &Path, format: OutputFormat, at: Option<&str>) -> Result<()> {
    let (mut viewer, _) = open_viewer(file)?;
    if let Some(id) = at {
        if !viewer.full_ids().iter().any(|known| known == id) {
            bail!("no event with id {id} in {}", file.display());
        }
        viewer.on_detail_position_changed(id);
    }
    let selected = if at.is_some() {
        viewer.displayed_outline_selection().map(str::to_string)
    } else {
        None
    };
    let rows = row_views(viewer.outline_rows(), selected.as_deref());
    print_rows(&rows, format)
}

pub fn run_detail(file: &Path, format: OutputFormat) -> Result<()> {
    let (viewer, _) = open_viewer(file)?;
    let rows = row_views(&viewer.detail_rows(), None);
    print_rows(&rows, format)
}

pub fn run_toggle(file: &Path, id: &str, scope: ScopeArg) -> Result<()> {
    let (mut viewer, mut store) = open_viewer(file)?;
    if !viewer.full_ids().iter().any(|known| known == id) {
        bail!("no event with id {id} in {}", file.display());
    }
    let collapsed = viewer.toggle_collapsed(scope.into(), id);
    viewer
        .persist_collapse(&mut store)
        .context("Failed to save collapse state")?;
    let state = if collapsed { "collapsed" } else { "expanded" };
    println!("{state} {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key_prefers_transcript_id() {
        assert_eq!(store_key(Some("run/42"), Path::new("a.jsonl")), "run_42");
        assert_eq!(store_key(None, Path::new("/tmp/eval.v2.jsonl")), "eval.v2");
    }
}
