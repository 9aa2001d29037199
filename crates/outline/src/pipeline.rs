use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::debug;
use tscope_core::{CollapseState, Node, NodeBody};

use crate::outline::flatten;
use crate::visitor::BoxedVisitor;

/// Inputs that fully determine an outline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineKey {
    pub tree_fingerprint: u64,
    pub collapse_version: Option<u64>,
    pub default_collapsed: bool,
}

/// Visitor list plus the last computed outline.
///
/// The outline is a pure function of the tree, the collapse map and the
/// visitors, so a key match returns the cached rows and a miss recomputes
/// from scratch.
pub struct OutlinePipeline {
    visitors: Vec<BoxedVisitor>,
    cached: Option<(PipelineKey, Vec<Node>)>,
    runs: u64,
}

impl OutlinePipeline {
    pub fn new(visitors: Vec<BoxedVisitor>) -> Self {
        Self {
            visitors,
            cached: None,
            runs: 0,
        }
    }

    pub fn visitors(&self) -> &[BoxedVisitor] {
        &self.visitors
    }

    /// Number of full recomputations so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    pub fn outline(
        &mut self,
        roots: &[Node],
        collapse: Option<&CollapseState>,
        default_collapsed: bool,
    ) -> &[Node] {
        let key = PipelineKey {
            tree_fingerprint: fingerprint(roots),
            collapse_version: collapse.map(CollapseState::version),
            default_collapsed,
        };

        let hit = matches!(&self.cached, Some((cached_key, _)) if *cached_key == key);
        if !hit {
            let rows = flatten(roots, collapse, default_collapsed, &self.visitors);
            self.runs += 1;
            debug!(rows = rows.len(), runs = self.runs, "outline recomputed");
            self.cached = Some((key, rows));
        }

        self.cached
            .as_ref()
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }
}

/// Structural hash of a tree: ids, depths and node kinds in pre-order.
pub fn fingerprint(roots: &[Node]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for root in roots {
        root.walk(&mut |node| {
            node.id.hash(&mut hasher);
            node.depth.hash(&mut hasher);
            match &node.body {
                NodeBody::Event(event) => event.kind().hash(&mut hasher),
                NodeBody::Turn { label } => ("turn", label).hash(&mut hasher),
                NodeBody::TurnRun { count, .. } => ("turn_run", count).hash(&mut hasher),
                NodeBody::Scoring { .. } => "scoring".hash(&mut hasher),
            }
        });
    }
    roots.len().hash(&mut hasher);
    hasher.finish()
}
