use tscope_core::{EventKind, Node, NodeBody};

use crate::fold::fold_adjacent_runs;
use crate::visitor::{BoxedVisitor, Visitor};

pub const SCORING_LABEL: &str = "scoring";

/// Folds adjacent score events at the same depth into one `"scoring"` node,
/// whatever the run length.
#[derive(Debug, Clone, Default)]
pub struct CollapseAdjacentScores;

impl Visitor for CollapseAdjacentScores {
    fn name(&self) -> &'static str {
        "collapse_adjacent_scores"
    }

    fn visit(&self, nodes: Vec<Node>) -> Vec<Node> {
        fold_adjacent_runs(
            nodes,
            |node| node.is_kind(EventKind::Score),
            |run| {
                let id = run[0].id.clone();
                let depth = run[0].depth;
                Node::synthetic(
                    id,
                    depth,
                    NodeBody::Scoring {
                        label: SCORING_LABEL.to_string(),
                    },
                    run,
                )
            },
        )
    }
}

pub fn collapse_adjacent_scores() -> BoxedVisitor {
    Box::new(CollapseAdjacentScores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tscope_core::testing::{self, node};

    fn scores(count: usize) -> Vec<Node> {
        (0..count)
            .map(|i| node(1, testing::score(&format!("s{i}"))))
            .collect()
    }

    fn assert_scoring(node: &Node) {
        match &node.body {
            NodeBody::Scoring { label } => assert_eq!(label, "scoring"),
            other => panic!("expected scoring node, got {other:?}"),
        }
    }

    #[test]
    fn single_score_still_collapses() {
        let out = CollapseAdjacentScores.visit(scores(1));
        assert_eq!(out.len(), 1);
        assert_scoring(&out[0]);
        assert_eq!(out[0].id, "s0");
    }

    #[test]
    fn five_scores_collapse_with_the_same_label() {
        let out = CollapseAdjacentScores.visit(scores(5));
        assert_eq!(out.len(), 1);
        assert_scoring(&out[0]);
        assert_eq!(out[0].children.len(), 5);
    }

    #[test]
    fn other_nodes_split_score_runs() {
        let mut input = scores(2);
        input.push(node(1, testing::model("m", "gpt")));
        input.push(node(1, testing::score("late")));
        let out = CollapseAdjacentScores.visit(input);
        assert_eq!(out.len(), 3);
        assert_scoring(&out[0]);
        assert_eq!(out[1].id, "m");
        assert_scoring(&out[2]);
    }
}
