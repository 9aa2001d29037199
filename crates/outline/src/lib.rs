//! Outline construction: a composable pipeline of structural rewrites over a
//! flattened transcript, plus the turn and scoring aggregators.

mod fold;
pub mod outline;
pub mod pipeline;
pub mod scores;
pub mod turns;
pub mod visitor;

pub use outline::{
    flatten, outline_label, outline_visitors, OutlineOptions, DEFAULT_REMOVED_EVENT_TYPES,
    DEFAULT_REMOVED_SPAN_NAMES,
};
pub use pipeline::{fingerprint, OutlinePipeline, PipelineKey};
pub use scores::{collapse_adjacent_scores, CollapseAdjacentScores, SCORING_LABEL};
pub use turns::{
    collapse_adjacent_turns, group_into_turns, turn_run_label, CollapseAdjacentTurns,
    GroupIntoTurns,
};
pub use visitor::{
    hide_scorer_children, remove_by_event_type, remove_named_span, run_pipeline, BoxedVisitor,
    HideScorerChildren, RemoveByEventType, RemoveNamedSpan, Visitor, SCORER_GROUP_TYPE,
    SCORER_TYPE,
};
