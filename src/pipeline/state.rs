//! Pipeline phase tracking.

use std::fmt;

/// Phases of one harvest run.
///
/// `Failed` and `Done` are terminal. A run with zero search results skips
/// from `Searching` straight to `Indexing`; the index/teardown phase is on
/// every path, so `Indexing` is reachable from every working state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Searching,
    Collecting,
    Loading,
    Indexing,
    Done,
    Failed,
}

impl PipelineState {
    /// Legal transitions of the harvest state machine.
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Searching, Collecting)
                | (Searching, Indexing)
                | (Collecting, Loading)
                | (Loading, Indexing)
                | (Indexing, Done)
                | (Searching, Failed)
                | (Collecting, Failed)
                | (Loading, Failed)
                | (Indexing, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Searching => "searching",
            PipelineState::Collecting => "collecting",
            PipelineState::Loading => "loading",
            PipelineState::Indexing => "indexing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}
