//! Request lifecycle states.

use std::fmt;

use tracing::debug;

/// Where a single explain request stands.
///
/// The happy path runs `Idle → EntitiesExtracted → EntitiesResolved →
/// ContextRetrieved → Completed`. `Failed` is reachable from every
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplainStage {
    Idle,
    EntitiesExtracted,
    EntitiesResolved,
    ContextRetrieved,
    Completed,
    Failed,
}

impl ExplainStage {
    /// The next state on the happy path.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::EntitiesExtracted),
            Self::EntitiesExtracted => Some(Self::EntitiesResolved),
            Self::EntitiesResolved => Some(Self::ContextRetrieved),
            Self::ContextRetrieved => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(self, to: Self) -> bool {
        match to {
            Self::Failed => !self.is_terminal(),
            // Blank input skips straight to completion.
            Self::Completed if self == Self::Idle => true,
            _ => self.next() == Some(to),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::EntitiesExtracted => "entities_extracted",
            Self::EntitiesResolved => "entities_resolved",
            Self::ContextRetrieved => "context_retrieved",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ExplainStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one request through its states.
#[derive(Debug)]
pub(crate) struct StageTracker {
    stage: ExplainStage,
}

impl StageTracker {
    pub(crate) fn new() -> Self {
        Self { stage: ExplainStage::Idle }
    }

    pub(crate) fn stage(&self) -> ExplainStage {
        self.stage
    }

    /// Move to `to`. Illegal transitions are ignored and logged.
    pub(crate) fn advance(&mut self, to: ExplainStage) {
        if self.stage.can_transition_to(to) {
            debug!(from = %self.stage, to = %to, "explain stage");
            self.stage = to;
        } else {
            debug!(from = %self.stage, to = %to, "ignored illegal stage transition");
        }
    }
}
