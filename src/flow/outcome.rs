//! What `advance` and `resume` report.

use serde::{Deserialize, Serialize};

use crate::actions::FollowUp;
use crate::core::{NodeId, PlayerId};

/// An action step waiting for input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingStep {
    /// The action step node.
    pub node: NodeId,
    /// Who must act.
    pub actor: PlayerId,
    /// Actions available to `actor`, in the order the step lists them.
    pub actions: Vec<String>,
    pub prompt: Option<String>,
    /// Set when the step waits on a chained action. `actions` then holds
    /// only that action.
    pub follow_up: Option<FollowUp>,
    /// Moves completed at this step so far.
    pub move_count: u32,
}

impl PendingStep {
    /// Is `action` among the eligible actions?
    #[must_use]
    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }
}

/// Result of driving the interpreter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowOutcome {
    /// Suspended at an action step.
    AwaitingAction(PendingStep),
    /// The flow tree is exhausted.
    Finished { winners: Vec<PlayerId> },
}

impl FlowOutcome {
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished { .. })
    }

    /// The waiting step, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingStep> {
        match self {
            Self::AwaitingAction(step) => Some(step),
            Self::Finished { .. } => None,
        }
    }

    /// Who must act next.
    #[must_use]
    pub fn actor(&self) -> Option<PlayerId> {
        self.pending().map(|step| step.actor)
    }

    /// Eligible action names; empty once finished.
    #[must_use]
    pub fn eligible_actions(&self) -> &[String] {
        match self {
            Self::AwaitingAction(step) => &step.actions,
            Self::Finished { .. } => &[],
        }
    }

    /// Winners, once finished.
    #[must_use]
    pub fn winners(&self) -> Option<&[PlayerId]> {
        match self {
            Self::Finished { winners } => Some(winners),
            Self::AwaitingAction(_) => None,
        }
    }
}
