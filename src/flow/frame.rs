//! Execution frames.
//!
//! One `Frame` per active node on the interpreter stack. Each node kind has
//! its own fixed frame data; there is no string-keyed bag.

use serde::{Deserialize, Serialize};

use crate::actions::FollowUp;
use crate::core::{NodeId, PlayerId};

use super::tree::NodeKind;

/// Branch taken by a conditional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    Then,
    Otherwise,
    /// Condition failed and there is no `otherwise`.
    Neither,
}

/// Per-frame state of an action step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepData {
    /// Completed moves. Follow-ups do not count until the chain ends.
    pub move_count: u32,
    /// Chained action awaiting input, with its actor resolved.
    pub follow_up: Option<FollowUp>,
    /// Consecutive follow-ups in the current chain.
    pub chain: u32,
}

/// Per-node-kind frame state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameData {
    /// `next` children have been entered.
    Sequence { next: u32 },
    /// `iteration` bodies have been entered.
    Loop { iteration: u32 },
    /// `None` until the condition is evaluated on entry.
    Conditional { branch: Option<Branch> },
    /// `order` is resolved on the first visit; `next` players have been entered.
    EachPlayer { order: Option<Vec<PlayerId>>, next: u32 },
    Phase { entered: bool },
    ActionStep(StepData),
}

impl FrameData {
    /// Fresh data for a node of this kind.
    #[must_use]
    pub fn initial(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Sequence { .. } => Self::Sequence { next: 0 },
            NodeKind::Loop { .. } => Self::Loop { iteration: 0 },
            NodeKind::Conditional { .. } => Self::Conditional { branch: None },
            NodeKind::EachPlayer { .. } => Self::EachPlayer { order: None, next: 0 },
            NodeKind::Phase { .. } => Self::Phase { entered: false },
            NodeKind::ActionStep(_) => Self::ActionStep(StepData::default()),
        }
    }

    /// Does this data belong to a node of this kind?
    #[must_use]
    pub fn matches(&self, kind: &NodeKind) -> bool {
        matches!(
            (self, kind),
            (Self::Sequence { .. }, NodeKind::Sequence { .. })
                | (Self::Loop { .. }, NodeKind::Loop { .. })
                | (Self::Conditional { .. }, NodeKind::Conditional { .. })
                | (Self::EachPlayer { .. }, NodeKind::EachPlayer { .. })
                | (Self::Phase { .. }, NodeKind::Phase { .. })
                | (Self::ActionStep(_), NodeKind::ActionStep(_))
        )
    }
}

/// One active node on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    pub node: NodeId,
    pub data: FrameData,
    /// Set when the node is done; the frame is popped on the next visit.
    pub completed: bool,
}

impl Frame {
    /// A fresh frame for `node`.
    #[must_use]
    pub fn enter(node: NodeId, kind: &NodeKind) -> Self {
        Self {
            node,
            data: FrameData::initial(kind),
            completed: false,
        }
    }
}
