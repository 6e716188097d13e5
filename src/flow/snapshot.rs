//! Execution stack snapshots.
//!
//! A `FlowSnapshot` is the engine's entire mutable state: the frames from
//! the root to the active node, plus the fingerprint of the tree they were
//! taken from. Only ordered containers are involved, so two stacks with the
//! same logical state encode to the same bytes.

use serde::{Deserialize, Serialize};

use crate::core::{FlowConfig, NodeId, SnapshotError};

use super::frame::{Branch, Frame, FrameData};
use super::tree::{FlowTree, NodeKind};

/// Serializable execution stack.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub tree_fingerprint: u64,
    /// Bottom (root) first.
    pub frames: Vec<Frame>,
}

impl FlowSnapshot {
    /// Canonical binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode from [`to_bytes`](Self::to_bytes) output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// Check that the frames describe a single path through `tree`.
    ///
    /// Every frame must name a node of the tree with matching data, the
    /// first frame must be the root, and each frame must be the child its
    /// parent frame's cursor points at.
    pub fn validate_against(&self, tree: &FlowTree, config: &FlowConfig) -> Result<(), SnapshotError> {
        if self.tree_fingerprint != tree.fingerprint() {
            return Err(SnapshotError::TreeMismatch {
                expected: tree.fingerprint(),
                found: self.tree_fingerprint,
            });
        }

        if let Some(first) = self.frames.first() {
            if first.node != tree.root() {
                return Err(SnapshotError::RootMismatch);
            }
        }

        // Every frame is checked on its own before any link between frames.
        let mut kinds = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            let node = tree
                .get(frame.node)
                .ok_or(SnapshotError::UnknownNode { node: frame.node })?;
            if !frame.data.matches(&node.kind) {
                return Err(SnapshotError::FrameMismatch { node: frame.node });
            }
            check_cursor(frame, &node.kind, config)?;
            kinds.push(&node.kind);
        }

        for (pair, kind) in self.frames.windows(2).zip(kinds) {
            let (frame, above) = (&pair[0], &pair[1]);
            if active_child(frame, kind) != Some(above.node) {
                return Err(SnapshotError::BrokenPath {
                    node: above.node,
                    parent: frame.node,
                });
            }
        }
        Ok(())
    }
}

/// Child a frame is currently running, judged from its data.
fn active_child(frame: &Frame, kind: &NodeKind) -> Option<NodeId> {
    if frame.completed {
        return None;
    }
    match (&frame.data, kind) {
        (FrameData::Sequence { next }, NodeKind::Sequence { children }) => {
            let index = (*next as usize).checked_sub(1)?;
            children.get(index).copied()
        }
        (FrameData::Loop { iteration }, NodeKind::Loop { body, .. }) if *iteration > 0 => Some(*body),
        (FrameData::Conditional { branch }, NodeKind::Conditional { then, otherwise, .. }) => match branch {
            Some(Branch::Then) => Some(*then),
            Some(Branch::Otherwise) => *otherwise,
            _ => None,
        },
        (FrameData::EachPlayer { order: Some(_), next }, NodeKind::EachPlayer { body, .. }) if *next > 0 => {
            Some(*body)
        }
        (FrameData::Phase { entered: true }, NodeKind::Phase { body, .. }) => *body,
        _ => None,
    }
}

fn check_cursor(frame: &Frame, kind: &NodeKind, config: &FlowConfig) -> Result<(), SnapshotError> {
    let in_range = match (&frame.data, kind) {
        (FrameData::Sequence { next }, NodeKind::Sequence { children }) => *next as usize <= children.len(),
        (FrameData::Loop { iteration }, NodeKind::Loop { max_iterations, .. }) => {
            *iteration <= max_iterations.unwrap_or(config.max_loop_iterations)
        }
        (FrameData::Conditional { branch: Some(Branch::Otherwise) }, NodeKind::Conditional { otherwise, .. }) => {
            otherwise.is_some()
        }
        (FrameData::EachPlayer { order, next }, _) => match order {
            Some(order) => *next as usize <= order.len(),
            None => *next == 0,
        },
        (FrameData::ActionStep(step), NodeKind::ActionStep(node)) => {
            frame.completed
                || step.follow_up.is_some()
                || node.max_moves.map_or(true, |max| step.move_count < max)
        }
        _ => true,
    };

    if in_range {
        Ok(())
    } else {
        Err(SnapshotError::CursorOutOfRange { node: frame.node })
    }
}
