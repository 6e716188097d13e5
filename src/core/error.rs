//! Error types for flow interpretation and action validation.
//!
//! Three kinds, with different recovery contracts:
//!
//! - [`ValidationError`]: a proposed action or selection value was rejected.
//!   Recoverable; the execution stack is untouched.
//! - [`ConfigurationError`]: the authored flow or action set is malformed.
//!   Fatal; meant to surface while a game is being written and tested.
//! - [`ExecutionError`]: the host's action executor failed. Propagated
//!   verbatim with the stack restored to its pre-call state.
//!
//! [`SnapshotError`] covers `restore_state` rejecting a snapshot, and
//! [`FlowError`] wraps the runtime kinds for `advance`/`resume`.

use super::ids::{ElementId, NodeId};
use super::player::PlayerId;

/// A proposed action or selection value was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("flow is finished, no action is awaited")]
    FlowFinished,

    #[error("{actual} cannot act now, waiting on {expected}")]
    WrongActor { expected: PlayerId, actual: PlayerId },

    #[error("unknown action '{action}'")]
    UnknownAction { action: String },

    #[error("action '{action}' is not available")]
    ActionNotAvailable { action: String },

    #[error("missing selection '{selection}'")]
    MissingSelection { selection: String },

    #[error("unexpected argument '{name}'")]
    UnexpectedArgument { name: String },

    #[error("Selection disabled: {reason}")]
    SelectionDisabled { selection: String, reason: String },

    #[error("Invalid selection for '{selection}'")]
    InvalidSelection { selection: String },

    #[error("selection '{selection}' expects {expected}")]
    TypeMismatch { selection: String, expected: String },

    #[error("value for '{selection}' must be between {min} and {max}")]
    OutOfRange { selection: String, min: i64, max: i64 },

    #[error("selection '{selection}' needs at least {min} elements, got {got}")]
    TooFewElements { selection: String, min: usize, got: usize },

    #[error("selection '{selection}' allows at most {max} elements, got {got}")]
    TooManyElements { selection: String, max: usize, got: usize },

    #[error("{element} chosen more than once for '{selection}'")]
    DuplicateElement { selection: String, element: ElementId },

    #[error("selection '{selection}' is not optional")]
    NotOptional { selection: String },

    #[error("selection '{selection}' cannot be filled yet, next is '{expected}'")]
    OutOfOrder { selection: String, expected: String },

    #[error("follow-up expects '{expected}': {detail}")]
    FollowUpMismatch { expected: String, detail: String },

    #[error("action failed: {reason}")]
    ActionFailed { reason: String },
}

/// The authored flow tree or action set is malformed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("loop {node} exceeded its iteration cap of {cap}")]
    IterationCapExceeded { node: NodeId, cap: u32 },

    #[error("action step {node} exceeded the follow-up chain cap of {cap}")]
    FollowUpChainTooLong { node: NodeId, cap: u32 },

    #[error("advance exceeded {cap} transitions without reaching a decision point")]
    TransitionCapExceeded { cap: u32 },

    #[error("action step {node} has no actions")]
    EmptyActionStep { node: NodeId },

    #[error("action step {node} names unregistered action '{action}'")]
    UnknownAction { node: NodeId, action: String },

    #[error("follow-up names unregistered action '{action}'")]
    UnknownFollowUp { action: String },

    #[error("action step {node} has min_moves {min} above max_moves {max}")]
    InvalidMoveBounds { node: NodeId, min: u32, max: u32 },

    #[error("action step {node} has max_moves 0")]
    ZeroMaxMoves { node: NodeId },

    #[error("action step {node} sets min_moves without max_moves or repeat_until and can never complete")]
    UnboundedActionStep { node: NodeId },

    #[error("loop {node} has an iteration cap of 0")]
    ZeroLoopCap { node: NodeId },

    #[error("action step {node} has no actor: no enclosing each-player and the host reports no active player")]
    NoActor { node: NodeId },

    #[error("action '{action}' is registered twice")]
    DuplicateAction { action: String },

    #[error("action '{action}' defines selection '{selection}' twice")]
    DuplicateSelection { action: String, selection: String },

    #[error("selection '{selection}' of action '{action}' depends on '{dependency}', which is not defined before it")]
    UndefinedDependency {
        action: String,
        selection: String,
        dependency: String,
    },

    #[error("selection '{selection}' of action '{action}' has min {min} above max {max}")]
    InvalidElementBounds {
        action: String,
        selection: String,
        min: usize,
        max: usize,
    },

    #[error("value selection '{selection}' of action '{action}' has min {min} above max {max}")]
    InvalidValueBounds {
        action: String,
        selection: String,
        min: i64,
        max: i64,
    },
}

/// The host's action executor failed.
///
/// The message is the host's own; the engine never rewrites it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    /// Create an execution error with the host's message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A snapshot could not be restored against the current flow tree.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot was taken from a different flow tree (fingerprint {found:#x}, expected {expected:#x})")]
    TreeMismatch { expected: u64, found: u64 },

    #[error("snapshot references unknown {node}")]
    UnknownNode { node: NodeId },

    #[error("snapshot does not start at the root node")]
    RootMismatch,

    #[error("frame data for {node} does not match the node kind")]
    FrameMismatch { node: NodeId },

    #[error("{node} is not a child of {parent}")]
    BrokenPath { node: NodeId, parent: NodeId },

    #[error("frame cursor for {node} is out of range")]
    CursorOutOfRange { node: NodeId },

    #[error("snapshot encoding failed: {0}")]
    Encoding(String),
}

impl From<bincode::Error> for SnapshotError {
    fn from(err: bincode::Error) -> Self {
        SnapshotError::Encoding(err.to_string())
    }
}

/// Any error surfaced by `advance` or `resume`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// The execution stack does not fit the tree it runs against.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl FlowError {
    /// Validation and execution errors leave the stack intact and may be retried.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FlowError::Validation(_) | FlowError::Execution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_message() {
        let err = ValidationError::SelectionDisabled {
            selection: "card".into(),
            reason: "tapped".into(),
        };
        assert_eq!(err.to_string(), "Selection disabled: tapped");
    }

    #[test]
    fn test_invalid_message() {
        let err = ValidationError::InvalidSelection {
            selection: "card".into(),
        };
        assert_eq!(err.to_string(), "Invalid selection for 'card'");
    }

    #[test]
    fn test_execution_error_verbatim() {
        let err = FlowError::from(ExecutionError::new("deck is empty"));
        assert_eq!(err.to_string(), "deck is empty");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_configuration_not_recoverable() {
        let err = FlowError::from(ConfigurationError::IterationCapExceeded {
            node: NodeId::new(2),
            cap: 10,
        });
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "loop Node(2) exceeded its iteration cap of 10");
    }
}
