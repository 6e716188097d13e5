//! Flow engine: the turn structure interpreter.
//!
//! ## Key Types
//!
//! - `FlowNode`: authored tree (sequence, loop, conditional, each-player,
//!   phase, action step), built with the free functions in [`node`]
//! - `FlowTree`: the same tree compiled into a preorder arena
//! - `FlowDefinition`: tree + action registry + configuration, validated
//! - `FlowEngine`: the stack interpreter (`advance`, `resume`)
//! - `FlowOutcome`: awaiting an action, or finished with winners
//! - `FlowSnapshot`: serializable execution stack
//!
//! ## Lifecycle
//!
//! ```text
//! FlowNode --compile--> FlowTree --+--> FlowDefinition --> FlowEngine
//!                 ActionRegistry --+        advance() / resume() / state()
//! ```

pub mod definition;
pub mod engine;
pub mod frame;
pub mod node;
pub mod outcome;
pub mod snapshot;
pub mod step;
pub mod tree;

pub use definition::FlowDefinition;
pub use engine::FlowEngine;
pub use frame::{Branch, Frame, FrameData, StepData};
pub use node::{
    action_step, each_player, if_else, loop_while, phase, phase_with, sequence, when,
    ActionStepNode, ConditionalNode, EachPlayerNode, FlowNode, LoopNode, PhaseNode, PlayerOrder,
    StepActor,
};
pub use outcome::{FlowOutcome, PendingStep};
pub use snapshot::FlowSnapshot;
pub use step::{apply_action_result, step_is_complete, StepProgress};
pub use tree::{FlowTree, NodeKind, TreeNode};
