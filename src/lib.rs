//! # rust-gameflow
//!
//! A turn-structure interpreter and action selection engine for turn-based
//! games.
//!
//! ## Design Principles
//!
//! 1. **Game-Agnostic**: No hardcoded turns, phases, or actions. Games
//!    describe their turn structure as a `FlowNode` tree and their moves as
//!    `ActionDefinition`s, then plug in through `GameHost`.
//!
//! 2. **N-Player First**: Seating comes from the host. Nothing assumes two
//!    players.
//!
//! 3. **Data, Not Closures**: Conditions name host predicates by id, so the
//!    flow tree and the execution stack are plain serializable data.
//!
//! ## Architecture
//!
//! - **Suspending Interpreter**: `FlowEngine::advance` runs until a player
//!   must act, then returns. `resume` delivers the action. No threads, no
//!   blocking.
//!
//! - **Persistent Data Structures**: O(1) stack checkpoints via `im-rs`, so
//!   every call is all-or-nothing.
//!
//! - **Stateless Validation**: `SelectionEngine` recomputes candidates from
//!   the host on every query.
//!
//! ## Modules
//!
//! - `core`: Players, identifiers, configuration, errors
//! - `rules`: `GameHost` trait, predicate scope, conditions
//! - `actions`: Action definitions, selections, validation, auto-fill
//! - `flow`: Flow tree, frames, interpreter, snapshots
//! - `games`: Reference game

pub mod core;
pub mod rules;
pub mod actions;
pub mod flow;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, NodeId, ElementId, PredicateId, ChoiceSourceId,
    FlowConfig,
    ValidationError, ConfigurationError, ExecutionError, SnapshotError, FlowError,
};

pub use crate::rules::{GameHost, Scope, SelectionScope, Condition, ConditionEvaluator};

pub use crate::actions::{
    ActionDefinition, ActionRegistry, ActionResult, FollowUp,
    Selection, SelectionKind, ValueKind, Choice, ChoiceSource,
    ArgValue, Args, AutoFill, SelectionEngine, PendingAction,
};

pub use crate::flow::{
    FlowNode, FlowTree, FlowDefinition, FlowEngine, FlowOutcome, PendingStep, FlowSnapshot,
    Frame, FrameData, StepActor, PlayerOrder,
};
