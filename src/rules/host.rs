//! Host trait for game implementations.
//!
//! Games implement `GameHost` to supply everything the engine cannot know:
//! - Who is seated
//! - What registered predicates mean
//! - What the current candidates of a dynamic selection are
//! - How an accepted action changes the game
//! - Who won

use crate::actions::{ActionResult, Args, Choice};
use crate::core::{ChoiceSourceId, ExecutionError, PlayerId, PredicateId};

/// Evaluation context handed to predicates.
///
/// Built from the execution stack: the innermost each-player iteration
/// supplies `current_player`, the innermost loop supplies `loop_iteration`,
/// the innermost phase supplies `phase`. `actor` is set while evaluating
/// action legality and action-step conditions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Scope<'a> {
    /// Player of the innermost each-player iteration.
    pub current_player: Option<PlayerId>,
    /// Player an action step is waiting on.
    pub actor: Option<PlayerId>,
    /// Iterations of the innermost loop entered so far. 1-based inside the
    /// body; 0 while the loop condition is checked the first time.
    pub loop_iteration: Option<u32>,
    /// Name of the innermost phase.
    pub phase: Option<&'a str>,
}

impl<'a> Scope<'a> {
    /// A scope that only carries an actor.
    #[must_use]
    pub fn for_actor(actor: PlayerId) -> Self {
        Self {
            actor: Some(actor),
            ..Self::default()
        }
    }

    /// Set the actor (builder pattern).
    #[must_use]
    pub fn with_actor(mut self, actor: PlayerId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the current player (builder pattern).
    #[must_use]
    pub fn with_current_player(mut self, player: PlayerId) -> Self {
        self.current_player = Some(player);
        self
    }
}

/// Context handed to dynamic candidate enumerators.
///
/// `args` only holds selections that come before the one being enumerated.
#[derive(Clone, Copy, Debug)]
pub struct SelectionScope<'a> {
    /// The player building the action.
    pub actor: PlayerId,
    /// The action being built.
    pub action: &'a str,
    /// The selection being enumerated.
    pub selection: &'a str,
    /// Values of earlier selections.
    pub args: &'a Args,
}

/// Host trait.
///
/// ## Implementation Notes
///
/// - `check`: unknown predicate ids should return `false`
/// - `choices`: recomputed on every call, never cached by the engine
/// - `execute`: only called after the arguments passed validation
/// - `winners`: read once the flow tree is exhausted
pub trait GameHost {
    /// Players in seating order.
    fn players(&self) -> Vec<PlayerId>;

    /// Fallback actor for action steps outside any each-player node.
    fn active_player(&self) -> Option<PlayerId> {
        None
    }

    /// Evaluate a registered predicate.
    fn check(&self, predicate: &PredicateId, scope: &Scope<'_>) -> bool;

    /// Enumerate the current candidates of a dynamic selection.
    fn choices(&self, _source: &ChoiceSourceId, _scope: &SelectionScope<'_>) -> Vec<Choice> {
        Vec::new()
    }

    /// Apply a validated action.
    fn execute(
        &mut self,
        action: &str,
        args: &Args,
        actor: PlayerId,
    ) -> Result<ActionResult, ExecutionError>;

    /// Called when the interpreter enters a phase.
    fn enter_phase(&mut self, _phase: &str) {}

    /// Winners, read when the flow finishes.
    fn winners(&self) -> Vec<PlayerId> {
        Vec::new()
    }
}
