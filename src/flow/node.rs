//! Flow nodes: the authored turn structure.
//!
//! A game's turn structure is a tree of `FlowNode`s, built once at setup
//! with the free builder functions below and then compiled into a
//! [`FlowTree`](super::FlowTree).
//!
//! ## Example
//!
//! ```
//! use rust_gameflow::flow::{action_step, each_player, loop_while, phase, sequence};
//! use rust_gameflow::rules::Condition;
//!
//! let flow = sequence([
//!     phase("setup"),
//!     loop_while(
//!         Condition::check("finished").negate(),
//!         each_player(action_step(["play"]).max_moves(1)),
//!     )
//!     .into(),
//! ]);
//! # let _ = flow;
//! ```

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;
use crate::rules::Condition;

/// A node of the authored flow tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowNode {
    /// Children in order.
    Sequence(Vec<FlowNode>),
    Loop(LoopNode),
    Conditional(ConditionalNode),
    EachPlayer(EachPlayerNode),
    Phase(PhaseNode),
    ActionStep(ActionStepNode),
}

impl FlowNode {
    /// Short variant name for logs.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Sequence(_) => "sequence",
            Self::Loop(_) => "loop",
            Self::Conditional(_) => "conditional",
            Self::EachPlayer(_) => "each_player",
            Self::Phase(_) => "phase",
            Self::ActionStep(_) => "action_step",
        }
    }
}

/// Repeat the body while a condition holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoopNode {
    /// Checked before every iteration.
    pub condition: Condition,
    pub body: Box<FlowNode>,
    /// Overrides `FlowConfig::max_loop_iterations`.
    pub max_iterations: Option<u32>,
}

impl LoopNode {
    /// Set this loop's iteration cap (builder pattern).
    #[must_use]
    pub fn max_iterations(mut self, cap: u32) -> Self {
        self.max_iterations = Some(cap);
        self
    }
}

/// Take one branch, chosen once per entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionalNode {
    pub condition: Condition,
    pub then: Box<FlowNode>,
    pub otherwise: Option<Box<FlowNode>>,
}

/// Order in which an each-player node visits players.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerOrder {
    /// Host seating order.
    #[default]
    Seating,
    /// Seating order reversed.
    Reverse,
    /// Seating order rotated to start with this player.
    StartingWith(PlayerId),
}

/// Run the body once per player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EachPlayerNode {
    pub order: PlayerOrder,
    /// Players for whom this fails are left out when the iteration starts.
    pub filter: Condition,
    pub body: Box<FlowNode>,
}

impl EachPlayerNode {
    /// Set the visiting order (builder pattern).
    #[must_use]
    pub fn order(mut self, order: PlayerOrder) -> Self {
        self.order = order;
        self
    }

    /// Only visit players satisfying `filter` (builder pattern).
    #[must_use]
    pub fn filter(mut self, filter: Condition) -> Self {
        self.filter = filter;
        self
    }
}

/// A named phase. The host is told when it is entered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseNode {
    pub name: String,
    pub body: Option<Box<FlowNode>>,
}

/// Who acts at an action step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepActor {
    /// Player of the innermost each-player, else the host's active player.
    #[default]
    Current,
    /// Always this player.
    Seat(PlayerId),
}

/// Wait for a player's action.
///
/// With none of `min_moves`, `max_moves`, `repeat_until` set, the step
/// takes exactly one action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionStepNode {
    /// Eligible action names.
    pub actions: Vec<String>,
    pub actor: StepActor,
    pub min_moves: Option<u32>,
    pub max_moves: Option<u32>,
    /// Ends the step once it holds after a move and `min_moves` is met.
    pub repeat_until: Option<Condition>,
    /// Step completes without input while this holds.
    pub skip_if: Option<Condition>,
    pub prompt: Option<String>,
}

impl ActionStepNode {
    /// Set who acts (builder pattern).
    #[must_use]
    pub fn actor(mut self, actor: StepActor) -> Self {
        self.actor = actor;
        self
    }

    #[must_use]
    pub fn min_moves(mut self, n: u32) -> Self {
        self.min_moves = Some(n);
        self
    }

    #[must_use]
    pub fn max_moves(mut self, n: u32) -> Self {
        self.max_moves = Some(n);
        self
    }

    #[must_use]
    pub fn repeat_until(mut self, condition: Condition) -> Self {
        self.repeat_until = Some(condition);
        self
    }

    #[must_use]
    pub fn skip_if(mut self, condition: Condition) -> Self {
        self.skip_if = Some(condition);
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }
}

impl From<LoopNode> for FlowNode {
    fn from(node: LoopNode) -> Self {
        Self::Loop(node)
    }
}

impl From<ConditionalNode> for FlowNode {
    fn from(node: ConditionalNode) -> Self {
        Self::Conditional(node)
    }
}

impl From<EachPlayerNode> for FlowNode {
    fn from(node: EachPlayerNode) -> Self {
        Self::EachPlayer(node)
    }
}

impl From<PhaseNode> for FlowNode {
    fn from(node: PhaseNode) -> Self {
        Self::Phase(node)
    }
}

impl From<ActionStepNode> for FlowNode {
    fn from(node: ActionStepNode) -> Self {
        Self::ActionStep(node)
    }
}

/// Run children in order.
pub fn sequence(children: impl IntoIterator<Item = FlowNode>) -> FlowNode {
    FlowNode::Sequence(children.into_iter().collect())
}

/// Repeat `body` while `condition` holds.
pub fn loop_while(condition: Condition, body: impl Into<FlowNode>) -> LoopNode {
    LoopNode {
        condition,
        body: Box::new(body.into()),
        max_iterations: None,
    }
}

/// Run `then` if `condition` holds on entry.
pub fn when(condition: Condition, then: impl Into<FlowNode>) -> FlowNode {
    FlowNode::Conditional(ConditionalNode {
        condition,
        then: Box::new(then.into()),
        otherwise: None,
    })
}

/// Run `then` or `otherwise` depending on `condition` at entry.
pub fn if_else(condition: Condition, then: impl Into<FlowNode>, otherwise: impl Into<FlowNode>) -> FlowNode {
    FlowNode::Conditional(ConditionalNode {
        condition,
        then: Box::new(then.into()),
        otherwise: Some(Box::new(otherwise.into())),
    })
}

/// Run `body` once per seated player.
pub fn each_player(body: impl Into<FlowNode>) -> EachPlayerNode {
    EachPlayerNode {
        order: PlayerOrder::Seating,
        filter: Condition::Always,
        body: Box::new(body.into()),
    }
}

/// A phase marker with no body.
pub fn phase(name: impl Into<String>) -> FlowNode {
    FlowNode::Phase(PhaseNode {
        name: name.into(),
        body: None,
    })
}

/// A phase wrapping `body`.
pub fn phase_with(name: impl Into<String>, body: impl Into<FlowNode>) -> FlowNode {
    FlowNode::Phase(PhaseNode {
        name: name.into(),
        body: Some(Box::new(body.into())),
    })
}

/// Wait for one of `actions` from the current player.
pub fn action_step<S: Into<String>>(actions: impl IntoIterator<Item = S>) -> ActionStepNode {
    ActionStepNode {
        actions: actions.into_iter().map(Into::into).collect(),
        actor: StepActor::Current,
        min_moves: None,
        max_moves: None,
        repeat_until: None,
        skip_if: None,
        prompt: None,
    }
}
