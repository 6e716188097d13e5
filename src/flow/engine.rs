//! The flow interpreter.
//!
//! `FlowEngine` walks a compiled `FlowTree` with an explicit stack of
//! frames. It never blocks: `advance` runs until an action step needs input
//! or the tree is exhausted, then returns. The stack is the engine's whole
//! mutable state and can be saved with `state` and restored with
//! `restore_state`.
//!
//! ## Transactions
//!
//! `advance`, `resume` and `record_external_action` each checkpoint the
//! stack on entry. On any error the checkpoint is put back, so a rejected
//! or failed call leaves the stack exactly as it was. `im::Vector` makes
//! the checkpoint a constant-time clone.
//!
//! ## Example
//!
//! ```
//! use rust_gameflow::actions::Args;
//! use rust_gameflow::core::PlayerId;
//! use rust_gameflow::flow::{FlowEngine, FlowOutcome};
//! use rust_gameflow::games::race::RaceGameBuilder;
//!
//! let (definition, mut game) = RaceGameBuilder::new().players(2).target(3).build().unwrap();
//! let mut engine = FlowEngine::new(definition).unwrap();
//!
//! let outcome = engine.advance(&mut game).unwrap();
//! assert_eq!(outcome.actor(), Some(PlayerId::new(0)));
//!
//! let outcome = engine
//!     .resume(&mut game, "add", Args::new().with("amount", 3i64), PlayerId::new(0))
//!     .unwrap();
//! assert!(matches!(outcome, FlowOutcome::Finished { .. }));
//! assert_eq!(outcome.winners(), Some(&[PlayerId::new(0)][..]));
//! ```

use std::sync::Arc;

use im::Vector;
use tracing::{debug, trace, warn};

use crate::actions::{ActionResult, Args, AutoFill, PendingAction, SelectionEngine};
use crate::core::{
    ConfigurationError, FlowError, NodeId, PlayerId, SnapshotError, ValidationError,
};
use crate::rules::{Condition, ConditionEvaluator, GameHost, Scope};

use super::definition::FlowDefinition;
use super::frame::{Branch, Frame, FrameData, StepData};
use super::node::{ActionStepNode, PlayerOrder, StepActor};
use super::outcome::{FlowOutcome, PendingStep};
use super::snapshot::FlowSnapshot;
use super::step::{apply_action_result, step_is_complete, StepProgress};
use super::tree::{FlowTree, NodeKind};

/// Stack-based flow interpreter.
#[derive(Clone, Debug)]
pub struct FlowEngine {
    definition: Arc<FlowDefinition>,
    /// Root first; the last frame is the active node.
    stack: Vector<Frame>,
}

impl FlowEngine {
    /// Create an engine positioned at the root of `definition`.
    pub fn new(definition: FlowDefinition) -> Result<Self, ConfigurationError> {
        Self::from_shared(Arc::new(definition))
    }

    /// Create an engine over a definition shared with other engines.
    pub fn from_shared(definition: Arc<FlowDefinition>) -> Result<Self, ConfigurationError> {
        definition.validate()?;
        let root = definition.tree.root();
        let mut stack = Vector::new();
        stack.push_back(Frame::enter(root, &definition.tree.node(root).kind));
        Ok(Self { definition, stack })
    }

    /// The definition this engine runs.
    #[must_use]
    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    /// Drive the interpreter to the next decision point.
    ///
    /// Calling this again without an intervening `resume` returns the same
    /// outcome.
    pub fn advance<G: GameHost + ?Sized>(&mut self, host: &mut G) -> Result<FlowOutcome, FlowError> {
        let checkpoint = self.stack.clone();
        let result = self.run(host);
        if let Err(err) = &result {
            debug!(error = %err, "advance failed, stack restored");
            self.stack = checkpoint;
        }
        result
    }

    /// Deliver a filled action from `actor` and continue.
    ///
    /// The action must be eligible at the current step and its arguments
    /// must validate. When the step waits on a follow-up, its pre-filled
    /// arguments are merged in and may not be contradicted.
    ///
    /// ## Errors
    ///
    /// Validation and execution errors mean the host did not apply the
    /// action, so the call can simply be retried. A configuration error (follow-up chain,
    /// iteration or transition cap) can be raised after `execute` has
    /// already changed the host. The stack is still restored, but the host
    /// is not, so such an error is fatal for the session and the action
    /// must not be resumed again. `FlowError::is_recoverable` tells the two
    /// apart.
    pub fn resume<G: GameHost + ?Sized>(
        &mut self,
        host: &mut G,
        action: &str,
        args: Args,
        actor: PlayerId,
    ) -> Result<FlowOutcome, FlowError> {
        let checkpoint = self.stack.clone();
        let result = self.try_resume(host, action, args, actor);
        if let Err(err) = &result {
            debug!(%action, %actor, error = %err, "resume rejected, stack restored");
            self.stack = checkpoint;
        }
        result
    }

    fn try_resume<G: GameHost + ?Sized>(
        &mut self,
        host: &mut G,
        action: &str,
        args: Args,
        actor: PlayerId,
    ) -> Result<FlowOutcome, FlowError> {
        let step = self.awaiting(host)?;
        self.check_eligible(&step, action, actor)?;

        let definition = Arc::clone(&self.definition);
        let action_def = definition
            .actions
            .get(action)
            .ok_or_else(|| ValidationError::UnknownAction {
                action: action.to_string(),
            })?;

        let args = merge_follow_up(&step, args)?;
        SelectionEngine::validate_args(&*host, action_def, &args, actor)?;

        let result = host.execute(action, &args, actor)?;
        debug!(%action, %actor, success = result.success, "action executed");

        self.complete_step(&*host, actor, &result)?;
        self.run(host)
    }

    /// Complete the current step with an action executed outside `resume`.
    ///
    /// The result goes through the same completion routine `resume` uses.
    /// As with [`resume`](Self::resume), a configuration error here is
    /// fatal: the host has already applied the action.
    pub fn record_external_action<G: GameHost + ?Sized>(
        &mut self,
        host: &mut G,
        actor: PlayerId,
        action: &str,
        result: &ActionResult,
    ) -> Result<FlowOutcome, FlowError> {
        let checkpoint = self.stack.clone();
        let outcome = self.awaiting(host).and_then(|step| {
            self.check_eligible(&step, action, actor)?;
            self.complete_step(&*host, actor, result)?;
            self.run(host)
        });
        if let Err(err) = &outcome {
            debug!(%action, %actor, error = %err, "external action rejected, stack restored");
            self.stack = checkpoint;
        }
        outcome
    }

    /// Start building `action` for the waiting step.
    ///
    /// Auto-fill follows `FlowConfig::auto_fill`. If the step waits on a
    /// follow-up of `action`, its pre-filled arguments are applied.
    pub fn begin_action<'e, G: GameHost + ?Sized>(
        &'e self,
        host: &G,
        step: &PendingStep,
        action: &str,
    ) -> Result<PendingAction<'e>, ValidationError> {
        let definition = self.definition.actions.get(action).ok_or_else(|| ValidationError::UnknownAction {
            action: action.to_string(),
        })?;
        if !step.allows(action) {
            return Err(ValidationError::ActionNotAvailable {
                action: action.to_string(),
            });
        }

        let policy = if self.definition.config.auto_fill {
            AutoFill::enabled()
        } else {
            AutoFill::disabled()
        };
        match &step.follow_up {
            Some(follow_up) if follow_up.action == action => {
                PendingAction::follow_up(definition, host, follow_up, step.actor, policy)
            }
            _ => Ok(PendingAction::start(definition, host, step.actor, policy)),
        }
    }

    /// Snapshot the execution stack.
    #[must_use]
    pub fn state(&self) -> FlowSnapshot {
        FlowSnapshot {
            tree_fingerprint: self.definition.tree.fingerprint(),
            frames: self.stack.iter().cloned().collect(),
        }
    }

    /// Replace the execution stack with a snapshot taken from the same tree.
    pub fn restore_state(&mut self, snapshot: FlowSnapshot) -> Result<(), SnapshotError> {
        snapshot.validate_against(&self.definition.tree, &self.definition.config)?;
        self.stack = snapshot.frames.into_iter().collect();
        debug!(depth = self.stack.len(), "stack restored");
        Ok(())
    }

    /// Player of the innermost each-player iteration.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        self.scope().current_player
    }

    /// Predicate scope at the active node.
    #[must_use]
    pub fn scope(&self) -> Scope<'_> {
        scope_of(&self.definition.tree, &self.stack)
    }

    /// The tree is exhausted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of active frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Run to a decision point and require a waiting step.
    fn awaiting<G: GameHost + ?Sized>(&mut self, host: &mut G) -> Result<PendingStep, FlowError> {
        match self.run(host)? {
            FlowOutcome::AwaitingAction(step) => Ok(step),
            FlowOutcome::Finished { .. } => Err(ValidationError::FlowFinished.into()),
        }
    }

    fn check_eligible(&self, step: &PendingStep, action: &str, actor: PlayerId) -> Result<(), ValidationError> {
        if actor != step.actor {
            return Err(ValidationError::WrongActor {
                expected: step.actor,
                actual: actor,
            });
        }
        if step.allows(action) {
            Ok(())
        } else if self.definition.actions.contains(action) {
            Err(ValidationError::ActionNotAvailable {
                action: action.to_string(),
            })
        } else {
            Err(ValidationError::UnknownAction {
                action: action.to_string(),
            })
        }
    }

    /// Apply an action result to the active action step.
    fn complete_step<G: GameHost + ?Sized>(
        &mut self,
        host: &G,
        actor: PlayerId,
        result: &ActionResult,
    ) -> Result<(), FlowError> {
        if !result.success {
            let reason = result.error.clone().unwrap_or_else(|| "action failed".to_string());
            return Err(ValidationError::ActionFailed { reason }.into());
        }

        let definition = Arc::clone(&self.definition);
        if let Some(follow_up) = &result.follow_up {
            if !definition.actions.contains(&follow_up.action) {
                return Err(ConfigurationError::UnknownFollowUp {
                    action: follow_up.action.clone(),
                }
                .into());
            }
        }

        let scope = scope_of(&definition.tree, &self.stack).with_actor(actor);
        let frame = self.stack.back_mut().ok_or(ValidationError::FlowFinished)?;
        let node = frame.node;
        let (NodeKind::ActionStep(step), FrameData::ActionStep(data)) =
            (&definition.tree.node(node).kind, &mut frame.data)
        else {
            return Err(SnapshotError::FrameMismatch { node }.into());
        };

        let progress = apply_action_result(
            step,
            data,
            result,
            actor,
            node,
            definition.config.max_follow_up_chain,
            |condition| ConditionEvaluator::evaluate(condition, host, &scope),
        )?;
        debug!(%node, ?progress, move_count = data.move_count, "action step updated");

        frame.completed = progress == StepProgress::Complete;
        Ok(())
    }

    /// Visit frames until a decision point.
    fn run<G: GameHost + ?Sized>(&mut self, host: &mut G) -> Result<FlowOutcome, FlowError> {
        let definition = Arc::clone(&self.definition);
        let cap = definition.config.max_transitions;
        for _ in 0..cap {
            if let Some(outcome) = self.visit(host, &definition)? {
                return Ok(outcome);
            }
        }
        Err(ConfigurationError::TransitionCapExceeded { cap }.into())
    }

    /// One transition: pop completed frames, descend, or stop at a step.
    fn visit<G: GameHost + ?Sized>(
        &mut self,
        host: &mut G,
        definition: &FlowDefinition,
    ) -> Result<Option<FlowOutcome>, FlowError> {
        let tree = &definition.tree;
        let scope = scope_of(tree, &self.stack);

        let Some(mut frame) = self.stack.pop_back() else {
            let winners = host.winners();
            debug!(?winners, "flow finished");
            return Ok(Some(FlowOutcome::Finished { winners }));
        };
        if frame.completed {
            trace!(node = %frame.node, "leave");
            return Ok(None);
        }

        let node = frame.node;
        trace!(%node, kind = tree.node(node).kind.name(), "visit");

        let mut child = None;
        let mut completed = false;
        let mut outcome = None;

        match (&tree.node(node).kind, &mut frame.data) {
            (NodeKind::Sequence { children }, FrameData::Sequence { next }) => {
                match children.get(*next as usize) {
                    Some(&c) => {
                        *next += 1;
                        child = Some(c);
                    }
                    None => completed = true,
                }
            }

            (
                NodeKind::Loop {
                    condition,
                    body,
                    max_iterations,
                },
                FrameData::Loop { iteration },
            ) => {
                if ConditionEvaluator::evaluate(condition, &*host, &scope) {
                    let cap = max_iterations.unwrap_or(definition.config.max_loop_iterations);
                    if *iteration >= cap {
                        return Err(ConfigurationError::IterationCapExceeded { node, cap }.into());
                    }
                    *iteration += 1;
                    child = Some(*body);
                } else {
                    completed = true;
                }
            }

            (
                NodeKind::Conditional {
                    condition,
                    then,
                    otherwise,
                },
                FrameData::Conditional { branch },
            ) => {
                if branch.is_some() {
                    completed = true;
                } else {
                    let taken = if ConditionEvaluator::evaluate(condition, &*host, &scope) {
                        Branch::Then
                    } else if otherwise.is_some() {
                        Branch::Otherwise
                    } else {
                        Branch::Neither
                    };
                    child = match taken {
                        Branch::Then => Some(*then),
                        Branch::Otherwise => *otherwise,
                        Branch::Neither => None,
                    };
                    completed = child.is_none();
                    *branch = Some(taken);
                }
            }

            (
                NodeKind::EachPlayer {
                    order: policy,
                    filter,
                    body,
                },
                FrameData::EachPlayer { order, next },
            ) => {
                let players = order.get_or_insert_with(|| resolve_order(&*host, policy, filter, &scope));
                if (*next as usize) < players.len() {
                    *next += 1;
                    child = Some(*body);
                } else {
                    completed = true;
                }
            }

            (NodeKind::Phase { name, body }, FrameData::Phase { entered }) => {
                if *entered {
                    completed = true;
                } else {
                    *entered = true;
                    debug!(phase = %name, "phase entered");
                    host.enter_phase(name);
                    child = *body;
                    completed = body.is_none();
                }
            }

            (NodeKind::ActionStep(step), FrameData::ActionStep(data)) => {
                match await_step(&*host, definition, node, step, data, &scope)? {
                    Some(pending) => outcome = Some(FlowOutcome::AwaitingAction(pending)),
                    None => completed = true,
                }
            }

            _ => return Err(SnapshotError::FrameMismatch { node }.into()),
        }

        frame.completed = completed;
        self.stack.push_back(frame);
        if let Some(child) = child {
            trace!(node = %child, parent = %node, "enter");
            self.stack.push_back(Frame::enter(child, &tree.node(child).kind));
        }
        Ok(outcome)
    }
}

/// Build the predicate scope from the innermost frames.
fn scope_of<'t>(tree: &'t FlowTree, stack: &Vector<Frame>) -> Scope<'t> {
    let mut scope = Scope::default();
    for frame in stack.iter().rev() {
        match (&frame.data, &tree.node(frame.node).kind) {
            (FrameData::EachPlayer { order: Some(order), next }, _) if scope.current_player.is_none() => {
                scope.current_player = next
                    .checked_sub(1)
                    .and_then(|i| order.get(i as usize))
                    .copied();
            }
            (FrameData::Loop { iteration }, _) if scope.loop_iteration.is_none() => {
                scope.loop_iteration = Some(*iteration);
            }
            (_, NodeKind::Phase { name, .. }) if scope.phase.is_none() => {
                scope.phase = Some(name.as_str());
            }
            _ => {}
        }
    }
    scope
}

/// Seating order for an each-player node, with the filter applied.
fn resolve_order<G: GameHost + ?Sized>(
    host: &G,
    policy: &PlayerOrder,
    filter: &Condition,
    scope: &Scope<'_>,
) -> Vec<PlayerId> {
    let mut players = host.players();
    match policy {
        PlayerOrder::Seating => {}
        PlayerOrder::Reverse => players.reverse(),
        PlayerOrder::StartingWith(first) => players = crate::core::rotate_seating(&players, *first),
    }
    if !filter.is_always() {
        players.retain(|p| ConditionEvaluator::evaluate(filter, host, &scope.with_current_player(*p)));
    }
    players
}

/// Who acts at a step.
fn resolve_actor<G: GameHost + ?Sized>(
    host: &G,
    node: NodeId,
    step: &ActionStepNode,
    scope: &Scope<'_>,
) -> Result<PlayerId, ConfigurationError> {
    match step.actor {
        StepActor::Seat(player) => Ok(player),
        StepActor::Current => scope
            .current_player
            .or_else(|| host.active_player())
            .ok_or(ConfigurationError::NoActor { node }),
    }
}

/// Decide what an action step waits for, or `None` if it completes now.
///
/// A follow-up that is no longer available is dropped. The move that
/// requested it then counts, as if it had returned no follow-up.
fn await_step<G: GameHost + ?Sized>(
    host: &G,
    definition: &FlowDefinition,
    node: NodeId,
    step: &ActionStepNode,
    data: &mut StepData,
    scope: &Scope<'_>,
) -> Result<Option<PendingStep>, ConfigurationError> {
    if let Some(follow_up) = &data.follow_up {
        let actor = match follow_up.actor {
            Some(actor) => actor,
            None => resolve_actor(host, node, step, scope)?,
        };
        let scope = scope.with_actor(actor);

        if let Some(def) = definition
            .actions
            .get(&follow_up.action)
            .filter(|def| SelectionEngine::is_available(host, def, actor, &scope))
        {
            return Ok(Some(PendingStep {
                node,
                actor,
                actions: vec![follow_up.action.clone()],
                prompt: def.prompt.clone(),
                follow_up: Some(follow_up.clone()),
                move_count: data.move_count,
            }));
        }

        warn!(%node, %actor, action = %follow_up.action, "follow-up not available, dropping it");
        data.follow_up = None;
        data.chain = 0;
        data.move_count += 1;
        if step_is_complete(step, data.move_count, |c| ConditionEvaluator::evaluate(c, host, &scope)) {
            return Ok(None);
        }
    }

    let actor = resolve_actor(host, node, step, scope)?;
    let scope = scope.with_actor(actor);

    if let Some(skip) = &step.skip_if {
        if ConditionEvaluator::evaluate(skip, host, &scope) {
            debug!(%node, %actor, "action step skipped");
            return Ok(None);
        }
    }

    let actions: Vec<String> = step
        .actions
        .iter()
        .filter(|name| {
            definition
                .actions
                .get(name)
                .is_some_and(|def| SelectionEngine::is_available(host, def, actor, &scope))
        })
        .cloned()
        .collect();

    if actions.is_empty() {
        warn!(%node, %actor, "no action available, completing step");
        return Ok(None);
    }

    Ok(Some(PendingStep {
        node,
        actor,
        actions,
        prompt: step.prompt.clone(),
        follow_up: None,
        move_count: data.move_count,
    }))
}

/// Merge a pending follow-up's locked arguments into `args`.
fn merge_follow_up(step: &PendingStep, mut args: Args) -> Result<Args, ValidationError> {
    let Some(follow_up) = &step.follow_up else {
        return Ok(args);
    };
    for (name, locked) in follow_up.args.iter() {
        match args.get(name) {
            Some(given) if given != locked => {
                return Err(ValidationError::FollowUpMismatch {
                    expected: follow_up.action.clone(),
                    detail: format!("'{}' is locked to {}, got {}", name, locked, given),
                });
            }
            Some(_) => {}
            None => {
                args.insert(name, locked.clone());
            }
        }
    }
    Ok(args)
}
