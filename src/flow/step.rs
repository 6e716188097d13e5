//! Action-step completion.
//!
//! Every path that finishes an action inside an action step (a normal
//! `resume` and an externally executed action) goes through
//! [`apply_action_result`].

use crate::actions::ActionResult;
use crate::core::{ConfigurationError, NodeId, PlayerId};
use crate::rules::Condition;

use super::frame::StepData;
use super::node::ActionStepNode;

/// What an action step does after an action result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepProgress {
    /// A follow-up was requested; the same step waits for it.
    AwaitingFollowUp,
    /// Move counted; the step wants another action.
    Continue,
    /// Move counted; the step is done.
    Complete,
}

/// Apply a successful action result to an action step's frame data.
///
/// A follow-up leaves `move_count` alone and suspends completion, even if
/// `max_moves` would otherwise be reached. Otherwise the move is counted
/// and [`step_is_complete`] decides. `holds` evaluates `repeat_until`.
pub fn apply_action_result(
    step: &ActionStepNode,
    data: &mut StepData,
    result: &ActionResult,
    actor: PlayerId,
    node: NodeId,
    chain_cap: u32,
    holds: impl Fn(&Condition) -> bool,
) -> Result<StepProgress, ConfigurationError> {
    if let Some(follow_up) = &result.follow_up {
        if data.chain >= chain_cap {
            return Err(ConfigurationError::FollowUpChainTooLong { node, cap: chain_cap });
        }
        let mut follow_up = follow_up.clone();
        follow_up.actor.get_or_insert(actor);
        data.follow_up = Some(follow_up);
        data.chain += 1;
        return Ok(StepProgress::AwaitingFollowUp);
    }

    data.follow_up = None;
    data.chain = 0;
    data.move_count += 1;

    if step_is_complete(step, data.move_count, holds) {
        Ok(StepProgress::Complete)
    } else {
        Ok(StepProgress::Continue)
    }
}

/// Completion policy after `move_count` moves.
///
/// Complete when `max_moves` is reached, or `repeat_until` holds and
/// `min_moves` is met, or no policy was set at all (one action per step).
pub fn step_is_complete(step: &ActionStepNode, move_count: u32, holds: impl Fn(&Condition) -> bool) -> bool {
    if step.max_moves.is_some_and(|max| move_count >= max) {
        return true;
    }
    if let Some(until) = &step.repeat_until {
        let min_met = step.min_moves.map_or(true, |min| move_count >= min);
        return min_met && holds(until);
    }
    step.min_moves.is_none() && step.max_moves.is_none()
}
