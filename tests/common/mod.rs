//! Shared helpers for integration tests.

#![allow(dead_code)]

use rust_gameflow::actions::{
    ActionResult, ArgValue, Args, Choice, FollowUp, SelectionKind,
};
use rust_gameflow::core::{ChoiceSourceId, ExecutionError, PlayerId, PredicateId};
use rust_gameflow::flow::{FlowEngine, PendingStep};
use rust_gameflow::rules::{GameHost, Scope, SelectionScope};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A scripted table.
///
/// Predicates are named flags, except `under_rounds`, which holds while the
/// innermost loop has entered fewer than `rounds` iterations. Every dynamic
/// selection returns `candidates`. Executions and phases are logged, and
/// every execution fails while the `broken` flag is raised.
#[derive(Clone, Debug, Default)]
pub struct Table {
    pub seats: usize,
    pub flags: Vec<String>,
    pub candidates: Vec<Choice>,
    pub log: Vec<(String, PlayerId, Args)>,
    /// Raise `finished` once this many actions have run.
    pub finish_after: Option<usize>,
    /// Chain this follow-up after the named action.
    pub follow_up: Option<(String, FollowUp)>,
    pub rounds: u32,
    pub phases: Vec<String>,
    pub winners: Vec<PlayerId>,
}

impl Table {
    pub fn new(seats: usize) -> Self {
        Self {
            seats,
            ..Self::default()
        }
    }

    pub fn with_flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<Choice>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn actions(&self) -> Vec<&str> {
        self.log.iter().map(|(a, _, _)| a.as_str()).collect()
    }
}

impl GameHost for Table {
    fn players(&self) -> Vec<PlayerId> {
        PlayerId::all(self.seats).collect()
    }

    fn check(&self, predicate: &PredicateId, scope: &Scope<'_>) -> bool {
        match predicate.as_str() {
            "under_rounds" => scope.loop_iteration.unwrap_or(0) < self.rounds,
            name => self.flags.iter().any(|f| f == name),
        }
    }

    fn choices(&self, _: &ChoiceSourceId, _: &SelectionScope<'_>) -> Vec<Choice> {
        self.candidates.clone()
    }

    fn execute(&mut self, action: &str, args: &Args, actor: PlayerId) -> Result<ActionResult, ExecutionError> {
        if self.flags.iter().any(|f| f == "broken") {
            return Err(ExecutionError::new("table is broken"));
        }
        self.log.push((action.to_string(), actor, args.clone()));
        if self.finish_after.is_some_and(|n| self.log.len() >= n) {
            self.flags.push("finished".to_string());
        }
        match &self.follow_up {
            Some((after, follow_up)) if after == action => Ok(ActionResult::ok().with_follow_up(follow_up.clone())),
            _ => Ok(ActionResult::ok()),
        }
    }

    fn enter_phase(&mut self, phase: &str) {
        self.phases.push(phase.to_string());
    }

    fn winners(&self) -> Vec<PlayerId> {
        self.winners.clone()
    }
}

/// Fill `action` for the waiting step with the first enabled candidate of
/// every selection, skipping optional ones.
pub fn fill_first_enabled<G: GameHost>(engine: &FlowEngine, host: &G, step: &PendingStep, action: &str) -> Args {
    let mut pending = engine.begin_action(host, step, action).expect("eligible action starts");
    while let Some(selection) = pending.next_selection() {
        if selection.optional {
            pending.skip(host, &selection.name).expect("optional selection skips");
            continue;
        }
        let choice = pending
            .choices(host)
            .into_iter()
            .find(Choice::is_enabled)
            .expect("eligible action has an enabled candidate");
        let value = match selection.kind {
            SelectionKind::Elements { .. } => ArgValue::elements(choice.value.as_element()),
            _ => choice.value,
        };
        pending.choose(host, &selection.name, value).expect("enabled candidate is accepted");
    }
    pending.into_args()
}
