//! Incremental action building.
//!
//! `PendingAction` fills an action one selection at a time, the way a
//! client prompts a player: ask for the next selection, show its
//! candidates, accept a value, repeat. Auto-fill runs after start, after a
//! follow-up start and after every accepted value.

use tracing::trace;

use crate::core::{PlayerId, ValidationError};
use crate::rules::GameHost;

use super::definition::ActionDefinition;
use super::result::FollowUp;
use super::selection::{Choice, Selection};
use super::validate::{AutoFill, SelectionEngine};
use super::value::{ArgValue, Args};

/// An action being filled in.
///
/// ## Example
///
/// ```
/// use rust_gameflow::actions::{ActionDefinition, AutoFill, Choice, ChoiceSource, PendingAction, Selection};
/// use rust_gameflow::core::PlayerId;
/// use rust_gameflow::games::race::RaceGameBuilder;
///
/// let (_, game) = RaceGameBuilder::new().build().unwrap();
/// let def = ActionDefinition::new("pick").with_selection(Selection::choice(
///     "color",
///     ChoiceSource::fixed([
///         Choice::new("red", "Red"),
///         Choice::new("blue", "Blue").with_disabled("sold out"),
///     ]),
/// ));
///
/// // Only one enabled candidate, so it is filled straight away.
/// let pending = PendingAction::start(&def, &game, PlayerId::new(0), AutoFill::enabled());
/// assert!(pending.is_complete());
/// assert_eq!(pending.auto_filled(), ["color".to_string()]);
/// ```
#[derive(Clone, Debug)]
pub struct PendingAction<'d> {
    definition: &'d ActionDefinition,
    actor: PlayerId,
    args: Args,
    /// Selections filled by auto-fill, in fill order.
    auto_filled: Vec<String>,
    policy: AutoFill,
}

impl<'d> PendingAction<'d> {
    /// Start building `definition` for `actor`.
    pub fn start<G: GameHost + ?Sized>(
        definition: &'d ActionDefinition,
        host: &G,
        actor: PlayerId,
        policy: AutoFill,
    ) -> Self {
        Self::with_args(definition, host, actor, Args::new(), policy)
    }

    /// Start building a chained follow-up, with its pre-filled arguments.
    ///
    /// `fallback_actor` performs it when the follow-up names no actor.
    pub fn follow_up<G: GameHost + ?Sized>(
        definition: &'d ActionDefinition,
        host: &G,
        follow_up: &FollowUp,
        fallback_actor: PlayerId,
        policy: AutoFill,
    ) -> Result<Self, ValidationError> {
        let actor = follow_up.actor.unwrap_or(fallback_actor);
        for (name, value) in follow_up.args.iter() {
            let selection = definition
                .selection(name)
                .ok_or_else(|| ValidationError::UnexpectedArgument {
                    name: name.to_string(),
                })?;
            SelectionEngine::validate_selection(host, definition, selection, value, actor, &follow_up.args)?;
        }
        Ok(Self::with_args(definition, host, actor, follow_up.args.clone(), policy))
    }

    fn with_args<G: GameHost + ?Sized>(
        definition: &'d ActionDefinition,
        host: &G,
        actor: PlayerId,
        args: Args,
        policy: AutoFill,
    ) -> Self {
        let mut pending = Self {
            definition,
            actor,
            args,
            auto_filled: Vec::new(),
            policy,
        };
        pending.auto_fill(host);
        pending
    }

    /// Fill selections while exactly one enabled candidate remains.
    fn auto_fill<G: GameHost + ?Sized>(&mut self, host: &G) {
        while let Some(selection) = self.next_selection() {
            let choices = SelectionEngine::choices(host, self.definition, selection, self.actor, &self.args);
            let Some(value) = SelectionEngine::auto_fill_value(selection, &choices, self.policy) else {
                break;
            };
            trace!(action = %self.definition.name, selection = %selection.name, %value, "auto-filled");
            self.auto_filled.push(selection.name.clone());
            self.args.insert(selection.name.clone(), value);
        }
    }

    /// The action being built.
    #[must_use]
    pub fn definition(&self) -> &'d ActionDefinition {
        self.definition
    }

    #[must_use]
    pub fn actor(&self) -> PlayerId {
        self.actor
    }

    /// The selection to fill next.
    #[must_use]
    pub fn next_selection(&self) -> Option<&'d Selection> {
        SelectionEngine::next_unfilled(self.definition, &self.args)
    }

    /// Candidates for the next selection.
    pub fn choices<G: GameHost + ?Sized>(&self, host: &G) -> Vec<Choice> {
        match self.next_selection() {
            Some(selection) => SelectionEngine::choices(host, self.definition, selection, self.actor, &self.args),
            None => Vec::new(),
        }
    }

    fn expect_next(&self, name: &str) -> Result<&'d Selection, ValidationError> {
        match self.next_selection() {
            Some(next) if next.name == name => Ok(next),
            Some(next) if self.definition.selection(name).is_some() => Err(ValidationError::OutOfOrder {
                selection: name.to_string(),
                expected: next.name.clone(),
            }),
            _ => Err(ValidationError::UnexpectedArgument {
                name: name.to_string(),
            }),
        }
    }

    /// Fill the next selection.
    ///
    /// `name` must be the next unfilled selection. On error nothing changes.
    pub fn choose<G: GameHost + ?Sized>(
        &mut self,
        host: &G,
        name: &str,
        value: impl Into<ArgValue>,
    ) -> Result<(), ValidationError> {
        let selection = self.expect_next(name)?;
        let value = value.into();
        SelectionEngine::validate_selection(host, self.definition, selection, &value, self.actor, &self.args)?;
        self.args.insert(name, value);
        self.auto_fill(host);
        Ok(())
    }

    /// Leave an optional selection empty.
    pub fn skip<G: GameHost + ?Sized>(&mut self, host: &G, name: &str) -> Result<(), ValidationError> {
        let selection = self.expect_next(name)?;
        if !selection.optional {
            return Err(ValidationError::NotOptional {
                selection: name.to_string(),
            });
        }
        self.args.insert(name, ArgValue::None);
        self.auto_fill(host);
        Ok(())
    }

    /// Every selection has a value.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.next_selection().is_none()
    }

    #[must_use]
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Names of auto-filled selections, in fill order.
    #[must_use]
    pub fn auto_filled(&self) -> &[String] {
        &self.auto_filled
    }

    /// Finish building and take the arguments.
    #[must_use]
    pub fn into_args(self) -> Args {
        self.args
    }
}
