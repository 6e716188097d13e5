//! Selection and validation engine.
//!
//! Stateless: every call reads the action definition, the partial argument
//! map and the host, and returns a decision. Candidates are enumerated from
//! the host on every call and never cached.
//!
//! ## Validation order
//!
//! For a candidate-based selection, the proposed value is first matched
//! against the candidates. A match that is disabled is rejected with its
//! reason (`SelectionDisabled`) before an unmatched value is rejected as
//! `InvalidSelection`. Multi-element values run that check per element,
//! then reject duplicates, then enforce `{min, max}`.
//!
//! ## Auto-fill
//!
//! A selection auto-fills when the policy allows it, the selection is not
//! optional, and exactly one *enabled* candidate exists. Disabled candidates
//! are removed before counting. [`SelectionEngine::auto_fill_value`] is the
//! only place this rule is implemented.

use crate::core::{PlayerId, ValidationError};
use crate::rules::{ConditionEvaluator, GameHost, Scope, SelectionScope};

use super::definition::ActionDefinition;
use super::selection::{Choice, ChoiceSource, Selection, SelectionKind, ValueKind};
use super::value::{ArgValue, Args};

/// When auto-fill may fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoFill {
    /// Caller opted in.
    pub enabled: bool,
    /// An action is currently executing; nothing auto-fills meanwhile.
    pub action_in_progress: bool,
}

impl AutoFill {
    /// Auto-fill on, nothing executing.
    #[must_use]
    pub const fn enabled() -> Self {
        Self {
            enabled: true,
            action_in_progress: false,
        }
    }

    /// Auto-fill off.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            action_in_progress: false,
        }
    }

    /// Mark an action as executing (builder pattern).
    #[must_use]
    pub const fn in_progress(mut self) -> Self {
        self.action_in_progress = true;
        self
    }

    #[must_use]
    pub const fn allows(self) -> bool {
        self.enabled && !self.action_in_progress
    }
}

impl Default for AutoFill {
    fn default() -> Self {
        Self::enabled()
    }
}

/// Selection and validation engine.
pub struct SelectionEngine;

impl SelectionEngine {
    /// Current candidates for `selection`.
    ///
    /// Only values of selections that come before it are visible to the
    /// host, so candidates never depend on later input.
    pub fn choices<G: GameHost + ?Sized>(
        host: &G,
        action: &ActionDefinition,
        selection: &Selection,
        actor: PlayerId,
        args: &Args,
    ) -> Vec<Choice> {
        match selection.kind.source() {
            None => Vec::new(),
            Some(ChoiceSource::Static(choices)) => choices.clone(),
            Some(ChoiceSource::Dynamic(source)) => {
                let prior = Self::prior_args(action, &selection.name, args);
                let scope = SelectionScope {
                    actor,
                    action: &action.name,
                    selection: &selection.name,
                    args: &prior,
                };
                host.choices(source, &scope)
            }
        }
    }

    fn prior_args(action: &ActionDefinition, selection: &str, args: &Args) -> Args {
        action
            .selections
            .iter()
            .take_while(|s| s.name != selection)
            .filter_map(|s| args.get(&s.name).map(|v| (s.name.clone(), v.clone())))
            .collect()
    }

    /// First selection without a value.
    #[must_use]
    pub fn next_unfilled<'d>(action: &'d ActionDefinition, args: &Args) -> Option<&'d Selection> {
        action.selections.iter().find(|s| !args.contains(&s.name))
    }

    /// Check a proposed value for one selection.
    pub fn validate_selection<G: GameHost + ?Sized>(
        host: &G,
        action: &ActionDefinition,
        selection: &Selection,
        value: &ArgValue,
        actor: PlayerId,
        args: &Args,
    ) -> Result<(), ValidationError> {
        if value.is_none() {
            return if selection.optional {
                Ok(())
            } else {
                Err(ValidationError::NotOptional {
                    selection: selection.name.clone(),
                })
            };
        }

        match &selection.kind {
            SelectionKind::Value(kind) => Self::check_value(selection, kind, value),
            SelectionKind::Choice(_) => {
                let choices = Self::choices(host, action, selection, actor, args);
                Self::match_candidate(selection, &choices, value)
            }
            SelectionKind::Element(_) => {
                if value.as_element().is_none() {
                    return Err(Self::mismatch(selection, "an element"));
                }
                let choices = Self::choices(host, action, selection, actor, args);
                Self::match_candidate(selection, &choices, value)
            }
            SelectionKind::Elements { min, max, .. } => {
                let ids = value
                    .as_elements()
                    .ok_or_else(|| Self::mismatch(selection, "elements"))?;
                let choices = Self::choices(host, action, selection, actor, args);

                for id in ids {
                    Self::match_candidate(selection, &choices, &ArgValue::Element(*id))?;
                }

                for (i, id) in ids.iter().enumerate() {
                    if ids[..i].contains(id) {
                        return Err(ValidationError::DuplicateElement {
                            selection: selection.name.clone(),
                            element: *id,
                        });
                    }
                }

                if ids.len() < *min {
                    return Err(ValidationError::TooFewElements {
                        selection: selection.name.clone(),
                        min: *min,
                        got: ids.len(),
                    });
                }
                if let Some(max) = max {
                    if ids.len() > *max {
                        return Err(ValidationError::TooManyElements {
                            selection: selection.name.clone(),
                            max: *max,
                            got: ids.len(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Disabled check first, then the generic invalid check.
    fn match_candidate(
        selection: &Selection,
        choices: &[Choice],
        value: &ArgValue,
    ) -> Result<(), ValidationError> {
        match choices.iter().find(|c| &c.value == value) {
            Some(Choice {
                disabled: Some(reason),
                ..
            }) => Err(ValidationError::SelectionDisabled {
                selection: selection.name.clone(),
                reason: reason.clone(),
            }),
            Some(_) => Ok(()),
            None => Err(ValidationError::InvalidSelection {
                selection: selection.name.clone(),
            }),
        }
    }

    fn check_value(
        selection: &Selection,
        kind: &ValueKind,
        value: &ArgValue,
    ) -> Result<(), ValidationError> {
        match (kind, value) {
            (ValueKind::Bool, ArgValue::Bool(_)) | (ValueKind::Text, ArgValue::Text(_)) => Ok(()),
            (ValueKind::Int { min, max }, ArgValue::Int(n)) => {
                if n < min || n > max {
                    Err(ValidationError::OutOfRange {
                        selection: selection.name.clone(),
                        min: *min,
                        max: *max,
                    })
                } else {
                    Ok(())
                }
            }
            _ => Err(Self::mismatch(selection, &kind.describe())),
        }
    }

    fn mismatch(selection: &Selection, expected: &str) -> ValidationError {
        ValidationError::TypeMismatch {
            selection: selection.name.clone(),
            expected: expected.to_string(),
        }
    }

    /// Check a complete argument map.
    ///
    /// Rejects names the action does not define and required selections
    /// without a value, and validates every supplied value in fill order.
    pub fn validate_args<G: GameHost + ?Sized>(
        host: &G,
        action: &ActionDefinition,
        args: &Args,
        actor: PlayerId,
    ) -> Result<(), ValidationError> {
        if let Some(name) = args.names().find(|n| action.selection(n).is_none()) {
            return Err(ValidationError::UnexpectedArgument {
                name: name.to_string(),
            });
        }

        for selection in &action.selections {
            match args.get(&selection.name) {
                Some(value) => {
                    Self::validate_selection(host, action, selection, value, actor, args)?;
                }
                None if selection.optional => {}
                None => {
                    return Err(ValidationError::MissingSelection {
                        selection: selection.name.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// The single enabled candidate, if there is exactly one.
    #[must_use]
    pub fn sole_enabled(choices: &[Choice]) -> Option<&Choice> {
        let mut enabled = choices.iter().filter(|c| c.is_enabled());
        match (enabled.next(), enabled.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    /// Value to auto-fill `selection` with, if auto-fill applies.
    ///
    /// `elements` selections only auto-fill when exactly one element is
    /// required, since the sole candidate is then the only legal value.
    #[must_use]
    pub fn auto_fill_value(
        selection: &Selection,
        choices: &[Choice],
        policy: AutoFill,
    ) -> Option<ArgValue> {
        if !policy.allows() || selection.optional {
            return None;
        }
        let only = Self::sole_enabled(choices)?;

        match &selection.kind {
            SelectionKind::Value(_) => None,
            SelectionKind::Choice(_) | SelectionKind::Element(_) => Some(only.value.clone()),
            SelectionKind::Elements { min, .. } if *min == 1 => {
                let id = only.value.as_element()?;
                Some(ArgValue::elements([id]))
            }
            SelectionKind::Elements { .. } => None,
        }
    }

    /// Can `actor` take this action right now?
    ///
    /// The legality condition must hold, and every required candidate-based
    /// selection with no dependency must have at least one enabled candidate.
    pub fn is_available<G: GameHost + ?Sized>(
        host: &G,
        action: &ActionDefinition,
        actor: PlayerId,
        scope: &Scope<'_>,
    ) -> bool {
        let scope = scope.with_actor(actor);
        if !ConditionEvaluator::evaluate(&action.condition, host, &scope) {
            return false;
        }

        let empty = Args::new();
        action
            .selections
            .iter()
            .filter(|s| s.needs_candidate() && s.depends_on.is_empty())
            .all(|s| {
                Self::choices(host, action, s, actor, &empty)
                    .iter()
                    .any(Choice::is_enabled)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionResult;
    use crate::core::{ChoiceSourceId, ElementId, ExecutionError, PredicateId};

    struct Table {
        hand: Vec<Choice>,
    }

    impl GameHost for Table {
        fn players(&self) -> Vec<PlayerId> {
            PlayerId::all(2).collect()
        }

        fn check(&self, predicate: &PredicateId, _: &Scope<'_>) -> bool {
            predicate.as_str() == "yes"
        }

        fn choices(&self, source: &ChoiceSourceId, scope: &SelectionScope<'_>) -> Vec<Choice> {
            match source.as_str() {
                "hand" => self.hand.clone(),
                "echo" => scope
                    .args
                    .get("card")
                    .and_then(ArgValue::as_element)
                    .map(|id| vec![Choice::element(id)])
                    .unwrap_or_default(),
                "later_visible" => {
                    if scope.args.contains("after") {
                        vec![Choice::element(ElementId(99))]
                    } else {
                        vec![Choice::element(ElementId(1))]
                    }
                }
                _ => Vec::new(),
            }
        }

        fn execute(&mut self, _: &str, _: &Args, _: PlayerId) -> Result<ActionResult, ExecutionError> {
            Ok(ActionResult::ok())
        }
    }

    fn table() -> Table {
        Table {
            hand: vec![
                Choice::element(ElementId(1)).with_disabled("x"),
                Choice::element(ElementId(2)),
                Choice::element(ElementId(3)),
            ],
        }
    }

    fn p0() -> PlayerId {
        PlayerId::new(0)
    }

    fn single(source: &str) -> ActionDefinition {
        ActionDefinition::new("play").with_selection(Selection::element("card", ChoiceSource::dynamic(source)))
    }

    #[test]
    fn test_disabled_before_invalid() {
        let host = table();
        let def = single("hand");
        let sel = &def.selections[0];

        let disabled = SelectionEngine::validate_selection(&host, &def, sel, &ElementId(1).into(), p0(), &Args::new());
        assert_eq!(disabled.unwrap_err().to_string(), "Selection disabled: x");

        let unknown = SelectionEngine::validate_selection(&host, &def, sel, &ElementId(7).into(), p0(), &Args::new());
        assert_eq!(
            unknown,
            Err(ValidationError::InvalidSelection { selection: "card".into() })
        );

        let fine = SelectionEngine::validate_selection(&host, &def, sel, &ElementId(2).into(), p0(), &Args::new());
        assert!(fine.is_ok());
    }

    #[test]
    fn test_element_type_mismatch() {
        let host = table();
        let def = single("hand");
        let err = SelectionEngine::validate_selection(&host, &def, &def.selections[0], &ArgValue::Int(2), p0(), &Args::new());
        assert!(matches!(err, Err(ValidationError::TypeMismatch { .. })));
    }

    #[test]
    fn test_elements_checks() {
        let host = table();
        let def = ActionDefinition::new("discard").with_selection(Selection::elements(
            "cards",
            ChoiceSource::dynamic("hand"),
            1,
            Some(2),
        ));
        let sel = &def.selections[0];
        let check = |ids: &[u32]| {
            let value = ArgValue::elements(ids.iter().copied().map(ElementId));
            SelectionEngine::validate_selection(&host, &def, sel, &value, p0(), &Args::new())
        };

        assert!(check(&[2, 3]).is_ok());
        assert!(matches!(check(&[2, 1]), Err(ValidationError::SelectionDisabled { .. })));
        assert!(matches!(check(&[2, 9]), Err(ValidationError::InvalidSelection { .. })));
        assert!(matches!(check(&[2, 2]), Err(ValidationError::DuplicateElement { .. })));
        assert!(matches!(check(&[]), Err(ValidationError::TooFewElements { min: 1, got: 0, .. })));

        let mut wide = table();
        wide.hand.push(Choice::element(ElementId(4)));
        let value = ArgValue::elements([ElementId(2), ElementId(3), ElementId(4)]);
        let err = SelectionEngine::validate_selection(&wide, &def, sel, &value, p0(), &Args::new());
        assert!(matches!(err, Err(ValidationError::TooManyElements { max: 2, got: 3, .. })));
    }

    /// The host receives the variant it declared, so a lone element is refused.
    #[test]
    fn test_elements_reject_single_element() {
        let host = table();
        let def = ActionDefinition::new("discard").with_selection(Selection::elements(
            "cards",
            ChoiceSource::dynamic("hand"),
            1,
            Some(2),
        ));
        let value = ArgValue::Element(ElementId(2));
        let err = SelectionEngine::validate_selection(&host, &def, &def.selections[0], &value, p0(), &Args::new());
        assert!(matches!(err, Err(ValidationError::TypeMismatch { .. })));
    }

    #[test]
    fn test_value_selection() {
        let host = table();
        let def = ActionDefinition::new("bid")
            .with_selection(Selection::value("amount", ValueKind::Int { min: 1, max: 5 }))
            .with_selection(Selection::value("note", ValueKind::Text).optional());
        let amount = &def.selections[0];
        let note = &def.selections[1];

        let check = |sel: &Selection, v: ArgValue| {
            SelectionEngine::validate_selection(&host, &def, sel, &v, p0(), &Args::new())
        };

        assert!(check(amount, ArgValue::Int(3)).is_ok());
        assert!(matches!(check(amount, ArgValue::Int(9)), Err(ValidationError::OutOfRange { .. })));
        assert!(matches!(check(amount, ArgValue::from("3")), Err(ValidationError::TypeMismatch { .. })));
        assert!(matches!(check(amount, ArgValue::None), Err(ValidationError::NotOptional { .. })));
        assert!(check(note, ArgValue::None).is_ok());
    }

    #[test]
    fn test_static_choices() {
        let host = table();
        let def = ActionDefinition::new("pick").with_selection(Selection::choice(
            "color",
            ChoiceSource::fixed([
                Choice::new("red", "Red"),
                Choice::new("blue", "Blue").with_disabled("sold out"),
            ]),
        ));
        let sel = &def.selections[0];
        let check = |v: &str| SelectionEngine::validate_selection(&host, &def, sel, &v.into(), p0(), &Args::new());

        assert!(check("red").is_ok());
        assert_eq!(check("blue").unwrap_err().to_string(), "Selection disabled: sold out");
        assert!(matches!(check("green"), Err(ValidationError::InvalidSelection { .. })));
    }

    #[test]
    fn test_choices_see_only_prior_args() {
        let host = table();
        let def = ActionDefinition::new("play")
            .with_selection(Selection::element("first", ChoiceSource::dynamic("later_visible")))
            .with_selection(Selection::value("after", ValueKind::Bool));
        let args = Args::new().with("after", true);

        let choices = SelectionEngine::choices(&host, &def, &def.selections[0], p0(), &args);
        assert_eq!(choices, vec![Choice::element(ElementId(1))]);
    }

    #[test]
    fn test_dependent_choices() {
        let host = table();
        let def = ActionDefinition::new("play")
            .with_selection(Selection::element("card", ChoiceSource::dynamic("hand")))
            .with_selection(Selection::element("again", ChoiceSource::dynamic("echo")).depends_on("card"));
        let args = Args::new().with("card", ElementId(3));

        let choices = SelectionEngine::choices(&host, &def, &def.selections[1], p0(), &args);
        assert_eq!(choices, vec![Choice::element(ElementId(3))]);
    }

    #[test]
    fn test_validate_args() {
        let host = table();
        let def = single("hand");

        assert!(SelectionEngine::validate_args(&host, &def, &Args::new().with("card", ElementId(2)), p0()).is_ok());
        assert_eq!(
            SelectionEngine::validate_args(&host, &def, &Args::new(), p0()),
            Err(ValidationError::MissingSelection { selection: "card".into() })
        );
        assert_eq!(
            SelectionEngine::validate_args(&host, &def, &Args::new().with("card", ElementId(2)).with("x", 1i64), p0()),
            Err(ValidationError::UnexpectedArgument { name: "x".into() })
        );
    }

    #[test]
    fn test_auto_fill_filters_disabled() {
        let def = single("hand");
        let sel = &def.selections[0];

        let one_enabled = vec![
            Choice::element(ElementId(1)).with_disabled("a"),
            Choice::element(ElementId(2)),
            Choice::element(ElementId(3)).with_disabled("c"),
        ];
        assert_eq!(
            SelectionEngine::auto_fill_value(sel, &one_enabled, AutoFill::enabled()),
            Some(ArgValue::Element(ElementId(2)))
        );

        let none_enabled = vec![
            Choice::element(ElementId(1)).with_disabled("a"),
            Choice::element(ElementId(2)).with_disabled("b"),
        ];
        assert_eq!(SelectionEngine::auto_fill_value(sel, &none_enabled, AutoFill::enabled()), None);

        let two_enabled = vec![Choice::element(ElementId(1)), Choice::element(ElementId(2))];
        assert_eq!(SelectionEngine::auto_fill_value(sel, &two_enabled, AutoFill::enabled()), None);
    }

    #[test]
    fn test_auto_fill_policy() {
        let def = single("hand");
        let sel = &def.selections[0];
        let only = vec![Choice::element(ElementId(2))];

        assert!(SelectionEngine::auto_fill_value(sel, &only, AutoFill::disabled()).is_none());
        assert!(SelectionEngine::auto_fill_value(sel, &only, AutoFill::enabled().in_progress()).is_none());
        assert!(SelectionEngine::auto_fill_value(&sel.clone().optional(), &only, AutoFill::enabled()).is_none());
    }

    #[test]
    fn test_auto_fill_elements() {
        let only = vec![Choice::element(ElementId(5))];
        let exactly_one = Selection::elements("cards", ChoiceSource::dynamic("hand"), 1, Some(3));
        let at_least_two = Selection::elements("cards", ChoiceSource::dynamic("hand"), 2, None);

        assert_eq!(
            SelectionEngine::auto_fill_value(&exactly_one, &only, AutoFill::enabled()),
            Some(ArgValue::elements([ElementId(5)]))
        );
        assert!(SelectionEngine::auto_fill_value(&at_least_two, &only, AutoFill::enabled()).is_none());
    }

    #[test]
    fn test_is_available() {
        let host = table();
        let scope = Scope::default();

        assert!(SelectionEngine::is_available(&host, &single("hand"), p0(), &scope));
        assert!(!SelectionEngine::is_available(&host, &single("nothing"), p0(), &scope));
        assert!(!SelectionEngine::is_available(
            &host,
            &single("hand").with_condition(crate::rules::Condition::check("no")),
            p0(),
            &scope
        ));

        let all_disabled = Table {
            hand: vec![Choice::element(ElementId(1)).with_disabled("x")],
        };
        assert!(!SelectionEngine::is_available(&all_disabled, &single("hand"), p0(), &scope));

        let optional = ActionDefinition::new("play")
            .with_selection(Selection::element("card", ChoiceSource::dynamic("nothing")).optional());
        assert!(SelectionEngine::is_available(&host, &optional, p0(), &scope));
    }
}
