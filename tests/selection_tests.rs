//! Integration tests for selection validation and auto-fill.
//!
//! Covers candidate validation order, auto-fill over disabled candidates,
//! dependent selections and the engine's action builder.

mod common;

use common::{fill_first_enabled, init_tracing, Table};
use rust_gameflow::actions::{
    ActionDefinition, ActionRegistry, ActionResult, ArgValue, Args, AutoFill, Choice, ChoiceSource, FollowUp,
    PendingAction, Selection, SelectionEngine, ValueKind,
};
use rust_gameflow::core::{
    ChoiceSourceId, ElementId, ExecutionError, FlowConfig, FlowError, PlayerId, PredicateId, ValidationError,
};
use rust_gameflow::flow::{action_step, sequence, FlowDefinition, FlowEngine, FlowNode, StepActor};
use rust_gameflow::rules::{GameHost, Scope, SelectionScope};

const P0: PlayerId = PlayerId::new(0);

/// Two shops; the items on offer depend on the chosen shop.
struct Market {
    south_open: bool,
}

impl GameHost for Market {
    fn players(&self) -> Vec<PlayerId> {
        vec![P0]
    }

    fn check(&self, _: &PredicateId, _: &Scope<'_>) -> bool {
        false
    }

    fn choices(&self, source: &ChoiceSourceId, scope: &SelectionScope<'_>) -> Vec<Choice> {
        match source.as_str() {
            "shops" => vec![
                Choice::new("north", "North"),
                Choice::new("south", "South").disabled_if((!self.south_open).then_some("closed")),
            ],
            "items" => match scope.args.get("shop").and_then(ArgValue::as_text) {
                Some("north") => vec![Choice::new("apple", "Apple")],
                Some("south") => vec![Choice::new("pear", "Pear"), Choice::new("plum", "Plum")],
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    fn execute(&mut self, _: &str, _: &Args, _: PlayerId) -> Result<ActionResult, ExecutionError> {
        Ok(ActionResult::ok())
    }
}

fn buy() -> ActionDefinition {
    ActionDefinition::new("buy")
        .with_selection(Selection::choice("shop", ChoiceSource::dynamic("shops")))
        .with_selection(Selection::choice("item", ChoiceSource::dynamic("items")).depends_on("shop"))
        .with_selection(Selection::value("quantity", ValueKind::Int { min: 1, max: 3 }))
}

fn id(raw: u32) -> ElementId {
    ElementId::new(raw)
}

// =============================================================================
// Candidate Validation
// =============================================================================

/// A disabled candidate reports its reason, not "invalid".
#[test]
fn test_disabled_reported_before_invalid() {
    let table = Table::new(1);
    let selection = Selection::choice(
        "target",
        ChoiceSource::fixed([Choice::new("A", "A").with_disabled("x"), Choice::new("B", "B")]),
    );
    let action = ActionDefinition::new("aim").with_selection(selection.clone());
    let check = |value: &str| {
        SelectionEngine::validate_selection(&table, &action, &selection, &ArgValue::from(value), P0, &Args::new())
    };

    assert_eq!(
        check("A"),
        Err(ValidationError::SelectionDisabled {
            selection: "target".to_string(),
            reason: "x".to_string(),
        })
    );
    assert_eq!(
        check("C"),
        Err(ValidationError::InvalidSelection {
            selection: "target".to_string(),
        })
    );
    assert_eq!(check("B"), Ok(()));
    assert_eq!(check("A").unwrap_err().to_string(), "Selection disabled: x");
    assert_eq!(check("C").unwrap_err().to_string(), "Invalid selection for 'target'");
}

#[test]
fn test_elements_validation() {
    let hand = [Choice::element(id(1)), Choice::element(id(2)).with_disabled("cursed"), Choice::element(id(3))];
    let table = Table::new(1).with_candidates(hand.to_vec());
    let selection = Selection::elements("cards", ChoiceSource::dynamic("hand"), 1, Some(2));
    let action = ActionDefinition::new("discard").with_selection(selection.clone());
    let check = |ids: &[u32]| {
        let value = ArgValue::elements(ids.iter().copied().map(id));
        SelectionEngine::validate_selection(&table, &action, &selection, &value, P0, &Args::new())
    };

    assert_eq!(check(&[1, 3]), Ok(()));
    assert!(matches!(check(&[2]), Err(ValidationError::SelectionDisabled { .. })));
    assert!(matches!(check(&[7]), Err(ValidationError::InvalidSelection { .. })));
    assert!(matches!(check(&[1, 1]), Err(ValidationError::DuplicateElement { .. })));
    assert!(matches!(check(&[]), Err(ValidationError::TooFewElements { min: 1, got: 0, .. })));
    assert!(matches!(check(&[1, 3, 1]), Err(ValidationError::DuplicateElement { .. })));

    let wide = Selection::elements("cards", ChoiceSource::dynamic("hand"), 0, Some(1));
    let value = ArgValue::elements([id(1), id(3)]);
    assert!(matches!(
        SelectionEngine::validate_selection(&table, &action, &wide, &value, P0, &Args::new()),
        Err(ValidationError::TooManyElements { max: 1, got: 2, .. })
    ));
}

#[test]
fn test_value_and_argument_checks() {
    let market = Market { south_open: true };
    let action = buy();
    let full = Args::new().with("shop", "north").with("item", "apple");

    let check = |args: Args| SelectionEngine::validate_args(&market, &action, &args, P0);

    assert_eq!(check(full.clone().with("quantity", 2i64)), Ok(()));
    assert!(matches!(
        check(full.clone().with("quantity", 9i64)),
        Err(ValidationError::OutOfRange { min: 1, max: 3, .. })
    ));
    assert!(matches!(
        check(full.clone().with("quantity", "two")),
        Err(ValidationError::TypeMismatch { .. })
    ));
    assert!(matches!(check(full.clone()), Err(ValidationError::MissingSelection { .. })));
    assert!(matches!(
        check(full.with("quantity", 1i64).with("coupon", true)),
        Err(ValidationError::UnexpectedArgument { .. })
    ));

    // Items are checked against the chosen shop.
    let wrong_shop = Args::new().with("shop", "north").with("item", "pear").with("quantity", 1i64);
    assert!(matches!(check(wrong_shop), Err(ValidationError::InvalidSelection { .. })));
}

// =============================================================================
// Auto-fill
// =============================================================================

/// Disabled candidates are filtered out before counting.
#[test]
fn test_auto_fill_ignores_disabled() {
    let action = ActionDefinition::new("pick").with_selection(Selection::choice("pick", ChoiceSource::dynamic("any")));

    let table = Table::new(1).with_candidates(vec![
        Choice::new("A", "A").with_disabled("no"),
        Choice::new("B", "B"),
        Choice::new("C", "C").with_disabled("no"),
    ]);
    let pending = PendingAction::start(&action, &table, P0, AutoFill::enabled());
    assert!(pending.is_complete());
    assert_eq!(pending.args().get("pick"), Some(&ArgValue::from("B")));
    assert_eq!(pending.auto_filled(), ["pick".to_string()]);

    let table = Table::new(1).with_candidates(vec![
        Choice::new("A", "A").with_disabled("no"),
        Choice::new("B", "B").with_disabled("no"),
    ]);
    let pending = PendingAction::start(&action, &table, P0, AutoFill::enabled());
    assert!(!pending.is_complete());
    assert!(pending.auto_filled().is_empty());
    assert!(!SelectionEngine::is_available(&table, &action, P0, &Scope::default()));
}

/// Filling one selection can narrow the next to a single candidate.
#[test]
fn test_auto_fill_cascades_through_dependencies() {
    init_tracing();
    let market = Market { south_open: false };
    let action = buy();

    let pending = PendingAction::start(&action, &market, P0, AutoFill::enabled());
    assert_eq!(pending.auto_filled(), ["shop".to_string(), "item".to_string()]);
    assert_eq!(pending.next_selection().map(|s| s.name.as_str()), Some("quantity"));
    assert!(pending.choices(&market).is_empty());

    let pending = PendingAction::start(&action, &market, P0, AutoFill::disabled());
    assert!(pending.auto_filled().is_empty());
    assert_eq!(pending.choices(&market).len(), 2);
}

#[test]
fn test_manual_fill_then_cascade() {
    let market = Market { south_open: true };
    let action = buy();
    let mut pending = PendingAction::start(&action, &market, P0, AutoFill::enabled());
    assert!(pending.auto_filled().is_empty());

    assert!(matches!(
        pending.choose(&market, "item", "pear"),
        Err(ValidationError::OutOfOrder { .. })
    ));
    assert!(matches!(pending.skip(&market, "shop"), Err(ValidationError::NotOptional { .. })));

    pending.choose(&market, "shop", "north").unwrap();
    assert_eq!(pending.auto_filled(), ["item".to_string()]);
    pending.choose(&market, "quantity", 3i64).unwrap();
    assert!(pending.is_complete());

    let args = pending.into_args();
    assert_eq!(SelectionEngine::validate_args(&market, &action, &args, P0), Ok(()));
}

// =============================================================================
// Engine Integration
// =============================================================================

fn shop_engine(config: FlowConfig) -> FlowEngine {
    let actions = ActionRegistry::new().with(buy()).unwrap();
    let root: FlowNode = sequence([action_step(["buy"]).actor(StepActor::Seat(P0)).into()]);
    FlowEngine::new(FlowDefinition::new(&root, actions, config).unwrap()).unwrap()
}

#[test]
fn test_begin_action_follows_config() {
    let mut market = Market { south_open: false };

    let mut engine = shop_engine(FlowConfig::default());
    let outcome = engine.advance(&mut market).unwrap();
    let step = outcome.pending().unwrap();
    let pending = engine.begin_action(&market, step, "buy").unwrap();
    assert_eq!(pending.auto_filled().len(), 2);
    assert!(matches!(
        engine.begin_action(&market, step, "sell"),
        Err(ValidationError::UnknownAction { .. })
    ));

    let mut engine = shop_engine(FlowConfig::default().with_auto_fill(false));
    let outcome = engine.advance(&mut market).unwrap();
    let pending = engine.begin_action(&market, outcome.pending().unwrap(), "buy").unwrap();
    assert!(pending.auto_filled().is_empty());
}

#[test]
fn test_built_arguments_resume() {
    let mut market = Market { south_open: true };
    let mut engine = shop_engine(FlowConfig::default());
    let outcome = engine.advance(&mut market).unwrap();
    let step = outcome.pending().unwrap().clone();

    let mut pending = engine.begin_action(&market, &step, "buy").unwrap();
    pending.choose(&market, "shop", "south").unwrap();
    pending.choose(&market, "item", "plum").unwrap();
    pending.choose(&market, "quantity", 1i64).unwrap();
    let args = pending.into_args();

    let outcome = engine.resume(&mut market, "buy", args, P0).unwrap();
    assert!(outcome.is_finished());
}

/// Invalid pre-filled follow-up arguments are caught when building starts.
#[test]
fn test_follow_up_prefill_is_validated() {
    let mut actions = ActionRegistry::new();
    actions.register(ActionDefinition::new("play")).unwrap();
    actions
        .register(
            ActionDefinition::new("target")
                .with_selection(Selection::choice("victim", ChoiceSource::dynamic("players"))),
        )
        .unwrap();
    let root: FlowNode = action_step(["play"]).actor(StepActor::Seat(P0)).into();
    let mut engine = FlowEngine::new(FlowDefinition::new(&root, actions, FlowConfig::default()).unwrap()).unwrap();

    let mut table = Table::new(2).with_candidates(vec![Choice::new("p1", "Player 1"), Choice::new("p2", "Player 2")]);
    table.follow_up = Some((
        "play".to_string(),
        FollowUp::new("target").with_args(Args::new().with("victim", "p9")),
    ));

    let outcome = engine.resume(&mut table, "play", Args::new(), P0).unwrap();
    let step = outcome.pending().unwrap();
    assert!(matches!(
        engine.begin_action(&table, step, "target"),
        Err(ValidationError::InvalidSelection { .. })
    ));

    let err = engine.resume(&mut table, "target", Args::new(), P0).unwrap_err();
    assert!(matches!(err, FlowError::Validation(ValidationError::InvalidSelection { .. })));
}

#[test]
fn test_fill_first_enabled_helper() {
    let mut table = Table::new(1).with_candidates(vec![
        Choice::element(id(4)).with_disabled("tapped"),
        Choice::element(id(5)),
        Choice::element(id(6)),
    ]);
    let actions = ActionRegistry::new()
        .with(
            ActionDefinition::new("discard")
                .with_selection(Selection::elements("cards", ChoiceSource::dynamic("hand"), 1, None))
                .with_selection(Selection::value("note", ValueKind::Text).optional()),
        )
        .unwrap();
    let root: FlowNode = action_step(["discard"]).actor(StepActor::Seat(P0)).into();
    let mut engine = FlowEngine::new(FlowDefinition::new(&root, actions, FlowConfig::default()).unwrap()).unwrap();

    let outcome = engine.advance(&mut table).unwrap();
    let args = fill_first_enabled(&engine, &table, outcome.pending().unwrap(), "discard");
    assert_eq!(args.get("cards"), Some(&ArgValue::elements([id(5)])));
    assert_eq!(args.get("note"), Some(&ArgValue::None));

    assert!(engine.resume(&mut table, "discard", args, P0).unwrap().is_finished());
}
