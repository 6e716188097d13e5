//! Race game implementation.

use crate::actions::{
    ActionDefinition, ActionRegistry, ActionResult, ArgValue, Args, Choice, ChoiceSource, FollowUp, Selection,
    ValueKind,
};
use crate::core::{ChoiceSourceId, ConfigurationError, ElementId, ExecutionError, FlowConfig, PlayerId, PredicateId};
use crate::flow::{action_step, each_player, loop_while, phase, sequence, FlowDefinition, FlowNode};
use crate::rules::{Condition, GameHost, Scope, SelectionScope};

const OVERSHOOT: &str = "would pass the target";

/// Race game state.
#[derive(Clone, Debug)]
pub struct RaceGame {
    target: i64,
    total: i64,
    hands: Vec<Vec<ElementId>>,
    /// Top of the deck is the last element.
    deck: Vec<ElementId>,
    discards: Vec<ElementId>,
    notes: Vec<String>,
    phases: Vec<String>,
    winner: Option<PlayerId>,
}

/// Builder for creating a RaceGame and its flow.
pub struct RaceGameBuilder {
    player_count: usize,
    target: i64,
    hand_size: usize,
    deck_size: usize,
    config: FlowConfig,
}

impl Default for RaceGameBuilder {
    fn default() -> Self {
        Self {
            player_count: 2,
            target: 10,
            hand_size: 2,
            deck_size: 4,
            config: FlowConfig::default(),
        }
    }
}

impl RaceGameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(mut self, count: usize) -> Self {
        assert!((2..=8).contains(&count), "Player count must be 2-8");
        self.player_count = count;
        self
    }

    pub fn target(mut self, target: i64) -> Self {
        self.target = target;
        self
    }

    pub fn hand_size(mut self, size: usize) -> Self {
        self.hand_size = size;
        self
    }

    pub fn deck_size(mut self, size: usize) -> Self {
        self.deck_size = size;
        self
    }

    pub fn config(mut self, config: FlowConfig) -> Self {
        self.config = config;
        self
    }

    /// The turn structure.
    ///
    /// ```text
    /// sequence
    ///   phase "setup"
    ///   loop while !finished
    ///     each_player
    ///       action_step [add, play, draw, discard] max 1, skip if finished
    ///   phase "scoring"
    /// ```
    #[must_use]
    pub fn flow() -> FlowNode {
        let finished = Condition::check("finished");
        sequence([
            phase("setup"),
            loop_while(
                finished.clone().negate(),
                each_player(
                    action_step(["add", "play", "draw", "discard"])
                        .max_moves(1)
                        .skip_if(finished)
                        .prompt("Your turn"),
                ),
            )
            .into(),
            phase("scoring"),
        ])
    }

    /// The action set.
    pub fn actions() -> Result<ActionRegistry, ConfigurationError> {
        ActionRegistry::new()
            .with(
                ActionDefinition::new("add")
                    .with_prompt("Add to the total")
                    .with_selection(Selection::choice("amount", ChoiceSource::dynamic("amounts"))),
            )?
            .with(
                ActionDefinition::new("play")
                    .with_prompt("Play a card")
                    .with_condition(Condition::check("has_cards"))
                    .with_selection(Selection::element("card", ChoiceSource::dynamic("hand"))),
            )?
            .with(
                ActionDefinition::new("draw")
                    .with_prompt("Draw a card")
                    .with_condition(Condition::check("deck_not_empty")),
            )?
            .with(
                ActionDefinition::new("discard")
                    .with_prompt("Discard cards")
                    .with_condition(Condition::check("has_cards"))
                    .with_selection(Selection::elements("cards", ChoiceSource::dynamic("hand"), 1, Some(2)))
                    .with_selection(Selection::value("note", ValueKind::Text).optional()),
            )
    }

    /// Build the flow definition and the initial game.
    ///
    /// Cards are numbered from 1 and dealt in order: each player gets
    /// `hand_size` cards, the rest form the deck.
    pub fn build(self) -> Result<(FlowDefinition, RaceGame), ConfigurationError> {
        let definition = FlowDefinition::new(&Self::flow(), Self::actions()?, self.config)?;

        let mut next_card = 1u32;
        let mut deal = |count: usize| -> Vec<ElementId> {
            let cards = (next_card..next_card + count as u32).map(ElementId::new).collect();
            next_card += count as u32;
            cards
        };

        let hands: Vec<Vec<ElementId>> = (0..self.player_count).map(|_| deal(self.hand_size)).collect();
        let mut deck = deal(self.deck_size);
        deck.reverse();

        let game = RaceGame {
            target: self.target,
            total: 0,
            hands,
            deck,
            discards: Vec::new(),
            notes: Vec::new(),
            phases: Vec::new(),
            winner: None,
        };
        Ok((definition, game))
    }
}

impl RaceGame {
    /// Value of a card: 1, 2, 3, 1, 2, 3, ...
    #[must_use]
    pub fn value_of(card: ElementId) -> i64 {
        i64::from(card.raw().saturating_sub(1) % 3) + 1
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.total
    }

    #[must_use]
    pub fn target(&self) -> i64 {
        self.target
    }

    /// Cards in a player's hand.
    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[ElementId] {
        self.hands.get(player.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn discards(&self) -> &[ElementId] {
        &self.discards
    }

    /// Notes left with discards.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Phases entered, in order.
    #[must_use]
    pub fn phases(&self) -> &[String] {
        &self.phases
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    fn overshoots(&self, amount: i64) -> bool {
        self.total + amount > self.target
    }

    fn advance_total(&mut self, amount: i64, actor: PlayerId) {
        self.total += amount;
        if self.total == self.target {
            self.winner = Some(actor);
        }
    }

    fn hand_mut(&mut self, player: PlayerId) -> Result<&mut Vec<ElementId>, ExecutionError> {
        self.hands
            .get_mut(player.index())
            .ok_or_else(|| ExecutionError::new(format!("{} is not seated", player)))
    }

    fn take_from_hand(&mut self, player: PlayerId, card: ElementId) -> Result<(), ExecutionError> {
        let hand = self.hand_mut(player)?;
        let index = hand
            .iter()
            .position(|c| *c == card)
            .ok_or_else(|| ExecutionError::new(format!("{} is not in hand", card)))?;
        hand.remove(index);
        self.discards.push(card);
        Ok(())
    }
}

fn required<'a>(args: &'a Args, name: &str) -> Result<&'a ArgValue, ExecutionError> {
    args.get(name)
        .ok_or_else(|| ExecutionError::new(format!("missing argument '{}'", name)))
}

impl GameHost for RaceGame {
    fn players(&self) -> Vec<PlayerId> {
        PlayerId::all(self.hands.len()).collect()
    }

    fn check(&self, predicate: &PredicateId, scope: &Scope<'_>) -> bool {
        let actor = scope.actor.or(scope.current_player);
        match predicate.as_str() {
            "finished" => self.winner.is_some(),
            "has_cards" => actor.is_some_and(|p| !self.hand(p).is_empty()),
            "deck_not_empty" => !self.deck.is_empty(),
            _ => false,
        }
    }

    fn choices(&self, source: &ChoiceSourceId, scope: &SelectionScope<'_>) -> Vec<Choice> {
        match source.as_str() {
            "amounts" => (1..=3i64)
                .map(|n| Choice::new(n, format!("+{}", n)).disabled_if(self.overshoots(n).then_some(OVERSHOOT)))
                .collect(),
            "hand" => self
                .hand(scope.actor)
                .iter()
                .map(|&card| {
                    let value = Self::value_of(card);
                    // Only playing a card moves the total.
                    let blocked = scope.action == "play" && self.overshoots(value);
                    Choice::new(card, format!("{} ({})", card, value)).disabled_if(blocked.then_some(OVERSHOOT))
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn execute(&mut self, action: &str, args: &Args, actor: PlayerId) -> Result<ActionResult, ExecutionError> {
        match action {
            "add" => {
                let amount = required(args, "amount")?
                    .as_int()
                    .ok_or_else(|| ExecutionError::new("amount must be an integer"))?;
                self.advance_total(amount, actor);
                Ok(ActionResult::ok().with_data(Args::new().with("total", self.total)))
            }
            "play" => {
                let card = required(args, "card")?
                    .as_element()
                    .ok_or_else(|| ExecutionError::new("card must be an element"))?;
                self.take_from_hand(actor, card)?;
                self.advance_total(Self::value_of(card), actor);

                let result = ActionResult::ok().with_data(Args::new().with("total", self.total));
                if self.hand(actor).is_empty() && !self.deck.is_empty() && self.winner.is_none() {
                    Ok(result.with_follow_up(FollowUp::new("draw")))
                } else {
                    Ok(result)
                }
            }
            "draw" => {
                let card = self.deck.pop().ok_or_else(|| ExecutionError::new("deck is empty"))?;
                self.hand_mut(actor)?.push(card);
                Ok(ActionResult::ok())
            }
            "discard" => {
                let cards = required(args, "cards")?
                    .as_elements()
                    .ok_or_else(|| ExecutionError::new("cards must be elements"))?
                    .to_vec();
                for card in cards {
                    self.take_from_hand(actor, card)?;
                }
                if let Some(note) = args.get("note").and_then(ArgValue::as_text) {
                    self.notes.push(note.to_string());
                }
                Ok(ActionResult::ok())
            }
            other => Err(ExecutionError::new(format!("unknown action '{}'", other))),
        }
    }

    fn enter_phase(&mut self, phase: &str) {
        self.phases.push(phase.to_string());
    }

    fn winners(&self) -> Vec<PlayerId> {
        self.winner.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    #[test]
    fn test_game_creation() {
        let (definition, game) = RaceGameBuilder::new().players(3).hand_size(2).deck_size(4).build().unwrap();

        assert_eq!(game.players().len(), 3);
        assert_eq!(game.hand(p(0)), [ElementId(1), ElementId(2)]);
        assert_eq!(game.hand(p(2)), [ElementId(5), ElementId(6)]);
        assert_eq!(game.deck_len(), 4);
        assert_eq!(game.total(), 0);
        assert!(definition.actions.contains("discard"));
    }

    #[test]
    fn test_card_values() {
        let values: Vec<i64> = (1..=6).map(|n| RaceGame::value_of(ElementId(n))).collect();
        assert_eq!(values, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn test_amounts_disabled_near_target() {
        let (_, mut game) = RaceGameBuilder::new().target(5).build().unwrap();
        game.total = 3;

        let args = Args::new();
        let scope = SelectionScope {
            actor: p(0),
            action: "add",
            selection: "amount",
            args: &args,
        };
        let choices = game.choices(&ChoiceSourceId::new("amounts"), &scope);

        assert_eq!(choices.len(), 3);
        assert!(choices[0].is_enabled());
        assert!(choices[1].is_enabled());
        assert_eq!(choices[2].disabled.as_deref(), Some(OVERSHOOT));
    }

    #[test]
    fn test_play_chains_draw_when_hand_empties() {
        let (_, mut game) = RaceGameBuilder::new().hand_size(1).target(20).build().unwrap();

        let result = game
            .execute("play", &Args::new().with("card", ElementId(1)), p(0))
            .unwrap();
        assert_eq!(result.follow_up, Some(FollowUp::new("draw")));
        assert_eq!(game.total(), 1);
        assert_eq!(game.discards(), [ElementId(1)]);
    }

    #[test]
    fn test_exact_target_wins() {
        let (_, mut game) = RaceGameBuilder::new().target(3).build().unwrap();
        game.execute("add", &Args::new().with("amount", 3i64), p(1)).unwrap();

        assert_eq!(game.winner(), Some(p(1)));
        assert_eq!(game.winners(), vec![p(1)]);
        assert!(game.check(&PredicateId::new("finished"), &Scope::default()));
    }

    #[test]
    fn test_execute_errors() {
        let (_, mut game) = RaceGameBuilder::new().deck_size(0).build().unwrap();

        assert_eq!(
            game.execute("draw", &Args::new(), p(0)).unwrap_err(),
            ExecutionError::new("deck is empty")
        );
        assert!(game.execute("play", &Args::new().with("card", ElementId(99)), p(0)).is_err());
        assert!(game.execute("fly", &Args::new(), p(0)).is_err());
    }
}
