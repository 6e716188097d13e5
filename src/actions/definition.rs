//! Action definitions and the action registry.
//!
//! An `ActionDefinition` is authored once at game setup: a name, a legality
//! condition and an ordered list of selections. The `ActionRegistry` holds
//! every action a flow may reference.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::core::ConfigurationError;
use crate::rules::Condition;

use super::selection::{Selection, SelectionKind, ValueKind};

/// An action a player can take.
///
/// ## Example
///
/// ```
/// use rust_gameflow::actions::{ActionDefinition, ChoiceSource, Selection};
/// use rust_gameflow::rules::Condition;
///
/// let play = ActionDefinition::new("play")
///     .with_condition(Condition::check("has_cards"))
///     .with_selection(Selection::element("card", ChoiceSource::dynamic("hand")));
///
/// assert_eq!(play.selections.len(), 1);
/// assert!(play.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    pub prompt: Option<String>,
    /// Legality condition, evaluated with the actor in scope.
    pub condition: Condition,
    /// Filled in this order.
    pub selections: Vec<Selection>,
}

impl ActionDefinition {
    /// Create an always-legal action with no selections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            condition: Condition::Always,
            selections: Vec::new(),
        }
    }

    /// Set the prompt (builder pattern).
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Set the legality condition (builder pattern).
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Append a selection (builder pattern).
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selections.push(selection);
        self
    }

    /// Look up a selection by name.
    #[must_use]
    pub fn selection(&self, name: &str) -> Option<&Selection> {
        self.selections.iter().find(|s| s.name == name)
    }

    /// Position of a selection in fill order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.selections.iter().position(|s| s.name == name)
    }

    /// Check the selection list for authoring mistakes.
    ///
    /// Rejects duplicate selection names, dependencies on selections that
    /// are not defined earlier, and `elements` or integer bounds with
    /// `min > max`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();

        for selection in &self.selections {
            for dependency in &selection.depends_on {
                if !seen.contains(dependency.as_str()) {
                    return Err(ConfigurationError::UndefinedDependency {
                        action: self.name.clone(),
                        selection: selection.name.clone(),
                        dependency: dependency.clone(),
                    });
                }
            }

            match &selection.kind {
                SelectionKind::Elements { min, max: Some(max), .. } if min > max => {
                    return Err(ConfigurationError::InvalidElementBounds {
                        action: self.name.clone(),
                        selection: selection.name.clone(),
                        min: *min,
                        max: *max,
                    });
                }
                SelectionKind::Value(ValueKind::Int { min, max }) if min > max => {
                    return Err(ConfigurationError::InvalidValueBounds {
                        action: self.name.clone(),
                        selection: selection.name.clone(),
                        min: *min,
                        max: *max,
                    });
                }
                _ => {}
            }

            if !seen.insert(selection.name.as_str()) {
                return Err(ConfigurationError::DuplicateSelection {
                    action: self.name.clone(),
                    selection: selection.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Registry of action definitions.
///
/// ## Example
///
/// ```
/// use rust_gameflow::actions::{ActionDefinition, ActionRegistry};
///
/// let mut registry = ActionRegistry::new();
/// registry.register(ActionDefinition::new("pass")).unwrap();
///
/// assert!(registry.contains("pass"));
/// assert!(registry.register(ActionDefinition::new("pass")).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    actions: FxHashMap<String, ActionDefinition>,
}

impl ActionRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action definition.
    ///
    /// The definition is validated first; a name already taken is rejected.
    pub fn register(&mut self, action: ActionDefinition) -> Result<(), ConfigurationError> {
        if self.actions.contains_key(&action.name) {
            return Err(ConfigurationError::DuplicateAction {
                action: action.name,
            });
        }
        action.validate()?;
        self.actions.insert(action.name.clone(), action);
        Ok(())
    }

    /// Register an action (builder pattern).
    pub fn with(mut self, action: ActionDefinition) -> Result<Self, ConfigurationError> {
        self.register(action)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over all definitions (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.values()
    }
}
