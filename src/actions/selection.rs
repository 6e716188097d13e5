//! Selections and their candidates.
//!
//! A `Selection` is one named input an action needs before it can run.
//! Four kinds:
//!
//! | Kind | Value | Candidates |
//! |------|-------|------------|
//! | `Value` | typed literal (`Bool`, `Int`, `Text`) | none, checked by type/range |
//! | `Choice` | any `ArgValue` | static list or host enumerator |
//! | `Element` | one `ElementId` | static list or host enumerator |
//! | `Elements` | several `ElementId`s, `{min, max}` | static list or host enumerator |
//!
//! Candidates are `Choice` records. A disabled candidate stays visible with
//! its reason but can never be auto-filled or accepted.

use serde::{Deserialize, Serialize};

use crate::core::{ChoiceSourceId, ElementId};

use super::value::ArgValue;

/// One candidate value for a selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    /// The value submitted when this candidate is picked.
    pub value: ArgValue,
    /// Label for display.
    pub display: String,
    /// Why this candidate cannot be picked right now.
    pub disabled: Option<String>,
}

impl Choice {
    /// Create an enabled candidate.
    pub fn new(value: impl Into<ArgValue>, display: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: display.into(),
            disabled: None,
        }
    }

    /// Create an enabled element candidate labelled with the element id.
    #[must_use]
    pub fn element(id: ElementId) -> Self {
        Self::new(id, id.to_string())
    }

    /// Mark this candidate disabled (builder pattern).
    #[must_use]
    pub fn with_disabled(mut self, reason: impl Into<String>) -> Self {
        self.disabled = Some(reason.into());
        self
    }

    /// Disable this candidate when `reason` is `Some`.
    #[must_use]
    pub fn disabled_if(mut self, reason: Option<impl Into<String>>) -> Self {
        self.disabled = reason.map(Into::into);
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.disabled.is_none()
    }
}

/// Type constraint on a `Value` selection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    /// Integer within `[min, max]`.
    Int { min: i64, max: i64 },
    Text,
}

impl ValueKind {
    /// An integer with no practical bounds.
    #[must_use]
    pub fn any_int() -> Self {
        Self::Int {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Bool => "a boolean".to_string(),
            Self::Int { min, max } => format!("an integer in {}..={}", min, max),
            Self::Text => "text".to_string(),
        }
    }
}

/// Where a selection's candidates come from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceSource {
    /// Fixed at authoring time.
    Static(Vec<Choice>),
    /// Enumerated by the host on every query.
    Dynamic(ChoiceSourceId),
}

impl ChoiceSource {
    /// A host enumerator.
    pub fn dynamic(id: impl Into<ChoiceSourceId>) -> Self {
        Self::Dynamic(id.into())
    }

    /// A fixed list.
    pub fn fixed(choices: impl IntoIterator<Item = Choice>) -> Self {
        Self::Static(choices.into_iter().collect())
    }
}

/// What kind of input a selection takes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionKind {
    Value(ValueKind),
    Choice(ChoiceSource),
    Element(ChoiceSource),
    Elements {
        source: ChoiceSource,
        min: usize,
        /// `None` means no upper bound.
        max: Option<usize>,
    },
}

impl SelectionKind {
    /// Candidate source, if this kind has one.
    #[must_use]
    pub fn source(&self) -> Option<&ChoiceSource> {
        match self {
            Self::Value(_) => None,
            Self::Choice(source) | Self::Element(source) => Some(source),
            Self::Elements { source, .. } => Some(source),
        }
    }
}

/// A named input requirement of an action.
///
/// ## Example
///
/// ```
/// use rust_gameflow::actions::{ChoiceSource, Selection};
///
/// let target = Selection::element("target", ChoiceSource::dynamic("enemies"))
///     .with_prompt("Pick a target");
/// let extra = Selection::elements("extra", ChoiceSource::dynamic("enemies"), 0, Some(2))
///     .depends_on("target")
///     .optional();
///
/// assert_eq!(target.name, "target");
/// assert!(extra.optional);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub name: String,
    pub prompt: Option<String>,
    pub kind: SelectionKind,
    /// May be skipped with `ArgValue::None`.
    pub optional: bool,
    /// Earlier selections whose values the candidates are computed from.
    pub depends_on: Vec<String>,
}

impl Selection {
    fn with_kind(name: impl Into<String>, kind: SelectionKind) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            kind,
            optional: false,
            depends_on: Vec::new(),
        }
    }

    /// A typed literal.
    pub fn value(name: impl Into<String>, kind: ValueKind) -> Self {
        Self::with_kind(name, SelectionKind::Value(kind))
    }

    /// Pick one of an enumerated list.
    pub fn choice(name: impl Into<String>, source: ChoiceSource) -> Self {
        Self::with_kind(name, SelectionKind::Choice(source))
    }

    /// Pick one element.
    pub fn element(name: impl Into<String>, source: ChoiceSource) -> Self {
        Self::with_kind(name, SelectionKind::Element(source))
    }

    /// Pick between `min` and `max` distinct elements.
    pub fn elements(
        name: impl Into<String>,
        source: ChoiceSource,
        min: usize,
        max: Option<usize>,
    ) -> Self {
        Self::with_kind(name, SelectionKind::Elements { source, min, max })
    }

    /// Set the prompt (builder pattern).
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Allow skipping (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Declare a dependency on an earlier selection (builder pattern).
    #[must_use]
    pub fn depends_on(mut self, selection: impl Into<String>) -> Self {
        self.depends_on.push(selection.into());
        self
    }

    /// Does this selection pick from candidates?
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.kind.source().is_some()
    }

    /// Must at least one enabled candidate exist for the selection to be fillable?
    ///
    /// False for optional selections, typed values and `elements` with `min == 0`.
    #[must_use]
    pub fn needs_candidate(&self) -> bool {
        if self.optional {
            return false;
        }
        match &self.kind {
            SelectionKind::Value(_) => false,
            SelectionKind::Choice(_) | SelectionKind::Element(_) => true,
            SelectionKind::Elements { min, .. } => *min > 0,
        }
    }
}
