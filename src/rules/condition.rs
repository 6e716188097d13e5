//! Conditions.
//!
//! Conditions gate loops, branches, action steps and action legality. They
//! are plain data: leaves name a host predicate by `PredicateId`, and the
//! combinators compose them. Nothing executable is stored, so any tree that
//! holds conditions can be hashed, compared and serialized.

use serde::{Deserialize, Serialize};

use crate::core::PredicateId;

use super::host::{GameHost, Scope};

/// A condition evaluated against the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Always holds.
    #[default]
    Always,

    /// Never holds.
    Never,

    /// Host predicate.
    Check(PredicateId),

    /// Condition must be false.
    Not(Box<Condition>),

    /// All conditions must hold.
    All(Vec<Condition>),

    /// At least one condition must hold.
    Any(Vec<Condition>),
}

impl Condition {
    /// Create a host predicate condition.
    pub fn check(predicate: impl Into<PredicateId>) -> Self {
        Self::Check(predicate.into())
    }

    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    /// Is this the trivially-true condition?
    #[must_use]
    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

/// Evaluator for conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate<G: GameHost + ?Sized>(condition: &Condition, host: &G, scope: &Scope<'_>) -> bool {
        match condition {
            Condition::Always => true,
            Condition::Never => false,
            Condition::Check(predicate) => host.check(predicate, scope),
            Condition::Not(inner) => !Self::evaluate(inner, host, scope),
            Condition::All(conditions) => conditions
                .iter()
                .all(|c| Self::evaluate(c, host, scope)),
            Condition::Any(conditions) => conditions
                .iter()
                .any(|c| Self::evaluate(c, host, scope)),
        }
    }
}
