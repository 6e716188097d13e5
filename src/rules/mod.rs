//! The boundary between the engine and a game.
//!
//! Games implement `GameHost` to define:
//! - What registered predicates mean
//! - The candidates of dynamic selections
//! - How actions modify state
//! - Who won
//!
//! The engine calls into `GameHost` but never interprets game-specific
//! concepts directly. `Condition` trees reference host predicates by id.

pub mod condition;
pub mod host;

pub use condition::{Condition, ConditionEvaluator};
pub use host::{GameHost, Scope, SelectionScope};
