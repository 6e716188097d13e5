//! Core engine types: players, identifiers, configuration, errors.
//!
//! This module contains the building blocks shared by the flow interpreter
//! and the action system. Nothing here knows about a particular game.

pub mod player;
pub mod ids;
pub mod config;
pub mod error;

pub use player::{rotate_seating, PlayerId};
pub use ids::{ChoiceSourceId, ElementId, NodeId, PredicateId};
pub use config::FlowConfig;
pub use error::{
    ConfigurationError, ExecutionError, FlowError, SnapshotError, ValidationError,
};
