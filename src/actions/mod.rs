//! Action system: definitions, selections and validation.
//!
//! ## Key Types
//!
//! - `ActionDefinition`: name, legality condition, ordered selections
//! - `ActionRegistry`: every action a flow may reference
//! - `Selection` / `Choice`: input requirements and their candidates
//! - `ArgValue` / `Args`: typed argument values
//! - `SelectionEngine`: stateless candidate enumeration, validation and auto-fill
//! - `PendingAction`: builds an action one selection at a time
//! - `ActionResult` / `FollowUp`: what the host reports after executing
//!
//! ## Example
//!
//! ```
//! use rust_gameflow::actions::{ActionDefinition, ChoiceSource, Selection, ValueKind};
//!
//! let bid = ActionDefinition::new("bid")
//!     .with_selection(Selection::value("amount", ValueKind::Int { min: 1, max: 10 }))
//!     .with_selection(Selection::element("lot", ChoiceSource::dynamic("lots")));
//!
//! assert!(bid.validate().is_ok());
//! ```

pub mod definition;
pub mod pending;
pub mod result;
pub mod selection;
pub mod validate;
pub mod value;

pub use definition::{ActionDefinition, ActionRegistry};
pub use pending::PendingAction;
pub use result::{ActionResult, FollowUp};
pub use selection::{Choice, ChoiceSource, Selection, SelectionKind, ValueKind};
pub use validate::{AutoFill, SelectionEngine};
pub use value::{ArgValue, Args};
