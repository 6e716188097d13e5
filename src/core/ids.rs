//! Identifiers shared between the flow and action subsystems.
//!
//! - `NodeId`: stable position of a node in a compiled flow tree (preorder
//!   index), used by snapshots to reference nodes without pointers.
//! - `ElementId`: opaque reference to a game element (card, piece, space).
//!   The engine only compares them; the host owns what they point at.
//! - `PredicateId`: name of a host-registered predicate. Flow trees and
//!   action definitions store these instead of closures, so nothing
//!   executable ever needs to be persisted.
//! - `ChoiceSourceId`: name of a host-side candidate enumerator for a
//!   dynamic selection.

use serde::{Deserialize, Serialize};

/// Stable identifier of a node in a compiled flow tree.
///
/// Assigned in preorder, so the root is always `NodeId(0)` and the same
/// authored tree always produces the same ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node of every tree.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a new node ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the arena index for this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Opaque reference to a game element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

impl ElementId {
    /// Create a new element ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for ElementId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Element({})", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_string())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a host-registered predicate.
    PredicateId,
    "Predicate"
);

string_id!(
    /// Identifier of a host-side candidate enumerator.
    ChoiceSourceId,
    "ChoiceSource"
);
