//! Compiled flow tree.
//!
//! The authored `FlowNode` tree is flattened into an arena once, at
//! definition time. Nodes are numbered in preorder, so the same authored
//! tree always yields the same `NodeId`s and frames can reference nodes by
//! id instead of by pointer.
//!
//! The tree also carries a fingerprint of the authored structure. Snapshots
//! record it so a saved stack is never restored against a different tree.
//! The fingerprint is FNV-1a over the `bincode` encoding of the authored
//! tree, which has fixed-width integers on every target.

use std::io;

use serde::{Deserialize, Serialize};

use crate::core::NodeId;
use crate::rules::Condition;

use super::node::{ActionStepNode, FlowNode, PlayerOrder};

/// Node configuration with children replaced by ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Sequence {
        children: Vec<NodeId>,
    },
    Loop {
        condition: Condition,
        body: NodeId,
        max_iterations: Option<u32>,
    },
    Conditional {
        condition: Condition,
        then: NodeId,
        otherwise: Option<NodeId>,
    },
    EachPlayer {
        order: PlayerOrder,
        filter: Condition,
        body: NodeId,
    },
    Phase {
        name: String,
        body: Option<NodeId>,
    },
    ActionStep(ActionStepNode),
}

impl NodeKind {
    /// Short variant name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequence { .. } => "sequence",
            Self::Loop { .. } => "loop",
            Self::Conditional { .. } => "conditional",
            Self::EachPlayer { .. } => "each_player",
            Self::Phase { .. } => "phase",
            Self::ActionStep(_) => "action_step",
        }
    }

    /// Direct children in order.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Self::Sequence { children } => children.clone(),
            Self::Loop { body, .. } | Self::EachPlayer { body, .. } => vec![*body],
            Self::Conditional { then, otherwise, .. } => {
                std::iter::once(*then).chain(*otherwise).collect()
            }
            Self::Phase { body, .. } => body.iter().copied().collect(),
            Self::ActionStep(_) => Vec::new(),
        }
    }
}

/// A node in the arena.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    /// `None` only for the root.
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
}

/// Arena-based flow tree.
///
/// ## Example
///
/// ```
/// use rust_gameflow::core::NodeId;
/// use rust_gameflow::flow::{action_step, phase, sequence, FlowTree};
///
/// let tree = FlowTree::compile(&sequence([phase("setup"), action_step(["play"]).into()]));
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.node(NodeId::new(2)).parent, Some(NodeId::ROOT));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTree {
    nodes: Vec<TreeNode>,
    fingerprint: u64,
}

impl FlowTree {
    /// Flatten an authored tree.
    #[must_use]
    pub fn compile(root: &FlowNode) -> Self {
        let mut fingerprint = Fingerprint::default();
        // Infallible: the writer never errors and no authored type has a custom serializer.
        let _ = bincode::serialize_into(&mut fingerprint, root);

        let mut tree = Self {
            nodes: Vec::new(),
            fingerprint: fingerprint.0,
        };
        tree.alloc(root, None);
        tree
    }

    /// Allocate `node` and its subtree in preorder, returning its id.
    fn alloc(&mut self, node: &FlowNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(TreeNode {
            id,
            parent,
            kind: NodeKind::Sequence { children: Vec::new() },
        });

        let kind = match node {
            FlowNode::Sequence(children) => NodeKind::Sequence {
                children: children.iter().map(|c| self.alloc(c, Some(id))).collect(),
            },
            FlowNode::Loop(node) => NodeKind::Loop {
                condition: node.condition.clone(),
                body: self.alloc(&node.body, Some(id)),
                max_iterations: node.max_iterations,
            },
            FlowNode::Conditional(node) => {
                let then = self.alloc(&node.then, Some(id));
                let otherwise = node.otherwise.as_ref().map(|o| self.alloc(o, Some(id)));
                NodeKind::Conditional {
                    condition: node.condition.clone(),
                    then,
                    otherwise,
                }
            }
            FlowNode::EachPlayer(node) => NodeKind::EachPlayer {
                order: node.order.clone(),
                filter: node.filter.clone(),
                body: self.alloc(&node.body, Some(id)),
            },
            FlowNode::Phase(node) => NodeKind::Phase {
                name: node.name.clone(),
                body: node.body.as_ref().map(|b| self.alloc(b, Some(id))),
            },
            FlowNode::ActionStep(step) => NodeKind::ActionStep(step.clone()),
        };

        self.nodes[id.index()].kind = kind;
        id
    }

    /// Root node ID (always 0).
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID.
    ///
    /// Ids handed out by this tree are always valid.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    /// Get a node by an ID of unknown origin.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    /// Hash of the authored structure.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes in preorder.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Iterate over all action steps.
    pub fn action_steps(&self) -> impl Iterator<Item = (NodeId, &ActionStepNode)> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::ActionStep(step) => Some((n.id, step)),
            _ => None,
        })
    }
}

/// 64-bit FNV-1a over everything written to it.
struct Fingerprint(u64);

impl Fingerprint {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self(Self::OFFSET)
    }
}

impl io::Write for Fingerprint {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for byte in buf {
            self.0 = (self.0 ^ u64::from(*byte)).wrapping_mul(Self::PRIME);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
