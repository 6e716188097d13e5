//! Flow definitions.
//!
//! A `FlowDefinition` bundles everything that is authored once per game:
//! the compiled tree, the action registry and the engine configuration.
//! It is checked as a whole before any engine runs it.

use crate::actions::ActionRegistry;
use crate::core::{ConfigurationError, FlowConfig};

use super::node::FlowNode;
use super::tree::{FlowTree, NodeKind};

/// An authored game flow, ready to run.
#[derive(Clone, Debug)]
pub struct FlowDefinition {
    pub tree: FlowTree,
    pub actions: ActionRegistry,
    pub config: FlowConfig,
}

impl FlowDefinition {
    /// Compile `root` and check it against `actions`.
    pub fn new(root: &FlowNode, actions: ActionRegistry, config: FlowConfig) -> Result<Self, ConfigurationError> {
        let definition = Self {
            tree: FlowTree::compile(root),
            actions,
            config,
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Dry-run check of the whole tree.
    ///
    /// Reports the first problem found in preorder. Action definitions are
    /// checked when they are registered.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for node in self.tree.iter() {
            match &node.kind {
                NodeKind::Loop {
                    max_iterations: Some(0),
                    ..
                } => return Err(ConfigurationError::ZeroLoopCap { node: node.id }),
                NodeKind::ActionStep(step) => {
                    if step.actions.is_empty() {
                        return Err(ConfigurationError::EmptyActionStep { node: node.id });
                    }
                    if let Some(action) = step.actions.iter().find(|a| !self.actions.contains(a)) {
                        return Err(ConfigurationError::UnknownAction {
                            node: node.id,
                            action: action.clone(),
                        });
                    }
                    match (step.min_moves, step.max_moves) {
                        (_, Some(0)) => return Err(ConfigurationError::ZeroMaxMoves { node: node.id }),
                        (Some(min), Some(max)) if min > max => {
                            return Err(ConfigurationError::InvalidMoveBounds {
                                node: node.id,
                                min,
                                max,
                            })
                        }
                        (Some(_), None) if step.repeat_until.is_none() => {
                            return Err(ConfigurationError::UnboundedActionStep { node: node.id })
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if self.config.max_loop_iterations == 0 {
            return Err(ConfigurationError::ZeroLoopCap {
                node: self.tree.root(),
            });
        }
        Ok(())
    }
}
