//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Flow engine configuration parameters.
///
/// The caps here are safety valves against authoring bugs. Exceeding any of
/// them is a `ConfigurationError`, never a silent truncation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Iteration cap for loops that do not set their own `max_iterations`.
    pub max_loop_iterations: u32,

    /// Maximum consecutive follow-ups inside one action step.
    pub max_follow_up_chain: u32,

    /// Maximum interpreter transitions in a single `advance()`.
    /// Catches runaway trees that never reach an action step.
    pub max_transitions: u32,

    /// Default auto-fill policy for `PendingAction`.
    pub auto_fill: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: 10_000,
            max_follow_up_chain: 32,
            max_transitions: 100_000,
            auto_fill: true,
        }
    }
}

impl FlowConfig {
    /// Set the default loop iteration cap.
    #[must_use]
    pub fn with_max_loop_iterations(mut self, cap: u32) -> Self {
        self.max_loop_iterations = cap;
        self
    }

    /// Set the follow-up chain cap.
    #[must_use]
    pub fn with_max_follow_up_chain(mut self, cap: u32) -> Self {
        self.max_follow_up_chain = cap;
        self
    }

    /// Set the per-advance transition cap.
    #[must_use]
    pub fn with_max_transitions(mut self, cap: u32) -> Self {
        self.max_transitions = cap;
        self
    }

    /// Enable or disable auto-fill by default.
    #[must_use]
    pub fn with_auto_fill(mut self, enabled: bool) -> Self {
        self.auto_fill = enabled;
        self
    }
}
