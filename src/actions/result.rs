//! Action results.
//!
//! The host's `execute` reports what happened through an `ActionResult`.
//! The engine reads only `success` and `follow_up`; `data` is passed
//! through to the caller untouched.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

use super::value::Args;

/// A request to chain straight into another action.
///
/// While a follow-up is pending the originating action step is not
/// complete and its move counter is not advanced.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FollowUp {
    /// Registered action to perform next.
    pub action: String,
    /// Pre-filled arguments. These are locked: the player fills the rest.
    pub args: Args,
    /// Who performs it. Defaults to the actor of the originating action.
    pub actor: Option<PlayerId>,
}

impl FollowUp {
    /// Chain into `action` with no pre-filled arguments.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: Args::new(),
            actor: None,
        }
    }

    /// Pre-fill arguments (builder pattern).
    #[must_use]
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Hand the follow-up to another player (builder pattern).
    #[must_use]
    pub fn with_actor(mut self, actor: PlayerId) -> Self {
        self.actor = Some(actor);
        self
    }
}

/// Outcome of executing a fully-filled action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    /// Host's reason when `success` is false.
    pub error: Option<String>,
    pub follow_up: Option<FollowUp>,
    /// Opaque data for the caller.
    pub data: Args,
}

impl ActionResult {
    /// A successful result.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// A rejected result. The step is left as it was.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Chain into another action (builder pattern).
    #[must_use]
    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    /// Attach caller data (builder pattern).
    #[must_use]
    pub fn with_data(mut self, data: Args) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_and_failed() {
        let ok = ActionResult::ok();
        assert!(ok.success);
        assert!(ok.error.is_none());
        assert!(ok.follow_up.is_none());

        let failed = ActionResult::failed("no cards left");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("no cards left"));
    }

    #[test]
    fn test_follow_up_builder() {
        let result = ActionResult::ok().with_follow_up(
            FollowUp::new("draw")
                .with_args(Args::new().with("count", 1i64))
                .with_actor(PlayerId::new(1)),
        );
        let follow_up = result.follow_up.unwrap();
        assert_eq!(follow_up.action, "draw");
        assert_eq!(follow_up.actor, Some(PlayerId::new(1)));
        assert!(follow_up.args.contains("count"));
    }
}
