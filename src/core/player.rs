//! Player identification and seating order.
//!
//! ## PlayerId
//!
//! Type-safe player identifier supporting 1-255 players. The engine never
//! assumes a player count; the host reports its seating through
//! `GameHost::players`.

use serde::{Deserialize, Serialize};

/// Player identifier supporting 1-255 players.
///
/// Player indices are 0-based: the first player is `PlayerId(0)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all player IDs for a game with `player_count` players.
    ///
    /// ```
    /// use rust_gameflow::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(players.len(), 4);
    /// assert_eq!(players[0], PlayerId::new(0));
    /// assert_eq!(players[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count.min(255) as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Rotate a seating so that `start` comes first.
///
/// Seats before `start` wrap around to the end. If `start` is not seated,
/// the seating is returned unchanged.
///
/// ```
/// use rust_gameflow::core::{rotate_seating, PlayerId};
///
/// let seats: Vec<_> = PlayerId::all(4).collect();
/// let order = rotate_seating(&seats, PlayerId::new(2));
/// assert_eq!(order, vec![PlayerId::new(2), PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
/// ```
#[must_use]
pub fn rotate_seating(seating: &[PlayerId], start: PlayerId) -> Vec<PlayerId> {
    match seating.iter().position(|&p| p == start) {
        Some(pos) => seating[pos..].iter().chain(&seating[..pos]).copied().collect(),
        None => seating.to_vec(),
    }
}
