//! "Race to the target" reference game.
//!
//! A small game that exercises every part of the engine:
//! - Players take turns, one action each, until someone wins
//! - `add` raises a shared total by 1-3; amounts that would pass the
//!   target are shown but disabled
//! - `play` spends a numbered card from hand for its value; emptying the
//!   hand chains into a `draw` follow-up
//! - `draw` takes the top card of the shared deck
//! - `discard` throws away one or two cards with an optional note
//! - Whoever lands exactly on the target wins
//!
//! Supports 2-8 players.

mod game;

pub use game::{RaceGame, RaceGameBuilder};
