//! Reference game implementations.
//!
//! Games here implement `GameHost` and ship their own flow definition.
//! They are used by documentation examples and integration tests.

pub mod race;
