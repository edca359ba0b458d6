//! Core deterministic primitives.
//!
//! Integer clock arithmetic shared by the game rules and the host.

pub mod millis;

// Re-export core types
pub use millis::{Millis, MILLIS_PER_SECOND, TICK_DELTA};
