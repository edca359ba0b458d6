//! Game Logic Module
//!
//! The turn and clock rules. Synchronous, deterministic, no I/O.
//!
//! ## Module Structure
//!
//! - `settings`: Validated configuration and clamping updates
//! - `state`: Phase, per-seat clocks, grace window, invariants
//! - `turn`: Start, pause, reset, finish, jump-in, grace transitions
//! - `tick`: Time advance
//! - `events`: Events emitted after each successful mutation
//! - `view`: Read-only snapshots and per-seat display hints

pub mod settings;
pub mod state;
pub mod turn;
pub mod tick;
pub mod events;
pub mod view;

// Re-export key types
pub use settings::{Settings, SettingsUpdate};
pub use state::{GameState, Phase, Seat, InvariantViolation};
pub use tick::TickResult;
pub use events::{ClockEvent, ClockEventData, HandoffReason};
pub use view::{ClockSnapshot, SeatView};
