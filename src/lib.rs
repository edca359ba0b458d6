//! # Debate Clock
//!
//! Multi-player chess-clock timer for structured debates: one speaker at a
//! time, a grace window after every handoff, and a limited number of
//! jump-ins per player.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DEBATE CLOCK                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── millis.rs   - Integer millisecond clock arithmetic      │
//! │                                                              │
//! │  game/           - Clock rules (deterministic)               │
//! │  ├── settings.rs - Settings snapshot and clamping edits      │
//! │  ├── state.rs    - Phase, seats, invariants                  │
//! │  ├── turn.rs     - Start, pause, finish, jump-in, grace      │
//! │  ├── tick.rs     - Time advance                              │
//! │  ├── events.rs   - Events after every mutation               │
//! │  └── view.rs     - Snapshots and seat display hints          │
//! │                                                              │
//! │  host/           - Async shell (non-deterministic)           │
//! │  ├── session.rs  - Session owner and event broadcast         │
//! │  ├── driver.rs   - 100 ms tick driver                        │
//! │  ├── protocol.rs - Line commands and JSON replies            │
//! │  └── console.rs  - stdin/stdout host                         │
//! │                                                              │
//! │  config.rs       - Environment configuration                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules never read the wall clock and never use
//! floating point for clock state. Time only moves when the host calls
//! `advance_time`, in exact integer milliseconds, so the same sequence of
//! calls always produces the same state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;
pub mod host;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use crate::core::millis::{Millis, MILLIS_PER_SECOND, TICK_DELTA};
pub use game::settings::{Settings, SettingsUpdate};
pub use game::state::{GameState, Phase, Seat};
pub use game::events::{ClockEvent, ClockEventData};
pub use game::view::{ClockSnapshot, SeatView};
pub use host::session::{ClockSession, SharedSession};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wall-clock time between driver ticks (ms)
pub const TICK_INTERVAL_MS: u64 = 100;

/// Driver tick rate (Hz)
pub const TICK_RATE: u32 = 10;
