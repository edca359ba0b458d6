//! Host Layer
//!
//! Async shell around the game rules: the session owner, the tick driver,
//! and the console protocol. This layer is **non-deterministic** - all
//! clock rules run through `game/`.

pub mod session;
pub mod driver;
pub mod protocol;
pub mod console;

pub use session::{ClockSession, SharedSession, EVENT_CHANNEL_CAPACITY};
pub use driver::{spawn_driver, DriverConfig, TickDriver};
pub use protocol::{Command, Reply, ProtocolError};
pub use console::{execute, run_console};
