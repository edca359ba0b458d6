//! Clock Session
//!
//! The single owner of a game: the settings store, the live game state,
//! and the event channel observers subscribe to. Every write goes through
//! here, and every successful write is broadcast as events.

use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::core::millis::{format_clock, Millis};
use crate::game::events::{ClockEvent, ClockEventData};
use crate::game::settings::{Settings, SettingsUpdate};
use crate::game::state::{GameState, Phase, Seat};
use crate::game::tick::{tick, TickResult};
use crate::game::turn;
use crate::game::view::{format_seconds, seat_views, ClockSnapshot, SeatView};

/// Capacity of the event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A session behind the one lock every caller serializes on.
pub type SharedSession = Arc<Mutex<ClockSession>>;

/// A clock session.
pub struct ClockSession {
    /// Stored settings (read by the next start)
    settings: Settings,
    /// Live game
    state: GameState,
    /// Event broadcast channel
    event_tx: broadcast::Sender<ClockEvent>,
}

impl Default for ClockSession {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ClockSession {
    /// Create a session in the menu with `settings` stored.
    pub fn new(settings: Settings) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            settings: settings.clamped(),
            state: GameState::new(),
            event_tx,
        }
    }

    /// Wrap in the shared lock.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Subscribe to events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ClockEvent> {
        self.event_tx.subscribe()
    }

    // =========================================================================
    // WRITE SURFACE
    // =========================================================================

    /// Merge `update` into the stored settings. Never touches a running game.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Settings {
        let settings = self.settings.apply(update);
        if settings != self.settings {
            self.settings = settings;
            self.state
                .push_event(ClockEventData::SettingsUpdated { settings });
        }
        self.commit("update_settings", true);
        settings
    }

    /// Start a fresh game from the settings stored right now.
    pub fn start(&mut self) -> bool {
        let settings = self.settings;
        let accepted = turn::start(&mut self.state, &settings);
        self.commit("start", accepted)
    }

    /// Pause or resume.
    pub fn toggle_pause(&mut self) -> bool {
        let accepted = turn::toggle_pause(&mut self.state);
        self.commit("toggle_pause", accepted)
    }

    /// Return to the menu.
    pub fn reset(&mut self) -> bool {
        let accepted = turn::reset(&mut self.state);
        self.commit("reset", accepted)
    }

    /// Leave the game (same effect as reset).
    pub fn exit(&mut self) -> bool {
        let accepted = turn::exit(&mut self.state);
        self.commit("exit", accepted)
    }

    /// Current speaker yields (or closes their grace window).
    pub fn finish_speaking(&mut self) -> bool {
        let accepted = turn::finish_speaking(&mut self.state);
        self.commit("finish_speaking", accepted)
    }

    /// `seat` tries to take the floor.
    pub fn jump_in(&mut self, seat: Seat) -> bool {
        let accepted = turn::jump_in(&mut self.state, seat);
        self.commit("jump_in", accepted)
    }

    /// Close the grace window early.
    pub fn end_grace_period_early(&mut self) -> bool {
        let accepted = turn::end_grace_period_early(&mut self.state);
        self.commit("end_grace_period_early", accepted)
    }

    /// A player selected `seat`'s region.
    pub fn select_seat(&mut self, seat: Seat) -> bool {
        let accepted = turn::select_seat(&mut self.state, seat);
        self.commit("select_seat", accepted)
    }

    /// Advance the clock by `delta` ms. A no-op unless playing.
    pub fn advance_time(&mut self, delta: Millis) -> bool {
        self.run_tick(delta).applied
    }

    /// Advance the clock and return the full tick result.
    pub fn run_tick(&mut self, delta: Millis) -> TickResult {
        let result = tick(&mut self.state, delta);
        // tick() already drained its events into the result
        self.broadcast(&result.events);
        self.check_state("advance_time");

        if let Some(seat) = result.expired {
            let next = self.state.current_speaker;
            let left = self.state.time_of(next).unwrap_or_default();
            debug!(seat, next, next_time = %format_seconds(left), "clock ran out");
        }
        result
    }

    /// Drain pending events, broadcast them, and report `accepted`.
    fn commit(&mut self, op: &'static str, accepted: bool) -> bool {
        let events = self.state.take_events();
        if accepted {
            debug!(op, events = events.len(), "operation applied");
        } else {
            debug!(op, phase = %self.state.phase, "operation ignored");
        }
        self.broadcast(&events);
        self.check_state(op);
        accepted
    }

    fn broadcast(&self, events: &[ClockEvent]) {
        for event in events {
            match &event.data {
                ClockEventData::PhaseChanged { old_phase, new_phase } => {
                    info!(%old_phase, %new_phase, "phase changed");
                }
                ClockEventData::GameEnded { elapsed_ms } => {
                    info!(elapsed = %format_clock(*elapsed_ms), "game ended");
                }
                _ => {}
            }
            // No subscribers is fine
            let _ = self.event_tx.send(event.clone());
        }
    }

    fn check_state(&self, op: &'static str) {
        let checked = self.state.check_invariants();
        if let Err(violation) = &checked {
            error!(op, %violation, "invariant violated");
        }
        debug_assert!(checked.is_ok(), "{op} broke an invariant");
    }

    // =========================================================================
    // READ SURFACE
    // =========================================================================

    /// Stored settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Live game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Who holds the floor.
    pub fn current_speaker(&self) -> Seat {
        self.state.current_speaker
    }

    /// Remaining time per seat (ms).
    pub fn player_times(&self) -> &[Millis] {
        &self.state.player_times
    }

    /// Remaining jump-ins per seat.
    pub fn jump_in_counts(&self) -> &[u32] {
        &self.state.jump_in_counts
    }

    /// Whether the grace window is open.
    pub fn grace_period_active(&self) -> bool {
        self.state.grace_period_active
    }

    /// Grace time left (ms).
    pub fn grace_period_remaining(&self) -> Millis {
        self.state.grace_period_remaining
    }

    /// Snapshot of the whole read surface.
    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot::capture(&self.state, &self.settings)
    }

    /// Per-seat display hints.
    pub fn seat_views(&self) -> Vec<SeatView> {
        seat_views(&self.state)
    }
}
