//! Game State
//!
//! Phase, per-player clocks and jump-in allowances, and the grace window.
//! Pure data plus small helpers; the rules live in `turn` and `tick`.

use serde::{Serialize, Deserialize};

use crate::core::millis::{Millis, MILLIS_ZERO};
use crate::game::events::{ClockEvent, ClockEventData, HandoffReason};
use crate::game::settings::Settings;

/// Index of a player position, `0..player_count`.
pub type Seat = usize;

/// Next seat counter-clockwise from `seat`: `(seat - 1 + count) mod count`.
#[inline]
pub fn counter_clockwise(seat: Seat, count: usize) -> Seat {
    if count == 0 {
        return 0;
    }
    (seat + count - 1) % count
}

// =============================================================================
// PHASE
// =============================================================================

/// Lifecycle phase of a game.
///
/// ```text
/// Menu ──start──▶ Playing ◀──toggle──▶ Paused
///                    │
///                    └──all clocks at 0──▶ Ended
/// (any) ──reset/exit──▶ Menu
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Configuring, no game in progress
    #[default]
    Menu,
    /// Clock running
    Playing,
    /// Clock frozen
    Paused,
    /// Every player is out of time
    Ended,
}

impl Phase {
    /// Whether a game exists in this phase (arrays are populated).
    pub fn has_game(self) -> bool {
        !matches!(self, Phase::Menu)
    }

    /// Lowercase name, as used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Menu => "menu",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Ended => "ended",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    /// Current lifecycle phase
    pub phase: Phase,

    /// Settings snapshot taken at the last start
    pub settings: Settings,

    /// Who holds the floor
    pub current_speaker: Seat,

    /// Remaining time per seat (ms)
    pub player_times: Vec<Millis>,

    /// Remaining jump-ins per seat
    pub jump_in_counts: Vec<u32>,

    /// Whether the current speaker is protected from jump-ins
    pub grace_period_active: bool,

    /// Time left in the grace window (ms, 0 when inactive)
    pub grace_period_remaining: Millis,

    /// Playing time since the last start (ms)
    pub elapsed: Millis,

    /// Effective ticks since the last start
    pub tick: u64,

    /// Events generated by the last operation (drained by the owner)
    #[serde(skip)]
    pub pending_events: Vec<ClockEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Empty state in the menu.
    pub fn new() -> Self {
        Self {
            phase: Phase::Menu,
            settings: Settings::default(),
            current_speaker: 0,
            player_times: Vec::new(),
            jump_in_counts: Vec::new(),
            grace_period_active: false,
            grace_period_remaining: MILLIS_ZERO,
            elapsed: MILLIS_ZERO,
            tick: 0,
            pending_events: Vec::new(),
        }
    }

    /// Number of seats in the current game (0 in the menu).
    #[inline]
    pub fn player_count(&self) -> usize {
        self.player_times.len()
    }

    /// Check whether the clock is running.
    #[inline]
    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Check whether the game has ended.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Remaining time for a seat, if it exists.
    pub fn time_of(&self, seat: Seat) -> Option<Millis> {
        self.player_times.get(seat).copied()
    }

    /// Remaining jump-ins for a seat, if it exists.
    pub fn jump_ins_of(&self, seat: Seat) -> Option<u32> {
        self.jump_in_counts.get(seat).copied()
    }

    /// True once every clock has reached zero. False with no seats.
    pub fn all_out_of_time(&self) -> bool {
        !self.player_times.is_empty() && self.player_times.iter().all(|t| *t <= 0)
    }

    /// Seat the floor passes to when the current speaker yields.
    #[inline]
    pub fn next_speaker(&self) -> Seat {
        counter_clockwise(self.current_speaker, self.player_count())
    }

    // -------------------------------------------------------------------------
    // Mutation helpers (used by `turn` and `tick`)
    // -------------------------------------------------------------------------

    /// Move to `phase`, recording the change. No event if unchanged.
    pub(crate) fn set_phase(&mut self, phase: Phase) {
        let old_phase = self.phase;
        if old_phase == phase {
            return;
        }
        self.phase = phase;
        self.push_event(ClockEventData::PhaseChanged {
            old_phase,
            new_phase: phase,
        });
    }

    /// Open a full-length grace window for the current speaker.
    pub(crate) fn open_grace(&mut self) {
        let duration_ms = self.settings.grace_duration();
        self.grace_period_active = true;
        self.grace_period_remaining = duration_ms;
        self.push_event(ClockEventData::GraceStarted {
            seat: self.current_speaker,
            duration_ms,
        });
    }

    /// Close the grace window.
    pub(crate) fn close_grace(&mut self, early: bool) {
        self.grace_period_active = false;
        self.grace_period_remaining = MILLIS_ZERO;
        self.push_event(ClockEventData::GraceEnded {
            seat: self.current_speaker,
            early,
        });
    }

    /// Give the floor to `to` and open a fresh grace window for them.
    pub(crate) fn hand_floor(&mut self, to: Seat, reason: HandoffReason) {
        let from = self.current_speaker;
        self.current_speaker = to;
        self.push_event(ClockEventData::SpeakerChanged { from, to, reason });
        self.open_grace();
    }

    /// Push an event stamped with the current game clock.
    pub(crate) fn push_event(&mut self, data: ClockEventData) {
        self.pending_events
            .push(ClockEvent::new(self.elapsed, self.tick, data));
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<ClockEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // -------------------------------------------------------------------------
    // Invariants
    // -------------------------------------------------------------------------

    /// Verify the structural invariants of a live game.
    ///
    /// Only checked while a game exists (`Playing`, `Paused`, `Ended`).
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if !self.phase.has_game() {
            return Ok(());
        }

        let expected = self.settings.seats();
        if self.player_times.len() != expected || self.jump_in_counts.len() != expected {
            return Err(InvariantViolation::SeatCountMismatch {
                expected,
                times: self.player_times.len(),
                jump_ins: self.jump_in_counts.len(),
            });
        }

        if self.current_speaker >= expected {
            return Err(InvariantViolation::SpeakerOutOfRange {
                speaker: self.current_speaker,
                player_count: expected,
            });
        }

        if !self.grace_period_active && self.grace_period_remaining != 0 {
            return Err(InvariantViolation::StaleGraceTime(self.grace_period_remaining));
        }

        if self.grace_period_remaining < 0 {
            return Err(InvariantViolation::NegativeTime {
                what: "grace period",
                value: self.grace_period_remaining,
            });
        }

        if let Some(value) = self.player_times.iter().copied().find(|t| *t < 0) {
            return Err(InvariantViolation::NegativeTime {
                what: "player time",
                value,
            });
        }

        if self.is_ended() != self.all_out_of_time() {
            return Err(InvariantViolation::EndedMismatch {
                phase: self.phase,
                all_out: self.all_out_of_time(),
            });
        }

        Ok(())
    }
}

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// Arrays do not match the player count.
    #[error("expected {expected} seats, found {times} clocks and {jump_ins} jump-in counters")]
    SeatCountMismatch {
        /// Seats in the settings snapshot
        expected: usize,
        /// Length of `player_times`
        times: usize,
        /// Length of `jump_in_counts`
        jump_ins: usize,
    },

    /// Speaker index outside the table.
    #[error("speaker {speaker} out of range for {player_count} players")]
    SpeakerOutOfRange {
        /// Current speaker
        speaker: Seat,
        /// Seats in the game
        player_count: usize,
    },

    /// Grace inactive but time left on it.
    #[error("grace period inactive with {0} ms remaining")]
    StaleGraceTime(Millis),

    /// A clock went below zero.
    #[error("{what} is negative: {value} ms")]
    NegativeTime {
        /// Which clock
        what: &'static str,
        /// Offending value (ms)
        value: Millis,
    },

    /// Ended phase disagrees with the clocks.
    #[error("phase {phase} but all clocks out = {all_out}")]
    EndedMismatch {
        /// Current phase
        phase: Phase,
        /// Whether every clock is at zero
        all_out: bool,
    },
}

// =============================================================================
// TESTS
// =============================================================================
