//! Clock Tick
//!
//! Advances the running game by a fixed slice of time. Only the current
//! speaker's clock runs, and it keeps running through their own grace
//! window: they are speaking.

use crate::core::millis::{countdown, Millis};
use crate::game::events::{ClockEvent, ClockEventData, HandoffReason};
use crate::game::state::{GameState, Phase, Seat};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Whether the tick applied (false outside `Playing`)
    pub applied: bool,
    /// Events generated this tick
    pub events: Vec<ClockEvent>,
    /// Seat whose clock ran out this tick
    pub expired: Option<Seat>,
    /// Whether the game ended this tick
    pub game_ended: bool,
}

/// Run one tick of `delta` milliseconds.
///
/// Steps, applied as one update:
/// 1. Grace window counts down; at `<= 0` it closes.
/// 2. Current speaker's clock counts down regardless of grace.
/// 3. At `<= 0` the clock clamps to 0 and the floor passes counter-clockwise
///    with a fresh, full grace window.
/// 4. If every clock is at 0 the game ends.
///
/// Grace expiry is resolved before the speaker check, so a handoff in the
/// same tick always leaves a full-length window. A no-op unless playing
/// or when `delta <= 0`.
pub fn tick(state: &mut GameState, delta: Millis) -> TickResult {
    let mut result = TickResult::default();

    if state.phase != Phase::Playing || delta <= 0 || state.player_count() == 0 {
        return result;
    }
    result.applied = true;

    // 0. Advance game clock
    state.tick += 1;
    state.elapsed = state.elapsed.saturating_add(delta);

    // 1. Grace window
    update_grace(state, delta);

    // 2-3. Speaker clock
    result.expired = update_speaker_clock(state, delta);

    // 4. End condition
    if state.all_out_of_time() {
        state.set_phase(Phase::Ended);
        state.push_event(ClockEventData::GameEnded {
            elapsed_ms: state.elapsed,
        });
        result.game_ended = true;
    }

    result.events = state.take_events();
    result
}

/// Count the grace window down, closing it when it runs out.
fn update_grace(state: &mut GameState, delta: Millis) {
    if !state.grace_period_active {
        return;
    }

    let (remaining, expired) = countdown(state.grace_period_remaining, delta);
    if expired {
        state.close_grace(false);
    } else {
        state.grace_period_remaining = remaining;
    }
}

/// Count the speaker's clock down. Returns the seat if it ran out.
fn update_speaker_clock(state: &mut GameState, delta: Millis) -> Option<Seat> {
    let speaker = state.current_speaker;
    let (remaining, expired) = countdown(state.player_times[speaker], delta);
    state.player_times[speaker] = remaining;

    if !expired {
        return None;
    }

    state.push_event(ClockEventData::TimeExpired { seat: speaker });
    let next = state.next_speaker();
    state.hand_floor(next, HandoffReason::TimeExpired);
    Some(speaker)
}
