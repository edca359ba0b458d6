//! Turn Transitions
//!
//! Every discrete operation on a game. Each one either performs its whole
//! effect and returns `true`, or changes nothing and returns `false`.
//! Calls that arrive in the wrong phase are ordinary no-ops, so input racing
//! with a phase change can never corrupt state.

use crate::core::millis::MILLIS_ZERO;
use crate::game::events::{ClockEventData, HandoffReason};
use crate::game::settings::Settings;
use crate::game::state::{GameState, Phase, Seat};

/// Set up a fresh game from `settings` and start the clock.
///
/// Allowed from any phase; an in-progress game is discarded. `settings`
/// must be the snapshot current at the moment of the call.
pub fn start(state: &mut GameState, settings: &Settings) -> bool {
    let settings = settings.clamped();
    let seats = settings.seats();

    state.settings = settings;
    state.player_times = vec![settings.time_budget(); seats];
    state.jump_in_counts = vec![settings.jump_in_amount; seats];
    state.current_speaker = 0;
    state.elapsed = MILLIS_ZERO;
    state.tick = 0;

    state.push_event(ClockEventData::GameStarted { settings });
    state.set_phase(Phase::Playing);
    state.open_grace();
    true
}

/// Flip between `Playing` and `Paused`. No-op from `Menu` or `Ended`.
pub fn toggle_pause(state: &mut GameState) -> bool {
    match state.phase {
        Phase::Playing => state.set_phase(Phase::Paused),
        Phase::Paused => state.set_phase(Phase::Playing),
        Phase::Menu | Phase::Ended => return false,
    }
    true
}

/// Discard the game and return to the menu. Allowed from any phase.
pub fn reset(state: &mut GameState) -> bool {
    state.current_speaker = 0;
    state.player_times.clear();
    state.jump_in_counts.clear();
    state.grace_period_active = false;
    state.grace_period_remaining = MILLIS_ZERO;
    state.elapsed = MILLIS_ZERO;
    state.tick = 0;

    state.set_phase(Phase::Menu);
    state.push_event(ClockEventData::GameReset);
    true
}

/// Leave the game. Same effect as [`reset`].
pub fn exit(state: &mut GameState) -> bool {
    reset(state)
}

/// Current speaker yields the floor.
///
/// While their own grace window is open, the only thing a speaker can do
/// is close it: the call ends the grace period instead of passing the floor.
pub fn finish_speaking(state: &mut GameState) -> bool {
    if !state.is_playing() {
        return false;
    }

    if state.grace_period_active {
        return end_grace_period_early(state);
    }

    let next = state.next_speaker();
    state.hand_floor(next, HandoffReason::Finished);
    true
}

/// `seat` tries to seize the floor.
///
/// Succeeds only while playing, outside any grace window, for a seat other
/// than the speaker that still has both jump-ins and time left. Which
/// condition failed is deliberately not reported.
pub fn jump_in(state: &mut GameState, seat: Seat) -> bool {
    if !can_jump_in(state, seat) {
        return false;
    }

    state.hand_floor(seat, HandoffReason::JumpedIn);

    let remaining = state.jump_in_counts[seat] - 1;
    state.jump_in_counts[seat] = remaining;
    state.push_event(ClockEventData::JumpInUsed { seat, remaining });
    true
}

/// Whether [`jump_in`] would succeed for `seat` right now.
pub fn can_jump_in(state: &GameState, seat: Seat) -> bool {
    state.is_playing()
        && seat != state.current_speaker
        && !state.grace_period_active
        && state.jump_ins_of(seat).is_some_and(|n| n > 0)
        && state.time_of(seat).is_some_and(|t| t > 0)
}

/// Close the current grace window before it runs out.
pub fn end_grace_period_early(state: &mut GameState) -> bool {
    if !state.is_playing() || !state.grace_period_active {
        return false;
    }

    state.close_grace(true);
    true
}

/// A player selected `seat`'s region.
///
/// The speaker's own region finishes speaking; any other region is a
/// jump-in attempt, always routed through [`jump_in`] for the decision.
pub fn select_seat(state: &mut GameState, seat: Seat) -> bool {
    if seat == state.current_speaker {
        finish_speaking(state)
    } else {
        jump_in(state, seat)
    }
}
