//! Read-Only Projections
//!
//! Snapshots of a game for rendering and serialization. Nothing here
//! mutates state, and nothing here is authoritative: a seat marked
//! `selectable` is a hint for affordances, `turn::jump_in` still decides.

use serde::{Serialize, Deserialize};

use crate::core::millis::{ceil_secs, to_secs_f64, Millis};
use crate::game::settings::Settings;
use crate::game::state::{GameState, Phase, Seat};
use crate::game::turn::can_jump_in;

/// Full read surface of a session at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    /// Lifecycle phase
    pub phase: Phase,
    /// Who holds the floor
    pub current_speaker: Seat,
    /// Remaining time per seat (seconds)
    pub player_times: Vec<f64>,
    /// Remaining jump-ins per seat
    pub jump_in_counts: Vec<u32>,
    /// Grace window open
    pub grace_period_active: bool,
    /// Grace time left (seconds)
    pub grace_period_remaining: f64,
    /// Playing time since start (seconds)
    pub elapsed: f64,
    /// Stored settings (applies to the next start)
    pub settings: Settings,
    /// Per-seat display hints
    pub seats: Vec<SeatView>,
}

impl ClockSnapshot {
    /// Capture `state` alongside the stored `settings`.
    pub fn capture(state: &GameState, settings: &Settings) -> Self {
        Self {
            phase: state.phase,
            current_speaker: state.current_speaker,
            player_times: state.player_times.iter().map(|t| to_secs_f64(*t)).collect(),
            jump_in_counts: state.jump_in_counts.clone(),
            grace_period_active: state.grace_period_active,
            grace_period_remaining: to_secs_f64(state.grace_period_remaining),
            elapsed: to_secs_f64(state.elapsed),
            settings: *settings,
            seats: seat_views(state),
        }
    }
}

/// Display hints for one player's region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    /// Seat index
    pub seat: Seat,
    /// Whole seconds to show, rounded up; hidden for others during grace
    pub display_time: Option<u64>,
    /// Jump-ins left
    pub jump_ins: u32,
    /// Holds the floor
    pub is_speaker: bool,
    /// Someone else's grace window is open
    pub grayed_out: bool,
    /// Cannot jump in any more
    pub out_of_jumps: bool,
    /// Clock at zero
    pub out_of_time: bool,
    /// Selecting this region would currently do something
    pub selectable: bool,
}

/// Display hints for every seat. Empty in the menu.
pub fn seat_views(state: &GameState) -> Vec<SeatView> {
    if !state.phase.has_game() {
        return Vec::new();
    }

    let playing = state.is_playing();
    (0..state.player_count())
        .map(|seat| {
            let time = state.player_times[seat];
            let jump_ins = state.jump_in_counts[seat];
            let is_speaker = seat == state.current_speaker;
            let grayed_out = playing && !is_speaker && state.grace_period_active;

            SeatView {
                seat,
                display_time: (!grayed_out).then(|| ceil_secs(time)),
                jump_ins,
                is_speaker,
                grayed_out,
                out_of_jumps: playing && !is_speaker && jump_ins == 0,
                out_of_time: time <= 0,
                selectable: playing && (is_speaker || can_jump_in(state, seat)),
            }
        })
        .collect()
}

/// Seconds shown for a clock: rounded up, never negative.
pub fn format_seconds(ms: Millis) -> String {
    ceil_secs(ms).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tick::tick;
    use crate::game::turn;

    fn settings() -> Settings {
        Settings {
            invulnerability_period: 2,
            jump_in_amount: 1,
            max_time: 10,
            player_count: 3,
        }
    }

    #[test]
    fn test_menu_has_no_seats() {
        let state = GameState::new();
        let snapshot = ClockSnapshot::capture(&state, &settings());
        assert_eq!(snapshot.phase, Phase::Menu);
        assert!(snapshot.seats.is_empty());
        assert!(snapshot.player_times.is_empty());
        assert_eq!(snapshot.settings, settings());
    }

    #[test]
    fn test_grace_hides_other_clocks() {
        let mut state = GameState::new();
        turn::start(&mut state, &settings());
        tick(&mut state, 100);

        let views = seat_views(&state);
        assert_eq!(views[0].display_time, Some(10));
        assert!(views[0].is_speaker);
        assert!(views[0].selectable);
        assert!(views[1].grayed_out);
        assert_eq!(views[1].display_time, None);
        assert!(!views[1].selectable);
    }

    #[test]
    fn test_after_grace_everyone_visible() {
        let mut state = GameState::new();
        turn::start(&mut state, &settings());
        turn::end_grace_period_early(&mut state);
        state.jump_in_counts[2] = 0;
        state.player_times[1] = 0;

        let views = seat_views(&state);
        assert!(views.iter().all(|v| !v.grayed_out && v.display_time.is_some()));
        assert!(views[1].out_of_time);
        assert!(!views[1].selectable);
        assert!(views[2].out_of_jumps);
        assert!(!views[2].selectable);
    }

    #[test]
    fn test_paused_shows_all_but_nothing_selectable() {
        let mut state = GameState::new();
        turn::start(&mut state, &settings());
        turn::toggle_pause(&mut state);

        let views = seat_views(&state);
        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| v.display_time == Some(10)));
        assert!(views.iter().all(|v| !v.selectable));
    }

    #[test]
    fn test_snapshot_in_seconds() {
        let mut state = GameState::new();
        turn::start(&mut state, &settings());
        for _ in 0..5 {
            tick(&mut state, 100);
        }
        let snapshot = ClockSnapshot::capture(&state, &settings());
        assert!((snapshot.player_times[0] - 9.5).abs() < 1e-9);
        assert!((snapshot.grace_period_remaining - 1.5).abs() < 1e-9);
        assert!((snapshot.elapsed - 0.5).abs() < 1e-9);
        assert_eq!(format_seconds(9_500), "10");
    }
}
