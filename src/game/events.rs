//! Clock Events
//!
//! Emitted after every successful mutation so observers can react
//! without polling. A rejected operation emits nothing.

use serde::{Serialize, Deserialize};

use crate::core::millis::Millis;
use crate::game::settings::Settings;
use crate::game::state::{Phase, Seat};

/// Why the floor changed hands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandoffReason {
    /// Speaker yielded voluntarily
    Finished,
    /// Another player seized the floor
    JumpedIn,
    /// Speaker's clock ran out
    TimeExpired,
}

/// Event payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClockEventData {
    /// Stored settings were replaced
    SettingsUpdated {
        /// New stored settings
        settings: Settings,
    },

    /// A fresh game was set up (also on restart)
    GameStarted {
        /// Snapshot the game was built from
        settings: Settings,
    },

    /// Lifecycle phase changed
    PhaseChanged {
        /// Phase before
        old_phase: Phase,
        /// Phase after
        new_phase: Phase,
    },

    /// The current speaker changed
    SpeakerChanged {
        /// Previous speaker
        from: Seat,
        /// New speaker
        to: Seat,
        /// Why the floor moved
        reason: HandoffReason,
    },

    /// A grace window opened
    GraceStarted {
        /// Protected speaker
        seat: Seat,
        /// Window length (ms)
        duration_ms: Millis,
    },

    /// A grace window closed
    GraceEnded {
        /// Speaker whose window closed
        seat: Seat,
        /// Closed before running out
        early: bool,
    },

    /// A jump-in was spent
    JumpInUsed {
        /// Seat that jumped in
        seat: Seat,
        /// Jump-ins left for that seat
        remaining: u32,
    },

    /// A player's clock reached zero
    TimeExpired {
        /// Seat whose clock hit zero
        seat: Seat,
    },

    /// Every clock reached zero
    GameEnded {
        /// Total playing time (ms)
        elapsed_ms: Millis,
    },

    /// Session returned to the menu
    GameReset,
}

/// An event stamped with the game clock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClockEvent {
    /// Playing time since the last start (ms)
    pub at_ms: Millis,

    /// Effective ticks since the last start
    pub tick: u64,

    /// Player the event is about, if any
    pub seat: Option<Seat>,

    /// Event data
    pub data: ClockEventData,
}

impl ClockEvent {
    /// Create a new event.
    pub fn new(at_ms: Millis, tick: u64, data: ClockEventData) -> Self {
        let seat = match &data {
            ClockEventData::SpeakerChanged { to, .. } => Some(*to),
            ClockEventData::GraceStarted { seat, .. } => Some(*seat),
            ClockEventData::GraceEnded { seat, .. } => Some(*seat),
            ClockEventData::JumpInUsed { seat, .. } => Some(*seat),
            ClockEventData::TimeExpired { seat } => Some(*seat),
            _ => None,
        };

        Self {
            at_ms,
            tick,
            seat,
            data,
        }
    }

    /// True for a phase change into `phase`.
    pub fn entered(&self, phase: Phase) -> bool {
        matches!(
            self.data,
            ClockEventData::PhaseChanged { new_phase, .. } if new_phase == phase
        )
    }

    /// True for a phase change out of `phase`.
    pub fn left(&self, phase: Phase) -> bool {
        matches!(
            self.data,
            ClockEventData::PhaseChanged { old_phase, new_phase }
                if old_phase == phase && new_phase != phase
        )
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self.data {
            ClockEventData::SettingsUpdated { .. } => "settings_updated",
            ClockEventData::GameStarted { .. } => "game_started",
            ClockEventData::PhaseChanged { .. } => "phase_changed",
            ClockEventData::SpeakerChanged { .. } => "speaker_changed",
            ClockEventData::GraceStarted { .. } => "grace_started",
            ClockEventData::GraceEnded { .. } => "grace_ended",
            ClockEventData::JumpInUsed { .. } => "jump_in_used",
            ClockEventData::TimeExpired { .. } => "time_expired",
            ClockEventData::GameEnded { .. } => "game_ended",
            ClockEventData::GameReset => "game_reset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seat_extracted_from_payload() {
        let event = ClockEvent::new(
            0,
            0,
            ClockEventData::SpeakerChanged {
                from: 0,
                to: 2,
                reason: HandoffReason::TimeExpired,
            },
        );
        assert_eq!(event.seat, Some(2));

        let event = ClockEvent::new(0, 0, ClockEventData::GameReset);
        assert_eq!(event.seat, None);
    }

    #[test]
    fn test_entered_and_left() {
        let pause = ClockEvent::new(
            500,
            5,
            ClockEventData::PhaseChanged {
                old_phase: Phase::Playing,
                new_phase: Phase::Paused,
            },
        );
        assert!(pause.entered(Phase::Paused));
        assert!(pause.left(Phase::Playing));
        assert!(!pause.entered(Phase::Playing));
        assert!(!pause.left(Phase::Paused));
    }

    #[test]
    fn test_event_json_shape() {
        let event = ClockEvent::new(1_200, 12, ClockEventData::JumpInUsed { seat: 1, remaining: 2 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["data"]["kind"], "jump_in_used");
        assert_eq!(json["data"]["remaining"], 2);
        assert_eq!(json["seat"], 1);
        assert_eq!(json["at_ms"], 1_200);
        assert_eq!(event.label(), "jump_in_used");
    }
}
