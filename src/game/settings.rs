//! Game Settings
//!
//! The immutable snapshot a game is started from, plus the clamping
//! partial update used by the settings form. Input is never rejected:
//! every value is pulled back into its legal range.

use serde::{Serialize, Deserialize};

use crate::core::millis::{from_secs, Millis};

/// Fewest players a game can have.
pub const MIN_PLAYERS: u32 = 2;

/// Most players a game can have.
pub const MAX_PLAYERS: u32 = 8;

/// Smallest grace period (seconds).
pub const MIN_INVULNERABILITY_SECS: u32 = 1;

/// Smallest jump-in allowance per player.
pub const MIN_JUMP_IN_AMOUNT: u32 = 1;

/// Smallest per-player time budget (seconds).
pub const MIN_MAX_TIME_SECS: u32 = 10;

/// Validated game configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Grace duration after any speaker change (seconds, >= 1)
    pub invulnerability_period: u32,
    /// Jump-ins granted per player at game start (>= 1)
    pub jump_in_amount: u32,
    /// Initial time budget per player (seconds, >= 10)
    pub max_time: u32,
    /// Number of players (2..=8)
    pub player_count: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            invulnerability_period: 3,
            jump_in_amount: 3,
            max_time: 60,
            player_count: 2,
        }
    }
}

impl Settings {
    /// Pull every field back into its legal range.
    pub fn clamped(self) -> Self {
        Self {
            invulnerability_period: self.invulnerability_period.max(MIN_INVULNERABILITY_SECS),
            jump_in_amount: self.jump_in_amount.max(MIN_JUMP_IN_AMOUNT),
            max_time: self.max_time.max(MIN_MAX_TIME_SECS),
            player_count: self.player_count.clamp(MIN_PLAYERS, MAX_PLAYERS),
        }
    }

    /// Merge `update` over this snapshot, clamping each provided field.
    ///
    /// Fields left as `None` keep their current value.
    pub fn apply(self, update: &SettingsUpdate) -> Self {
        let mut next = self;
        if let Some(v) = update.invulnerability_period {
            next.invulnerability_period = clamp_field(v, MIN_INVULNERABILITY_SECS, u32::MAX);
        }
        if let Some(v) = update.jump_in_amount {
            next.jump_in_amount = clamp_field(v, MIN_JUMP_IN_AMOUNT, u32::MAX);
        }
        if let Some(v) = update.max_time {
            next.max_time = clamp_field(v, MIN_MAX_TIME_SECS, u32::MAX);
        }
        if let Some(v) = update.player_count {
            next.player_count = clamp_field(v, MIN_PLAYERS, MAX_PLAYERS);
        }
        next.clamped()
    }

    /// Number of player seats.
    #[inline]
    pub fn seats(&self) -> usize {
        self.player_count as usize
    }

    /// Grace duration in milliseconds.
    #[inline]
    pub fn grace_duration(&self) -> Millis {
        from_secs(self.invulnerability_period)
    }

    /// Per-player time budget in milliseconds.
    #[inline]
    pub fn time_budget(&self) -> Millis {
        from_secs(self.max_time)
    }
}

/// A partial settings edit. Values are signed so any input can be clamped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    /// New grace duration (seconds)
    pub invulnerability_period: Option<i64>,
    /// New jump-in allowance
    pub jump_in_amount: Option<i64>,
    /// New time budget (seconds)
    pub max_time: Option<i64>,
    /// New player count
    pub player_count: Option<i64>,
}

impl SettingsUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.invulnerability_period.is_none()
            && self.jump_in_amount.is_none()
            && self.max_time.is_none()
            && self.player_count.is_none()
    }
}

#[inline]
fn clamp_field(value: i64, min: u32, max: u32) -> u32 {
    value.clamp(min as i64, max as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_legal() {
        let settings = Settings::default();
        assert_eq!(settings, settings.clamped());
        assert_eq!(settings.seats(), 2);
        assert_eq!(settings.grace_duration(), 3_000);
        assert_eq!(settings.time_budget(), 60_000);
    }

    #[test]
    fn test_player_count_clamped_both_ways() {
        let low = Settings::default().apply(&SettingsUpdate {
            player_count: Some(1),
            ..Default::default()
        });
        assert_eq!(low.player_count, MIN_PLAYERS);

        let high = Settings::default().apply(&SettingsUpdate {
            player_count: Some(42),
            ..Default::default()
        });
        assert_eq!(high.player_count, MAX_PLAYERS);

        let negative = Settings::default().apply(&SettingsUpdate {
            player_count: Some(-3),
            ..Default::default()
        });
        assert_eq!(negative.player_count, MIN_PLAYERS);
    }

    #[test]
    fn test_lower_bounds() {
        let settings = Settings::default().apply(&SettingsUpdate {
            invulnerability_period: Some(0),
            jump_in_amount: Some(-7),
            max_time: Some(9),
            player_count: None,
        });
        assert_eq!(settings.invulnerability_period, 1);
        assert_eq!(settings.jump_in_amount, 1);
        assert_eq!(settings.max_time, 10);
        assert_eq!(settings.player_count, 2);
    }

    #[test]
    fn test_partial_merge_keeps_other_fields() {
        let base = Settings {
            invulnerability_period: 5,
            jump_in_amount: 2,
            max_time: 90,
            player_count: 4,
        };
        let merged = base.apply(&SettingsUpdate {
            max_time: Some(120),
            ..Default::default()
        });
        assert_eq!(merged, Settings { max_time: 120, ..base });
    }

    #[test]
    fn test_huge_values_saturate() {
        let settings = Settings::default().apply(&SettingsUpdate {
            max_time: Some(i64::MAX),
            ..Default::default()
        });
        assert_eq!(settings.max_time, u32::MAX);
    }

    #[test]
    fn test_clamped_is_idempotent() {
        let raw = Settings {
            invulnerability_period: 0,
            jump_in_amount: 0,
            max_time: 0,
            player_count: 99,
        };
        assert_eq!(raw.clamped(), raw.clamped().clamped());
    }

    #[test]
    fn test_update_deserializes_camel_case() {
        let update: SettingsUpdate =
            serde_json::from_str(r#"{"playerCount":3,"maxTime":30}"#).unwrap();
        assert_eq!(update.player_count, Some(3));
        assert_eq!(update.max_time, Some(30));
        assert!(update.jump_in_amount.is_none());
        assert!(!update.is_empty());
        assert!(SettingsUpdate::default().is_empty());
    }
}
