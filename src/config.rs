//! Host Configuration
//!
//! Read once at startup from `DEBATE_CLOCK_*` environment variables.
//! Missing values fall back to defaults. Settings values go through the
//! same clamps as the settings form, so only text that is not a number
//! is an error.

use std::time::Duration;
use thiserror::Error;

use crate::core::millis::Millis;
use crate::game::settings::{Settings, SettingsUpdate};
use crate::host::driver::DriverConfig;

/// Player count variable.
pub const ENV_PLAYERS: &str = "DEBATE_CLOCK_PLAYERS";
/// Grace period variable (seconds).
pub const ENV_GRACE_SECS: &str = "DEBATE_CLOCK_GRACE_SECS";
/// Jump-in allowance variable.
pub const ENV_JUMP_INS: &str = "DEBATE_CLOCK_JUMP_INS";
/// Time budget variable (seconds).
pub const ENV_MAX_TIME_SECS: &str = "DEBATE_CLOCK_MAX_TIME_SECS";
/// Tick period variable (ms). Each tick advances the clock by the same amount.
pub const ENV_TICK_MS: &str = "DEBATE_CLOCK_TICK_MS";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not an integer.
    #[error("{name} must be an integer, got {value:?}")]
    NotANumber {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Tick period must be positive.
    #[error("{name} must be at least 1 ms, got {value}")]
    ZeroTick {
        /// Variable name
        name: &'static str,
        /// Parsed value
        value: u64,
    },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppConfig {
    /// Settings stored in the session at startup
    pub settings: Settings,
    /// Tick driver cadence
    pub driver: DriverConfig,
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from any name → value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| -> Result<Option<i64>, ConfigError> {
            match lookup(name) {
                None => Ok(None),
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| ConfigError::NotANumber { name, value: raw }),
            }
        };

        let update = SettingsUpdate {
            player_count: read(ENV_PLAYERS)?,
            invulnerability_period: read(ENV_GRACE_SECS)?,
            jump_in_amount: read(ENV_JUMP_INS)?,
            max_time: read(ENV_MAX_TIME_SECS)?,
        };
        let settings = Settings::default().apply(&update);

        let mut driver = DriverConfig::default();
        if let Some(raw) = lookup(ENV_TICK_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| ConfigError::NotANumber {
                name: ENV_TICK_MS,
                value: raw.clone(),
            })?;
            if ms == 0 {
                return Err(ConfigError::ZeroTick {
                    name: ENV_TICK_MS,
                    value: ms,
                });
            }
            // Each tick advances the clock by exactly the wall time it spans
            driver.period = Duration::from_millis(ms);
            driver.delta = ms.min(i64::MAX as u64) as Millis;
        }

        Ok(Self { settings, driver })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.settings.player_count, 2);
        assert_eq!(config.driver.period, Duration::from_millis(100));
    }

    #[test]
    fn test_values_are_clamped() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_PLAYERS, "12"),
            (ENV_GRACE_SECS, "0"),
            (ENV_JUMP_INS, " 5 "),
            (ENV_MAX_TIME_SECS, "-30"),
            (ENV_TICK_MS, "50"),
        ]))
        .unwrap();

        assert_eq!(
            config.settings,
            Settings {
                invulnerability_period: 1,
                jump_in_amount: 5,
                max_time: 10,
                player_count: 8,
            }
        );
        assert_eq!(config.driver.period, Duration::from_millis(50));
        assert_eq!(config.driver.delta, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_tick_period_tracks_wall_time() {
        use crate::host::driver::spawn_driver;
        use crate::host::session::ClockSession;
        use tokio::sync::broadcast;

        for tick_ms in ["50", "250"] {
            let config = AppConfig::from_lookup(lookup(&[
                (ENV_PLAYERS, "3"),
                (ENV_MAX_TIME_SECS, "60"),
                (ENV_TICK_MS, tick_ms),
            ]))
            .unwrap();
            let session = ClockSession::new(config.settings).into_shared();
            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
            let handle = spawn_driver(session.clone(), config.driver, shutdown_rx).await;

            session.lock().await.start();
            tokio::time::sleep(Duration::from_millis(1_010)).await;

            let spent = 60_000 - session.lock().await.player_times()[0];
            assert_eq!(spent, 1_000, "tick {tick_ms} ms spent {spent} ms in 1 s");

            shutdown_tx.send(()).unwrap();
            handle.await.unwrap();
        }
    }

    #[test]
    fn test_garbage_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_PLAYERS, "four")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NotANumber {
                name: ENV_PLAYERS,
                value: "four".to_string(),
            }
        );

        let err = AppConfig::from_lookup(lookup(&[(ENV_TICK_MS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTick { .. }));
    }
}
