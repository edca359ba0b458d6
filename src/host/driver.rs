//! Tick Driver
//!
//! Calls `advance_time` on a steady cadence while the session is playing.
//! Idles otherwise, and restarts the cadence from scratch each time play
//! resumes. `advance_time` rejects stale ticks on its own, so a tick that
//! races a pause is harmless.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::core::millis::{Millis, TICK_DELTA};
use crate::game::events::ClockEvent;
use crate::game::state::Phase;
use crate::host::session::SharedSession;
use crate::TICK_INTERVAL_MS;

/// Driver cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Wall-clock time between ticks
    pub period: Duration,
    /// Game time applied per tick (ms)
    pub delta: Millis,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(TICK_INTERVAL_MS),
            delta: TICK_DELTA,
        }
    }
}

/// Why a run of ticks stopped.
enum Halt {
    /// Left `Playing`; wait for the next resume
    Idle,
    /// Shutdown or session gone; exit the driver
    Exit,
}

/// Periodic caller of `advance_time`.
pub struct TickDriver {
    session: SharedSession,
    config: DriverConfig,
    events: broadcast::Receiver<ClockEvent>,
}

impl TickDriver {
    /// Create a driver for `session`.
    ///
    /// Subscribes immediately so no phase change is missed between
    /// construction and `run`.
    pub async fn new(session: SharedSession, config: DriverConfig) -> Self {
        let events = session.lock().await.subscribe_events();
        Self {
            session,
            config,
            events,
        }
    }

    /// Run until `shutdown` fires.
    #[instrument(skip_all, name = "tick_driver")]
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            period_ms = self.config.period.as_millis() as u64,
            delta_ms = self.config.delta,
            "tick driver started"
        );

        loop {
            if !self.is_playing().await {
                match self.wait_for_play(&mut shutdown).await {
                    Halt::Idle => continue,
                    Halt::Exit => break,
                }
            }

            match self.drive(&mut shutdown).await {
                Halt::Idle => continue,
                Halt::Exit => break,
            }
        }

        info!("tick driver stopped");
    }

    async fn is_playing(&self) -> bool {
        self.session.lock().await.phase() == Phase::Playing
    }

    /// Block until some event arrives, then let the caller re-check.
    async fn wait_for_play(&mut self, shutdown: &mut broadcast::Receiver<()>) -> Halt {
        tokio::select! {
            event = self.events.recv() => match event {
                Err(broadcast::error::RecvError::Closed) => Halt::Exit,
                // Lagged or any event: re-check the phase
                _ => Halt::Idle,
            },
            _ = shutdown.recv() => Halt::Exit,
        }
    }

    /// Tick until the phase leaves `Playing`.
    async fn drive(&mut self, shutdown: &mut broadcast::Receiver<()>) -> Halt {
        let period = self.config.period;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("clock running");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let mut session = self.session.lock().await;
                    session.advance_time(self.config.delta);
                    if session.phase() != Phase::Playing {
                        debug!(phase = %session.phase(), "clock stopped by tick");
                        return Halt::Idle;
                    }
                }
                event = self.events.recv() => match event {
                    Ok(event) if event.left(Phase::Playing) => {
                        debug!("clock stopped by phase change");
                        return Halt::Idle;
                    }
                    Err(broadcast::error::RecvError::Closed) => return Halt::Exit,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "driver lagged behind events");
                        if !self.is_playing().await {
                            return Halt::Idle;
                        }
                    }
                    Ok(_) => {}
                },
                _ = shutdown.recv() => return Halt::Exit,
            }
        }
    }
}

/// Spawn a driver task for `session`.
pub async fn spawn_driver(
    session: SharedSession,
    config: DriverConfig,
    shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    let driver = TickDriver::new(session, config).await;
    tokio::spawn(driver.run(shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::settings::Settings;
    use crate::host::session::ClockSession;
    use tokio::time::sleep;

    fn scenario_session() -> SharedSession {
        ClockSession::new(Settings {
            invulnerability_period: 2,
            jump_in_amount: 1,
            max_time: 10,
            player_count: 3,
        })
        .into_shared()
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_ticks_while_playing() {
        let session = scenario_session();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_driver(session.clone(), DriverConfig::default(), shutdown_rx).await;

        session.lock().await.start();
        sleep(Duration::from_millis(1_050)).await;

        {
            let session = session.lock().await;
            let spent = 10_000 - session.player_times()[0];
            assert!((900..=1_100).contains(&spent), "spent {spent} ms");
            assert_eq!(session.player_times()[1], 10_000);
        }

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_idles_in_menu() {
        let session = scenario_session();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_driver(session.clone(), DriverConfig::default(), shutdown_rx).await;

        sleep(Duration::from_secs(5)).await;
        assert_eq!(session.lock().await.state().tick, 0);

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_stops_on_pause_and_resumes() {
        let session = scenario_session();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_driver(session.clone(), DriverConfig::default(), shutdown_rx).await;

        session.lock().await.start();
        sleep(Duration::from_millis(550)).await;
        session.lock().await.toggle_pause();
        let frozen = session.lock().await.player_times()[0];

        sleep(Duration::from_secs(3)).await;
        assert_eq!(session.lock().await.player_times()[0], frozen);

        session.lock().await.toggle_pause();
        sleep(Duration::from_millis(1_050)).await;
        let resumed = session.lock().await.player_times()[0];
        let spent = frozen - resumed;
        assert!((900..=1_100).contains(&spent), "spent {spent} ms after resume");

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_runs_game_to_the_end() {
        let session = ClockSession::new(Settings {
            invulnerability_period: 1,
            jump_in_amount: 1,
            max_time: 10,
            player_count: 2,
        })
        .into_shared();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = spawn_driver(session.clone(), DriverConfig::default(), shutdown_rx).await;

        session.lock().await.start();
        sleep(Duration::from_secs(25)).await;

        {
            let session = session.lock().await;
            assert_eq!(session.phase(), Phase::Ended);
            assert_eq!(session.player_times(), &[0, 0]);
        }

        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
