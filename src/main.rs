//! Debate Clock
//!
//! Console host: reads commands on stdin, writes JSON replies and events
//! on stdout, logs on stderr.

use std::time::Duration;
use anyhow::Context;
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use debate_clock::{
    AppConfig, ClockSession, TICK_RATE, VERSION,
    host::{driver::spawn_driver, console::run_console},
};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Debate Clock v{}", VERSION);

    let config = AppConfig::from_env().context("invalid configuration")?;
    info!(
        players = config.settings.player_count,
        max_time = config.settings.max_time,
        grace = config.settings.invulnerability_period,
        jump_ins = config.settings.jump_in_amount,
        "loaded settings"
    );
    info!("Tick Rate: {} Hz", TICK_RATE);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    let result = runtime.block_on(serve(config));

    // A pending stdin read parks a blocking thread; don't wait on it
    runtime.shutdown_timeout(Duration::from_millis(250));
    result
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let session = ClockSession::new(config.settings).into_shared();
    let (shutdown_tx, _) = broadcast::channel(1);

    let driver = spawn_driver(session.clone(), config.driver, shutdown_tx.subscribe()).await;

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            let _ = ctrl_c_tx.send(());
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let console = run_console(session, stdin, stdout, shutdown_tx).await;

    if let Err(e) = driver.await {
        warn!("Tick driver task failed: {}", e);
    }

    console.context("console I/O failed")?;
    info!("Goodbye");
    Ok(())
}
