//! Console Host
//!
//! Reads commands line by line, applies them to the shared session, and
//! writes one JSON reply per command plus every event as it happens.
//! Works over any async reader/writer pair: stdin/stdout in the binary,
//! in-memory buffers in tests.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use crate::game::events::ClockEvent;
use crate::host::protocol::{Command, ProtocolError, Reply};
use crate::host::session::{ClockSession, SharedSession};

/// Apply `command` to `session` and build its reply.
///
/// `Quit` is not handled here; the host loop owns shutdown.
pub fn execute(session: &mut ClockSession, command: &Command) -> Reply {
    let accepted = match command {
        Command::UpdateSettings(update) => {
            let settings = session.update_settings(update);
            return Reply::Settings { settings };
        }
        Command::Start => session.start(),
        Command::TogglePause => session.toggle_pause(),
        Command::Reset => session.reset(),
        Command::Exit => session.exit(),
        Command::FinishSpeaking => session.finish_speaking(),
        Command::JumpIn { seat } => session.jump_in(*seat),
        Command::EndGracePeriod => session.end_grace_period_early(),
        Command::Select { seat } => session.select_seat(*seat),
        Command::Status | Command::Quit => true,
    };

    Reply::Ack {
        command: command.name().to_string(),
        accepted,
        snapshot: session.snapshot(),
    }
}

/// Line writer for replies.
struct ReplyWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> ReplyWriter<W> {
    async fn send(&mut self, reply: &Reply) -> std::io::Result<()> {
        let json = reply
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.inner.write_all(json.as_bytes()).await?;
        self.inner.write_all(b"\n").await?;
        self.inner.flush().await
    }

    /// Write every event already queued on `events`.
    async fn drain(&mut self, events: &mut broadcast::Receiver<ClockEvent>) -> std::io::Result<()> {
        loop {
            match events.try_recv() {
                Ok(event) => self.send(&Reply::Event(event)).await?,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "console lagged behind events");
                }
                Err(_) => return Ok(()),
            }
        }
    }
}

/// Serve the console until `quit`, end of input, or `shutdown` fires.
///
/// Always signals `shutdown` on the way out so the rest of the host stops
/// with it.
#[instrument(skip_all, name = "console")]
pub async fn run_console<R, W>(
    session: SharedSession,
    reader: R,
    writer: W,
    shutdown: broadcast::Sender<()>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = session.lock().await.subscribe_events();
    let mut shutdown_rx = shutdown.subscribe();
    let mut lines = reader.lines();
    let mut out = ReplyWriter { inner: writer };

    info!("console ready");

    let result = loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                debug!("console stopping on shutdown");
                break Ok(());
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Err(e) = out.send(&Reply::Event(event)).await {
                        break Err(e);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "console lagged behind events");
                }
                Err(broadcast::error::RecvError::Closed) => break Ok(()),
            },
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        info!("input closed");
                        break Ok(());
                    }
                    Err(e) => break Err(e),
                };

                match handle_line(&session, &line, &mut events, &mut out).await {
                    Ok(true) => {}
                    Ok(false) => break Ok(()),
                    Err(e) => break Err(e),
                }
            }
        }
    };

    // Nobody may be listening any more
    let _ = shutdown.send(());
    info!("console closed");
    result
}

/// Handle one input line. Returns false on `quit`.
async fn handle_line<W: AsyncWrite + Unpin>(
    session: &SharedSession,
    line: &str,
    events: &mut broadcast::Receiver<ClockEvent>,
    out: &mut ReplyWriter<W>,
) -> std::io::Result<bool> {
    let command = match Command::parse_line(line) {
        Ok(command) => command,
        Err(ProtocolError::Empty) => return Ok(true),
        Err(e) => {
            warn!(error = %e, "rejected input line");
            out.send(&Reply::Error {
                message: e.to_string(),
            })
            .await?;
            return Ok(true);
        }
    };

    if command == Command::Quit {
        out.send(&Reply::Bye).await?;
        return Ok(false);
    }

    let reply = execute(&mut *session.lock().await, &command);
    out.send(&reply).await?;
    out.drain(events).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::ClockEventData;
    use crate::game::settings::Settings;
    use crate::game::state::Phase;

    fn shared() -> SharedSession {
        ClockSession::new(Settings {
            invulnerability_period: 2,
            jump_in_amount: 1,
            max_time: 10,
            player_count: 3,
        })
        .into_shared()
    }

    async fn run_script(session: SharedSession, script: &str) -> Vec<Reply> {
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut output = Vec::new();
        run_console(session, script.as_bytes(), &mut output, shutdown_tx)
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| Reply::from_json(line).unwrap())
            .collect()
    }

    fn acks(replies: &[Reply]) -> Vec<(&str, bool)> {
        replies
            .iter()
            .filter_map(|reply| match reply {
                Reply::Ack {
                    command, accepted, ..
                } => Some((command.as_str(), *accepted)),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_script_drives_session() {
        let session = shared();
        let replies = run_script(session.clone(), "start\ngrace\njump 1\njump 2\nquit\n").await;

        assert_eq!(
            acks(&replies),
            [
                ("start", true),
                ("end_grace_period", true),
                ("jump_in", true),
                ("jump_in", false),
            ]
        );
        assert_eq!(replies.last(), Some(&Reply::Bye));

        let session = session.lock().await;
        assert_eq!(session.current_speaker(), 1);
        assert_eq!(session.jump_in_counts(), &[1, 0, 1]);
    }

    #[tokio::test]
    async fn test_events_follow_their_ack() {
        let replies = run_script(shared(), "start\n").await;

        assert!(matches!(replies[0], Reply::Ack { .. }));
        let kinds: Vec<_> = replies[1..]
            .iter()
            .filter_map(|reply| match reply {
                Reply::Event(event) => Some(event.label()),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, ["game_started", "phase_changed", "grace_started"]);
    }

    #[tokio::test]
    async fn test_bad_input_reports_error_and_continues() {
        let replies = run_script(shared(), "dance\n\njump\nstatus\n").await;

        let errors = replies
            .iter()
            .filter(|reply| matches!(reply, Reply::Error { .. }))
            .count();
        assert_eq!(errors, 2);
        assert_eq!(acks(&replies), [("status", true)]);
    }

    #[tokio::test]
    async fn test_settings_and_json_commands() {
        let session = shared();
        let script = "set players=5 max_time=5\n{\"type\":\"start\"}\n";
        let replies = run_script(session.clone(), script).await;

        assert!(replies.iter().any(|reply| matches!(
            reply,
            Reply::Settings { settings } if settings.player_count == 5 && settings.max_time == 10
        )));
        assert!(replies.iter().any(|reply| matches!(
            reply,
            Reply::Event(ClockEvent {
                data: ClockEventData::SettingsUpdated { .. },
                ..
            })
        )));

        let session = session.lock().await;
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.player_times(), &[10_000; 5]);
    }

    #[tokio::test]
    async fn test_end_of_input_signals_shutdown() {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let mut output = Vec::new();
        run_console(shared(), "status\n".as_bytes(), &mut output, shutdown_tx)
            .await
            .unwrap();
        assert!(shutdown_rx.try_recv().is_ok());
    }

    #[test]
    fn test_execute_status_reports_snapshot() {
        let mut session = ClockSession::default();
        session.start();
        match execute(&mut session, &Command::Status) {
            Reply::Ack {
                command,
                accepted,
                snapshot,
            } => {
                assert_eq!(command, "status");
                assert!(accepted);
                assert_eq!(snapshot.phase, Phase::Playing);
                assert_eq!(snapshot.seats.len(), 2);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
