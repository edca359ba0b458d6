//! Protocol Messages
//!
//! Line format for driving a session from a console or a pipe.
//! Commands come in one per line, either as JSON tagged by `type` or as
//! short words. Replies and events go out as one JSON object per line.
//!
//! ```text
//! {"type":"jump_in","seat":2}        jump 2
//! {"type":"toggle_pause"}            pause
//! {"type":"update_settings",         set players=4 max_time=30
//!  "playerCount":4,"maxTime":30}
//! ```
//!
//! Seats are zero-based in both forms.

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::game::events::ClockEvent;
use crate::game::settings::{Settings, SettingsUpdate};
use crate::game::state::Seat;
use crate::game::view::ClockSnapshot;

// =============================================================================
// INPUT
// =============================================================================

/// Commands accepted by a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Merge a partial settings edit.
    UpdateSettings(SettingsUpdate),

    /// Start (or restart) a game.
    Start,

    /// Pause or resume.
    TogglePause,

    /// Return to the menu.
    Reset,

    /// Leave the game.
    Exit,

    /// Current speaker yields.
    FinishSpeaking,

    /// A seat tries to take the floor.
    JumpIn {
        /// Seat trying to jump in
        seat: Seat,
    },

    /// Close the grace window early.
    EndGracePeriod,

    /// A seat's region was selected.
    Select {
        /// Seat whose region was selected
        seat: Seat,
    },

    /// Report the current snapshot without changing anything.
    Status,

    /// Shut the host down.
    Quit,
}

impl Command {
    /// Parse one input line, JSON or word form.
    pub fn parse_line(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        if line.starts_with('{') {
            return Ok(serde_json::from_str(line)?);
        }

        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(ProtocolError::Empty);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" | "restart" => Command::Start,
            "pause" | "resume" | "toggle" => Command::TogglePause,
            "reset" | "menu" => Command::Reset,
            "exit" | "leave" => Command::Exit,
            "finish" | "done" => Command::FinishSpeaking,
            "grace" | "end_grace" => Command::EndGracePeriod,
            "jump" | "jump_in" => Command::JumpIn {
                seat: parse_seat(verb, words.next())?,
            },
            "select" | "tap" => Command::Select {
                seat: parse_seat(verb, words.next())?,
            },
            "set" => Command::UpdateSettings(parse_settings(words.by_ref())?),
            "status" | "show" => Command::Status,
            "quit" | "q" => Command::Quit,
            _ => return Err(ProtocolError::UnknownCommand(verb.to_string())),
        };

        if let Some(extra) = words.next() {
            return Err(ProtocolError::InvalidArgument {
                name: verb.to_string(),
                value: extra.to_string(),
            });
        }
        Ok(command)
    }

    /// Name used in acknowledgements.
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpdateSettings(_) => "update_settings",
            Command::Start => "start",
            Command::TogglePause => "toggle_pause",
            Command::Reset => "reset",
            Command::Exit => "exit",
            Command::FinishSpeaking => "finish_speaking",
            Command::JumpIn { .. } => "jump_in",
            Command::EndGracePeriod => "end_grace_period",
            Command::Select { .. } => "select",
            Command::Status => "status",
            Command::Quit => "quit",
        }
    }
}

fn parse_seat(verb: &str, arg: Option<&str>) -> Result<Seat, ProtocolError> {
    let arg = arg.ok_or_else(|| ProtocolError::MissingArgument(verb.to_string()))?;
    arg.parse().map_err(|_| ProtocolError::InvalidArgument {
        name: "seat".to_string(),
        value: arg.to_string(),
    })
}

/// Parse `key=value` pairs into a settings edit.
fn parse_settings<'a>(
    pairs: impl Iterator<Item = &'a str>,
) -> Result<SettingsUpdate, ProtocolError> {
    let mut update = SettingsUpdate::default();

    for pair in pairs {
        let (key, raw) = pair.split_once('=').ok_or_else(|| ProtocolError::InvalidArgument {
            name: "set".to_string(),
            value: pair.to_string(),
        })?;
        let value: i64 = raw.parse().map_err(|_| ProtocolError::InvalidArgument {
            name: key.to_string(),
            value: raw.to_string(),
        })?;

        let slot = match key {
            "players" | "player_count" | "playerCount" => &mut update.player_count,
            "grace" | "invulnerability_period" | "invulnerabilityPeriod" => {
                &mut update.invulnerability_period
            }
            "jumps" | "jump_ins" | "jump_in_amount" | "jumpInAmount" => &mut update.jump_in_amount,
            "time" | "max_time" | "maxTime" => &mut update.max_time,
            _ => return Err(ProtocolError::UnknownSetting(key.to_string())),
        };
        *slot = Some(value);
    }

    if update.is_empty() {
        return Err(ProtocolError::MissingArgument("set".to_string()));
    }
    Ok(update)
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Lines written by a host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reply {
    /// Result of a command.
    Ack {
        /// Command name
        command: String,
        /// Whether the command took effect
        accepted: bool,
        /// State after the command
        snapshot: ClockSnapshot,
    },

    /// Stored settings after an edit.
    Settings {
        /// Stored settings
        settings: Settings,
    },

    /// An event from the session.
    Event(ClockEvent),

    /// Input could not be understood.
    Error {
        /// Human-readable reason
        message: String,
    },

    /// Host is shutting down.
    Bye,
}

impl Reply {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Errors from reading a command line.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// Malformed JSON command.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// Unrecognized command word.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Unrecognized `set` key.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// Command needs an argument it did not get.
    #[error("missing argument for {0}")]
    MissingArgument(String),

    /// Argument present but unusable.
    #[error("invalid value for {name}: {value}")]
    InvalidArgument {
        /// Argument name
        name: String,
        /// Offending text
        value: String,
    },
}
