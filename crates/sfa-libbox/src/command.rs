// ── Command kinds and client options ──
//
// A command client subscribes to exactly one stream of the engine's
// command endpoint. The numeric codes are what goes over the wire.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default status push cadence: two seconds, in nanoseconds.
pub const DEFAULT_STATUS_INTERVAL_NANOS: i64 = 2 * 1000 * 1000 * 1000;

/// The subscription a command client opens on the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Command {
    /// Live log lines.
    Log,
    /// Periodic traffic and memory status.
    Status,
    /// Outbound group topology snapshots.
    #[strum(to_string = "group", serialize = "groups")]
    Group,
    /// Clash mode list and mode switches.
    #[strum(to_string = "clash_mode", serialize = "clash-mode")]
    ClashMode,
}

impl Command {
    /// Wire code sent in the handshake.
    pub fn code(self) -> u8 {
        match self {
            Self::Log => 0,
            Self::Status => 1,
            Self::Group => 5,
            Self::ClashMode => 9,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Log),
            1 => Some(Self::Status),
            5 => Some(Self::Group),
            9 => Some(Self::ClashMode),
            _ => None,
        }
    }
}

/// Options handed to the engine when a command client connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandClientOptions {
    pub command: Command,
    /// Status push interval in nanoseconds. Ignored by every command
    /// except [`Command::Status`].
    pub status_interval: i64,
}

impl CommandClientOptions {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            status_interval: DEFAULT_STATUS_INTERVAL_NANOS,
        }
    }

    pub fn with_status_interval(mut self, nanos: i64) -> Self {
        self.status_interval = nanos;
        self
    }
}
