// ── Event dispatcher ──
//
// Translates the engine's raw callbacks into `Handler` hooks. No queue,
// no reordering: each callback forwards before it returns. Absent or empty
// payloads are dropped here rather than treated as protocol errors.

use std::sync::Arc;

use sfa_libbox::{Command, CommandClientHandler, OutboundGroup, StatusMessage};
use tracing::trace;

use crate::handler::Handler;

pub(crate) struct Dispatcher {
    command: Command,
    handler: Arc<dyn Handler>,
}

impl Dispatcher {
    pub(crate) fn new(command: Command, handler: Arc<dyn Handler>) -> Self {
        Self { command, handler }
    }
}

impl CommandClientHandler for Dispatcher {
    fn connected(&self) {
        trace!(command = %self.command, "dispatch connected");
        self.handler.on_connected();
    }

    fn disconnected(&self, message: Option<&str>) {
        trace!(command = %self.command, reason = message.unwrap_or(""), "dispatch disconnected");
        self.handler.on_disconnected(message);
    }

    fn write_groups(&self, groups: Option<&mut dyn Iterator<Item = OutboundGroup>>) {
        let Some(groups) = groups else {
            trace!(command = %self.command, "dropping absent group snapshot");
            return;
        };
        // The engine may invalidate the sequence once we return.
        let groups: Vec<OutboundGroup> = groups.collect();
        self.handler.update_groups(groups);
    }

    fn clear_log(&self) {
        self.handler.clear_log();
    }

    fn write_log(&self, message: Option<&str>) {
        match message {
            Some(line) if !line.is_empty() => self.handler.append_log(line),
            _ => trace!(command = %self.command, "dropping empty log line"),
        }
    }

    fn write_status(&self, message: Option<StatusMessage>) {
        if let Some(status) = message {
            self.handler.update_status(&status);
        }
    }

    fn initialize_clash_mode(&self, modes: &mut dyn Iterator<Item = String>, current: &str) {
        let modes: Vec<String> = modes.collect();
        self.handler.initialize_clash_mode(modes, current);
    }

    fn update_clash_mode(&self, mode: &str) {
        self.handler.update_clash_mode(mode);
    }
}
