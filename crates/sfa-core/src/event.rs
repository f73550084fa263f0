// ── Typed session events ──
//
// `Event` is the tagged form of the handler hooks. `EventForwarder` turns
// hooks into events on an unbounded channel so consumers can process them
// on their own task without stalling the engine's callback thread.

use sfa_libbox::{OutboundGroup, StatusMessage};
use tokio::sync::mpsc;

use crate::handler::Handler;

/// One event delivered by a command session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connected,
    Disconnected(Option<String>),
    Status(StatusMessage),
    Groups(Vec<OutboundGroup>),
    LogCleared,
    Log(String),
    ClashModeInit { modes: Vec<String>, current: String },
    ClashModeChanged(String),
}

/// A [`Handler`] that forwards every hook as an [`Event`].
///
/// Sends never block. Events sent after the receiver is dropped are
/// discarded.
#[derive(Debug, Clone)]
pub struct EventForwarder {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventForwarder {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Handler for EventForwarder {
    fn on_connected(&self) {
        self.forward(Event::Connected);
    }

    fn on_disconnected(&self, reason: Option<&str>) {
        self.forward(Event::Disconnected(reason.map(str::to_owned)));
    }

    fn update_status(&self, status: &StatusMessage) {
        self.forward(Event::Status(status.clone()));
    }

    fn update_groups(&self, groups: Vec<OutboundGroup>) {
        self.forward(Event::Groups(groups));
    }

    fn clear_log(&self) {
        self.forward(Event::LogCleared);
    }

    fn append_log(&self, message: &str) {
        self.forward(Event::Log(message.to_owned()));
    }

    fn initialize_clash_mode(&self, modes: Vec<String>, current: &str) {
        self.forward(Event::ClashModeInit {
            modes,
            current: current.to_owned(),
        });
    }

    fn update_clash_mode(&self, mode: &str) {
        self.forward(Event::ClashModeChanged(mode.to_owned()));
    }
}
