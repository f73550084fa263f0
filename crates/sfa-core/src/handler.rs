use sfa_libbox::{OutboundGroup, StatusMessage};

/// Consumer of one or more command sessions.
///
/// Every hook defaults to a no-op, so collaborators implement only what
/// they display. A handler holds no connection state and may be shared by
/// several sessions of different kinds at once.
///
/// Hooks run synchronously on the engine's callback thread and nothing is
/// queued in between: a slow hook stalls the engine's delivery for that
/// session. Hooks must not block indefinitely; hand long work off to a
/// channel (see [`EventForwarder`](crate::EventForwarder)).
pub trait Handler: Send + Sync {
    fn on_connected(&self) {}

    /// The engine ended the session. `reason` is advisory.
    fn on_disconnected(&self, _reason: Option<&str>) {}

    fn update_status(&self, _status: &StatusMessage) {}

    fn update_groups(&self, _groups: Vec<OutboundGroup>) {}

    fn clear_log(&self) {}

    fn append_log(&self, _message: &str) {}

    fn initialize_clash_mode(&self, _modes: Vec<String>, _current: &str) {}

    fn update_clash_mode(&self, _mode: &str) {}
}
