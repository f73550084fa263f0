use crate::model::{OutboundGroup, StatusMessage};

/// Raw callback surface the engine drives for one command connection.
///
/// Callbacks arrive on threads owned by the endpoint, in the order the
/// engine emits them. Payloads may be absent; implementors decide what an
/// absent payload means. Sequences are borrowed for the duration of the
/// call only: the engine may invalidate them as soon as the callback
/// returns, so anything kept must be copied out first.
pub trait CommandClientHandler: Send + Sync {
    fn connected(&self);

    fn disconnected(&self, message: Option<&str>);

    fn write_groups(&self, groups: Option<&mut dyn Iterator<Item = OutboundGroup>>);

    fn clear_log(&self);

    fn write_log(&self, message: Option<&str>);

    fn write_status(&self, message: Option<StatusMessage>);

    fn initialize_clash_mode(&self, modes: &mut dyn Iterator<Item = String>, current: &str);

    fn update_clash_mode(&self, mode: &str);
}
