// ── Status notification projection ──
//
// Renders Status events into the text of a persistent notification and
// drives the notification's lifecycle alongside the service.

use std::sync::Arc;

use bytesize::ByteSize;
use futures_core::Stream;
use sfa_libbox::{Command, CommandEndpoint, StatusMessage};
use tracing::debug;

use crate::binding::{Binding, Liveness};
use crate::client::CommandClient;
use crate::config::SessionConfig;
use crate::handler::Handler;

/// Title used when the active profile has no name.
pub const DEFAULT_TITLE: &str = "sing-box";
/// Content shown until the first status arrives.
pub const STARTED_CONTENT: &str = "service started";

/// A user-visible notification the projection writes into.
pub trait NotificationSurface: Send + Sync + 'static {
    fn show(&self, title: &str, content: &str);
    fn update(&self, content: &str);
    fn remove(&self);
}

/// IEC byte formatting: `1024` renders as `1.0 KiB`. Negative counts
/// render as zero.
pub fn format_bytes(bytes: i64) -> String {
    ByteSize::b(u64::try_from(bytes).unwrap_or(0)).to_string_as(true)
}

/// Notification content for one status message.
pub fn status_content(status: &StatusMessage) -> String {
    format!(
        "{}/s ↑\t{}/s ↓",
        format_bytes(status.uplink),
        format_bytes(status.downlink)
    )
}

// ── StatusProjection ─────────────────────────────────────────────

/// Handler that writes each status into a [`NotificationSurface`].
pub struct StatusProjection<S: NotificationSurface> {
    surface: Arc<S>,
}

impl<S: NotificationSurface> StatusProjection<S> {
    pub fn new(surface: Arc<S>) -> Self {
        Self { surface }
    }
}

impl<S: NotificationSurface> Handler for StatusProjection<S> {
    fn update_status(&self, status: &StatusMessage) {
        self.surface.update(&status_content(status));
    }
}

// ── ServiceNotification ──────────────────────────────────────────

/// The service's foreground notification.
///
/// With dynamic updates enabled, a Status session feeds live traffic into
/// the content while the liveness signal is active.
pub struct ServiceNotification<E: CommandEndpoint, S: NotificationSurface> {
    client: CommandClient<E>,
    surface: Arc<S>,
    dynamic: bool,
    binding: Option<Binding>,
}

impl<E: CommandEndpoint, S: NotificationSurface> ServiceNotification<E, S> {
    pub fn new(endpoint: Arc<E>, surface: Arc<S>, config: SessionConfig, dynamic: bool) -> Self {
        let projection = Arc::new(StatusProjection::new(Arc::clone(&surface)));
        let client = CommandClient::builder(endpoint, Command::Status, projection)
            .config(config)
            .build();
        Self {
            client,
            surface,
            dynamic,
            binding: None,
        }
    }

    pub fn client(&self) -> &CommandClient<E> {
        &self.client
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// Show the notification for `profile_name`.
    ///
    /// When dynamic, connects the status session and follows `signals`
    /// from then on.
    pub fn show<L>(&mut self, profile_name: &str, signals: L)
    where
        L: Stream<Item = Liveness> + Send + 'static,
    {
        let title = if profile_name.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            profile_name
        };
        self.surface.show(title, STARTED_CONTENT);

        if self.dynamic {
            self.client.connect();
            if let Some(mut previous) = self.binding.take() {
                previous.unregister();
            }
            self.binding = Some(Binding::register(self.client.clone(), signals));
        } else {
            debug!("dynamic notification disabled, not subscribing to status");
        }
    }

    /// Disconnect, remove the notification, and drop the liveness
    /// subscription if one was registered.
    pub fn close(&mut self) {
        self.client.disconnect();
        self.surface.remove();
        if let Some(mut binding) = self.binding.take() {
            binding.unregister();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_iec_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.0 KiB");
        assert_eq!(format_bytes(2048), "2.0 KiB");
    }

    #[test]
    fn status_content_has_both_directions() {
        let content = status_content(&StatusMessage::traffic(1024, 2048));
        assert_eq!(content, "1.0 KiB/s ↑\t2.0 KiB/s ↓");
    }
}
