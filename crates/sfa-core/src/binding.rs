// ── Subscription lifecycle binding ──
//
// Ties a session's connect/disconnect to an external liveness signal, such
// as the screen turning on and off. Holds no protocol state of its own.

use std::pin::pin;

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use sfa_libbox::CommandEndpoint;

use crate::client::CommandClient;

/// External liveness signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Active,
    Inactive,
}

/// Something a [`Binding`] can start and stop.
pub trait Connectable: Send + Sync + 'static {
    fn connect(&self);
    fn disconnect(&self);
}

impl<E: CommandEndpoint> Connectable for CommandClient<E> {
    fn connect(&self) {
        CommandClient::connect(self);
    }

    fn disconnect(&self) {
        CommandClient::disconnect(self);
    }
}

/// A registered liveness subscription. Dropping it unregisters.
pub struct Binding {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Binding {
    /// Forward `signals` to `target` until unregistered or the stream ends:
    /// `Active` connects, `Inactive` disconnects.
    ///
    /// Must be called within a tokio runtime.
    pub fn register<T, S>(target: T, signals: S) -> Self
    where
        T: Connectable,
        S: Stream<Item = Liveness> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let mut signals = pin!(signals);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    signal = signals.next() => match signal {
                        Some(Liveness::Active) => {
                            debug!("liveness active, connecting");
                            target.connect();
                        }
                        Some(Liveness::Inactive) => {
                            debug!("liveness inactive, disconnecting");
                            target.disconnect();
                        }
                        None => break,
                    },
                }
            }
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Register against a `watch` channel. Only changes after registration
    /// are forwarded; the current value is not replayed.
    pub fn from_watch<T: Connectable>(target: T, signals: watch::Receiver<Liveness>) -> Self {
        Self::register(target, WatchStream::from_changes(signals))
    }

    pub fn is_registered(&self) -> bool {
        self.task.is_some()
    }

    /// Stop forwarding signals. Idempotent.
    pub fn unregister(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        self.unregister();
    }
}
