// ── Command session ──
//
// One reconnecting subscription to the engine's command endpoint. Owns at
// most one live engine handle and at most one in-flight retry task. The
// handle slot and the retry task slot share a single mutex so that an
// install can never land after a teardown.

use std::sync::Arc;

use parking_lot::Mutex;
use sfa_libbox::{
    Command, CommandClientHandler, CommandClientOptions, CommandConnection, CommandEndpoint,
    ForeignRef,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{RetryPolicy, SessionConfig};
use crate::dispatch::Dispatcher;
use crate::error::CoreError;
use crate::handler::Handler;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
///
/// Purely informational: `connect()` never fails, and subscribers only
/// ever see what the engine itself reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// Waiting for or running attempt `attempt` (0 before the first delay).
    Connecting { attempt: u32 },
    /// A handle is installed. Stays set after the engine closes its side;
    /// that closure reaches subscribers only through `on_disconnected`.
    Connected,
    /// Every attempt of the last `connect()` failed.
    Failed,
}

// ── EngineHandle ─────────────────────────────────────────────────

/// A live engine connection plus the reference pinning it.
///
/// Dropping it asks the engine to disconnect (best-effort) and then
/// releases the reference, in that order.
struct EngineHandle<C: CommandConnection> {
    connection: C,
    reference: ForeignRef,
}

impl<C: CommandConnection> Drop for EngineHandle<C> {
    fn drop(&mut self) {
        if let Err(err) = self.connection.disconnect() {
            debug!(refnum = self.reference.num(), error = %err, "engine disconnect failed");
        }
    }
}

// ── Shared slot ──────────────────────────────────────────────────

struct RetryTask {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

struct Slot<C: CommandConnection> {
    handle: Option<EngineHandle<C>>,
    task: Option<RetryTask>,
    /// Bumped on every teardown; a retry task only touches the slot while
    /// its generation is current.
    generation: u64,
}

impl<C: CommandConnection> Slot<C> {
    /// Cancel the retry task and detach the live handle. The caller drops
    /// the returned handle outside the lock.
    fn teardown(&mut self) -> (Option<EngineHandle<C>>, Option<RetryTask>) {
        let task = self.task.take();
        if let Some(task) = &task {
            task.cancel.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
        (self.handle.take(), task)
    }
}

struct Shared<C: CommandConnection> {
    slot: Mutex<Slot<C>>,
    state: watch::Sender<ConnectionState>,
}

impl<C: CommandConnection> Shared<C> {
    /// Install `handle` unless the attempt was superseded. Returns the
    /// handle back when it must be torn down instead.
    fn install(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        handle: EngineHandle<C>,
    ) -> Option<EngineHandle<C>> {
        let mut slot = self.slot.lock();
        if cancel.is_cancelled() || slot.generation != generation {
            return Some(handle);
        }
        slot.handle = Some(handle);
        self.state.send_replace(ConnectionState::Connected);
        None
    }

    /// Detach the handle installed by `generation`, if it is still current,
    /// and mark the session disconnected.
    fn release(&self, generation: u64) -> Option<EngineHandle<C>> {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return None;
        }
        slot.task = None;
        self.state.send_replace(ConnectionState::Disconnected);
        slot.handle.take()
    }

    fn publish(&self, generation: u64, cancel: &CancellationToken, state: ConnectionState) {
        let slot = self.slot.lock();
        if !cancel.is_cancelled() && slot.generation == generation {
            self.state.send_replace(state);
        }
    }
}

// ── CommandClient ────────────────────────────────────────────────

/// A reconnecting command session of one [`Command`] kind.
///
/// Cheaply cloneable via `Arc<ClientInner>`. The last clone to drop tears
/// the session down.
pub struct CommandClient<E: CommandEndpoint> {
    inner: Arc<ClientInner<E>>,
}

impl<E: CommandEndpoint> Clone for CommandClient<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ClientInner<E: CommandEndpoint> {
    endpoint: Arc<E>,
    options: CommandClientOptions,
    retry: RetryPolicy,
    dispatcher: Arc<dyn CommandClientHandler>,
    parent: CancellationToken,
    shared: Arc<Shared<E::Connection>>,
}

impl<E: CommandEndpoint> CommandClient<E> {
    /// Session with the default configuration.
    pub fn new(endpoint: Arc<E>, command: Command, handler: Arc<dyn Handler>) -> Self {
        Self::builder(endpoint, command, handler).build()
    }

    pub fn builder(
        endpoint: Arc<E>,
        command: Command,
        handler: Arc<dyn Handler>,
    ) -> CommandClientBuilder<E> {
        CommandClientBuilder {
            endpoint,
            command,
            handler,
            config: SessionConfig::default(),
            parent: None,
        }
    }

    pub fn command(&self) -> Command {
        self.inner.options.command
    }

    /// Whether an engine handle is currently installed.
    ///
    /// An engine-side close does not clear the handle; it stays installed
    /// until `disconnect()`, `connect()` or drop.
    pub fn is_connected(&self) -> bool {
        self.inner.shared.slot.lock().handle.is_some()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start connecting in the background.
    ///
    /// Any live handle and any in-flight retry task are torn down first.
    /// Never fails: transient errors are retried, and exhaustion is only
    /// visible as [`ConnectionState::Failed`].
    pub fn connect(&self) {
        let inner = &self.inner;
        let command = inner.options.command;

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(%command, "connect called outside a tokio runtime, ignoring");
            return;
        };

        if inner.parent.is_cancelled() {
            debug!(%command, "owner scope already cancelled, not connecting");
            self.disconnect();
            return;
        }

        let cancel = inner.parent.child_token();
        let (stale, _) = {
            let mut slot = inner.shared.slot.lock();
            let stale = slot.teardown();
            let generation = slot.generation;

            inner
                .shared
                .state
                .send_replace(ConnectionState::Connecting { attempt: 0 });

            let join = runtime.spawn(retry_task(
                Arc::clone(&inner.endpoint),
                inner.options.clone(),
                inner.retry.clone(),
                Arc::clone(&inner.dispatcher),
                Arc::clone(&inner.shared),
                cancel.clone(),
                generation,
            ));
            slot.task = Some(RetryTask { cancel, join });
            stale
        };

        if stale.is_some() {
            debug!(%command, "replacing live command session");
        }
        drop(stale);
    }

    /// Stop retrying and release the live handle. Idempotent.
    ///
    /// The engine-side disconnect is best-effort; its failure is logged
    /// and the local handle is released regardless.
    pub fn disconnect(&self) {
        let (stale, _) = {
            let mut slot = self.inner.shared.slot.lock();
            let torn = slot.teardown();
            self.inner
                .shared
                .state
                .send_replace(ConnectionState::Disconnected);
            torn
        };

        if let Some(handle) = stale {
            info!(command = %self.inner.options.command, "command session disconnected");
            drop(handle);
        }
    }

    /// Cancel, wait for the retry task to finish, then disconnect.
    pub async fn shutdown(&self) {
        let task = {
            let mut slot = self.inner.shared.slot.lock();
            let task = slot.task.take();
            if let Some(task) = &task {
                task.cancel.cancel();
            }
            task
        };

        if let Some(task) = task {
            if let Err(err) = task.join.await {
                warn!(error = %err, "command retry task ended abnormally");
            }
        }

        self.disconnect();
    }

    /// Wait until the current `connect()` settles.
    ///
    /// Returns `Ok` once connected, `ConnectionFailed` after the retry
    /// budget is spent, and `SessionClosed` right away when the session is
    /// idle or gets disconnected while waiting.
    pub async fn wait_connected(&self) -> Result<(), CoreError> {
        let mut rx = self.connection_state();
        let state = *rx
            .wait_for(|state| !matches!(state, ConnectionState::Connecting { .. }))
            .await
            .map_err(|_| CoreError::Internal("connection state channel closed".into()))?;

        match state {
            ConnectionState::Connected => Ok(()),
            ConnectionState::Failed => Err(CoreError::ConnectionFailed {
                endpoint: self.inner.endpoint.describe(),
                reason: format!("gave up after {} attempts", self.inner.retry.max_attempts),
            }),
            ConnectionState::Disconnected | ConnectionState::Connecting { .. } => {
                Err(CoreError::SessionClosed {
                    reason: "session is not connecting".into(),
                })
            }
        }
    }
}

impl<E: CommandEndpoint> Drop for ClientInner<E> {
    fn drop(&mut self) {
        let (stale, _) = self.shared.slot.lock().teardown();
        self.shared.state.send_replace(ConnectionState::Disconnected);
        drop(stale);
    }
}

// ── Builder ──────────────────────────────────────────────────────

pub struct CommandClientBuilder<E: CommandEndpoint> {
    endpoint: Arc<E>,
    command: Command,
    handler: Arc<dyn Handler>,
    config: SessionConfig,
    parent: Option<CancellationToken>,
}

impl<E: CommandEndpoint> CommandClientBuilder<E> {
    #[must_use]
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Tie the session to an outer scope. Cancelling `parent` stops any
    /// retry loop and releases the live handle.
    #[must_use]
    pub fn cancel(mut self, parent: &CancellationToken) -> Self {
        self.parent = Some(parent.child_token());
        self
    }

    pub fn build(self) -> CommandClient<E> {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        CommandClient {
            inner: Arc::new(ClientInner {
                options: self.config.options_for(self.command),
                retry: self.config.retry,
                dispatcher: Arc::new(Dispatcher::new(self.command, self.handler)),
                endpoint: self.endpoint,
                parent: self.parent.unwrap_or_default(),
                shared: Arc::new(Shared {
                    slot: Mutex::new(Slot {
                        handle: None,
                        task: None,
                        generation: 0,
                    }),
                    state,
                }),
            }),
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn retry_task<E: CommandEndpoint>(
    endpoint: Arc<E>,
    options: CommandClientOptions,
    retry: RetryPolicy,
    dispatcher: Arc<dyn CommandClientHandler>,
    shared: Arc<Shared<E::Connection>>,
    cancel: CancellationToken,
    generation: u64,
) {
    let command = options.command;

    for attempt in 1..=retry.max_attempts {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(%command, attempt, "command connect cancelled");
                shared.release(generation);
                return;
            }
            () = tokio::time::sleep(retry.delay_for(attempt)) => {}
        }

        shared.publish(generation, &cancel, ConnectionState::Connecting { attempt });

        let connection = match endpoint.connect(&options, Arc::clone(&dispatcher)).await {
            Ok(connection) => connection,
            Err(err) => {
                debug!(%command, attempt, error = %err, "command connect attempt failed");
                continue;
            }
        };

        let handle = EngineHandle {
            connection,
            reference: endpoint.refs().acquire(command),
        };
        if let Some(rejected) = shared.install(generation, &cancel, handle) {
            debug!(%command, attempt, "connected after cancellation, releasing");
            drop(rejected);
            shared.release(generation);
            return;
        }
        info!(%command, attempt, endpoint = %endpoint.describe(), "command session connected");

        // Hold the handle until this scope ends.
        cancel.cancelled().await;
        if let Some(handle) = shared.release(generation) {
            info!(%command, "command session released by owner scope");
            drop(handle);
        }
        return;
    }

    warn!(
        %command,
        attempts = retry.max_attempts,
        endpoint = %endpoint.describe(),
        "giving up on command session"
    );
    shared.publish(generation, &cancel, ConnectionState::Failed);
}
