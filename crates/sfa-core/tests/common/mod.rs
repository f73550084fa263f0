//! Scripted in-memory command endpoint shared by the integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sfa_libbox::{
    CommandClientHandler, CommandClientOptions, CommandConnection, CommandEndpoint, Error,
    RefTable,
};
use tokio::time::Instant;

type ConnectHook = Box<dyn Fn() + Send + Sync>;

/// Endpoint that fails a configurable number of attempts, then succeeds.
pub struct StubEndpoint {
    refs: Arc<RefTable>,
    start: Instant,
    failures_left: AtomicU32,
    attempts: Mutex<Vec<Duration>>,
    options: Mutex<Vec<CommandClientOptions>>,
    handler: Mutex<Option<Arc<dyn CommandClientHandler>>>,
    disconnects: Arc<AtomicUsize>,
    fail_disconnect: Arc<AtomicBool>,
    on_connect: Mutex<Option<ConnectHook>>,
}

impl StubEndpoint {
    /// Succeeds after `failures` failed attempts.
    pub fn failing(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            refs: RefTable::new(),
            start: Instant::now(),
            failures_left: AtomicU32::new(failures),
            attempts: Mutex::new(Vec::new()),
            options: Mutex::new(Vec::new()),
            handler: Mutex::new(None),
            disconnects: Arc::new(AtomicUsize::new(0)),
            fail_disconnect: Arc::new(AtomicBool::new(false)),
            on_connect: Mutex::new(None),
        })
    }

    pub fn healthy() -> Arc<Self> {
        Self::failing(0)
    }

    pub fn unreachable() -> Arc<Self> {
        Self::failing(u32::MAX)
    }

    /// Run `hook` inside every successful connect, before it returns.
    pub fn on_connect(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_connect.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn fail_disconnects(&self) {
        self.fail_disconnect.store(true, Ordering::SeqCst);
    }

    /// Attempt times relative to endpoint creation, in milliseconds.
    pub fn attempt_offsets_ms(&self) -> Vec<u128> {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .map(Duration::as_millis)
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn last_options(&self) -> Option<CommandClientOptions> {
        self.options.lock().unwrap().last().cloned()
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn live_refs(&self) -> usize {
        self.refs.live()
    }

    /// Drive the most recently connected handler, as the engine would.
    pub fn emit(&self, f: impl FnOnce(&dyn CommandClientHandler)) {
        let handler = self.handler.lock().unwrap().clone().unwrap();
        f(handler.as_ref());
    }
}

impl CommandEndpoint for StubEndpoint {
    type Connection = StubConnection;

    fn connect(
        &self,
        options: &CommandClientOptions,
        handler: Arc<dyn CommandClientHandler>,
    ) -> impl Future<Output = Result<StubConnection, Error>> + Send {
        self.attempts.lock().unwrap().push(self.start.elapsed());
        self.options.lock().unwrap().push(options.clone());

        let failed = match self.failures_left.load(Ordering::SeqCst) {
            0 => false,
            u32::MAX => true,
            _ => {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                true
            }
        };

        let result = if failed {
            Err(Error::Connect {
                endpoint: self.describe(),
                reason: "connection refused".into(),
            })
        } else {
            handler.connected();
            *self.handler.lock().unwrap() = Some(handler);
            if let Some(hook) = self.on_connect.lock().unwrap().as_ref() {
                hook();
            }
            Ok(StubConnection {
                disconnects: Arc::clone(&self.disconnects),
                fail: Arc::clone(&self.fail_disconnect),
            })
        };
        std::future::ready(result)
    }

    fn refs(&self) -> &Arc<RefTable> {
        &self.refs
    }

    fn describe(&self) -> String {
        "stub".into()
    }
}

pub struct StubConnection {
    disconnects: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl CommandConnection for StubConnection {
    fn disconnect(&mut self) -> Result<(), Error> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Closed {
                reason: "engine already gone".into(),
            });
        }
        Ok(())
    }
}

/// Let spawned tasks run to quiescence under the paused clock.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
