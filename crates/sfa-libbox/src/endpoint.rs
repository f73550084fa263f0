// ── Command endpoint abstraction ──
//
// The engine's control plane as seen by a command client: open a
// connection for one command kind, later tear it down. Implemented by
// `SocketEndpoint` for a running engine and by in-memory stubs in tests.

use std::future::Future;
use std::sync::Arc;

use crate::command::CommandClientOptions;
use crate::error::Error;
use crate::handler::CommandClientHandler;
use crate::refs::RefTable;

/// The engine's command endpoint.
pub trait CommandEndpoint: Send + Sync + 'static {
    type Connection: CommandConnection;

    /// Open one connection. On success the engine starts calling `handler`
    /// and keeps doing so until the connection is disconnected or the
    /// engine closes it.
    ///
    /// May block on the engine; callers keep it off latency-sensitive
    /// threads.
    fn connect(
        &self,
        options: &CommandClientOptions,
        handler: Arc<dyn CommandClientHandler>,
    ) -> impl Future<Output = Result<Self::Connection, Error>> + Send;

    /// Reference table pinning the engine objects behind live connections.
    fn refs(&self) -> &Arc<RefTable>;

    /// Human-readable endpoint description for logs and errors.
    fn describe(&self) -> String {
        "engine".into()
    }
}

/// A live connection returned by [`CommandEndpoint::connect`].
pub trait CommandConnection: Send + 'static {
    /// Ask the engine to stop this subscription. Best-effort: an engine
    /// that already went away reports an error here.
    fn disconnect(&mut self) -> Result<(), Error>;
}
