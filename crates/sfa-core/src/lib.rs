// sfa-core: Command session manager between the engine's command endpoint
// and its consumers (service notification, log viewer, group and mode UI).

pub mod binding;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod handler;
pub mod notification;

// ── Primary re-exports ──────────────────────────────────────────────
pub use binding::{Binding, Connectable, Liveness};
pub use client::{CommandClient, CommandClientBuilder, ConnectionState};
pub use config::{RetryPolicy, SessionConfig};
pub use error::CoreError;
pub use event::{Event, EventForwarder};
pub use handler::Handler;
pub use notification::{NotificationSurface, ServiceNotification, StatusProjection};

// Engine boundary types consumers need alongside the session API.
pub use sfa_libbox::{
    Command, CommandEndpoint, EndpointAddr, OutboundGroup, OutboundGroupItem, SocketEndpoint,
    StatusMessage,
};
