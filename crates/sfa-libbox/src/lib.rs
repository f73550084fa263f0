// sfa-libbox: Engine boundary for the sing-box command endpoint.

pub mod command;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod model;
pub mod refs;
pub mod socket;

pub use command::{Command, CommandClientOptions, DEFAULT_STATUS_INTERVAL_NANOS};
pub use endpoint::{CommandConnection, CommandEndpoint};
pub use error::Error;
pub use handler::CommandClientHandler;
pub use model::{OutboundGroup, OutboundGroupItem, StatusMessage};
pub use refs::{ForeignRef, RefTable};
pub use socket::{EndpointAddr, SocketConnection, SocketEndpoint};
