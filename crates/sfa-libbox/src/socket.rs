//! Local-socket command endpoint.
//!
//! Connects to the engine's command socket, sends a one-line handshake
//! naming the subscription, then decodes newline-delimited JSON frames and
//! drives a [`CommandClientHandler`] from a background reader task.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sfa_libbox::{Command, CommandClientOptions, CommandConnection, CommandEndpoint, SocketEndpoint};
//!
//! let endpoint = SocketEndpoint::parse("unix:/data/sfa/command.sock")?;
//! let options = CommandClientOptions::new(Command::Status);
//! let mut conn = endpoint.connect(&options, Arc::new(MyHandler)).await?;
//! // ... handler receives frames ...
//! conn.disconnect()?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::command::{Command, CommandClientOptions};
use crate::endpoint::{CommandConnection, CommandEndpoint};
use crate::error::Error;
use crate::handler::CommandClientHandler;
use crate::model::{OutboundGroup, StatusMessage};
use crate::refs::RefTable;

// ── Frame size limit ─────────────────────────────────────────────────

const MAX_FRAME_LENGTH: usize = 4 * 1024 * 1024;

// ── EndpointAddr ─────────────────────────────────────────────────────

/// Where the engine's command socket lives.
///
/// Parsed from `unix:<path>` (or a bare absolute path) and
/// `tcp:<host>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointAddr {
    #[cfg(unix)]
    Unix(PathBuf),
    Tcp(String),
}

impl FromStr for EndpointAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidEndpoint {
            endpoint: s.to_owned(),
            reason: reason.to_owned(),
        };

        if let Some(host) = s.strip_prefix("tcp:") {
            return match host.rsplit_once(':') {
                Some((name, port)) if !name.is_empty() && port.parse::<u16>().is_ok() => {
                    Ok(Self::Tcp(host.to_owned()))
                }
                _ => Err(invalid("expected tcp:<host>:<port>")),
            };
        }

        parse_unix(s).ok_or_else(|| invalid("expected unix:<path> or tcp:<host>:<port>"))
    }
}

#[cfg(unix)]
fn parse_unix(s: &str) -> Option<EndpointAddr> {
    let path = match s.strip_prefix("unix:") {
        Some(path) => path,
        None if s.starts_with('/') => s,
        None => return None,
    };
    (!path.is_empty()).then(|| EndpointAddr::Unix(PathBuf::from(path)))
}

#[cfg(not(unix))]
fn parse_unix(_s: &str) -> Option<EndpointAddr> {
    None
}

impl fmt::Display for EndpointAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(unix)]
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
            Self::Tcp(host) => write!(f, "tcp:{host}"),
        }
    }
}

// ── SocketEndpoint ───────────────────────────────────────────────────

/// Command endpoint backed by a local stream socket.
#[derive(Debug, Clone)]
pub struct SocketEndpoint {
    addr: EndpointAddr,
    refs: Arc<RefTable>,
}

impl SocketEndpoint {
    pub fn new(addr: EndpointAddr) -> Self {
        Self {
            addr,
            refs: RefTable::new(),
        }
    }

    pub fn parse(addr: &str) -> Result<Self, Error> {
        Ok(Self::new(addr.parse()?))
    }

    pub fn addr(&self) -> &EndpointAddr {
        &self.addr
    }
}

impl CommandEndpoint for SocketEndpoint {
    type Connection = SocketConnection;

    fn connect(
        &self,
        options: &CommandClientOptions,
        handler: Arc<dyn CommandClientHandler>,
    ) -> impl Future<Output = Result<SocketConnection, Error>> + Send {
        let addr = self.addr.clone();
        let options = options.clone();
        async move { SocketConnection::open(addr, options, handler).await }
    }

    fn refs(&self) -> &Arc<RefTable> {
        &self.refs
    }

    fn describe(&self) -> String {
        self.addr.to_string()
    }
}

// ── SocketConnection ─────────────────────────────────────────────────

/// One open subscription on the command socket.
///
/// Owns the background reader task; disconnecting (or dropping) stops it.
pub struct SocketConnection {
    command: Command,
    cancel: CancellationToken,
    reader: JoinHandle<()>,
}

/// First line written by the client.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Handshake {
    pub command: u8,
    pub status_interval: i64,
}

impl SocketConnection {
    async fn open(
        addr: EndpointAddr,
        options: CommandClientOptions,
        handler: Arc<dyn CommandClientHandler>,
    ) -> Result<Self, Error> {
        tracing::debug!(endpoint = %addr, command = %options.command, "Connecting to command endpoint");

        match &addr {
            #[cfg(unix)]
            EndpointAddr::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(|e| connect_error(&addr, &e))?;
                Self::start(stream, &options, handler).await
            }
            EndpointAddr::Tcp(host) => {
                let stream = tokio::net::TcpStream::connect(host.as_str())
                    .await
                    .map_err(|e| connect_error(&addr, &e))?;
                Self::start(stream, &options, handler).await
            }
        }
    }

    async fn start<S>(
        stream: S,
        options: &CommandClientOptions,
        handler: Arc<dyn CommandClientHandler>,
    ) -> Result<Self, Error>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, mut write) = tokio::io::split(stream);

        let handshake = Handshake {
            command: options.command.code(),
            status_interval: options.status_interval,
        };
        let mut line =
            serde_json::to_string(&handshake).map_err(|e| Error::Handshake(e.to_string()))?;
        line.push('\n');
        write
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Handshake(e.to_string()))?;
        write
            .flush()
            .await
            .map_err(|e| Error::Handshake(e.to_string()))?;

        tracing::info!(command = %options.command, "Command connection established");
        handler.connected();

        let cancel = CancellationToken::new();
        let frames = FramedRead::new(read, LinesCodec::new_with_max_length(MAX_FRAME_LENGTH));
        let reader = tokio::spawn(read_loop(
            frames,
            write,
            handler,
            cancel.clone(),
            options.command,
        ));

        Ok(Self {
            command: options.command,
            cancel,
            reader,
        })
    }
}

impl CommandConnection for SocketConnection {
    fn disconnect(&mut self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        let engine_gone = self.reader.is_finished();
        self.cancel.cancel();
        if engine_gone {
            return Err(Error::Closed {
                reason: format!("{} stream already ended", self.command),
            });
        }
        Ok(())
    }
}

impl Drop for SocketConnection {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn connect_error(addr: &EndpointAddr, err: &std::io::Error) -> Error {
    Error::Connect {
        endpoint: addr.to_string(),
        reason: err.to_string(),
    }
}

// ── Reader loop ──────────────────────────────────────────────────────

/// Read frames until the engine closes the stream or the connection is
/// disconnected locally. Local disconnects are not reported to the handler.
async fn read_loop<R, W>(
    mut frames: FramedRead<R, LinesCodec>,
    _write: W,
    handler: Arc<dyn CommandClientHandler>,
    cancel: CancellationToken,
    command: Command,
) where
    R: AsyncRead + Unpin,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(%command, "Command connection closed locally");
                return;
            }
            line = frames.next() => {
                match line {
                    Some(Ok(line)) => {
                        if let Outcome::Closed(reason) = dispatch_line(&line, handler.as_ref()) {
                            tracing::info!(%command, reason = reason.as_deref().unwrap_or(""), "Engine closed command stream");
                            handler.disconnected(reason.as_deref());
                            return;
                        }
                    }
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        tracing::debug!(%command, max = MAX_FRAME_LENGTH, "Skipping oversized command frame");
                    }
                    Some(Err(LinesCodecError::Io(e))) => {
                        let err = Error::Io(e);
                        tracing::info!(%command, error = %err, "Command stream failed");
                        handler.disconnected(Some(&err.to_string()));
                        return;
                    }
                    None => {
                        tracing::info!(%command, "Command stream ended");
                        handler.disconnected(None);
                        return;
                    }
                }
            }
        }
    }
}

// ── Frame decoding ───────────────────────────────────────────────────

/// A frame pushed by the engine, one JSON object per line.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
    Status(StatusMessage),
    Groups {
        #[serde(default)]
        groups: Option<Vec<OutboundGroup>>,
    },
    ClearLog,
    Log {
        #[serde(default)]
        message: Option<String>,
    },
    ClashModeInit {
        #[serde(default)]
        modes: Vec<String>,
        current: String,
    },
    ClashMode {
        mode: String,
    },
    Closed {
        #[serde(default)]
        reason: Option<String>,
    },
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Continue,
    Closed(Option<String>),
}

fn decode_frame(line: &str) -> Result<Frame, Error> {
    serde_json::from_str(line).map_err(|e| Error::Frame {
        message: e.to_string(),
        line: line.to_owned(),
    })
}

/// Decode one line and hand its payload to the handler.
fn dispatch_line(line: &str, handler: &dyn CommandClientHandler) -> Outcome {
    if line.trim().is_empty() {
        return Outcome::Continue;
    }

    let frame = match decode_frame(line) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping undecodable command frame");
            return Outcome::Continue;
        }
    };

    match frame {
        Frame::Status(status) => handler.write_status(Some(status)),
        Frame::Groups { groups: Some(groups) } => {
            let mut iter = groups.into_iter();
            let iter: &mut dyn Iterator<Item = OutboundGroup> = &mut iter;
            handler.write_groups(Some(iter));
        }
        Frame::Groups { groups: None } => handler.write_groups(None),
        Frame::ClearLog => handler.clear_log(),
        Frame::Log { message } => handler.write_log(message.as_deref()),
        Frame::ClashModeInit { modes, current } => {
            handler.initialize_clash_mode(&mut modes.into_iter(), &current);
        }
        Frame::ClashMode { mode } => handler.update_clash_mode(&mode),
        Frame::Closed { reason } => return Outcome::Closed(reason),
    }
    Outcome::Continue
}

// ── Tests ────────────────────────────────────────────────────────────
