use thiserror::Error;

/// Top-level error type for the `sfa-libbox` crate.
///
/// Covers every failure mode at the engine boundary: reaching the command
/// endpoint, the handshake, frame decoding, and teardown.
/// `sfa-core` maps these into its own diagnostics, and never surfaces them
/// to subscribers.
#[derive(Debug, Error)]
pub enum Error {
    // ── Endpoint ────────────────────────────────────────────────────
    /// The endpoint address could not be parsed.
    #[error("Invalid command endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The command endpoint refused or dropped the connection attempt.
    #[error("Cannot reach command endpoint {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    // ── Transport ───────────────────────────────────────────────────
    /// The command stream failed while reading frames.
    #[error("Command socket I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing the handshake line failed.
    #[error("Command handshake failed: {0}")]
    Handshake(String),

    /// The connection is already gone (engine closed it, or it was torn down).
    #[error("Command connection closed: {reason}")]
    Closed { reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A frame could not be decoded, with the raw line for debugging.
    #[error("Malformed command frame: {message}")]
    Frame { message: String, line: String },
}
