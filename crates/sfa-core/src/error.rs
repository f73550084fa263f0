// ── Core error types ──
//
// Errors from sfa-core's fallible setup paths. Connection attempts never
// return these: transient failures are retried and exhaustion is only
// observable through the connection state. The `From<sfa_libbox::Error>`
// impl translates boundary errors into session-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to engine at {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Engine session closed: {reason}")]
    SessionClosed { reason: String },

    #[error("Invalid engine endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("Engine protocol error: {message}")]
    Protocol { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from boundary errors ──────────────────────────────────

impl From<sfa_libbox::Error> for CoreError {
    fn from(err: sfa_libbox::Error) -> Self {
        match err {
            sfa_libbox::Error::InvalidEndpoint { endpoint, reason } => {
                CoreError::InvalidEndpoint { endpoint, reason }
            }
            sfa_libbox::Error::Connect { endpoint, reason } => {
                CoreError::ConnectionFailed { endpoint, reason }
            }
            sfa_libbox::Error::Io(e) => CoreError::ConnectionFailed {
                endpoint: String::new(),
                reason: e.to_string(),
            },
            sfa_libbox::Error::Handshake(reason) => CoreError::ConnectionFailed {
                endpoint: String::new(),
                reason: format!("handshake failed: {reason}"),
            },
            sfa_libbox::Error::Closed { reason } => CoreError::SessionClosed { reason },
            sfa_libbox::Error::Frame { message, line: _ } => CoreError::Protocol { message },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn invalid_endpoint_keeps_its_details() {
        let err: CoreError = "nowhere".parse::<sfa_libbox::EndpointAddr>().unwrap_err().into();
        match err {
            CoreError::InvalidEndpoint { endpoint, .. } => assert_eq!(endpoint, "nowhere"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
