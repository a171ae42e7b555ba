//! Error types for the bridge.
//!
//! Only two things can go wrong at this layer: a socket operation fails, or
//! an inbound telemetry datagram has the wrong length. Remote shutdown is
//! deliberately *not* an error but a normal terminal signal, surfaced as
//! [`EndReason::RemoteShutdown`](crate::EndReason::RemoteShutdown).
//!
//! Receive-loop failures never cross the session API as `Err` values; they
//! collapse into the session's terminal state and callers observe them by
//! polling [`Session::is_done`](crate::Session::is_done). The errors here
//! surface directly only from bind/start and from the codec.

use std::io;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Main error type for bridge operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// Socket-level failure: bind, send, receive, or accept.
    #[error("transport failure during {op}")]
    Transport {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// An inbound telemetry datagram whose length is not exactly one frame.
    #[error("malformed telemetry frame: expected {expected} bytes, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    /// `start` was called on a session whose loops are already running.
    #[error("session already started")]
    AlreadyStarted,
}

impl BridgeError {
    /// Helper constructor for transport errors with operation context.
    pub fn transport(op: &'static str, source: io::Error) -> Self {
        BridgeError::Transport { op, source }
    }

    /// Whether the telemetry loop can keep running after this error.
    ///
    /// A malformed datagram costs one frame; a transport failure means the
    /// socket is gone and the loop must terminate.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::MalformedFrame { .. })
    }
}
