//! Core data types carried between the simulator and the caller.

use std::sync::Arc;

use crate::wire::STATE_SIZE;

/// One timestamped snapshot of vehicle state received from the simulator.
///
/// `state` is the 12-dimensional vehicle state (position, velocity,
/// attitude, attitude rate). Interpreting the individual elements is the
/// flight controller's concern, not the bridge's.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryFrame {
    /// Simulation timestamp in seconds. Negative values are the in-band
    /// session-termination sentinel.
    pub time: f64,

    /// Vehicle state vector.
    pub state: [f64; STATE_SIZE],
}

impl TelemetryFrame {
    /// Whether this frame carries the remote-shutdown sentinel.
    pub fn is_shutdown_sentinel(&self) -> bool {
        self.time < 0.0
    }
}

/// One fixed-size RGBA camera frame received over the image stream.
#[derive(Debug, Clone)]
pub struct ImageFrame {
    /// Image height in pixels.
    pub rows: usize,

    /// Image width in pixels.
    pub cols: usize,

    /// Raw pixel bytes, `rows * cols * 4` long (zero-copy via Arc).
    pub data: Arc<[u8]>,
}

impl ImageFrame {
    /// Byte length of one wire frame for the given dimensions.
    pub fn byte_len(rows: usize, cols: usize) -> usize {
        rows * cols * 4
    }
}

/// Why a session reached its terminal state.
///
/// Keeping the tag lets callers tell a clean handoff from a broken link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The simulator sent a negative-timestamp frame asking for shutdown.
    RemoteShutdown,

    /// The telemetry socket errored or timed out after the link was up.
    LinkLost,
}
