//! The primary control loop: telemetry in, commands out.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::command::CommandChannel;
use crate::error::{BridgeError, Result};
use crate::state::SessionState;
use crate::types::EndReason;
use crate::wire::{self, TELEMETRY_BYTES};

/// Telemetry receive loop.
///
/// Runs the strict per-tick sequence: receive one datagram, decode it,
/// publish the frame, send the current actuator vector. The command channel
/// is owned here, so command cadence is coupled one-to-one to telemetry
/// cadence and decode never overlaps send.
///
/// The loop moves through three phases: waiting for the first frame
/// (unbounded receive), running (receive bounded by the configured
/// timeout), terminated. Termination publishes an [`EndReason`] and drops
/// both sockets on the way out.
pub(crate) struct TelemetryLoop {
    socket: UdpSocket,
    commands: CommandChannel,
    state: Arc<SessionState>,
    timeout: Duration,
    cancel: CancellationToken,
}

impl TelemetryLoop {
    pub fn new(
        socket: UdpSocket,
        commands: CommandChannel,
        state: Arc<SessionState>,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self { socket, commands, state, timeout, cancel }
    }

    pub async fn run(self) {
        let mut running = false;
        // Twice the frame size so an oversized datagram shows up as a
        // length mismatch instead of being silently truncated to fit.
        let mut buf = [0u8; TELEMETRY_BYTES * 2];

        loop {
            let received = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("telemetry loop cancelled");
                    return;
                }
                result = self.recv(&mut buf, running) => result,
            };

            let len = match received {
                Ok(len) => len,
                Err(e) => {
                    info!("telemetry link lost: {e}");
                    self.state.mark_done(EndReason::LinkLost);
                    return;
                }
            };

            let frame = match wire::decode_telemetry(&buf[..len]) {
                Ok(frame) => frame,
                Err(e) => {
                    // One corrupt packet must not kill the link.
                    warn!("dropping telemetry datagram: {e}");
                    continue;
                }
            };

            trace!(time = frame.time, "telemetry frame received");
            self.state.publish_frame(frame);

            if !running {
                info!(time = frame.time, "telemetry running");
                running = true;
            }

            if frame.is_shutdown_sentinel() {
                // No final command after the sentinel; both sockets drop
                // when the loop returns.
                info!("remote requested shutdown");
                self.state.mark_done(EndReason::RemoteShutdown);
                return;
            }

            let motors = self.state.motors();
            if let Err(e) = self.commands.send(&motors).await {
                debug!("command send failed, next tick retries: {e}");
            }
        }
    }

    /// Receive one datagram. The timeout only applies once the link is up:
    /// the simulator may take arbitrarily long to produce its first frame,
    /// but after that silence means the link is gone.
    async fn recv(&self, buf: &mut [u8], bounded: bool) -> Result<usize> {
        let map_err = |e| BridgeError::transport("telemetry receive", e);
        if bounded && self.timeout > Duration::ZERO {
            match tokio::time::timeout(self.timeout, self.socket.recv_from(buf)).await {
                Ok(result) => result.map(|(len, _)| len).map_err(map_err),
                Err(_) => Err(map_err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no telemetry within timeout",
                ))),
            }
        } else {
            self.socket.recv_from(buf).await.map(|(len, _)| len).map_err(map_err)
        }
    }
}
