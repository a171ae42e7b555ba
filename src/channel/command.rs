//! One-way actuator command channel.

use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tracing::trace;

use crate::error::{BridgeError, Result};
use crate::wire;

/// Fire-and-forget UDP sender for actuator vectors.
///
/// Owned exclusively by the telemetry loop, which sends exactly one command
/// per inbound telemetry frame. There is no acknowledgment and no retry: a
/// lost datagram is simply followed by the next one on the next tick. The
/// socket is released when the loop drops the channel, so teardown is
/// idempotent by ownership.
pub(crate) struct CommandChannel {
    socket: UdpSocket,
    dest: SocketAddr,
}

impl CommandChannel {
    /// Register a pre-bound ephemeral socket with the reactor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(socket: std::net::UdpSocket, dest: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::from_std(socket)
            .map_err(|e| BridgeError::transport("command socket registration", e))?;
        Ok(Self { socket, dest })
    }

    /// Encode and transmit one command datagram, best effort.
    pub async fn send(&self, motors: &[f64]) -> Result<()> {
        let buf = wire::encode_actuators(motors);
        self.socket
            .send_to(&buf, self.dest)
            .await
            .map_err(|e| BridgeError::transport("command send", e))?;
        trace!(bytes = buf.len(), dest = %self.dest, "sent command datagram");
        Ok(())
    }
}
