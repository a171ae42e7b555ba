//! Driver spawns and manages the network loop tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::channel::command::CommandChannel;
use crate::channel::imaging::ImagingLoop;
use crate::channel::telemetry::TelemetryLoop;
use crate::config::SessionConfig;
use crate::error::{BridgeError, Result};
use crate::state::SessionState;

/// The three pre-bound std sockets a session owns between `bind` and
/// `start`.
pub(crate) struct BoundSockets {
    pub command: std::net::UdpSocket,
    pub telemetry: std::net::UdpSocket,
    pub image: std::net::TcpListener,
}

/// Join handles for the two loop tasks, so the façade can await teardown.
pub(crate) struct LinkTasks {
    pub telemetry: JoinHandle<()>,
    pub imaging: JoinHandle<()>,
}

pub(crate) struct Driver;

impl Driver {
    /// Register the sockets with the reactor and spawn both loops.
    ///
    /// Must be called from within a tokio runtime. The telemetry loop takes
    /// ownership of the command channel; the cancellation token is the only
    /// external handle into either task.
    ///
    /// Registration works on cloned handles: if any step fails, the
    /// caller's pre-bound sockets are untouched and a later spawn can be
    /// attempted again.
    pub fn spawn(
        sockets: &BoundSockets,
        config: &SessionConfig,
        state: Arc<SessionState>,
        cancel: CancellationToken,
    ) -> Result<LinkTasks> {
        let command = sockets
            .command
            .try_clone()
            .map_err(|e| BridgeError::transport("command socket clone", e))?;
        let telemetry = sockets
            .telemetry
            .try_clone()
            .map_err(|e| BridgeError::transport("telemetry socket clone", e))?;
        let image = sockets
            .image
            .try_clone()
            .map_err(|e| BridgeError::transport("image listener clone", e))?;

        let commands =
            CommandChannel::new(command, SocketAddr::new(config.host, config.motor_port))?;
        let telemetry_socket = UdpSocket::from_std(telemetry)
            .map_err(|e| BridgeError::transport("telemetry socket registration", e))?;
        let listener = TcpListener::from_std(image)
            .map_err(|e| BridgeError::transport("image listener registration", e))?;

        let telemetry = TelemetryLoop::new(
            telemetry_socket,
            commands,
            Arc::clone(&state),
            config.timeout,
            cancel.clone(),
        );
        let imaging = ImagingLoop::new(
            listener,
            config.image_rows,
            config.image_cols,
            config.imaging_enabled,
            state,
            cancel,
        );

        debug!("spawning telemetry and imaging loops");
        Ok(LinkTasks {
            telemetry: tokio::spawn(telemetry.run()),
            imaging: tokio::spawn(imaging.run()),
        })
    }
}
