//! Session façade: the caller-facing aggregate of sockets, loops, and
//! shared state representing one simulator connection.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::channel;
use crate::config::SessionConfig;
use crate::driver::{BoundSockets, Driver, LinkTasks};
use crate::error::{BridgeError, Result};
use crate::state::SessionState;
use crate::types::{EndReason, ImageFrame, TelemetryFrame};
use crate::wire::STATE_SIZE;

/// One connection to a simulator.
///
/// Construction ([`Session::bind`]) allocates all three sockets but starts
/// no network activity; [`Session::start`] launches the telemetry and
/// imaging loops as independent tokio tasks and returns immediately. From
/// then on the caller polls the accessors while the loops keep the shared
/// snapshot current, and either waits for [`Session::is_done`] or tears the
/// session down explicitly with [`Session::shutdown`].
pub struct Session {
    config: SessionConfig,
    state: Arc<SessionState>,
    cancel: CancellationToken,
    telemetry_addr: SocketAddr,
    image_addr: SocketAddr,
    sockets: Option<BoundSockets>,
    tasks: Option<LinkTasks>,
}

impl Session {
    /// Bind all three sockets without starting any network activity.
    ///
    /// Binding happens here rather than at `start` so the simulator can
    /// begin sending the moment the caller hands it these ports: datagrams
    /// queue in the kernel until the loops come up.
    pub fn bind(config: SessionConfig) -> Result<Self> {
        let command = channel::bind_udp(SocketAddr::new(config.host, 0))
            .map_err(|e| BridgeError::transport("command socket bind", e))?;
        let telemetry = channel::bind_udp(SocketAddr::new(config.host, config.telemetry_port))
            .map_err(|e| BridgeError::transport("telemetry socket bind", e))?;
        let image = channel::bind_listener(SocketAddr::new(config.host, config.image_port))
            .map_err(|e| BridgeError::transport("image listener bind", e))?;

        let telemetry_addr = telemetry
            .local_addr()
            .map_err(|e| BridgeError::transport("telemetry local_addr", e))?;
        let image_addr = image
            .local_addr()
            .map_err(|e| BridgeError::transport("image local_addr", e))?;

        debug!(%telemetry_addr, %image_addr, "session sockets bound");

        Ok(Self {
            state: Arc::new(SessionState::new(config.motor_count)),
            cancel: CancellationToken::new(),
            telemetry_addr,
            image_addr,
            sockets: Some(BoundSockets { command, telemetry, image }),
            config,
            tasks: None,
        })
    }

    /// Launch the telemetry and imaging loops. Non-blocking.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`BridgeError::AlreadyStarted`] on a second call.
    pub fn start(&mut self) -> Result<()> {
        let sockets = self.sockets.as_ref().ok_or(BridgeError::AlreadyStarted)?;
        let tasks =
            Driver::spawn(sockets, &self.config, Arc::clone(&self.state), self.cancel.clone())?;
        // Only relinquish the pre-bound sockets once the loops are running;
        // a failed spawn leaves the session retryable, not AlreadyStarted.
        self.sockets = None;
        self.tasks = Some(tasks);
        info!(
            telemetry = %self.telemetry_addr,
            commands = %SocketAddr::new(self.config.host, self.config.motor_port),
            imaging = self.config.imaging_enabled,
            "session started"
        );
        Ok(())
    }

    /// True once the first telemetry frame has been received.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// True once either terminal condition was detected: the remote's
    /// shutdown sentinel or a dead link.
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Why the session ended, or `None` while it is still live.
    pub fn end_reason(&self) -> Option<EndReason> {
        self.state.end_reason()
    }

    /// Latest simulation timestamp, zero before the first frame.
    pub fn time(&self) -> f64 {
        self.state.latest_frame().map(|f| f.time).unwrap_or_default()
    }

    /// Latest vehicle state vector, zeros before the first frame.
    pub fn state(&self) -> [f64; STATE_SIZE] {
        self.state.latest_frame().map(|f| f.state).unwrap_or_default()
    }

    /// Latest camera frame, `None` until the image stream produces one.
    pub fn image(&self) -> Option<Arc<ImageFrame>> {
        self.state.latest_image()
    }

    /// Set the actuator vector sent on the next telemetry tick.
    ///
    /// The slice is copied, never aliased with caller-owned buffers. Extra
    /// values beyond `motor_count` are ignored; missing values stay zero.
    pub fn set_motors(&self, motors: &[f64]) {
        self.state.set_motors(motors);
    }

    /// Local address of the telemetry socket, useful when the config asked
    /// for an ephemeral port.
    pub fn telemetry_addr(&self) -> SocketAddr {
        self.telemetry_addr
    }

    /// Local address of the image listener.
    pub fn image_addr(&self) -> SocketAddr {
        self.image_addr
    }

    /// Push-style alternative to polling: a stream of telemetry frames,
    /// latest-wins (intermediate frames may be skipped under load).
    ///
    /// The stream owns its watch receiver, so it outlives the session.
    pub fn telemetry_updates(&self) -> impl Stream<Item = Arc<TelemetryFrame>> + use<> {
        WatchStream::new(self.state.subscribe_frames()).filter_map(|opt| async move { opt })
    }

    /// Explicit teardown: cancel both loops and wait for them to exit.
    ///
    /// Releases both sockets even if the caller never observed
    /// [`Session::is_done`]. Safe to call after the loops already
    /// terminated on their own.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(tasks) = self.tasks.take() {
            let _ = tasks.telemetry.await;
            let _ = tasks.imaging.await;
        }
        debug!("session shut down");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Best-effort teardown for callers that never await shutdown; the
        // loops observe the token at their next suspension point.
        self.cancel.cancel();
    }
}
