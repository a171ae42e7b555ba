//! Connection-oriented image stream listener.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::state::SessionState;
use crate::types::ImageFrame;

/// Per-read deadline once a client is connected. A quiet stretch usually
/// means the simulator paused or is quitting; the loop just waits for the
/// next bytes.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Camera frame receive loop.
///
/// Accepts a single simulator client and reads fixed-size RGBA frames of
/// `rows * cols * 4` bytes, publishing each as the latest image. The frame
/// buffer fills across however many reads the stream needs; an idle
/// deadline between reads is swallowed without discarding the bytes
/// already buffered, so a slow frame can never shift the stream off its
/// frame boundaries. A disconnect ends this loop but never the session,
/// since imagery is auxiliary to the telemetry link.
///
/// Disabled by default (`imaging_enabled` in the config): the listener is
/// bound so the port is reserved, but no client is ever accepted.
pub(crate) struct ImagingLoop {
    listener: TcpListener,
    rows: usize,
    cols: usize,
    enabled: bool,
    state: Arc<SessionState>,
    cancel: CancellationToken,
}

impl ImagingLoop {
    pub fn new(
        listener: TcpListener,
        rows: usize,
        cols: usize,
        enabled: bool,
        state: Arc<SessionState>,
        cancel: CancellationToken,
    ) -> Self {
        Self { listener, rows, cols, enabled, state, cancel }
    }

    pub async fn run(self) {
        if !self.enabled {
            debug!("imaging disabled, leaving the channel inert");
            return;
        }

        let (mut conn, peer) = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("imaging loop cancelled before accept");
                return;
            }
            result = self.listener.accept() => match result {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("image accept failed: {e}");
                    return;
                }
            },
        };
        info!(%peer, "image client connected");

        let frame_len = ImageFrame::byte_len(self.rows, self.cols);
        let mut buf = vec![0u8; frame_len];
        // Bytes of the current frame received so far. `read` (unlike
        // `read_exact`) is cancel-safe, so partial progress survives a
        // fired deadline.
        let mut filled = 0;

        loop {
            let read = tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("imaging loop cancelled");
                    return;
                }
                result = tokio::time::timeout(READ_TIMEOUT, conn.read(&mut buf[filled..])) => result,
            };

            match read {
                Ok(Ok(0)) => {
                    debug!("image client disconnected");
                    return;
                }
                Ok(Ok(n)) => {
                    filled += n;
                    if filled == frame_len {
                        trace!(bytes = frame_len, "image frame received");
                        self.state.publish_image(ImageFrame {
                            rows: self.rows,
                            cols: self.cols,
                            data: Arc::from(buf.as_slice()),
                        });
                        filled = 0;
                    }
                }
                Ok(Err(e)) => {
                    debug!("image read failed: {e}");
                    return;
                }
                Err(_elapsed) => {
                    trace!(filled, "image stream idle, keeping partial frame");
                }
            }
        }
    }
}
