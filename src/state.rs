//! Shared session state.
//!
//! One watch channel per field, one writer per field: the telemetry loop
//! writes frames and the terminal reason, the imaging loop writes images,
//! the caller writes the actuator vector. Updates are whole-value
//! replacements (last-write-wins, no queue), so readers never observe a
//! half-written frame. No atomicity is promised *across* fields: a reader
//! may pair a fresh telemetry frame with a stale image, which is accepted
//! as a benign race.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::{EndReason, ImageFrame, TelemetryFrame};

pub(crate) struct SessionState {
    frames: watch::Sender<Option<Arc<TelemetryFrame>>>,
    images: watch::Sender<Option<Arc<ImageFrame>>>,
    motors: watch::Sender<Arc<[f64]>>,
    end: watch::Sender<Option<EndReason>>,
    motor_count: usize,
}

impl SessionState {
    /// Zero-initialized state for a vehicle with `motor_count` motors.
    pub fn new(motor_count: usize) -> Self {
        let (frames, _) = watch::channel(None);
        let (images, _) = watch::channel(None);
        let (motors, _) = watch::channel(Arc::from(vec![0.0; motor_count]));
        let (end, _) = watch::channel(None);
        Self { frames, images, motors, end, motor_count }
    }

    /// Replace the latest telemetry frame. Readiness is implied: the slot
    /// holds `Some` forever after the first publish.
    pub fn publish_frame(&self, frame: TelemetryFrame) {
        self.frames.send_replace(Some(Arc::new(frame)));
    }

    pub fn publish_image(&self, image: ImageFrame) {
        self.images.send_replace(Some(Arc::new(image)));
    }

    /// Caller-side write of the actuator vector. The input is copied into a
    /// fresh vector of exactly `motor_count` elements: extra values are
    /// ignored, missing values stay zero. Values themselves are untouched.
    pub fn set_motors(&self, values: &[f64]) {
        let mut vector = vec![0.0; self.motor_count];
        for (slot, value) in vector.iter_mut().zip(values) {
            *slot = *value;
        }
        self.motors.send_replace(Arc::from(vector));
    }

    /// Snapshot of the actuator vector for the next command send.
    pub fn motors(&self) -> Arc<[f64]> {
        self.motors.borrow().clone()
    }

    pub fn latest_frame(&self) -> Option<Arc<TelemetryFrame>> {
        self.frames.borrow().clone()
    }

    pub fn latest_image(&self) -> Option<Arc<ImageFrame>> {
        self.images.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.frames.borrow().is_some()
    }

    /// Record the terminal reason. First writer wins; a later call with a
    /// different reason is a no-op, so the two loops cannot disagree about
    /// why the session ended.
    pub fn mark_done(&self, reason: EndReason) {
        self.end.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        *self.end.borrow()
    }

    pub fn is_done(&self) -> bool {
        self.end.borrow().is_some()
    }

    /// Watch receiver for the frame slot, for stream-style consumers.
    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Arc<TelemetryFrame>>> {
        self.frames.subscribe()
    }
}
