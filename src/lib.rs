//! Async bridge between a flight controller and a multicopter simulator.
//!
//! Simlink exchanges three independent streams with a simulator over the
//! network: outgoing actuator commands (UDP), incoming vehicle state
//! telemetry (UDP), and incoming camera imagery (TCP). The simulator sends
//! telemetry at its own cadence; the bridge answers each frame with exactly
//! one command datagram carrying the latest motor values, and exposes the
//! latest received values to the caller. A negative telemetry timestamp is
//! the simulator's in-band request for clean shutdown.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use simlink::{Session, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> simlink::Result<()> {
//!     let mut session = Session::bind(SessionConfig::default())?;
//!     session.start()?;
//!
//!     while !session.is_done() {
//!         if session.is_ready() {
//!             let _state = session.state();
//!             // Run the control law of your choice, then:
//!             session.set_motors(&[0.6, 0.6, 0.6, 0.6]);
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
//!     }
//!
//!     session.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! The bridge moves bytes and tracks the latest values; interpreting the
//! state vector and computing control outputs belong to the caller.

mod channel;
mod config;
mod driver;
mod error;
mod session;
mod state;
pub mod types;
pub mod wire;

pub use config::SessionConfig;
pub use error::{BridgeError, Result};
pub use session::Session;
pub use types::{EndReason, ImageFrame, TelemetryFrame};
pub use wire::{STATE_SIZE, TELEMETRY_BYTES, TELEMETRY_DOUBLES};
