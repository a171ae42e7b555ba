//! Session configuration.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Construction parameters for a [`Session`](crate::Session).
///
/// Everything is fixed at construction time; there is no dynamic
/// reconfiguration once the loops are running. The defaults match the
/// simulator's stock port assignments and a four-motor vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Address the simulator runs on. Telemetry and image sockets bind to
    /// this address; command datagrams are sent to it.
    pub host: IpAddr,

    /// Port the simulator consumes actuator commands on.
    pub motor_port: u16,

    /// Local port telemetry datagrams arrive on.
    pub telemetry_port: u16,

    /// Local port the simulator's image stream connects to.
    pub image_port: u16,

    /// Number of motors in the simulated vehicle.
    pub motor_count: usize,

    /// Receive timeout for telemetry, applied only after the first frame
    /// has arrived (the first frame may take arbitrarily long while the
    /// simulator starts up). `Duration::ZERO` disables the timeout.
    pub timeout: Duration,

    /// Whether the imaging loop accepts a client and reads frames. Defaults
    /// to `false`: the image channel is reserved but inert.
    pub imaging_enabled: bool,

    /// Image height in pixels. Must match what the simulator streams.
    pub image_rows: usize,

    /// Image width in pixels. Must match what the simulator streams.
    pub image_cols: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            motor_port: 5000,
            telemetry_port: 5001,
            image_port: 5002,
            motor_count: 4,
            timeout: Duration::from_millis(100),
            imaging_enabled: false,
            image_rows: 480,
            image_cols: 640,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_simulator() {
        let config = SessionConfig::default();
        assert_eq!(config.motor_port, 5000);
        assert_eq!(config.telemetry_port, 5001);
        assert_eq!(config.image_port, 5002);
        assert_eq!(config.motor_count, 4);
        assert!(!config.imaging_enabled);
    }

    #[test]
    fn partial_config_deserializes_over_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"motor_count": 6, "imaging_enabled": true}"#).unwrap();
        assert_eq!(config.motor_count, 6);
        assert!(config.imaging_enabled);
        assert_eq!(config.telemetry_port, 5001);
    }
}
