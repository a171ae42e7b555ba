//! Fixed-width binary codec for the simulator wire format.
//!
//! Both directions use bare sequences of little-endian `f64` values with no
//! header, no length prefix, and no framing beyond the datagram boundary.
//! The receiver knows the element count out of band: `motor_count` values
//! for a command datagram, [`TELEMETRY_DOUBLES`] values for a telemetry
//! datagram.

use crate::error::{BridgeError, Result};
use crate::types::TelemetryFrame;

/// Dimension of the vehicle state vector (position, velocity, attitude,
/// attitude rate).
pub const STATE_SIZE: usize = 12;

/// Values per telemetry datagram: a timestamp followed by the state vector.
pub const TELEMETRY_DOUBLES: usize = STATE_SIZE + 1;

/// Exact byte length of a well-formed telemetry datagram.
pub const TELEMETRY_BYTES: usize = TELEMETRY_DOUBLES * 8;

/// Serialize an actuator vector as consecutive little-endian `f64` values.
///
/// There is no error path: any slice of finite or non-finite floats encodes.
pub fn encode_actuators(values: &[f64]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(values.len() * 8);
    for value in values {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf
}

/// Decode one telemetry datagram into a [`TelemetryFrame`].
///
/// The buffer must be exactly [`TELEMETRY_BYTES`] long. Any other length
/// fails with [`BridgeError::MalformedFrame`] rather than silently
/// reinterpreting whatever bytes happen to be present.
pub fn decode_telemetry(buf: &[u8]) -> Result<TelemetryFrame> {
    if buf.len() != TELEMETRY_BYTES {
        return Err(BridgeError::MalformedFrame {
            expected: TELEMETRY_BYTES,
            actual: buf.len(),
        });
    }

    let mut frame = TelemetryFrame::default();
    let (time_bytes, state_bytes) = buf.split_at(8);
    frame.time = f64::from_le_bytes(time_bytes.try_into().expect("split_at(8) yields 8 bytes"));
    for (slot, chunk) in frame.state.iter_mut().zip(state_bytes.chunks_exact(8)) {
        *slot = f64::from_le_bytes(chunk.try_into().expect("chunks_exact(8) yields 8 bytes"));
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(time: f64, state: [f64; STATE_SIZE]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(TELEMETRY_BYTES);
        buf.extend_from_slice(&time.to_le_bytes());
        for v in state {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

    #[test]
    fn decodes_well_formed_frame() {
        let state = [
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0,
        ];
        let frame = decode_telemetry(&frame_bytes(0.25, state)).unwrap();
        assert_eq!(frame.time, 0.25);
        assert_eq!(frame.state, state);
    }

    #[test]
    fn short_buffer_is_malformed() {
        let err = decode_telemetry(&[0u8; 50]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MalformedFrame { expected: TELEMETRY_BYTES, actual: 50 }
        ));
    }

    #[test]
    fn long_buffer_is_malformed() {
        let err = decode_telemetry(&[0u8; TELEMETRY_BYTES + 8]).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedFrame { .. }));
    }

    #[test]
    fn empty_buffer_is_malformed() {
        assert!(decode_telemetry(&[]).is_err());
    }

    #[test]
    fn negative_time_decodes_as_sentinel() {
        let frame = decode_telemetry(&frame_bytes(-1.0, [0.0; STATE_SIZE])).unwrap();
        assert!(frame.is_shutdown_sentinel());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn encoded_actuators_round_trip(values in prop::collection::vec(0.0f64..=1.0, 0..16)) {
                let buf = encode_actuators(&values);
                prop_assert_eq!(buf.len(), values.len() * 8);
                for (i, chunk) in buf.chunks_exact(8).enumerate() {
                    let decoded = f64::from_le_bytes(chunk.try_into().unwrap());
                    prop_assert_eq!(decoded, values[i]);
                }
            }

            #[test]
            fn decode_rejects_every_wrong_length(len in 0usize..512) {
                prop_assume!(len != TELEMETRY_BYTES);
                let buf = vec![0u8; len];
                prop_assert!(
                    matches!(
                        decode_telemetry(&buf),
                        Err(BridgeError::MalformedFrame { actual, .. }) if actual == len
                    ),
                    "expected MalformedFrame with actual == {}",
                    len
                );
            }

            #[test]
            fn decode_preserves_wire_values(
                time in -1000.0f64..1000.0,
                state in prop::array::uniform12(-100.0f64..100.0),
            ) {
                let frame = decode_telemetry(&frame_bytes(time, state)).unwrap();
                prop_assert_eq!(frame.time, time);
                prop_assert_eq!(frame.state, state);
            }
        }
    }
}
