//! Encoding and validation of the 9-byte frames exchanged with the sensor.
//!
//! Command frames are laid out as `FF 01 op p0 p1 p2 p3 p4 cs` and replies
//! as `FF op d0 d1 d2 d3 d4 d5 cs`. In both directions the checksum covers
//! bytes 1 to 7: it is the two's complement of their sum modulo 256.

use crate::{Error, ADDRESS, FRAME_LEN, HEAD, PAYLOAD_LEN};

/// A complete frame, as written to or read from the serial link.
pub type Frame = [u8; FRAME_LEN];

/// The opcode-specific bytes of a frame.
pub type Payload = [u8; PAYLOAD_LEN];

/// Commands understood by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Read the CO2 concentration.
    ReadMeasurement = 0x86,
    /// Set the upper bound of the detection range.
    SetRange = 0x99,
    /// Enable or disable automatic baseline correction.
    SetAutocalibration = 0x79,
}

impl Opcode {
    /// Returns the wire value of the opcode.
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Maps a wire value back to an opcode, if it is one this driver speaks.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        match byte {
            0x86 => Some(Opcode::ReadMeasurement),
            0x99 => Some(Opcode::SetRange),
            0x79 => Some(Opcode::SetAutocalibration),
            _ => None,
        }
    }
}

/// Computes the checksum of `span`: `(255 - sum % 256 + 1) % 256`.
///
/// Callers pass bytes 1 to 7 of a frame, i.e. everything between the header
/// and the checksum byte itself.
pub fn checksum(span: &[u8]) -> u8 {
    let sum = span.iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
    (0xFF - sum).wrapping_add(1)
}

/// Builds a command frame for `opcode` carrying `payload`.
pub fn encode_command(opcode: Opcode, payload: Payload) -> Frame {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = HEAD;
    frame[1] = ADDRESS;
    frame[2] = opcode.byte();
    frame[3..8].copy_from_slice(&payload);
    frame[8] = checksum(&frame[1..8]);
    frame
}

/// Builds the reply the sensor would send for `opcode`.
///
/// The byte after the payload is left zero. Useful for simulating a sensor
/// on the other end of a transport.
pub fn encode_response(opcode: Opcode, payload: Payload) -> Frame {
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = HEAD;
    frame[1] = opcode.byte();
    frame[2..7].copy_from_slice(&payload);
    frame[8] = checksum(&frame[1..8]);
    frame
}

/// Validates a reply to a command sent with `expected`.
///
/// # Returns
///
/// * `Ok(Payload)` holding bytes 2 to 6 of the frame.
/// * `Err(Error::BadResponse)` if the header, the echoed opcode or the checksum is wrong.
pub fn validate_frame(frame: &Frame, expected: Opcode) -> Result<Payload, Error> {
    let crc = checksum(&frame[1..8]);
    if frame[0] != HEAD || frame[1] != expected.byte() || frame[8] != crc {
        log::debug!(
            "Rejected reply to {:?}: computed checksum {:02X}, frame {:02X?}",
            expected,
            crc,
            frame
        );
        return Err(Error::BadResponse);
    }

    let mut payload = [0u8; PAYLOAD_LEN];
    payload.copy_from_slice(&frame[2..7]);
    Ok(payload)
}
