//! # Frame Codec
//!
//! Pure decoding functions for the two-layer device frame: the fixed 4-byte
//! outer header and the device-id field at the front of the payload.
//!
//! Nothing here touches a socket or shared state. The connection session
//! reads exact byte counts off the stream and hands complete buffers to
//! these functions, so every validation failure maps to `None` for exactly
//! one frame and the caller decides what to do with the connection.

use crate::config::{
    INNER_HEADER_LEN, MAX_PAYLOAD_LEN, MIN_PAYLOAD_LEN, OUTER_HEADER_LEN, PROTOCOL_VERSION,
};

/// Decoded outer header of a frame.
///
/// `length` announces the payload byte count that follows the header and is
/// carried big-endian on the wire. `reserved` is carried but never
/// interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterHeader {
    pub version: u8,
    pub reserved: u8,
    pub length: u16,
}

impl OuterHeader {
    /// Wire size of the outer header
    pub const WIRE_LEN: usize = OUTER_HEADER_LEN;

    /// Decode an outer header from its 4 wire bytes.
    ///
    /// Field-by-field decode at fixed offsets; never reinterprets the byte
    /// buffer as a packed struct.
    pub fn from_bytes(bytes: &[u8; OUTER_HEADER_LEN]) -> Self {
        Self {
            version: bytes[0],
            reserved: bytes[1],
            length: u16::from_be_bytes([bytes[2], bytes[3]]),
        }
    }

    /// Encode the header back to its 4 wire bytes.
    pub fn to_bytes(self) -> [u8; OUTER_HEADER_LEN] {
        let len = self.length.to_be_bytes();
        [self.version, self.reserved, len[0], len[1]]
    }

    /// Validate the header and return the announced payload length.
    ///
    /// Returns `Some(length)` when the version matches
    /// [`PROTOCOL_VERSION`] and the length falls inside
    /// `MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN`; `None` otherwise. The upper
    /// bound keeps a corrupt or hostile length field from forcing an
    /// unbounded buffer allocation, the lower bound guarantees the payload
    /// can hold the inner header.
    pub fn payload_len(&self) -> Option<usize> {
        if self.version != PROTOCOL_VERSION {
            return None;
        }
        let length = usize::from(self.length);
        if !(MIN_PAYLOAD_LEN..=MAX_PAYLOAD_LEN).contains(&length) {
            return None;
        }
        Some(length)
    }
}

/// Extract the device id from a fully-received payload buffer.
///
/// Returns `None` when the buffer is too short to contain the inner header.
/// Only the leading little-endian u16 is read; the remaining inner-header
/// fields (measurement tag, timestamp, measurement type, data length) are
/// deliberately untouched, counting valid messages is the only goal here.
pub fn device_id(payload: &[u8]) -> Option<u16> {
    if payload.len() < INNER_HEADER_LEN {
        return None;
    }
    Some(u16::from_le_bytes([payload[0], payload[1]]))
}
