//! # Core Components
//!
//! Frame decoding and the shared message counters.
//!
//! ## Wire Format
//! ```text
//! [Version(1)] [Reserved(1)] [Length(2, BE)] [Payload(Length)]
//! ```
//! The payload begins with a 12-byte inner header of which only the leading
//! little-endian device id is read; everything after it is opaque.
//!
//! ## Security
//! - Announced payload length is validated before any allocation
//! - Header fields are decoded byte-by-byte, never via struct overlays

pub mod frame;
pub mod registry;
