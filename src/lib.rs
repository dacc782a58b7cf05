//! # Device Listener
//!
//! TCP listener that counts framed messages per field device.
//!
//! Field devices connect over TCP and stream two-layer length-prefixed
//! frames. The listener validates each frame's outer header, extracts the
//! device identifier from the payload, and keeps a live saturating count of
//! valid messages per device for periodic console reporting. Payload content
//! beyond the identifier is never interpreted or stored.
//!
//! ## Components
//! - **Frame codec** ([`core::frame`]): outer-header validation and
//!   device-id extraction, pure and stateless.
//! - **Counter registry** ([`core::registry`]): concurrency-safe saturating
//!   per-device counters shared by every connection.
//! - **Transport** ([`transport`]): the accept loop and the per-connection
//!   read session driving the codec.
//! - **Services** ([`service`]): the device-name directory and the snapshot
//!   reporter.
//!
//! ## Error Philosophy
//! A malformed frame is a protocol violation: logged, counted, and skipped
//! while the connection stays open. A transport failure closes that one
//! connection. Nothing a single peer does is fatal to the process.

pub mod config;
pub mod core;
pub mod error;
pub mod service;
pub mod transport;
pub mod utils;

pub use crate::core::frame::OuterHeader;
pub use crate::core::registry::{CounterRegistry, DeviceStat};
pub use crate::error::{ListenerError, Result};
pub use crate::service::directory::DeviceDirectory;
pub use crate::transport::server::DeviceServer;
pub use crate::utils::metrics::Metrics;
