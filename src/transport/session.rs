//! # Connection Session
//!
//! The per-connection read loop: outer header, then payload, repeated until
//! the peer disconnects or the transport fails.
//!
//! Every read requests an exact byte count, so the frame codec only ever
//! sees complete buffers; partial-frame reassembly stays down in the
//! transport where TCP already guarantees ordered delivery. Within one
//! connection frames are processed strictly in arrival order.

use crate::core::frame::{self, OuterHeader};
use crate::core::registry::CounterRegistry;
use crate::utils::metrics::Metrics;
use bytes::BytesMut;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, instrument, warn};

/// Drive one connection until it closes or fails.
///
/// A header that fails validation is logged and skipped; the loop keeps
/// reading from the current stream position without any resynchronization
/// attempt. If the peer's own framing is corrupt this can desync the rest
/// of the stream, but there is no delimiter to hunt for, so closing would
/// not recover anything either.
#[instrument(skip(stream, registry, metrics), fields(peer = %peer))]
pub async fn run(
    mut stream: TcpStream,
    peer: SocketAddr,
    registry: Arc<CounterRegistry>,
    metrics: Arc<Metrics>,
) {
    let mut header_buf = [0u8; OuterHeader::WIRE_LEN];
    let mut payload = BytesMut::new();

    loop {
        match stream.read_exact(&mut header_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                debug!("Peer closed the connection");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Header read failed");
                metrics.connection_error();
                return;
            }
        }

        let header = OuterHeader::from_bytes(&header_buf);
        let Some(length) = header.payload_len() else {
            warn!(
                version = header.version,
                length = header.length,
                "Invalid header, skipping frame"
            );
            metrics.header_violation();
            continue;
        };

        payload.resize(length, 0);
        if let Err(e) = stream.read_exact(&mut payload).await {
            warn!(error = %e, expected = length, "Payload read failed");
            metrics.connection_error();
            return;
        }

        match frame::device_id(&payload) {
            Some(device_id) => {
                registry.increment(device_id);
                metrics.frame_received(length as u64);
            }
            None => {
                // Unreachable while MIN_PAYLOAD_LEN covers the inner
                // header, but the codec contract allows it.
                warn!(length, "Payload too short for inner header");
                metrics.payload_violation();
            }
        }
    }
}
