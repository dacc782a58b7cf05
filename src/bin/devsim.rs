//! Randomized device traffic simulator.
//!
//! Connects to a running listener and streams frames for one device id:
//! a valid outer header, the 12-byte inner header, and 0..64 random filler
//! bytes, paced by an intensity multiplier.

use clap::Parser;
use device_listener::config::{INNER_HEADER_LEN, PROTOCOL_VERSION};
use device_listener::OuterHeader;
use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

const MAX_EXTRA_PAYLOAD: usize = 64;

/// Randomized device traffic simulator for the device listener.
#[derive(Parser, Debug)]
#[command(name = "devsim", version)]
struct Args {
    /// Listener address, e.g. 127.0.0.1:5555
    server: String,

    /// Device id to report in every frame
    device_id: u16,

    /// Pacing intensity multiplier (higher sends faster)
    #[arg(default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=100))]
    intensity: u8,
}

fn build_frame(device_id: u16, extra: usize, timestamp: u32) -> Vec<u8> {
    let length = (INNER_HEADER_LEN + extra) as u16;
    let header = OuterHeader {
        version: PROTOCOL_VERSION,
        reserved: 0,
        length,
    };

    let mut frame = Vec::with_capacity(OuterHeader::WIRE_LEN + usize::from(length));
    frame.extend_from_slice(&header.to_bytes());
    frame.extend_from_slice(&device_id.to_le_bytes());
    frame.extend_from_slice(&0u16.to_be_bytes()); // measurementTag
    frame.extend_from_slice(&timestamp.to_be_bytes());
    frame.extend_from_slice(&0u16.to_be_bytes()); // measurementType
    frame.extend_from_slice(&(extra as u16).to_be_bytes()); // dataLength
    frame.resize(OuterHeader::WIRE_LEN + INNER_HEADER_LEN + extra, 0);
    frame
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let mut stream = TcpStream::connect(&args.server).await?;
    println!(
        "Connected to {}, starting sending, deviceId is {}...",
        args.server, args.device_id
    );

    let mut rng = rand::rng();
    loop {
        let extra = rng.random_range(0..MAX_EXTRA_PAYLOAD);
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        let frame = build_frame(args.device_id, extra, timestamp);
        stream.write_all(&frame).await?;

        let micros = rng.random_range(0..10_000u64) * 100 / u64::from(args.intensity);
        tokio::time::sleep(Duration::from_micros(micros)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_listener::core::frame;

    #[test]
    fn built_frames_pass_listener_validation() {
        let bytes = build_frame(42, 10, 1_700_000_000);
        assert_eq!(bytes.len(), OuterHeader::WIRE_LEN + INNER_HEADER_LEN + 10);

        let mut header_buf = [0u8; OuterHeader::WIRE_LEN];
        header_buf.copy_from_slice(&bytes[..OuterHeader::WIRE_LEN]);
        let header = OuterHeader::from_bytes(&header_buf);

        let length = header.payload_len().expect("valid header");
        assert_eq!(length, INNER_HEADER_LEN + 10);
        assert_eq!(
            frame::device_id(&bytes[OuterHeader::WIRE_LEN..]),
            Some(42)
        );
    }
}
