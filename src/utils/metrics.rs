//! Observability counters
//!
//! Process-wide counters for monitoring listener health. Uses atomic
//! counters so sessions never contend on a lock to record an event.
//!
//! These are aggregates across all peers; the per-device message counts
//! live in the counter registry, not here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::info;

/// Counters for listener-wide events.
#[derive(Debug)]
pub struct Metrics {
    /// Total connections accepted
    pub connections_total: AtomicU64,
    /// Currently active connections
    pub connections_active: AtomicU64,
    /// Valid frames counted into the registry
    pub frames_valid: AtomicU64,
    /// Payload bytes carried by valid frames
    pub payload_bytes: AtomicU64,
    /// Frames dropped for an invalid outer header
    pub header_violations: AtomicU64,
    /// Frames dropped for a payload too short to carry the inner header
    pub payload_violations: AtomicU64,
    /// Connections torn down by a transport error
    pub connection_errors: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            connections_total: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            frames_valid: AtomicU64::new(0),
            payload_bytes: AtomicU64::new(0),
            header_violations: AtomicU64::new(0),
            payload_violations: AtomicU64::new(0),
            connection_errors: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a new connection
    pub fn connection_established(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection closed
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Currently active connections
    pub fn connections_active(&self) -> u64 {
        self.connections_active.load(Ordering::Relaxed)
    }

    /// Record a valid counted frame and its payload size
    pub fn frame_received(&self, payload_bytes: u64) {
        self.frames_valid.fetch_add(1, Ordering::Relaxed);
        self.payload_bytes.fetch_add(payload_bytes, Ordering::Relaxed);
    }

    /// Record a frame dropped for an invalid outer header
    pub fn header_violation(&self) {
        self.header_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame dropped for an undersized payload
    pub fn payload_violation(&self) {
        self.payload_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a connection torn down by a transport error
    pub fn connection_error(&self) {
        self.connection_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the collector was created
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log a summary of all counters at info level
    pub fn log_summary(&self) {
        info!(
            uptime_secs = self.uptime().as_secs(),
            connections_total = self.connections_total.load(Ordering::Relaxed),
            connections_active = self.connections_active.load(Ordering::Relaxed),
            frames_valid = self.frames_valid.load(Ordering::Relaxed),
            payload_bytes = self.payload_bytes.load(Ordering::Relaxed),
            header_violations = self.header_violations.load(Ordering::Relaxed),
            payload_violations = self.payload_violations.load(Ordering::Relaxed),
            connection_errors = self.connection_errors.load(Ordering::Relaxed),
            "Listener metrics summary"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
