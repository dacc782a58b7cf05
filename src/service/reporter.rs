//! # Statistics Reporter
//!
//! Joins registry snapshots with directory names and hands them to a
//! [`Reporter`]. The core never triggers reporting on its own; the binary
//! decides the schedule by driving [`run`] (or calling
//! [`snapshot_entries`] itself).

use crate::core::registry::CounterRegistry;
use crate::service::directory::DeviceDirectory;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// One row of a report: a registry stat joined with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub device_id: u16,
    pub name: String,
    pub count: u64,
    pub overflowed: bool,
}

/// Consumer of periodic snapshots.
pub trait Reporter: Send + Sync {
    fn on_snapshot(&self, entries: &[SnapshotEntry]);
}

/// Prints the statistics table to stdout in the listener's human-readable
/// form. Overflowed counters are prefixed with `>` to show the real total
/// exceeds the printed value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn on_snapshot(&self, entries: &[SnapshotEntry]) {
        println!("\x1b[32m-----------------------------------------------------");
        println!("Current statistics of received messages from devices:");
        println!("[device id] - [number of valid messages]");
        for entry in entries {
            println!(
                "{} - {}{}",
                entry.name,
                if entry.overflowed { ">" } else { "" },
                entry.count
            );
        }
        println!("-----------------------------------------------------\x1b[0m");
    }
}

/// Take a registry snapshot and resolve display names.
pub fn snapshot_entries(
    registry: &CounterRegistry,
    directory: &DeviceDirectory,
) -> Vec<SnapshotEntry> {
    registry
        .snapshot()
        .into_iter()
        .map(|stat| SnapshotEntry {
            device_id: stat.device_id,
            name: directory.name(stat.device_id).to_string(),
            count: stat.count,
            overflowed: stat.overflowed,
        })
        .collect()
}

/// Report on a fixed interval until the task is dropped.
pub async fn run<R: Reporter>(
    registry: std::sync::Arc<CounterRegistry>,
    directory: std::sync::Arc<DeviceDirectory>,
    reporter: R,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; swallow it so the first report
    // lands one full interval after startup.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        reporter.on_snapshot(&snapshot_entries(&registry, &directory));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_join_counts_with_names() {
        let registry = CounterRegistry::new();
        let directory = DeviceDirectory::parse("5:Thermometer\n");

        registry.increment(5);
        registry.increment(5);
        registry.increment(8);

        let entries = snapshot_entries(&registry, &directory);
        assert_eq!(entries.len(), 2);

        assert_eq!(entries[0].device_id, 5);
        assert_eq!(entries[0].name, "Thermometer");
        assert_eq!(entries[0].count, 2);
        assert!(!entries[0].overflowed);

        assert_eq!(entries[1].device_id, 8);
        assert_eq!(entries[1].name, "Unknown device");
        assert_eq!(entries[1].count, 1);
    }
}
