//! # Counter Registry
//!
//! Concurrency-safe per-device message counters.
//!
//! Every connection session shares one registry instance and funnels all
//! mutation through [`CounterRegistry::increment`]. Records are created
//! lazily on the first valid message from a device id and live until the
//! process exits. Counts saturate at `u64::MAX`; once a record hits the
//! ceiling a sticky overflow flag is raised instead of wrapping.
//!
//! Uses atomic counters per record, so concurrent increments for the same
//! device never lose updates and the reporting snapshot never blocks
//! writers for long.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Per-device counter state.
#[derive(Debug, Default)]
struct DeviceRecord {
    /// Valid messages seen from this device, saturating
    count: AtomicU64,
    /// Set once an increment was attempted at `count == u64::MAX`; never
    /// cleared afterwards
    overflowed: AtomicBool,
}

impl DeviceRecord {
    /// Saturating increment: bump the count, or raise the sticky overflow
    /// flag once the ceiling is reached. A single indivisible step with
    /// respect to other increments on the same record.
    fn increment(&self) {
        let result = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| c.checked_add(1));
        if result.is_err() {
            self.overflowed.store(true, Ordering::Release);
        }
    }
}

/// One entry of a registry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceStat {
    pub device_id: u16,
    pub count: u64,
    pub overflowed: bool,
}

/// Registry of saturating message counters, one record per device id.
///
/// Explicitly constructed and shared via `Arc`; there is no process-wide
/// singleton, which keeps unit tests isolated from each other.
#[derive(Debug, Default)]
pub struct CounterRegistry {
    records: RwLock<HashMap<u16, Arc<DeviceRecord>>>,
}

impl CounterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one valid message from `device_id`, creating the record on
    /// first sight. Safe to call concurrently from any number of sessions
    /// for the same or different ids.
    pub fn increment(&self, device_id: u16) {
        self.record(device_id).increment();
    }

    /// Fetch or lazily create the record for a device id.
    ///
    /// Fast path is a read lock; the write lock is only taken the first
    /// time an id is seen. Poisoned locks are recovered rather than
    /// propagated, a panicked session must not disable counting for the
    /// rest of the process.
    fn record(&self, device_id: u16) -> Arc<DeviceRecord> {
        {
            let records = self.records.read().unwrap_or_else(|e| e.into_inner());
            if let Some(record) = records.get(&device_id) {
                return Arc::clone(record);
            }
        }

        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(records.entry(device_id).or_default())
    }

    /// Point-in-time view of all counters for reporting, sorted by device
    /// id.
    ///
    /// Weakly consistent: increments running concurrently with the walk may
    /// or may not be included, but every entry reflects a value the counter
    /// actually held during the call.
    pub fn snapshot(&self) -> Vec<DeviceStat> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        let mut stats: Vec<DeviceStat> = records
            .iter()
            .map(|(&device_id, record)| DeviceStat {
                device_id,
                count: record.count.load(Ordering::Acquire),
                overflowed: record.overflowed.load(Ordering::Acquire),
            })
            .collect();
        stats.sort_unstable_by_key(|s| s.device_id);
        stats
    }

    /// Number of distinct device ids seen so far.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// True when no device has been counted yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat_for(registry: &CounterRegistry, device_id: u16) -> Option<DeviceStat> {
        registry
            .snapshot()
            .into_iter()
            .find(|s| s.device_id == device_id)
    }

    #[test]
    fn empty_registry_has_no_records() {
        let registry = CounterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn increment_creates_record_lazily() {
        let registry = CounterRegistry::new();
        registry.increment(7);

        let stat = stat_for(&registry, 7).expect("record for device 7");
        assert_eq!(stat.count, 1);
        assert!(!stat.overflowed);
        assert_eq!(stat_for(&registry, 5), None);
    }

    #[test]
    fn repeated_increments_accumulate() {
        let registry = CounterRegistry::new();
        for _ in 0..1000 {
            registry.increment(3);
        }
        registry.increment(9);

        let stat = stat_for(&registry, 3).expect("record for device 3");
        assert_eq!(stat.count, 1000);
        assert!(!stat.overflowed);
        assert_eq!(stat_for(&registry, 9).map(|s| s.count), Some(1));
    }

    #[test]
    fn increment_saturates_at_max_and_sets_sticky_flag() {
        let registry = CounterRegistry::new();

        // Pin the counter just under the ceiling to make the saturation
        // path reachable in a test.
        let record = registry.record(1);
        record.count.store(u64::MAX - 1, Ordering::Release);

        registry.increment(1);
        let stat = stat_for(&registry, 1).expect("record for device 1");
        assert_eq!(stat.count, u64::MAX);
        assert!(!stat.overflowed);

        registry.increment(1);
        let stat = stat_for(&registry, 1).expect("record for device 1");
        assert_eq!(stat.count, u64::MAX);
        assert!(stat.overflowed);

        // Idempotent at the ceiling.
        registry.increment(1);
        let stat = stat_for(&registry, 1).expect("record for device 1");
        assert_eq!(stat.count, u64::MAX);
        assert!(stat.overflowed);
    }

    #[test]
    fn snapshot_is_sorted_by_device_id() {
        let registry = CounterRegistry::new();
        registry.increment(300);
        registry.increment(2);
        registry.increment(40);

        let ids: Vec<u16> = registry.snapshot().iter().map(|s| s.device_id).collect();
        assert_eq!(ids, vec![2, 40, 300]);
    }
}
