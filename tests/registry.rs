//! Counter registry behavior under concurrency: no lost updates for a
//! single device, independent counts across devices.

use device_listener::CounterRegistry;
use std::sync::Arc;
use tokio::task::JoinSet;

fn count_for(registry: &CounterRegistry, device_id: u16) -> Option<u64> {
    registry
        .snapshot()
        .into_iter()
        .find(|s| s.device_id == device_id)
        .map(|s| s.count)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_increments_for_one_device_lose_nothing() {
    let registry = Arc::new(CounterRegistry::new());
    let tasks_count = 8usize;
    let per_task = 1000u64;

    let mut tasks = JoinSet::new();
    for _ in 0..tasks_count {
        let registry = Arc::clone(&registry);
        tasks.spawn(async move {
            for _ in 0..per_task {
                registry.increment(5);
            }
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    assert_eq!(count_for(&registry, 5), Some(tasks_count as u64 * per_task));
    let stat = registry
        .snapshot()
        .into_iter()
        .find(|s| s.device_id == 5)
        .unwrap();
    assert!(!stat.overflowed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_increments_for_distinct_devices_stay_separate() {
    let registry = Arc::new(CounterRegistry::new());

    let mut tasks = JoinSet::new();
    for device_id in 0u16..16 {
        let registry = Arc::clone(&registry);
        tasks.spawn(async move {
            for _ in 0..u64::from(device_id) + 1 {
                registry.increment(device_id);
            }
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    assert_eq!(registry.len(), 16);
    for device_id in 0u16..16 {
        assert_eq!(
            count_for(&registry, device_id),
            Some(u64::from(device_id) + 1)
        );
    }
}

#[test]
fn sequential_counting_matches_message_count() {
    let registry = CounterRegistry::new();
    for _ in 0..1234 {
        registry.increment(1);
    }
    assert_eq!(count_for(&registry, 1), Some(1234));
    assert_eq!(count_for(&registry, 2), None);
}
