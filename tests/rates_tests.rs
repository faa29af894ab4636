// RateTracker / CoreUsageTracker behavior through the public API

use hostagent::rates::{CoreUsageTracker, RateTracker};
use std::time::Duration;

#[test]
fn first_observation_is_zero_and_key_becomes_known() {
    let tracker = RateTracker::new();
    assert!(!tracker.contains("cpu_idle"));
    assert_eq!(tracker.update("cpu_idle", 12345), 0.0);
    assert!(tracker.contains("cpu_idle"));
}

#[test]
fn rate_matches_delta_over_elapsed_time() {
    let tracker = RateTracker::new();
    tracker.update("bytes", 1_000);
    std::thread::sleep(Duration::from_millis(100));
    let rate = tracker.update("bytes", 2_000);
    // 1000 over ~0.1s: allow generous scheduling slack.
    assert!(rate > 2_000.0, "rate was {rate}");
    assert!(rate < 11_000.0, "rate was {rate}");
}

#[test]
fn counter_reset_yields_negative_rate() {
    let tracker = RateTracker::new();
    tracker.update("resets", 5_000);
    std::thread::sleep(Duration::from_millis(20));
    assert!(tracker.update("resets", 100) < 0.0);
}

#[test]
fn concurrent_updates_to_disjoint_keys_do_not_interfere() {
    let tracker = RateTracker::new();
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let tracker = &tracker;
            scope.spawn(move || {
                let key = format!("worker_{worker}");
                for i in 0..1_000u64 {
                    tracker.update(&key, i * (worker + 1));
                }
            });
        }
    });
    for worker in 0..8u64 {
        let key = format!("worker_{worker}");
        assert!(tracker.contains(&key));
        // Final stored value is the last write; the next delta proves it.
        std::thread::sleep(Duration::from_millis(2));
        let rate = tracker.update(&key, 999 * (worker + 1));
        assert!(
            rate.abs() < f64::EPSILON,
            "stored pair for {key} was torn: rate {rate}"
        );
    }
}

#[test]
fn core_usage_sequence() {
    let cores = CoreUsageTracker::new();
    assert_eq!(cores.update(0, 100, 200), 0.0);
    assert_eq!(cores.update(0, 150, 300), 50.0);
}

#[test]
fn cores_are_tracked_independently() {
    let cores = CoreUsageTracker::new();
    cores.update(0, 0, 0);
    cores.update(1, 0, 0);
    assert_eq!(cores.update(0, 10, 100), 90.0);
    assert_eq!(cores.update(1, 100, 100), 0.0);
}
