// Delta tracking for per-second rates.
// The two trackers here are the only mutable cross-request state in the
// process; both are guarded by a single coarse lock each.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

/// Round to one decimal place.
pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Round to two decimal places.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Maps an arbitrary string key to its last observed counter value and
/// observation time (monotonic). `update` returns the per-second rate of
/// change between consecutive observations of the same key.
///
/// The first observation of a key returns 0.0. A negative delta (counter
/// reset or wraparound) is passed through unclamped; callers clamp where a
/// field demands it.
pub struct RateTracker {
    inner: Mutex<HashMap<String, (u64, Instant)>>,
}

impl RateTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Record `value` for `key` and return the rate since the previous
    /// observation, or 0.0 on the first one.
    pub fn update(&self, key: &str, value: u64) -> f64 {
        self.update_at(key, value, Instant::now())
    }

    fn update_at(&self, key: &str, value: u64, now: Instant) -> f64 {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match map.insert(key.to_owned(), (value, now)) {
            Some((prev_value, prev_time)) => {
                let time_delta = now.duration_since(prev_time).as_secs_f64();
                if time_delta > 0.0 {
                    (value as f64 - prev_value as f64) / time_delta
                } else {
                    // Same clock tick: stored value/time still advance.
                    0.0
                }
            }
            None => 0.0,
        }
    }

    /// Whether `key` has been observed at least once.
    pub fn contains(&self, key: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-core idle/total tick tracking. Unlike [`RateTracker`] the input is a
/// pair of coupled counters and the output is a usage ratio, not a rate, so
/// the two do not share an implementation.
pub struct CoreUsageTracker {
    inner: Mutex<HashMap<u32, (u64, u64)>>,
}

impl CoreUsageTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Record the latest (idle, total) tick counts for a core and return its
    /// usage percentage since the previous observation, rounded to one
    /// decimal. First observation returns 0.0. Not pre-clamped.
    pub fn update(&self, core_id: u32, idle_ticks: u64, total_ticks: u64) -> f64 {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match map.insert(core_id, (idle_ticks, total_ticks)) {
            Some((prev_idle, prev_total)) => {
                let idle_delta = idle_ticks as f64 - prev_idle as f64;
                let total_delta = total_ticks as f64 - prev_total as f64;
                if total_delta > 0.0 {
                    round1((1.0 - idle_delta / total_delta) * 100.0)
                } else {
                    0.0
                }
            }
            None => 0.0,
        }
    }
}

impl Default for CoreUsageTracker {
    fn default() -> Self {
        Self::new()
    }
}
