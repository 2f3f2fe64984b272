//! C2 — sliding-window monitor: a bounded ring buffer of numeric
//! observations with memoized mean/stddev/min/max.

use std::sync::{Arc, Mutex};

/// Thread-safe handle to a sliding-window monitor. Cheap to clone (an
/// `Arc`); shared by reference between the application's measurement code
/// and the knowledge adaptor.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<Mutex<MonitorInner>>,
}

struct MonitorInner {
    capacity: usize,
    buffer: Vec<f64>,
    /// Index the next `push` will overwrite.
    write_pos: usize,
    len: usize,
    /// Logical timestamp of the last mutation. Incremented on `push` and
    /// `clear`; statistics are memoized against this value.
    version: u64,
    cache: StatsCache,
}

#[derive(Default, Clone, Copy)]
struct StatsCache {
    version: Option<u64>,
    mean: f64,
    stddev: f64,
    min: f64,
    max: f64,
}

impl Monitor {
    /// Create a monitor with the given window size. `window` must be
    /// non-zero — a zero-capacity monitor can never hold an observation.
    pub fn new(window: usize) -> Self {
        debug_assert!(window > 0, "monitor window size must be non-zero");
        Self {
            inner: Arc::new(Mutex::new(MonitorInner {
                capacity: window.max(1),
                buffer: Vec::with_capacity(window.max(1)),
                write_pos: 0,
                len: 0,
                version: 0,
                cache: StatsCache::default(),
            })),
        }
    }

    /// Push a new observation. The oldest observation is overwritten once
    /// the window is full.
    pub fn push(&self, value: f64) {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.buffer.len() < inner.capacity {
            inner.buffer.push(value);
        } else {
            inner.buffer[inner.write_pos] = value;
        }
        inner.write_pos = (inner.write_pos + 1) % inner.capacity;
        inner.len = inner.buffer.len();
        inner.version += 1;
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        inner.buffer.clear();
        inner.write_pos = 0;
        inner.len = 0;
        inner.version += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().expect("monitor mutex poisoned").len == 0
    }

    pub fn is_full(&self) -> bool {
        let inner = self.inner.lock().expect("monitor mutex poisoned");
        inner.len == inner.capacity
    }

    /// The most recently pushed observation, if any.
    pub fn last(&self) -> Option<f64> {
        let inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.len == 0 {
            return None;
        }
        let last_idx = (inner.write_pos + inner.capacity - 1) % inner.capacity;
        Some(inner.buffer[last_idx])
    }

    pub fn mean(&self) -> Option<f64> {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.len == 0 {
            return None;
        }
        Self::recompute_if_stale(&mut inner);
        Some(inner.cache.mean)
    }

    pub fn stddev(&self) -> Option<f64> {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.len == 0 {
            return None;
        }
        Self::recompute_if_stale(&mut inner);
        Some(inner.cache.stddev)
    }

    pub fn min(&self) -> Option<f64> {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.len == 0 {
            return None;
        }
        Self::recompute_if_stale(&mut inner);
        Some(inner.cache.min)
    }

    pub fn max(&self) -> Option<f64> {
        let mut inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.len == 0 {
            return None;
        }
        Self::recompute_if_stale(&mut inner);
        Some(inner.cache.max)
    }

    /// A snapshot of the currently buffered observations, oldest first.
    pub fn get_shared_buffer(&self) -> Vec<f64> {
        let inner = self.inner.lock().expect("monitor mutex poisoned");
        if inner.len < inner.capacity {
            inner.buffer.clone()
        } else {
            let mut out = Vec::with_capacity(inner.len);
            out.extend_from_slice(&inner.buffer[inner.write_pos..]);
            out.extend_from_slice(&inner.buffer[..inner.write_pos]);
            out
        }
    }

    fn recompute_if_stale(inner: &mut MonitorInner) {
        if inner.cache.version == Some(inner.version) {
            return;
        }
        let n = inner.buffer.len() as f64;
        let sum: f64 = inner.buffer.iter().sum();
        let mean = sum / n;
        let variance = inner.buffer.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = inner.buffer.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = inner
            .buffer
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);
        inner.cache = StatsCache {
            version: Some(inner.version),
            mean,
            stddev: variance.sqrt(),
            min,
            max,
        };
    }
}
