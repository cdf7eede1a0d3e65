//! Per-client, per-endpoint request throttle.
//!
//! Each `(client, endpoint)` key owns a bucket holding `capacity` tokens.
//! Refill is a hard reset: once more than one window has passed since the
//! last reset the bucket goes straight back to full capacity. Consumption is
//! a compare-and-swap loop; only the reset takes a lock, and it re-checks the
//! timestamp under the lock so exactly one caller performs it.
//!
//! A bucket idle for more than a window holds nothing a fresh bucket would
//! not, so at most once per window the limiter drops all such buckets.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::error::{CoreError, CoreResult};

/// Bucket key: client identifier plus endpoint path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub client: String,
    pub endpoint: String,
}

impl BucketKey {
    pub fn new(client: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            endpoint: endpoint.into(),
        }
    }
}

struct Bucket {
    tokens: AtomicU32,
    /// Nanoseconds since the limiter's origin at the last reset.
    last_reset_nanos: AtomicU64,
    reset_guard: Mutex<()>,
}

impl Bucket {
    fn full(capacity: u32, now_nanos: u64) -> Self {
        Self {
            tokens: AtomicU32::new(capacity),
            last_reset_nanos: AtomicU64::new(now_nanos),
            reset_guard: Mutex::new(()),
        }
    }

    fn refill_if_needed(&self, capacity: u32, window_nanos: u64, now_nanos: u64) {
        let last = self.last_reset_nanos.load(Ordering::Acquire);
        if now_nanos.saturating_sub(last) <= window_nanos {
            return;
        }
        // A poisoned guard only means another resetter panicked; the atomics are still sound.
        let _guard = self
            .reset_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let last = self.last_reset_nanos.load(Ordering::Acquire);
        if now_nanos.saturating_sub(last) > window_nanos {
            self.tokens.store(capacity, Ordering::Release);
            self.last_reset_nanos.store(now_nanos, Ordering::Release);
        }
    }

    fn try_take(&self) -> bool {
        let mut current = self.tokens.load(Ordering::Acquire);
        while current > 0 {
            match self.tokens.compare_exchange_weak(
                current,
                current - 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
        false
    }
}

/// In-process request throttle. Buckets live for the lifetime of the limiter.
pub struct RateLimiter {
    buckets: DashMap<BucketKey, Arc<Bucket>>,
    capacity: u32,
    window: Duration,
    origin: Instant,
    /// Nanoseconds since origin of the last idle-bucket sweep.
    last_sweep_nanos: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_limits(config.capacity, config.window())
    }

    pub fn with_limits(capacity: u32, window: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            window,
            origin: Instant::now(),
            last_sweep_nanos: AtomicU64::new(0),
        }
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Take one token for `key`. Returns `false` when the bucket is empty.
    pub fn try_consume(&self, key: &BucketKey) -> bool {
        self.try_consume_at(key, Instant::now())
    }

    /// [`try_consume`](Self::try_consume) evaluated at an explicit instant.
    pub fn try_consume_at(&self, key: &BucketKey, now: Instant) -> bool {
        let now_nanos = self.nanos_since_origin(now);
        let window_nanos = self.window.as_nanos() as u64;
        self.sweep_idle(window_nanos, now_nanos);

        let bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Bucket::full(self.capacity, now_nanos)))
            .clone();

        bucket.refill_if_needed(self.capacity, window_nanos, now_nanos);
        bucket.try_take()
    }

    /// Drop buckets whose last reset is over a window old and that no caller
    /// currently holds. Runs at most once per window; the winner of the
    /// compare-and-swap does the work.
    fn sweep_idle(&self, window_nanos: u64, now_nanos: u64) {
        let last = self.last_sweep_nanos.load(Ordering::Acquire);
        if now_nanos.saturating_sub(last) <= window_nanos {
            return;
        }
        if self
            .last_sweep_nanos
            .compare_exchange(last, now_nanos, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            let idle = now_nanos.saturating_sub(bucket.last_reset_nanos.load(Ordering::Acquire))
                > window_nanos;
            !(idle && Arc::strong_count(bucket) == 1)
        });
        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            debug!(removed, remaining = self.buckets.len(), "idle rate-limit buckets dropped");
        }
    }

    /// Like [`try_consume`](Self::try_consume) but fails with `RATE_LIMIT_EXCEEDED`.
    pub fn check(&self, key: &BucketKey) -> CoreResult<()> {
        if self.try_consume(key) {
            Ok(())
        } else {
            warn!(endpoint = %key.endpoint, "rate limit exceeded");
            Err(CoreError::RateLimitExceeded)
        }
    }

    fn nanos_since_origin(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.origin).as_nanos() as u64
    }
}
