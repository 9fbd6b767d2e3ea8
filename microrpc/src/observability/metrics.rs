//
// Copyright 2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Counters for pools and calls.
//!
//! Every counter is an atomic that can be read back at any time. With the
//! `observability` feature enabled each update is also forwarded to the
//! `metrics` facade, so any installed recorder (Prometheus, StatsD, ...)
//! sees the same numbers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Connection pool counters.
#[derive(Debug, Default)]
pub struct PoolMetrics {
    dials: AtomicU64,
    dial_failures: AtomicU64,
    reuses: AtomicU64,
    waits: AtomicU64,
    exhausted: AtomicU64,
    evictions: AtomicU64,
    discards: AtomicU64,
    releases: AtomicU64,
}

impl PoolMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_dial(&self) {
        self.dials.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("microrpc.pool.dials").increment(1);
            metrics::gauge!("microrpc.pool.connections").increment(1.0);
        }
    }

    pub fn record_dial_failure(&self) {
        self.dial_failures.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.pool.dial_failures").increment(1);
    }

    pub fn record_reuse(&self) {
        self.reuses.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.pool.reuses").increment(1);
    }

    pub fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.pool.waits").increment(1);
    }

    pub fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.pool.exhausted").increment(1);
    }

    /// An idle connection outlived its TTL.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.pool.evictions").increment(1);
    }

    /// A connection left the pool for good, for any reason.
    pub fn record_discard(&self) {
        self.discards.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("microrpc.pool.discards").increment(1);
            metrics::gauge!("microrpc.pool.connections").decrement(1.0);
        }
    }

    pub fn record_release(&self) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.pool.releases").increment(1);
    }

    #[must_use]
    pub fn total_dials(&self) -> u64 {
        self.dials.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_dial_failures(&self) -> u64 {
        self.dial_failures.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_reuses(&self) -> u64 {
        self.reuses.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_waits(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_exhausted(&self) -> u64 {
        self.exhausted.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_discards(&self) -> u64 {
        self.discards.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_releases(&self) -> u64 {
        self.releases.load(Ordering::Relaxed)
    }
}

/// Call controller counters.
#[derive(Debug, Default)]
pub struct CallMetrics {
    calls: AtomicU64,
    attempts: AtomicU64,
    retries: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    deadlines: AtomicU64,
    cancellations: AtomicU64,
    total_latency_us: AtomicU64,
}

impl CallMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.call.started").increment(1);
    }

    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.call.attempts").increment(1);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.call.retries").increment(1);
    }

    pub fn record_success(&self, latency: Duration) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        let us = latency.as_micros() as u64;
        self.total_latency_us.fetch_add(us, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        {
            metrics::counter!("microrpc.call.succeeded").increment(1);
            metrics::histogram!("microrpc.call.latency.us").record(us as f64);
        }
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.call.failed").increment(1);
    }

    pub fn record_deadline(&self) {
        self.deadlines.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.call.deadline_exceeded").increment(1);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "observability")]
        metrics::counter!("microrpc.call.cancelled").increment(1);
    }

    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_deadlines(&self) -> u64 {
        self.deadlines.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total_cancellations(&self) -> u64 {
        self.cancellations.load(Ordering::Relaxed)
    }

    /// Mean latency of successful calls.
    #[must_use]
    pub fn average_latency(&self) -> Option<Duration> {
        let count = self.successes.load(Ordering::Relaxed);
        if count == 0 {
            return None;
        }
        let total = self.total_latency_us.load(Ordering::Relaxed);
        Some(Duration::from_micros(total / count))
    }
}
