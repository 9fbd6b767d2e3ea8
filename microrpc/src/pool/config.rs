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

//! Pool sizing configuration.

use std::time::Duration;

/// Connections dialed up front by [`Pool::warm_up`](crate::pool::Pool::warm_up).
pub const DEFAULT_POOL_INITIAL: usize = 5;

/// Most connections a pool keeps per address.
pub const DEFAULT_POOL_CAPACITY: usize = 20;

/// How long an idle connection stays reusable.
pub const DEFAULT_POOL_TTL: Duration = Duration::from_secs(60);

/// Default bound on a single dial.
pub const DEFAULT_DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Sizing and lifetime settings for a [`Pool`](crate::pool::Pool).
///
/// # Examples
///
/// ```rust
/// use microrpc::pool::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::default()
///     .with_capacity(4)
///     .with_ttl(Duration::from_secs(30));
/// assert_eq!(config.initial, 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Connections to dial when the pool is warmed up. Clamped to `capacity`.
    pub initial: usize,
    /// Upper bound on leased plus idle connections.
    pub capacity: usize,
    /// Idle connections older than this are closed instead of reused.
    pub ttl: Duration,
    /// Bound on a single dial. Zero means the dial is bounded only by the
    /// call's context.
    pub dial_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial: DEFAULT_POOL_INITIAL,
            capacity: DEFAULT_POOL_CAPACITY,
            ttl: DEFAULT_POOL_TTL,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
        }
    }
}

impl PoolConfig {
    /// Sets the number of connections dialed on warm up.
    pub fn with_initial(mut self, initial: usize) -> Self {
        self.initial = initial;
        self
    }

    /// Sets the capacity, lowering `initial` if it would exceed it.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self.initial = self.initial.min(capacity);
        self
    }

    /// Sets the idle time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the default dial timeout.
    pub fn with_dial_timeout(mut self, dial_timeout: Duration) -> Self {
        self.dial_timeout = dial_timeout;
        self
    }

    /// Checks that the settings describe a usable pool.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("pool capacity must be at least 1".to_string());
        }
        if self.initial > self.capacity {
            return Err(format!(
                "pool initial size {} exceeds capacity {}",
                self.initial, self.capacity
            ));
        }
        if self.ttl.is_zero() {
            return Err("pool ttl must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.initial, 5);
        assert_eq!(config.capacity, 20);
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_clamps_initial() {
        let config = PoolConfig::default().with_capacity(2);
        assert_eq!(config.initial, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        assert!(PoolConfig::default().with_capacity(0).validate().is_err());
        assert!(
            PoolConfig::default()
                .with_capacity(2)
                .with_initial(3)
                .validate()
                .is_err()
        );
        assert!(
            PoolConfig::default()
                .with_ttl(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}
