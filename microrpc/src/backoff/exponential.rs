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

//! Exponential backoff with optional jitter.

use crate::backoff::Backoff;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Grows the delay geometrically after every failed attempt.
///
/// The delay before retry `n + 1` is `base * factor^n`, capped at `cap`.
/// With jitter the wait is drawn from the upper half of that value, so
/// concurrent callers spread out without ever retrying back to back.
///
/// ```rust
/// use microrpc::backoff::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::new(Duration::from_millis(50))
///     .with_cap(Duration::from_secs(2))
///     .with_jitter(false);
/// # let _ = backoff;
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base: Duration,
    cap: Duration,
    factor: f64,
    jitter: bool,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl ExponentialBackoff {
    /// Starts at `base`, doubling up to 10 seconds, with jitter.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            cap: Duration::from_secs(10),
            factor: 2.0,
            jitter: true,
        }
    }

    pub fn with_cap(mut self, cap: Duration) -> Self {
        self.cap = cap;
        self
    }

    /// Growth per attempt. Values below 1 are treated as 1.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor.max(1.0);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    fn ceiling(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let scale = self.factor.powi(exp);
        let cap = self.cap.as_secs_f64();
        let secs = self.base.as_secs_f64() * scale;
        if !secs.is_finite() || secs >= cap {
            self.cap
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

#[async_trait]
impl Backoff for ExponentialBackoff {
    async fn next_delay(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        if !self.jitter || ceiling.is_zero() {
            return ceiling;
        }
        let half = ceiling / 2;
        half + half.mul_f64(rand::thread_rng().r#gen::<f64>())
    }

    fn name(&self) -> &str {
        "exponential"
    }
}
