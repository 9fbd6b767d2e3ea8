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

//! Observability support.
//!
//! The client reports what it is doing in two ways:
//!
//! - **Logs and spans** through `tracing`: dials, evictions, failed attempts
//!   and final call errors.
//! - **Counters** through [`PoolMetrics`] and [`CallMetrics`]. They are
//!   always available as atomics and, with the `observability` feature, are
//!   mirrored into the `metrics` facade.
//!
//! Both are compiled in with the default `observability` feature. Disabling
//! it removes every log statement and leaves only the atomic counters.
//!
//! # Logging setup
//!
//! The crate never installs a subscriber. Applications pick one:
//!
//! ```rust,no_run
//! use tracing_subscriber::EnvFilter;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(EnvFilter::new("microrpc=debug"))
//!     .init();
//! ```
//!
//! # Reading counters
//!
//! ```rust
//! use microrpc::observability::PoolMetrics;
//!
//! let metrics = PoolMetrics::new();
//! metrics.record_dial();
//! metrics.record_reuse();
//! assert_eq!(metrics.total_dials(), 1);
//! assert_eq!(metrics.total_reuses(), 1);
//! ```

mod metrics;

pub use self::metrics::{CallMetrics, PoolMetrics};

use crate::CallError;

/// Logs a failed call with structured context.
///
/// Context errors (deadline, cancellation) and argument errors are the
/// caller's business and are logged at `WARN`; everything else at `ERROR`.
#[cfg(feature = "observability")]
pub fn log_call_error(method: &str, error: &CallError) {
    use crate::ErrorKind;

    match error.kind() {
        ErrorKind::DeadlineExceeded
        | ErrorKind::Cancelled
        | ErrorKind::InvalidArgument
        | ErrorKind::UnsupportedContentType => {
            tracing::warn!(
                method,
                error = %error,
                kind = ?error.kind(),
                "call failed"
            );
        }
        _ => {
            tracing::error!(
                method,
                error = %error,
                kind = ?error.kind(),
                retryable = error.is_retryable(),
                "call failed"
            );
        }
    }
}

/// Logs a failed call with structured context (no-op when observability is
/// disabled).
#[cfg(not(feature = "observability"))]
pub fn log_call_error(_method: &str, _error: &CallError) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    #[test]
    fn test_log_call_error_accepts_every_layer() {
        log_call_error("/Svc/M", &CallError::DeadlineExceeded);
        log_call_error("/Svc/M", &CallError::Transport(TransportError::Closed));
        log_call_error("/Svc/M", &CallError::invalid_argument("empty method"));
    }
}
