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

//! In-process transport for tests and embedding.
//!
//! [`MemoryDialer`] hands every invocation to a handler closure instead of a
//! socket. It also keeps counters for dials and live connections, which is
//! what pool and client tests assert on.

use crate::context::CallContext;
use crate::transport::{Connection, ConnectionMetadata, Dialer, Invocation, TransportError};
use crate::CallError;
use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

#[cfg(feature = "observability")]
use tracing::{debug, instrument};

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Bytes, TransportError>> + Send>>;
type Handler = Arc<dyn Fn(Invocation) -> HandlerFuture + Send + Sync>;

#[derive(Debug, Default)]
struct DialStats {
    dials: AtomicU64,
    failed_dials: AtomicU64,
    pending_failures: AtomicU64,
    live: AtomicUsize,
    peak: AtomicUsize,
    closed: AtomicU64,
}

impl DialStats {
    fn opened(&self) {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(live, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Dials in-process connections served by a handler closure.
///
/// # Examples
///
/// ```rust
/// use microrpc::transport::{Dialer, MemoryDialer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let dialer = MemoryDialer::new(|invocation| async move { Ok(invocation.body) });
/// let _conn = dialer.dial("memory://echo").await.unwrap();
/// assert_eq!(dialer.dial_count(), 1);
/// assert_eq!(dialer.live_connections(), 1);
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryDialer {
    handler: Handler,
    dial_delay: Duration,
    stats: Arc<DialStats>,
}

impl MemoryDialer {
    /// Creates a dialer whose connections answer with `handler`.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Bytes, TransportError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |invocation| Box::pin(handler(invocation))),
            dial_delay: Duration::ZERO,
            stats: Arc::new(DialStats::default()),
        }
    }

    /// A dialer whose connections return the request body unchanged.
    pub fn echo() -> Self {
        Self::new(|invocation| async move { Ok(invocation.body) })
    }

    /// Makes every dial take `delay` before it completes.
    pub fn with_dial_delay(mut self, delay: Duration) -> Self {
        self.dial_delay = delay;
        self
    }

    /// Makes the next `count` dials fail with a connection refused error.
    pub fn fail_next_dials(&self, count: u64) {
        self.stats.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Number of successful dials so far.
    pub fn dial_count(&self) -> u64 {
        self.stats.dials.load(Ordering::SeqCst)
    }

    /// Number of dials that failed.
    pub fn failed_dial_count(&self) -> u64 {
        self.stats.failed_dials.load(Ordering::SeqCst)
    }

    /// Connections dialed and not yet closed or dropped.
    pub fn live_connections(&self) -> usize {
        self.stats.live.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously live connections observed.
    pub fn peak_connections(&self) -> usize {
        self.stats.peak.load(Ordering::SeqCst)
    }

    /// Connections closed or dropped so far.
    pub fn closed_connections(&self) -> u64 {
        self.stats.closed.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.stats
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl std::fmt::Debug for MemoryDialer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDialer")
            .field("dial_delay", &self.dial_delay)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Dialer for MemoryDialer {
    #[cfg_attr(feature = "observability", instrument(skip(self)))]
    async fn dial(&self, address: &str) -> Result<Box<dyn Connection>, TransportError> {
        if !self.dial_delay.is_zero() {
            tokio::time::sleep(self.dial_delay).await;
        }

        if self.take_failure() {
            self.stats.failed_dials.fetch_add(1, Ordering::SeqCst);
            return Err(TransportError::Dial {
                address: address.to_string(),
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "injected dial failure"),
            });
        }

        self.stats.dials.fetch_add(1, Ordering::SeqCst);
        self.stats.opened();

        let metadata = ConnectionMetadata::new(address, "memory");
        #[cfg(feature = "observability")]
        debug!(connection_id = %metadata.id, "dialed memory connection");

        Ok(Box::new(MemoryConnection {
            metadata,
            handler: Arc::clone(&self.handler),
            stats: Arc::clone(&self.stats),
            open: true,
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// A connection produced by [`MemoryDialer`].
pub struct MemoryConnection {
    metadata: ConnectionMetadata,
    handler: Handler,
    stats: Arc<DialStats>,
    open: bool,
}

impl MemoryConnection {
    fn shut(&mut self) {
        if self.open {
            self.open = false;
            self.stats.closed();
        }
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn metadata(&self) -> &ConnectionMetadata {
        &self.metadata
    }

    async fn invoke(
        &mut self,
        ctx: &CallContext,
        invocation: Invocation,
    ) -> Result<Bytes, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }

        let started = tokio::time::Instant::now();
        tokio::select! {
            result = (self.handler)(invocation) => result,
            reason = ctx.done() => Err(match reason {
                CallError::Cancelled => TransportError::Cancelled,
                _ => TransportError::Timeout { elapsed: started.elapsed() },
            }),
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.shut();
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.shut();
    }
}
