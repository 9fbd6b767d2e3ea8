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

//! Bounded, TTL-aware connection pool for one address.

use crate::context::CallContext;
use crate::observability::PoolMetrics;
use crate::pool::{PoolConfig, PoolError, PooledConnection};
use crate::transport::{Connection, Dialer, TransportError};
use crate::CallError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[cfg(feature = "observability")]
use tracing::{debug, instrument, warn};

struct IdleConnection {
    conn: Box<dyn Connection>,
    since: Instant,
}

#[derive(Default)]
struct PoolState {
    idle: VecDeque<IdleConnection>,
    /// Leased plus idle connections, including dials in progress.
    open: usize,
    closed: bool,
}

enum Step {
    Reuse(Box<dyn Connection>, Instant),
    Dial,
    Wait,
}

/// A bounded set of reusable connections to one address.
///
/// A connection is always in exactly one of three states: idle in the pool,
/// leased to a caller through a [`PooledConnection`], or discarded. The
/// number of idle plus leased connections never exceeds
/// [`PoolConfig::capacity`]. When the pool is full, [`Pool::acquire`] waits
/// for a release until the caller's context is done.
///
/// Idle connections older than [`PoolConfig::ttl`] are never leased; they
/// are closed and replaced by a fresh dial.
///
/// # Examples
///
/// ```rust
/// use microrpc::CallContext;
/// use microrpc::pool::{Pool, PoolConfig};
/// use microrpc::transport::MemoryDialer;
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dialer = Arc::new(MemoryDialer::echo());
/// let pool = Pool::new("memory://echo", dialer.clone(), PoolConfig::default());
///
/// let lease = pool.acquire(&CallContext::new()).await?;
/// lease.release(true);
///
/// let lease = pool.acquire(&CallContext::new()).await?;
/// assert_eq!(dialer.dial_count(), 1);
/// lease.release(true);
/// # Ok(())
/// # }
/// ```
pub struct Pool {
    address: String,
    dialer: Arc<dyn Dialer>,
    config: PoolConfig,
    state: Mutex<PoolState>,
    available: Notify,
    metrics: PoolMetrics,
}

impl Pool {
    /// Creates an empty pool. Nothing is dialed until the first acquire or
    /// [`Pool::warm_up`].
    ///
    /// # Panics
    ///
    /// Panics if `config.capacity` is zero.
    pub fn new(
        address: impl Into<String>,
        dialer: Arc<dyn Dialer>,
        config: PoolConfig,
    ) -> Arc<Self> {
        assert!(config.capacity > 0, "pool capacity must be at least 1");
        Arc::new(Self {
            address: address.into(),
            dialer,
            config,
            state: Mutex::new(PoolState::default()),
            available: Notify::new(),
            metrics: PoolMetrics::new(),
        })
    }

    /// Address every connection in this pool is dialed to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The pool's settings.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Pool counters.
    pub fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Connections currently idle.
    pub fn idle_count(&self) -> usize {
        self.state.lock().idle.len()
    }

    /// Connections currently idle or leased, including dials in progress.
    pub fn open_count(&self) -> usize {
        self.state.lock().open
    }

    /// Connections currently leased or being dialed.
    pub fn leased_count(&self) -> usize {
        let state = self.state.lock();
        state.open - state.idle.len()
    }

    /// Returns `true` once [`Pool::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Leases a connection, bounding any dial by the configured dial timeout.
    ///
    /// # Errors
    ///
    /// See [`Pool::acquire_with`].
    pub async fn acquire(self: &Arc<Self>, ctx: &CallContext) -> Result<PooledConnection, PoolError> {
        self.acquire_with(ctx, self.config.dial_timeout).await
    }

    /// Leases a connection.
    ///
    /// Reuses the most recently returned idle connection that is still
    /// within its TTL. Otherwise dials a new one if the pool has room, or
    /// waits for a release.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Closed`] if the pool is closed, now or while waiting.
    /// - [`PoolError::DialFailed`] if a dial fails or outlasts `dial_timeout`
    ///   or the context.
    /// - [`PoolError::Exhausted`] if the context is done before a
    ///   connection is released.
    #[cfg_attr(
        feature = "observability",
        instrument(skip(self, ctx), fields(address = %self.address))
    )]
    pub async fn acquire_with(
        self: &Arc<Self>,
        ctx: &CallContext,
        dial_timeout: Duration,
    ) -> Result<PooledConnection, PoolError> {
        let mut waited = false;
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let (step, expired) = self.next_step();
            for conn in expired {
                self.metrics.record_eviction();
                self.discard(conn);
                self.available.notify_one();
            }

            match step? {
                Step::Reuse(conn, since) => {
                    self.metrics.record_reuse();
                    return Ok(PooledConnection::new(Arc::clone(self), conn, since));
                }
                Step::Dial => return self.dial(ctx, dial_timeout).await,
                Step::Wait => {
                    if !waited {
                        waited = true;
                        self.metrics.record_wait();
                        #[cfg(feature = "observability")]
                        debug!("pool at capacity, waiting for a release");
                    }
                    tokio::select! {
                        _ = &mut notified => {}
                        _ = ctx.done() => {
                            self.metrics.record_exhausted();
                            #[cfg(feature = "observability")]
                            warn!("gave up waiting for a pooled connection");
                            return Err(PoolError::Exhausted {
                                address: self.address.clone(),
                            });
                        }
                    }
                }
            }
        }
    }

    /// Decides the next acquire step under the lock, evicting stale idle
    /// connections on the way. Evicted connections are returned for closing
    /// outside the lock.
    fn next_step(&self) -> (Result<Step, PoolError>, Vec<Box<dyn Connection>>) {
        let mut state = self.state.lock();
        if state.closed {
            return (
                Err(PoolError::Closed {
                    address: self.address.clone(),
                }),
                Vec::new(),
            );
        }

        let now = Instant::now();
        let mut expired = Vec::new();
        let mut fresh = VecDeque::with_capacity(state.idle.len());
        while let Some(idle) = state.idle.pop_front() {
            if now.duration_since(idle.since) >= self.config.ttl || !idle.conn.is_open() {
                expired.push(idle.conn);
            } else {
                fresh.push_back(idle);
            }
        }
        state.idle = fresh;
        state.open -= expired.len();

        let step = if let Some(idle) = state.idle.pop_back() {
            Step::Reuse(idle.conn, idle.since)
        } else if state.open < self.config.capacity {
            state.open += 1;
            Step::Dial
        } else {
            Step::Wait
        };
        (Ok(step), expired)
    }

    async fn dial(
        self: &Arc<Self>,
        ctx: &CallContext,
        dial_timeout: Duration,
    ) -> Result<PooledConnection, PoolError> {
        let slot = DialSlot {
            pool: self,
            armed: true,
        };
        let started = Instant::now();

        let dial = async {
            if dial_timeout.is_zero() {
                self.dialer.dial(&self.address).await
            } else {
                match tokio::time::timeout(dial_timeout, self.dialer.dial(&self.address)).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout {
                        elapsed: dial_timeout,
                    }),
                }
            }
        };

        let result = tokio::select! {
            result = dial => result,
            reason = ctx.done() => Err(match reason {
                CallError::Cancelled => TransportError::Cancelled,
                _ => TransportError::Timeout { elapsed: started.elapsed() },
            }),
        };

        match result {
            Ok(conn) => {
                slot.keep();
                self.metrics.record_dial();
                #[cfg(feature = "observability")]
                debug!(connection_id = %conn.metadata().id, "dialed new pooled connection");
                Ok(PooledConnection::new(Arc::clone(self), conn, Instant::now()))
            }
            Err(source) => {
                drop(slot);
                self.metrics.record_dial_failure();
                #[cfg(feature = "observability")]
                warn!(error = %source, "dial failed");
                Err(PoolError::DialFailed {
                    address: self.address.clone(),
                    source,
                })
            }
        }
    }

    /// Takes back a leased connection.
    ///
    /// Healthy connections still within their TTL go back to the idle set;
    /// all others are closed. Either way one waiter is woken.
    pub(crate) fn release(&self, conn: Box<dyn Connection>, since: Instant, healthy: bool) {
        self.metrics.record_release();
        let now = Instant::now();
        let reusable = healthy && conn.is_open() && now.duration_since(since) < self.config.ttl;

        let discarded = {
            let mut state = self.state.lock();
            if state.closed || !reusable {
                state.open -= 1;
                Some(conn)
            } else {
                state.idle.push_back(IdleConnection { conn, since: now });
                None
            }
        };

        if let Some(conn) = discarded {
            self.discard(conn);
        }
        self.available.notify_one();
    }

    /// Dials connections until `initial` are open, returning how many were
    /// dialed.
    ///
    /// # Errors
    ///
    /// Returns the first dial failure; connections dialed before it stay
    /// in the pool.
    pub async fn warm_up(self: &Arc<Self>, ctx: &CallContext) -> Result<usize, PoolError> {
        let target = self.config.initial.min(self.config.capacity);
        let dials_before = self.metrics.total_dials();
        let mut leases = Vec::new();
        let mut result = Ok(());
        while self.open_count() < target {
            match self.acquire(ctx).await {
                Ok(lease) => leases.push(lease),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }

        let dialed = self.metrics.total_dials() - dials_before;
        for lease in leases {
            lease.release(true);
        }
        #[cfg(feature = "observability")]
        debug!(idle = self.idle_count(), "pool warmed up");
        result.map(|()| dialed as usize)
    }

    /// Closes the pool.
    ///
    /// Idle connections are closed immediately; leased ones are closed when
    /// they are released. Waiting and future acquires fail with
    /// [`PoolError::Closed`].
    pub async fn close(&self) {
        let idle = {
            let mut state = self.state.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let idle: Vec<_> = state.idle.drain(..).collect();
            state.open -= idle.len();
            idle
        };
        self.available.notify_waiters();

        #[cfg(feature = "observability")]
        debug!(address = %self.address, idle = idle.len(), "closing pool");
        for mut idle in idle {
            self.metrics.record_discard();
            if let Err(_e) = idle.conn.close().await {
                #[cfg(feature = "observability")]
                debug!(error = %_e, "error closing idle connection");
            }
        }
    }

    fn discard(&self, mut conn: Box<dyn Connection>) {
        self.metrics.record_discard();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(_e) = conn.close().await {
                    #[cfg(feature = "observability")]
                    debug!(error = %_e, "error closing discarded connection");
                }
            });
        }
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Pool")
            .field("address", &self.address)
            .field("config", &self.config)
            .field("idle", &state.idle.len())
            .field("open", &state.open)
            .field("closed", &state.closed)
            .finish()
    }
}

/// Holds a reserved capacity slot while a dial is in flight. Dropping it,
/// including when the acquiring future is dropped, gives the slot back.
struct DialSlot<'a> {
    pool: &'a Pool,
    armed: bool,
}

impl DialSlot<'_> {
    /// The dial succeeded; the slot now belongs to the new connection.
    fn keep(mut self) {
        self.armed = false;
    }
}

impl Drop for DialSlot<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.state.lock().open -= 1;
            self.pool.available.notify_one();
        }
    }
}
