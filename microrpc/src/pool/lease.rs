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

//! Leased connections.

use crate::pool::Pool;
use crate::transport::Connection;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::time::Instant;

/// A connection leased from a [`Pool`].
///
/// Dereferences to the underlying [`Connection`]. Hand it back with
/// [`PooledConnection::release`], saying whether it is still healthy.
/// A lease dropped without an explicit release is treated as unhealthy and
/// its connection is closed, so a panicking or cancelled caller never
/// returns a connection in an unknown state to the pool.
pub struct PooledConnection {
    conn: Option<Box<dyn Connection>>,
    pool: Arc<Pool>,
    since: Instant,
}

impl PooledConnection {
    pub(crate) fn new(pool: Arc<Pool>, conn: Box<dyn Connection>, since: Instant) -> Self {
        Self {
            conn: Some(conn),
            pool,
            since,
        }
    }

    /// Returns the connection to its pool.
    ///
    /// Healthy connections within their TTL become idle and reusable;
    /// unhealthy ones are closed.
    pub fn release(mut self, healthy: bool) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn, self.since, healthy);
        }
    }

    /// The pool this lease came from.
    pub fn pool(&self) -> &Arc<Pool> {
        &self.pool
    }
}

impl Deref for PooledConnection {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
            .as_deref()
            .expect("connection is present until the lease ends")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn
            .as_deref_mut()
            .expect("connection is present until the lease ends")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn, self.since, false);
        }
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("address", &self.pool.address())
            .field("connection", &self.conn.as_ref().map(|c| c.metadata().id))
            .finish()
    }
}
