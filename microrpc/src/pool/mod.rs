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

//! Connection pooling.
//!
//! [`Pool`] keeps a bounded set of connections to one address and hands
//! them out as [`PooledConnection`] leases. [`PoolManager`] keeps one pool
//! per address so a client can reach several targets through one dialer.
//!
//! # Lease discipline
//!
//! Every successful acquire is paired with exactly one release. The call
//! path releases explicitly, marking the connection unhealthy if the
//! transport reported an error that leaves it unusable. A lease that is
//! dropped instead, for example because the task holding it was aborted,
//! is released as unhealthy.

mod config;
mod error;
mod lease;
mod manager;
#[allow(clippy::module_inception)]
mod pool;

pub use self::config::{
    DEFAULT_DIAL_TIMEOUT, DEFAULT_POOL_CAPACITY, DEFAULT_POOL_INITIAL, DEFAULT_POOL_TTL,
    PoolConfig,
};
pub use self::error::PoolError;
pub use self::lease::PooledConnection;
pub use self::manager::PoolManager;
pub use self::pool::Pool;
