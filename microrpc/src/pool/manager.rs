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

//! Per-address pool registry.

use crate::pool::{Pool, PoolConfig};
use crate::transport::Dialer;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "observability")]
use tracing::debug;

/// Lazily creates one [`Pool`] per target address, all sharing a dialer.
///
/// Pools are created with the configuration current at the time of their
/// creation; [`PoolManager::set_config`] only affects pools created later.
pub struct PoolManager {
    dialer: Arc<dyn Dialer>,
    config: RwLock<PoolConfig>,
    pools: Mutex<HashMap<String, Arc<Pool>>>,
}

impl PoolManager {
    /// Creates a manager with no pools.
    pub fn new(dialer: Arc<dyn Dialer>, config: PoolConfig) -> Self {
        Self {
            dialer,
            config: RwLock::new(config),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// The shared dialer.
    pub fn dialer(&self) -> &Arc<dyn Dialer> {
        &self.dialer
    }

    /// The configuration new pools are created with.
    pub fn config(&self) -> PoolConfig {
        self.config.read().clone()
    }

    /// Replaces the configuration used for pools created from now on.
    pub fn set_config(&self, config: PoolConfig) {
        *self.config.write() = config;
    }

    /// Returns the pool for `address`, creating it on first use.
    ///
    /// A pool found closed is replaced by a fresh one.
    pub fn get(&self, address: &str) -> Arc<Pool> {
        let mut pools = self.pools.lock();
        if let Some(pool) = pools.get(address) {
            if !pool.is_closed() {
                return Arc::clone(pool);
            }
        }

        #[cfg(feature = "observability")]
        debug!(address, "creating connection pool");
        let pool = Pool::new(address, Arc::clone(&self.dialer), self.config());
        pools.insert(address.to_string(), Arc::clone(&pool));
        pool
    }

    /// Returns the pool for `address` if one exists.
    pub fn find(&self, address: &str) -> Option<Arc<Pool>> {
        self.pools.lock().get(address).cloned()
    }

    /// Number of pools.
    pub fn len(&self) -> usize {
        self.pools.lock().len()
    }

    /// Returns `true` if no pool was created yet.
    pub fn is_empty(&self) -> bool {
        self.pools.lock().is_empty()
    }

    /// Closes and forgets every pool.
    pub async fn close_all(&self) {
        let pools: Vec<_> = self.pools.lock().drain().map(|(_, pool)| pool).collect();
        for pool in pools {
            pool.close().await;
        }
    }
}

impl fmt::Debug for PoolManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolManager")
            .field("dialer", &self.dialer.name())
            .field("config", &*self.config.read())
            .field("pools", &self.pools.lock().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CallContext;
    use crate::transport::MemoryDialer;

    #[tokio::test]
    async fn test_one_pool_per_address() {
        let manager = PoolManager::new(Arc::new(MemoryDialer::echo()), PoolConfig::default());
        let a = manager.get("memory://a");
        let again = manager.get("memory://a");
        let b = manager.get("memory://b");

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn test_config_applies_to_new_pools() {
        let manager = PoolManager::new(Arc::new(MemoryDialer::echo()), PoolConfig::default());
        let before = manager.get("memory://a");
        manager.set_config(PoolConfig::default().with_capacity(2));
        let after = manager.get("memory://b");

        assert_eq!(before.config().capacity, 20);
        assert_eq!(after.config().capacity, 2);
    }

    #[tokio::test]
    async fn test_closed_pool_is_replaced() {
        let manager = PoolManager::new(Arc::new(MemoryDialer::echo()), PoolConfig::default());
        let pool = manager.get("memory://a");
        pool.close().await;

        let fresh = manager.get("memory://a");
        assert!(!fresh.is_closed());
        let lease = fresh.acquire(&CallContext::new()).await.unwrap();
        lease.release(true);
    }

    #[tokio::test]
    async fn test_close_all() {
        let manager = PoolManager::new(Arc::new(MemoryDialer::echo()), PoolConfig::default());
        let pool = manager.get("memory://a");
        manager.close_all().await;
        assert!(pool.is_closed());
        assert!(manager.is_empty());
    }
}
