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

//! Service name to address resolution.

use crate::transport::TransportError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

/// Looks up the address of a service.
///
/// The client consults the resolver only when a call carries no address
/// override. Picking among replicas is the resolver's business.
#[async_trait]
pub trait Resolver: Send + Sync + Debug {
    /// Returns the address to dial for `service`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unresolved`] when the service is unknown.
    async fn resolve(&self, service: &str) -> Result<String, TransportError>;
}

/// A fixed service table with an optional fallback address.
///
/// ```rust
/// use microrpc::client::{Resolver, StaticResolver};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let resolver = StaticResolver::new()
///     .with_route("greeter", "10.0.0.7:9000")
///     .with_fallback("10.0.0.1:9000");
///
/// assert_eq!(resolver.resolve("greeter").await.unwrap(), "10.0.0.7:9000");
/// assert_eq!(resolver.resolve("billing").await.unwrap(), "10.0.0.1:9000");
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    routes: HashMap<String, String>,
    fallback: Option<String>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes `service` to `address`.
    pub fn with_route(mut self, service: impl Into<String>, address: impl Into<String>) -> Self {
        self.routes.insert(service.into(), address.into());
        self
    }

    /// Address used for services without a route.
    pub fn with_fallback(mut self, address: impl Into<String>) -> Self {
        self.fallback = Some(address.into());
        self
    }
}

#[async_trait]
impl Resolver for StaticResolver {
    async fn resolve(&self, service: &str) -> Result<String, TransportError> {
        self.routes
            .get(service)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| TransportError::Unresolved {
                service: service.to_string(),
            })
    }
}
