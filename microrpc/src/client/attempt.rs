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

//! The innermost call handler: one exchange over a pooled connection.

use crate::CallError;
use crate::client::{CallFuture, CallHandler, CallOptions, Request, Resolver, Response};
use crate::codec::Codec;
use crate::context::CallContext;
use crate::observability::CallMetrics;
use crate::pool::PoolManager;
use crate::transport::Invocation;
use std::sync::Arc;

#[cfg(feature = "observability")]
use tracing::{debug, instrument};

/// Metadata key carrying the remaining request timeout in nanoseconds.
pub const TIMEOUT_HEADER: &str = "timeout";

/// Metadata key carrying the request content type.
pub const CONTENT_TYPE_HEADER: &str = "x-content-type";

/// Performs a single attempt.
///
/// Marshals the body, resolves the target, leases a connection, invokes it
/// and hands the connection back. The lease is released on every path: a
/// failed exchange releases it as unhealthy when the transport says so, and
/// an attempt abandoned by the controller still runs to completion on its
/// own task and releases its lease there.
#[derive(Clone)]
pub(crate) struct Attempt {
    pub(crate) codec: Arc<dyn Codec>,
    pub(crate) pools: Arc<PoolManager>,
    pub(crate) address: String,
    pub(crate) resolver: Option<Arc<dyn Resolver>>,
    pub(crate) metrics: Arc<CallMetrics>,
}

impl Attempt {
    /// Call override, then resolver, then the client's static address.
    async fn target(&self, request: &Request, options: &CallOptions) -> Result<String, CallError> {
        let address = match (&options.address, &self.resolver) {
            (Some(address), _) => address.clone(),
            (None, Some(resolver)) => resolver.resolve(request.service()).await?,
            (None, None) => self.address.clone(),
        };
        if address.is_empty() {
            return Err(CallError::invalid_argument(format!(
                "no address for service {}",
                request.service()
            )));
        }
        Ok(address)
    }

    #[cfg_attr(
        feature = "observability",
        instrument(skip_all, fields(service = %request.service(), method = %request.method()))
    )]
    async fn run(
        self,
        ctx: CallContext,
        request: Request,
        options: Arc<CallOptions>,
    ) -> Result<Response, CallError> {
        self.metrics.record_attempt();

        let body = self.codec.marshal(&**request.body())?;
        let address = self.target(&request, &options).await?;
        let pool = self.pools.get(&address);
        let mut conn = if options.dial_timeout.is_zero() {
            pool.acquire(&ctx).await?
        } else {
            pool.acquire_with(&ctx, options.dial_timeout).await?
        };

        let timeout = ctx.remaining().unwrap_or(options.request_timeout);
        let mut metadata = ctx.metadata().clone();
        metadata.insert(TIMEOUT_HEADER.to_string(), timeout.as_nanos().to_string());
        metadata.insert(
            CONTENT_TYPE_HEADER.to_string(),
            request.content_type().to_string(),
        );

        let invocation = Invocation {
            method: request.endpoint(),
            content_type: request.content_type().to_string(),
            metadata,
            body,
        };

        match conn.invoke(&ctx, invocation).await {
            Ok(body) => {
                conn.release(true);
                Ok(Response {
                    content_type: request.content_type().to_string(),
                    body,
                    metadata: Default::default(),
                })
            }
            Err(e) => {
                #[cfg(feature = "observability")]
                debug!(address = %address, error = %e, "attempt failed");
                conn.release(!e.poisons_connection());
                Err(e.into())
            }
        }
    }
}

impl CallHandler for Attempt {
    fn call(&self, ctx: CallContext, request: Request, options: Arc<CallOptions>) -> CallFuture {
        Box::pin(self.clone().run(ctx, request, options))
    }
}
