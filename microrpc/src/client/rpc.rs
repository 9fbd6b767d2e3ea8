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

//! The pooled RPC client.

use crate::CallError;
use crate::broker::BrokerMessage;
use crate::client::attempt::Attempt;
use crate::client::{
    CallOption, Client, ClientOption, ClientOptions, Publication, PublishOption, PublishOptions,
    Request, RequestOption, RequestOptions, compose_call, controller,
};
use crate::codec::Payload;
use crate::context::CallContext;
use crate::observability::{CallMetrics, log_call_error};
use crate::pool::PoolManager;
use crate::transport::Dialer;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tokio::time::Instant;

#[cfg(feature = "observability")]
use tracing::{debug, instrument};

/// Metadata key carrying a publication's content type.
pub const PUBLISH_CONTENT_TYPE_HEADER: &str = "content-type";

/// A [`Client`] that leases connections from per-address pools.
///
/// The transport is whatever the [`Dialer`] produces. Use
/// [`new_client`](crate::client::new_client) to get the client with its
/// client wrappers applied.
pub struct RpcClient {
    name: String,
    options: RwLock<ClientOptions>,
    pools: Arc<PoolManager>,
    metrics: Arc<CallMetrics>,
}

impl RpcClient {
    /// Creates a client named after its dialer.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::InvalidArgument`] if the pool configuration is
    /// invalid.
    pub fn new(dialer: Arc<dyn Dialer>, options: ClientOptions) -> Result<Self, CallError> {
        options.pool.validate().map_err(CallError::invalid_argument)?;
        let name = dialer.name().to_string();
        let pools = Arc::new(PoolManager::new(dialer, options.pool.clone()));
        Ok(Self {
            name,
            options: RwLock::new(options),
            pools,
            metrics: Arc::new(CallMetrics::new()),
        })
    }

    /// Per-address pools.
    pub fn pools(&self) -> &Arc<PoolManager> {
        &self.pools
    }

    /// Call counters.
    pub fn metrics(&self) -> &Arc<CallMetrics> {
        &self.metrics
    }

    /// Pre-dials `initial` connections to the client's static address.
    ///
    /// Returns how many connections were dialed.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::InvalidArgument`] when no static address is set,
    /// or the first dial failure.
    pub async fn warm_up(&self, ctx: &CallContext) -> Result<usize, CallError> {
        let address = self.options.read().address.clone();
        if address.is_empty() {
            return Err(CallError::invalid_argument("client has no address to warm up"));
        }
        let dialed = self.pools.get(&address).warm_up(ctx).await?;
        Ok(dialed)
    }

    /// Closes every pool. Calls made afterwards start fresh pools.
    pub async fn close(&self) {
        self.pools.close_all().await;
    }

    fn request_options(options: Vec<RequestOption>) -> RequestOptions {
        options
            .into_iter()
            .fold(RequestOptions::default(), |opts, apply| apply(opts))
    }

    async fn invoke(
        &self,
        ctx: &CallContext,
        request: &Request,
        response: &mut dyn Payload,
        options: Vec<CallOption>,
    ) -> Result<(), CallError> {
        request.validate()?;

        let (mut call_options, codec, attempt) = {
            let client = self.options.read();
            let codec = client.codecs.lookup(request.content_type());
            let attempt = codec.clone().map(|codec| Attempt {
                codec,
                pools: Arc::clone(&self.pools),
                address: client.address.clone(),
                resolver: client.resolver.clone(),
                metrics: Arc::clone(&self.metrics),
            });
            (client.call_options.clone().apply(options), codec, attempt)
        };

        let ctx = match ctx.remaining() {
            Some(remaining) => {
                call_options.request_timeout = remaining;
                ctx.clone()
            }
            None => ctx.clone().with_timeout(call_options.request_timeout),
        };
        ctx.check()?;

        let (Some(codec), Some(attempt)) = (codec, attempt) else {
            return Err(CallError::UnsupportedContentType {
                content_type: request.content_type().to_string(),
            });
        };

        let handler = compose_call(Arc::new(attempt), &call_options.call_wrappers);
        let reply =
            controller::drive(&ctx, handler, request, Arc::new(call_options), &self.metrics).await?;
        codec.unmarshal(&reply.body, response)?;
        Ok(())
    }
}

#[async_trait]
impl Client for RpcClient {
    fn init(&self, options: Vec<ClientOption>) -> Result<(), CallError> {
        let mut current = self.options.write();
        let updated = current.clone().apply(options);
        updated.pool.validate().map_err(CallError::invalid_argument)?;
        if updated.pool != current.pool {
            self.pools.set_config(updated.pool.clone());
        }
        *current = updated;
        Ok(())
    }

    fn options(&self) -> ClientOptions {
        self.options.read().clone()
    }

    fn new_request(
        &self,
        service: &str,
        method: &str,
        body: Arc<dyn Payload>,
        options: Vec<RequestOption>,
    ) -> Request {
        let content_type = Self::request_options(options)
            .content_type
            .unwrap_or_else(|| self.options.read().content_type.clone());
        Request::new(service, method, content_type, body)
    }

    #[cfg_attr(
        feature = "observability",
        instrument(
            skip_all,
            fields(client = %self.name, service = %request.service(), method = %request.method())
        )
    )]
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        response: &mut dyn Payload,
        options: Vec<CallOption>,
    ) -> Result<(), CallError> {
        self.metrics.record_call();
        let started = Instant::now();

        let result = self.invoke(ctx, request, response, options).await;
        match &result {
            Ok(()) => {
                self.metrics.record_success(started.elapsed());
                #[cfg(feature = "observability")]
                debug!(elapsed_ms = started.elapsed().as_millis() as u64, "call succeeded");
            }
            Err(e) => {
                match e {
                    CallError::DeadlineExceeded => self.metrics.record_deadline(),
                    CallError::Cancelled => self.metrics.record_cancellation(),
                    _ => {}
                }
                self.metrics.record_failure();
                log_call_error(&request.endpoint(), e);
            }
        }
        result
    }

    fn new_publication(
        &self,
        topic: &str,
        payload: Arc<dyn Payload>,
        options: Vec<RequestOption>,
    ) -> Publication {
        let content_type = Self::request_options(options)
            .content_type
            .unwrap_or_else(|| self.options.read().content_type.clone());
        Publication::new(topic, content_type, payload)
    }

    #[cfg_attr(
        feature = "observability",
        instrument(skip_all, fields(client = %self.name, topic = %publication.topic()))
    )]
    async fn publish(
        &self,
        ctx: &CallContext,
        publication: &Publication,
        options: Vec<PublishOption>,
    ) -> Result<(), CallError> {
        if publication.topic().is_empty() {
            return Err(CallError::invalid_argument("publication topic is empty"));
        }
        ctx.check()?;

        let (codec, broker) = {
            let client = self.options.read();
            (
                client.codecs.lookup(publication.content_type()),
                Arc::clone(&client.broker),
            )
        };
        let codec = codec.ok_or_else(|| CallError::UnsupportedContentType {
            content_type: publication.content_type().to_string(),
        })?;

        let opts = options
            .into_iter()
            .fold(PublishOptions::default(), |opts, apply| apply(opts));
        let mut message = BrokerMessage::new(codec.marshal(&**publication.payload())?);
        message.header.extend(ctx.metadata().clone());
        message.header.extend(opts.headers);
        message.header.insert(
            PUBLISH_CONTENT_TYPE_HEADER.to_string(),
            publication.content_type().to_string(),
        );

        tokio::select! {
            biased;
            err = ctx.done() => Err(err),
            result = broker.publish(publication.topic(), message) => result.map_err(Into::into),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcClient")
            .field("name", &self.name)
            .field("options", &*self.options.read())
            .field("pools", &self.pools)
            .finish()
    }
}
