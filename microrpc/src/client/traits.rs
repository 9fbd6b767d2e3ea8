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

//! The client trait.

use crate::CallError;
use crate::client::{
    CallOption, ClientOption, ClientOptions, Publication, PublishOption, Request, RequestOption,
};
use crate::codec::Payload;
use crate::context::CallContext;
use async_trait::async_trait;
use std::sync::Arc;

/// A configured RPC client.
///
/// Implementations are shared as `Arc<dyn Client>` and may be wrapped by
/// [`ClientWrapper`](crate::client::ClientWrapper)s, which forward every
/// method to the client they wrap.
#[async_trait]
pub trait Client: Send + Sync {
    /// Applies option functions to the client's configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::InvalidArgument`] if the resulting configuration
    /// is invalid; the previous configuration is kept.
    fn init(&self, options: Vec<ClientOption>) -> Result<(), CallError>;

    /// A snapshot of the current configuration.
    fn options(&self) -> ClientOptions;

    /// Builds a request using the client's default content type unless an
    /// option overrides it.
    fn new_request(
        &self,
        service: &str,
        method: &str,
        body: Arc<dyn Payload>,
        options: Vec<RequestOption>,
    ) -> Request;

    /// Calls `request` and unmarshals the reply into `response`.
    ///
    /// # Errors
    ///
    /// Argument, codec, deadline and cancellation failures are returned
    /// without retrying; connection failures are retried up to the call's
    /// retry count and the last one is returned.
    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        response: &mut dyn Payload,
        options: Vec<CallOption>,
    ) -> Result<(), CallError>;

    /// Builds a publication for `topic`.
    fn new_publication(
        &self,
        topic: &str,
        payload: Arc<dyn Payload>,
        options: Vec<RequestOption>,
    ) -> Publication;

    /// Marshals the publication and hands it to the broker.
    async fn publish(
        &self,
        ctx: &CallContext,
        publication: &Publication,
        options: Vec<PublishOption>,
    ) -> Result<(), CallError>;

    /// Short name of the client variant.
    fn name(&self) -> &str;
}

/// Typed conveniences over [`Client`].
#[async_trait]
pub trait ClientExt: Client {
    /// Calls `request` and returns the reply as a `T`.
    async fn call_as<T>(
        &self,
        ctx: &CallContext,
        request: &Request,
        options: Vec<CallOption>,
    ) -> Result<T, CallError>
    where
        T: Payload + Default,
    {
        let mut response = T::default();
        self.call(ctx, request, &mut response, options).await?;
        Ok(response)
    }
}

impl<C: Client + ?Sized> ClientExt for C {}
