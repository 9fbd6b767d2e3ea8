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

//! Call and client middleware.
//!
//! Middleware composes at two points:
//!
//! - A [`CallWrapper`] wraps the handler that performs one attempt. The
//!   wrappers of a call are folded so that the first one runs first on the
//!   way in and last on the way out, with the attempt itself innermost.
//!   Retried calls run the whole stack once per attempt.
//! - A [`ClientWrapper`] wraps a whole [`Client`]. Client wrappers are
//!   applied once at construction; the first registered ends up outermost.
//!
//! ```rust
//! use microrpc::client::{call_wrapper, CallHandler};
//!
//! let logging = call_wrapper(|next, ctx, request, options| async move {
//!     let endpoint = request.endpoint();
//!     let result = next.call(ctx, request, options).await;
//!     println!("{endpoint}: {}", if result.is_ok() { "ok" } else { "failed" });
//!     result
//! });
//! # let _ = logging;
//! ```

use crate::CallError;
use crate::client::{CallOptions, Client, Request};
use crate::context::{CallContext, Metadata};
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Raw reply to one attempt, before it is unmarshalled.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Content type the body is encoded with.
    pub content_type: String,
    /// Marshalled response body.
    pub body: Bytes,
    /// Metadata attached by the transport or by middleware.
    pub metadata: Metadata,
}

/// Future returned by a [`CallHandler`].
pub type CallFuture = Pin<Box<dyn Future<Output = Result<Response, CallError>> + Send>>;

/// Performs one attempt of a call.
///
/// Arguments are owned so the returned future can run on its own task after
/// the caller stopped waiting for it.
pub trait CallHandler: Send + Sync {
    fn call(&self, ctx: CallContext, request: Request, options: Arc<CallOptions>) -> CallFuture;
}

/// Attempt-level middleware.
pub type CallWrapper = Arc<dyn Fn(Arc<dyn CallHandler>) -> Arc<dyn CallHandler> + Send + Sync>;

/// Client-level middleware.
pub type ClientWrapper = Arc<dyn Fn(Arc<dyn Client>) -> Arc<dyn Client> + Send + Sync>;

struct FnHandler<F>(F);

impl<F, Fut> CallHandler for FnHandler<F>
where
    F: Fn(CallContext, Request, Arc<CallOptions>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, CallError>> + Send + 'static,
{
    fn call(&self, ctx: CallContext, request: Request, options: Arc<CallOptions>) -> CallFuture {
        Box::pin((self.0)(ctx, request, options))
    }
}

/// Turns an async closure into a [`CallHandler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn CallHandler>
where
    F: Fn(CallContext, Request, Arc<CallOptions>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, CallError>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Builds a [`CallWrapper`] from an async closure that receives the next
/// handler in the chain.
pub fn call_wrapper<F, Fut>(f: F) -> CallWrapper
where
    F: Fn(Arc<dyn CallHandler>, CallContext, Request, Arc<CallOptions>) -> Fut
        + Send
        + Sync
        + 'static,
    Fut: Future<Output = Result<Response, CallError>> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |next: Arc<dyn CallHandler>| {
        let f = Arc::clone(&f);
        handler_fn(move |ctx, request, options| f(Arc::clone(&next), ctx, request, options))
    })
}

/// Wraps `handler` so that `wrappers[0]` is outermost.
pub fn compose_call(handler: Arc<dyn CallHandler>, wrappers: &[CallWrapper]) -> Arc<dyn CallHandler> {
    wrappers.iter().rev().fold(handler, |inner, wrap| wrap(inner))
}

/// Wraps `client` so that `wrappers[0]` is outermost.
pub fn compose_client(client: Arc<dyn Client>, wrappers: &[ClientWrapper]) -> Arc<dyn Client> {
    wrappers.iter().rev().fold(client, |inner, wrap| wrap(inner))
}
