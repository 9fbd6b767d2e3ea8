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

//! The client façade.
//!
//! A [`Client`] turns a [`Request`] into a reply. [`RpcClient`] is the one
//! implementation in this crate; it is parameterised by a
//! [`Dialer`](crate::transport::Dialer), so the same call controller runs
//! over TCP, in memory or any custom transport.
//!
//! A call goes through these steps:
//!
//! 1. The request is validated and the call options are merged from the
//!    client defaults and the per-call [`CallOption`]s.
//! 2. The deadline is taken from the context, or set to the request timeout.
//!    An already finished context fails the call before any I/O.
//! 3. The codec is looked up by content type. Unknown content types fail
//!    before a connection is leased.
//! 4. Attempts run through the call wrappers and the retry loop, each on its
//!    own task, each leasing and releasing its own pooled connection.
//! 5. The winning reply is unmarshalled into the caller's response value.
//!
//! # Examples
//!
//! ```rust
//! use microrpc::client::{self, ClientExt, ClientOptions};
//! use microrpc::transport::MemoryDialer;
//! use microrpc::CallContext;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = client::memory_client(
//!     MemoryDialer::echo(),
//!     ClientOptions::default().with_address("memory://echo"),
//! )?;
//!
//! let request = client.new_request("echo", "Echo.Say", Arc::new("hello".to_string()), vec![]);
//! let reply: String = client.call_as(&CallContext::new(), &request, vec![]).await?;
//! assert_eq!(reply, "hello");
//! # Ok(())
//! # }
//! ```

mod attempt;
mod controller;
mod middleware;
mod options;
mod request;
mod resolver;
mod rpc;
mod settings;
mod traits;

pub use self::attempt::{CONTENT_TYPE_HEADER, TIMEOUT_HEADER};
pub use self::middleware::{
    CallFuture, CallHandler, CallWrapper, ClientWrapper, Response, call_wrapper, compose_call,
    compose_client, handler_fn,
};
pub use self::options::{
    CallOption, CallOptions, ClientOption, ClientOptions, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_RETRIES, PublishOption, PublishOptions, RequestOption, RequestOptions, address,
    backoff, broker, codec, content_type, pool_capacity, pool_initial, pool_ttl, request_timeout,
    resolver, retries, with_address, with_backoff, with_call_wrapper, with_content_type,
    with_dial_timeout, with_header, with_request_timeout, with_retries, wrap, wrap_call,
};
pub use self::request::{Publication, Request, method_to_rpc};
pub use self::resolver::{Resolver, StaticResolver};
pub use self::rpc::{PUBLISH_CONTENT_TYPE_HEADER, RpcClient};
pub use self::settings::{ClientSettings, ConfigError, PoolSettings};
pub use self::traits::{Client, ClientExt};

use crate::CallError;
use crate::transport::{Dialer, MemoryDialer, TcpDialer};
use std::sync::Arc;

/// Builds an [`RpcClient`] over `dialer` and applies the client wrappers
/// from `options`.
///
/// # Errors
///
/// Returns [`CallError::InvalidArgument`] if the pool configuration is
/// invalid.
pub fn new_client(
    dialer: Arc<dyn Dialer>,
    options: ClientOptions,
) -> Result<Arc<dyn Client>, CallError> {
    let wrappers = options.wrappers.clone();
    let client: Arc<dyn Client> = Arc::new(RpcClient::new(dialer, options)?);
    Ok(compose_client(client, &wrappers))
}

/// A client speaking the framed TCP protocol.
pub fn tcp_client(options: ClientOptions) -> Result<Arc<dyn Client>, CallError> {
    new_client(Arc::new(TcpDialer::new()), options)
}

/// A client whose connections are served in process by `dialer`.
pub fn memory_client(
    dialer: MemoryDialer,
    options: ClientOptions,
) -> Result<Arc<dyn Client>, CallError> {
    new_client(Arc::new(dialer), options)
}
