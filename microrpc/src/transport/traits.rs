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

//! Core transport traits.

use crate::context::CallContext;
use crate::transport::{ConnectionMetadata, Invocation, TransportError};
use async_trait::async_trait;
use bytes::Bytes;

/// A single established connection to a remote endpoint.
///
/// A connection carries one exchange at a time; the pool guarantees that a
/// connection is leased to at most one caller.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use bytes::Bytes;
/// use microrpc::CallContext;
/// use microrpc::transport::{
///     Connection, ConnectionId, ConnectionMetadata, Invocation, TransportError,
/// };
///
/// struct Loopback {
///     metadata: ConnectionMetadata,
/// }
///
/// #[async_trait]
/// impl Connection for Loopback {
///     fn metadata(&self) -> &ConnectionMetadata {
///         &self.metadata
///     }
///
///     async fn invoke(
///         &mut self,
///         _ctx: &CallContext,
///         invocation: Invocation,
///     ) -> Result<Bytes, TransportError> {
///         Ok(invocation.body)
///     }
///
///     async fn close(&mut self) -> Result<(), TransportError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Connection: Send + 'static {
    /// Returns metadata about this connection.
    fn metadata(&self) -> &ConnectionMetadata;

    /// Sends one request and waits for its reply body.
    ///
    /// Implementations should give up once `ctx` is done, returning
    /// [`TransportError::Timeout`] or [`TransportError::Cancelled`].
    async fn invoke(
        &mut self,
        ctx: &CallContext,
        invocation: Invocation,
    ) -> Result<Bytes, TransportError>;

    /// Returns `false` once the connection is known to be unusable.
    fn is_open(&self) -> bool {
        true
    }

    /// Closes the connection.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Establishes new connections to an address.
///
/// A dialer is shared by every pool a client creates, so it must be safe to
/// call concurrently.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Opens a new connection to `address`.
    async fn dial(&self, address: &str) -> Result<Box<dyn Connection>, TransportError>;

    /// Short name of the transport, e.g. `"tcp"`.
    fn name(&self) -> &str;
}
