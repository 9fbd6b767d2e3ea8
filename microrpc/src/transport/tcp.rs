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

//! TCP transport.
//!
//! Each exchange is one request frame followed by one reply frame, using the
//! length-prefixed framing from [`codec::framing`](crate::codec::framing).
//! Both frames carry a postcard-encoded envelope:
//!
//! - [`WireRequest`]: method, content type, metadata and body.
//! - [`WireReply`]: either the reply body or the remote handler's error.
//!
//! Servers speaking this protocol read a `WireRequest` with
//! [`read_envelope`](crate::codec::framing::read_envelope) and answer with
//! [`write_envelope`](crate::codec::framing::write_envelope).

use crate::CallError;
use crate::codec::framing::{read_envelope, write_envelope};
use crate::context::{CallContext, Metadata};
use crate::transport::{Connection, ConnectionMetadata, Dialer, Invocation, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::io;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

#[cfg(feature = "observability")]
use tracing::{debug, error, info, instrument};

/// Request envelope sent to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireRequest {
    /// Fully qualified method name.
    pub method: String,
    /// Content type of `body`.
    pub content_type: String,
    /// Call headers.
    pub metadata: Metadata,
    /// Marshalled request body.
    pub body: Vec<u8>,
}

impl From<Invocation> for WireRequest {
    fn from(invocation: Invocation) -> Self {
        Self {
            method: invocation.method,
            content_type: invocation.content_type,
            metadata: invocation.metadata,
            body: invocation.body.to_vec(),
        }
    }
}

/// Reply envelope sent back by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WireReply {
    /// The handler succeeded with this marshalled body.
    Ok(Vec<u8>),
    /// The handler failed with this message.
    Err(String),
}

/// Dials plain TCP connections.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    nodelay: bool,
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self { nodelay: true }
    }
}

impl TcpDialer {
    /// Creates a dialer with `TCP_NODELAY` enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether dialed sockets disable Nagle's algorithm.
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    #[cfg_attr(feature = "observability", instrument(skip(self)))]
    async fn dial(&self, address: &str) -> Result<Box<dyn Connection>, TransportError> {
        #[cfg(feature = "observability")]
        info!("connecting to TCP endpoint");

        let stream = TcpStream::connect(address).await.map_err(|e| {
            #[cfg(feature = "observability")]
            error!("failed to connect: {}", e);
            TransportError::Dial {
                address: address.to_string(),
                source: e,
            }
        })?;
        stream.set_nodelay(self.nodelay)?;

        let connection = TcpConnection::from_stream(stream, address)?;
        #[cfg(feature = "observability")]
        debug!(connection_id = %connection.metadata.id, "TCP connection established");

        Ok(Box::new(connection))
    }

    fn name(&self) -> &str {
        "tcp"
    }
}

/// A TCP connection carrying one exchange at a time.
pub struct TcpConnection {
    stream: TcpStream,
    metadata: ConnectionMetadata,
    open: bool,
}

impl TcpConnection {
    /// Wraps an already connected stream.
    ///
    /// # Errors
    ///
    /// Fails if the socket addresses cannot be read.
    pub fn from_stream(stream: TcpStream, address: impl Into<String>) -> io::Result<Self> {
        let metadata = ConnectionMetadata::new(address, "tcp").with_peer(stream.peer_addr()?);
        Ok(Self {
            stream,
            metadata,
            open: true,
        })
    }

    async fn exchange(&mut self, request: WireRequest) -> Result<Bytes, TransportError> {
        write_envelope(&mut self.stream, &request)
            .await
            .map_err(|e| TransportError::Send {
                source: io::Error::other(e),
            })?;

        let reply: WireReply =
            read_envelope(&mut self.stream)
                .await
                .map_err(|e| TransportError::Receive {
                    source: io::Error::other(e),
                })?;

        match reply {
            WireReply::Ok(body) => Ok(Bytes::from(body)),
            WireReply::Err(message) => Err(TransportError::Remote { message }),
        }
    }
}

#[async_trait]
impl Connection for TcpConnection {
    fn metadata(&self) -> &ConnectionMetadata {
        &self.metadata
    }

    #[cfg_attr(
        feature = "observability",
        instrument(skip_all, fields(method = %invocation.method))
    )]
    async fn invoke(
        &mut self,
        ctx: &CallContext,
        invocation: Invocation,
    ) -> Result<Bytes, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }

        let started = tokio::time::Instant::now();
        let result = tokio::select! {
            result = self.exchange(WireRequest::from(invocation)) => result,
            reason = ctx.done() => Err(match reason {
                CallError::Cancelled => TransportError::Cancelled,
                _ => TransportError::Timeout { elapsed: started.elapsed() },
            }),
        };

        if let Err(e) = &result {
            if e.poisons_connection() {
                #[cfg(feature = "observability")]
                debug!(error = %e, "marking TCP connection unusable");
                self.open = false;
            }
        }
        result
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.stream.shutdown().await?;
        Ok(())
    }
}
