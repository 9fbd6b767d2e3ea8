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

//! Transport-level identifier and descriptor types.

use crate::context::Metadata;
use bytes::Bytes;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;

/// Process-unique identifier of a dialed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocates the next identifier.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// What a pool and its logs know about a connection.
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    pub id: ConnectionId,
    /// Address the connection was dialed to.
    pub address: String,
    /// Name of the dialer that opened it, e.g. `"tcp"`.
    pub transport: &'static str,
    /// Remote socket address, for network transports.
    pub peer: Option<SocketAddr>,
    pub dialed_at: Instant,
}

impl ConnectionMetadata {
    /// Describes a connection dialed just now.
    pub fn new(address: impl Into<String>, transport: &'static str) -> Self {
        Self {
            id: ConnectionId::next(),
            address: address.into(),
            transport,
            peer: None,
            dialed_at: Instant::now(),
        }
    }

    pub fn with_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }
}

/// One outbound exchange handed to a [`Connection`](crate::transport::Connection).
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Fully qualified method, e.g. `/greeter.Greeter/Hello`.
    pub method: String,
    /// Content type of `body`.
    pub content_type: String,
    /// Outgoing headers, including `timeout` and `x-content-type`.
    pub metadata: Metadata,
    /// Marshalled request body.
    pub body: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_connection_gets_a_new_id() {
        let a = ConnectionMetadata::new("127.0.0.1:9000", "tcp");
        let b = ConnectionMetadata::new("127.0.0.1:9000", "tcp");
        assert!(a.id < b.id);
        assert!(a.id.to_string().starts_with("conn-"));
    }

    #[test]
    fn test_peer_is_optional() {
        let peer: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let metadata = ConnectionMetadata::new("localhost:9000", "tcp").with_peer(peer);
        assert_eq!(metadata.peer, Some(peer));
        assert_eq!(metadata.transport, "tcp");
        assert!(ConnectionMetadata::new("local", "memory").peer.is_none());
    }
}
