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

//! Transport layer abstractions.
//!
//! The client never talks to sockets directly. It asks a [`Dialer`] for new
//! connections and sends each call as one [`Invocation`] over a leased
//! [`Connection`]. Two transports ship with the crate:
//!
//! - [`TcpDialer`]: length-prefixed postcard envelopes over TCP
//! - [`MemoryDialer`]: in-process handler closure, for tests and embedding
//!
//! # Writing a transport
//!
//! A transport implements [`Dialer`] to open connections and [`Connection`]
//! to carry exchanges. The pool owns connections between calls, decides
//! when they are reused, and closes them through [`Connection::close`].
//!
//! ```rust
//! use microrpc::CallContext;
//! use microrpc::transport::{Dialer, Invocation, MemoryDialer};
//! use bytes::Bytes;
//! use std::collections::HashMap;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dialer = MemoryDialer::new(|invocation: Invocation| async move {
//!     Ok(Bytes::from(invocation.method.into_bytes()))
//! });
//!
//! let mut conn = dialer.dial("memory://local").await?;
//! let reply = conn
//!     .invoke(
//!         &CallContext::new(),
//!         Invocation {
//!             method: "/Echo/Say".to_string(),
//!             content_type: "application/json".to_string(),
//!             metadata: HashMap::new(),
//!             body: Bytes::new(),
//!         },
//!     )
//!     .await?;
//! assert_eq!(&reply[..], b"/Echo/Say");
//! # Ok(())
//! # }
//! ```

mod error;
mod memory;
mod tcp;
mod traits;
mod types;

pub use self::error::TransportError;
pub use self::memory::{MemoryConnection, MemoryDialer};
pub use self::tcp::{TcpConnection, TcpDialer, WireReply, WireRequest};
pub use self::traits::{Connection, Dialer};
pub use self::types::{ConnectionId, ConnectionMetadata, Invocation};
