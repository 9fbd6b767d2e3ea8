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

//! Errors raised while dialing or using a connection.
//!
//! Whether a failure leaves the connection usable matters more to the pool
//! than the failure itself: see [`TransportError::poisons_connection`].

use std::io;
use std::time::Duration;
use thiserror::Error;

/// A dial or exchange failure.
///
/// ```rust
/// use microrpc::transport::TransportError;
/// use std::io;
///
/// let refused = TransportError::Dial {
///     address: "127.0.0.1:7000".to_string(),
///     source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
/// };
/// assert!(!refused.poisons_connection());
///
/// let remote = TransportError::remote("no such method");
/// assert!(!remote.poisons_connection());
/// assert!(TransportError::connection_lost("peer hung up").poisons_connection());
/// ```
#[derive(Debug, Error)]
pub enum TransportError {
    /// No connection could be opened to `address`.
    #[error("dial {address}: {source}")]
    Dial {
        address: String,
        #[source]
        source: io::Error,
    },

    /// The peer went away in the middle of an exchange.
    #[error("connection lost: {reason}")]
    ConnectionLost {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Writing the request failed.
    #[error("send failed: {source}")]
    Send {
        #[source]
        source: io::Error,
    },

    /// Reading the reply failed.
    #[error("receive failed: {source}")]
    Receive {
        #[source]
        source: io::Error,
    },

    /// The exchange or dial ran out of time.
    #[error("timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The call was cancelled while the exchange was in flight.
    #[error("exchange cancelled")]
    Cancelled,

    /// The peer sent something that does not follow the wire protocol.
    #[error("protocol violation: {reason}")]
    Protocol { reason: String },

    /// The remote handler reported a failure.
    ///
    /// The connection itself is healthy and can be reused.
    #[error("remote error: {message}")]
    Remote { message: String },

    /// No address could be found for a service.
    #[error("no address for service {service}")]
    Unresolved { service: String },

    /// The connection was already closed.
    #[error("connection closed")]
    Closed,

    /// Socket setup failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Shorthand for [`TransportError::ConnectionLost`] without a source.
    pub fn connection_lost(reason: impl Into<String>) -> Self {
        Self::ConnectionLost {
            reason: reason.into(),
            source: None,
        }
    }

    /// Shorthand for [`TransportError::Remote`].
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    /// Returns `true` if the connection that produced this error must not be
    /// handed out again.
    ///
    /// A half-finished exchange leaves unread bytes on the stream, so
    /// anything that interrupted one poisons the connection. Errors that
    /// happen before or after the exchange do not.
    #[must_use]
    pub fn poisons_connection(&self) -> bool {
        match self {
            Self::ConnectionLost { .. }
            | Self::Send { .. }
            | Self::Receive { .. }
            | Self::Timeout { .. }
            | Self::Cancelled
            | Self::Protocol { .. }
            | Self::Closed
            | Self::Io(_) => true,
            Self::Dial { .. } | Self::Remote { .. } | Self::Unresolved { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupted_exchange_poisons_connection() {
        let eof = || io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(TransportError::Send { source: eof() }.poisons_connection());
        assert!(TransportError::Receive { source: eof() }.poisons_connection());
        assert!(TransportError::Cancelled.poisons_connection());
        assert!(
            TransportError::Timeout {
                elapsed: Duration::from_millis(5)
            }
            .poisons_connection()
        );
    }

    #[test]
    fn test_remote_failure_keeps_connection() {
        let err = TransportError::remote("handler failed");
        assert!(!err.poisons_connection());
        assert_eq!(err.to_string(), "remote error: handler failed");
    }

    #[test]
    fn test_unresolved_display() {
        let err = TransportError::Unresolved {
            service: "greeter".to_string(),
        };
        assert_eq!(err.to_string(), "no address for service greeter");
        assert!(!err.poisons_connection());
    }

    #[test]
    fn test_io_conversion() {
        let err: TransportError = io::Error::new(io::ErrorKind::AddrInUse, "busy").into();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
