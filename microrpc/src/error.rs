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

//! Top-level error type for client calls.
//!
//! Failures are layered the same way the client is:
//!
//! 1. **Transport**: the connection failed mid-call ([`TransportError`])
//! 2. **Pool**: no connection could be leased ([`PoolError`])
//! 3. **Call**: argument, codec, deadline and cancellation failures
//!
//! [`CallError`] composes these layers. The call controller consults
//! [`CallError::is_retryable`] after every failed attempt: connection level
//! failures are worth another attempt, everything else is returned at once.
//!
//! # Examples
//!
//! ```rust
//! use microrpc::transport::TransportError;
//! use microrpc::{CallError, ErrorKind};
//!
//! let err: CallError = TransportError::Closed.into();
//! assert_eq!(err.kind(), ErrorKind::Transport);
//! assert!(err.is_retryable());
//!
//! assert!(!CallError::DeadlineExceeded.is_retryable());
//! ```

use crate::broker::BrokerError;
use crate::codec::{DeserializationError, SerializationError};
use crate::pool::PoolError;
use crate::transport::TransportError;
use thiserror::Error;

/// Flat classification of a [`CallError`], convenient for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request or options were malformed.
    InvalidArgument,
    /// No codec is registered for the content type.
    UnsupportedContentType,
    /// The call deadline passed.
    DeadlineExceeded,
    /// The caller cancelled the call.
    Cancelled,
    /// A new connection could not be established.
    DialFailed,
    /// The pool had no free connection before the call finished.
    PoolExhausted,
    /// The pool was shut down.
    PoolClosed,
    /// The connection failed during the exchange.
    Transport,
    /// The request body could not be marshalled.
    Serialization,
    /// The response body could not be unmarshalled.
    Deserialization,
    /// The message broker rejected a publication.
    Broker,
    /// A bug or panic inside the client.
    Internal,
}

/// Errors returned by [`Client::call`](crate::Client::call) and
/// [`Client::publish`](crate::Client::publish).
#[derive(Debug, Error)]
pub enum CallError {
    /// The request or call options were malformed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong.
        reason: String,
    },

    /// No codec is registered for the request's content type.
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType {
        /// The content type that had no codec.
        content_type: String,
    },

    /// The call deadline passed before a response arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the call.
    #[error("call cancelled")]
    Cancelled,

    /// Leasing a pooled connection failed.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// The connection failed during the exchange.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Marshalling the request body failed.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// Unmarshalling the response body failed.
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// Publishing to the broker failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// An unexpected failure inside the client, such as a panicking attempt.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl CallError {
    /// Shorthand for [`CallError::InvalidArgument`].
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// The flat classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::UnsupportedContentType { .. } => ErrorKind::UnsupportedContentType,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Pool(PoolError::DialFailed { .. }) => ErrorKind::DialFailed,
            Self::Pool(PoolError::Exhausted { .. }) => ErrorKind::PoolExhausted,
            Self::Pool(PoolError::Closed { .. }) => ErrorKind::PoolClosed,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Serialization(_) => ErrorKind::Serialization,
            Self::Deserialization(_) => ErrorKind::Deserialization,
            Self::Broker(_) => ErrorKind::Broker,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns `true` if another attempt might succeed.
    ///
    /// Every failure to lease a connection is retryable, including a closed
    /// pool: the next attempt gets a fresh pool for the same address. So are
    /// transport failures. Argument, codec, deadline and cancellation
    /// failures would fail the same way again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Pool(_) | Self::Transport(_) => true,
            Self::InvalidArgument { .. }
            | Self::UnsupportedContentType { .. }
            | Self::DeadlineExceeded
            | Self::Cancelled
            | Self::Serialization(_)
            | Self::Deserialization(_)
            | Self::Broker(_)
            | Self::Internal { .. } => false,
        }
    }

    /// Returns `true` if the call ran out of time or was cancelled.
    #[must_use]
    pub const fn is_context_error(&self) -> bool {
        matches!(self, Self::DeadlineExceeded | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_pool_errors_map_to_kinds() {
        let dial: CallError = PoolError::DialFailed {
            address: "127.0.0.1:1".to_string(),
            source: TransportError::Closed,
        }
        .into();
        assert_eq!(dial.kind(), ErrorKind::DialFailed);
        assert!(dial.is_retryable());

        let exhausted: CallError = PoolError::Exhausted {
            address: "a".to_string(),
        }
        .into();
        assert_eq!(exhausted.kind(), ErrorKind::PoolExhausted);
        assert!(exhausted.is_retryable());

        let closed: CallError = PoolError::Closed {
            address: "a".to_string(),
        }
        .into();
        assert_eq!(closed.kind(), ErrorKind::PoolClosed);
        assert!(closed.is_retryable());
    }

    #[test]
    fn test_transport_errors_are_retryable() {
        let err: CallError = TransportError::Receive {
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "eof"),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_terminal_errors() {
        for err in [
            CallError::invalid_argument("empty service"),
            CallError::UnsupportedContentType {
                content_type: "text/plain".to_string(),
            },
            CallError::DeadlineExceeded,
            CallError::Cancelled,
            CallError::Serialization(SerializationError::new("bad")),
            CallError::Deserialization(DeserializationError::new("bad")),
            CallError::Internal {
                message: "panic".to_string(),
            },
        ] {
            assert!(!err.is_retryable(), "{err} should not be retried");
        }
    }

    #[test]
    fn test_context_errors() {
        assert!(CallError::DeadlineExceeded.is_context_error());
        assert!(CallError::Cancelled.is_context_error());
        assert!(!CallError::invalid_argument("x").is_context_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CallError::invalid_argument("service is empty").to_string(),
            "invalid argument: service is empty"
        );
        assert_eq!(
            CallError::UnsupportedContentType {
                content_type: "text/xml".to_string()
            }
            .to_string(),
            "unsupported content type: text/xml"
        );
    }
}
