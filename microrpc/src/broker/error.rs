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

//! Broker error types.

use thiserror::Error;

/// Errors raised by a [`Broker`](crate::broker::Broker).
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker is not connected.
    #[error("broker is not connected")]
    NotConnected,

    /// The broker could not reach its backend.
    #[error("broker connection failed: {reason}")]
    Connection {
        /// Why the connection failed
        reason: String,
    },

    /// A subscription handler rejected an event.
    #[error("handler for topic {topic} failed: {message}")]
    Handler {
        /// Topic of the event
        topic: String,
        /// Message reported by the handler
        message: String,
    },

    /// The subscription was already removed.
    #[error("no subscription {id} on topic {topic}")]
    UnknownSubscription {
        /// Topic of the subscription
        topic: String,
        /// Identifier of the subscription
        id: u64,
    },
}
