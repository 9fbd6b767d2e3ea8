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

//! Pool error types.

use crate::transport::TransportError;
use thiserror::Error;

/// Errors returned when leasing a connection.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A new connection could not be dialed.
    #[error("failed to dial {address}: {source}")]
    DialFailed {
        /// Address the pool dials
        address: String,
        /// Why the dial failed
        #[source]
        source: TransportError,
    },

    /// Every connection was leased and none came back before the call's
    /// context finished.
    #[error("connection pool for {address} exhausted")]
    Exhausted {
        /// Address the pool dials
        address: String,
    },

    /// The pool was closed.
    #[error("connection pool for {address} is closed")]
    Closed {
        /// Address the pool dials
        address: String,
    },
}
