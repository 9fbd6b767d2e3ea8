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

//! Publish/subscribe brokers.
//!
//! The client publishes [`Publication`](crate::client::Publication)s through
//! a [`Broker`]. Brokers only see marshalled bytes plus headers; the client
//! marshals the payload with its codec registry before handing it over.
//!
//! [`MemoryBroker`] delivers in-process and is the client's default.

mod error;
mod memory;
mod traits;

pub use self::error::BrokerError;
pub use self::memory::{MemoryBroker, MemorySubscriber};
pub use self::traits::{
    Broker, BrokerMessage, Event, EventHandler, SubscribeOptions, Subscriber,
};
