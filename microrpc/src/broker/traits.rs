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

//! Broker traits and message types.

use crate::broker::BrokerError;
use crate::context::Metadata;
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::sync::Arc;

/// A message as carried by a broker: headers plus an opaque body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrokerMessage {
    /// Message headers, such as `content-type`.
    pub header: Metadata,
    /// Marshalled body.
    pub body: Bytes,
}

impl BrokerMessage {
    /// Creates a message with no headers.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            header: Metadata::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }
}

/// A message delivered to a subscription handler.
#[derive(Debug, Clone)]
pub struct Event {
    topic: String,
    message: BrokerMessage,
}

impl Event {
    /// Creates an event.
    pub fn new(topic: impl Into<String>, message: BrokerMessage) -> Self {
        Self {
            topic: topic.into(),
            message,
        }
    }

    /// Topic the message was published to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The delivered message.
    pub fn message(&self) -> &BrokerMessage {
        &self.message
    }
}

/// Callback invoked for every event on a subscribed topic.
pub type EventHandler = Arc<dyn Fn(&Event) -> Result<(), BrokerError> + Send + Sync>;

/// Options for [`Broker::subscribe`].
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    /// Subscribers sharing a group split the topic's events between them;
    /// subscribers without a group each see every event.
    pub group: Option<String>,
}

impl SubscribeOptions {
    /// Joins the consumer group `group`.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A live subscription.
#[async_trait]
pub trait Subscriber: Send + Sync + fmt::Debug {
    /// Topic this subscription listens on.
    fn topic(&self) -> &str;

    /// Stops delivery to this subscription.
    async fn unsubscribe(&self) -> Result<(), BrokerError>;
}

/// A publish/subscribe message broker.
#[async_trait]
pub trait Broker: Send + Sync + fmt::Debug {
    /// Connects to the backend.
    async fn connect(&self) -> Result<(), BrokerError>;

    /// Disconnects from the backend. Publishing fails until reconnected.
    async fn disconnect(&self) -> Result<(), BrokerError>;

    /// Publishes `message` to `topic`.
    async fn publish(&self, topic: &str, message: BrokerMessage) -> Result<(), BrokerError>;

    /// Registers `handler` for events on `topic`.
    async fn subscribe(
        &self,
        topic: &str,
        handler: EventHandler,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscriber>, BrokerError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}
