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

//! In-process broker.

use crate::broker::{
    Broker, BrokerError, BrokerMessage, Event, EventHandler, SubscribeOptions, Subscriber,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

#[cfg(feature = "observability")]
use tracing::{debug, warn};

struct Subscription {
    id: u64,
    group: Option<String>,
    handler: EventHandler,
}

#[derive(Default)]
struct Inner {
    connected: AtomicBool,
    next_id: AtomicU64,
    published: AtomicU64,
    delivered: AtomicU64,
    subscriptions: RwLock<HashMap<String, Vec<Subscription>>>,
    cursors: RwLock<HashMap<(String, String), Arc<AtomicUsize>>>,
}

/// A broker that delivers messages to subscribers in the same process.
///
/// Handlers run synchronously inside [`Broker::publish`]. A handler error is
/// logged and does not stop delivery to the remaining subscribers. Within a
/// consumer group events are handed out round-robin.
///
/// The broker starts disconnected; call [`Broker::connect`] first.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<Inner>,
}

impl MemoryBroker {
    /// Creates a disconnected broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a broker that is already connected.
    pub fn connected() -> Self {
        let broker = Self::new();
        broker.inner.connected.store(true, Ordering::Release);
        broker
    }

    /// Whether the broker is connected.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .subscriptions
            .read()
            .get(topic)
            .map_or(0, Vec::len)
    }

    /// Messages accepted by [`Broker::publish`].
    pub fn published_count(&self) -> u64 {
        self.inner.published.load(Ordering::Relaxed)
    }

    /// Handler invocations that returned `Ok`.
    pub fn delivered_count(&self) -> u64 {
        self.inner.delivered.load(Ordering::Relaxed)
    }

    fn cursor(&self, topic: &str, group: &str) -> Arc<AtomicUsize> {
        let key = (topic.to_string(), group.to_string());
        if let Some(cursor) = self.inner.cursors.read().get(&key) {
            return Arc::clone(cursor);
        }
        Arc::clone(self.inner.cursors.write().entry(key).or_default())
    }

    /// Picks the handlers that receive one event on `topic`.
    fn recipients(&self, topic: &str) -> Vec<EventHandler> {
        let subscriptions = self.inner.subscriptions.read();
        let Some(subs) = subscriptions.get(topic) else {
            return Vec::new();
        };

        let mut handlers = Vec::new();
        let mut groups: HashMap<&str, Vec<&EventHandler>> = HashMap::new();
        for sub in subs {
            match &sub.group {
                Some(group) => groups.entry(group.as_str()).or_default().push(&sub.handler),
                None => handlers.push(Arc::clone(&sub.handler)),
            }
        }
        for (group, members) in groups {
            let next = self.cursor(topic, group).fetch_add(1, Ordering::Relaxed);
            handlers.push(Arc::clone(members[next % members.len()]));
        }
        handlers
    }

    fn remove(&self, topic: &str, id: u64) -> Result<(), BrokerError> {
        let mut subscriptions = self.inner.subscriptions.write();
        let subs = subscriptions
            .get_mut(topic)
            .ok_or_else(|| BrokerError::UnknownSubscription {
                topic: topic.to_string(),
                id,
            })?;
        let before = subs.len();
        subs.retain(|s| s.id != id);
        if subs.len() == before {
            return Err(BrokerError::UnknownSubscription {
                topic: topic.to_string(),
                id,
            });
        }
        if subs.is_empty() {
            subscriptions.remove(topic);
        }
        Ok(())
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn connect(&self) -> Result<(), BrokerError> {
        self.inner.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), BrokerError> {
        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }

    async fn publish(&self, topic: &str, message: BrokerMessage) -> Result<(), BrokerError> {
        if !self.is_connected() {
            return Err(BrokerError::NotConnected);
        }
        self.inner.published.fetch_add(1, Ordering::Relaxed);

        let handlers = self.recipients(topic);
        #[cfg(feature = "observability")]
        debug!(topic, subscribers = handlers.len(), "publishing event");

        let event = Event::new(topic, message);
        for handler in handlers {
            match handler(&event) {
                Ok(()) => {
                    self.inner.delivered.fetch_add(1, Ordering::Relaxed);
                }
                Err(_e) => {
                    #[cfg(feature = "observability")]
                    warn!(topic, error = %_e, "subscriber rejected event");
                }
            }
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &str,
        handler: EventHandler,
        options: SubscribeOptions,
    ) -> Result<Box<dyn Subscriber>, BrokerError> {
        if !self.is_connected() {
            return Err(BrokerError::NotConnected);
        }
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscriptions
            .write()
            .entry(topic.to_string())
            .or_default()
            .push(Subscription {
                id,
                group: options.group,
                handler,
            });
        Ok(Box::new(MemorySubscriber {
            broker: self.clone(),
            topic: topic.to_string(),
            id,
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl fmt::Debug for MemoryBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBroker")
            .field("connected", &self.is_connected())
            .field("topics", &self.inner.subscriptions.read().len())
            .finish()
    }
}

/// Handle returned by [`MemoryBroker`] subscriptions.
pub struct MemorySubscriber {
    broker: MemoryBroker,
    topic: String,
    id: u64,
}

#[async_trait]
impl Subscriber for MemorySubscriber {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn unsubscribe(&self) -> Result<(), BrokerError> {
        self.broker.remove(&self.topic, self.id)
    }
}

impl fmt::Debug for MemorySubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySubscriber")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn collector() -> (EventHandler, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: EventHandler = Arc::new(move |event: &Event| {
            sink.lock()
                .push(String::from_utf8_lossy(&event.message().body).into_owned());
            Ok(())
        });
        (handler, seen)
    }

    #[tokio::test]
    async fn test_publish_requires_connect() {
        let broker = MemoryBroker::new();
        let err = broker
            .publish("orders", BrokerMessage::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrokerError::NotConnected));

        broker.connect().await.unwrap();
        broker.publish("orders", BrokerMessage::new("x")).await.unwrap();
        assert_eq!(broker.published_count(), 1);
        assert_eq!(broker.delivered_count(), 0);
    }

    #[tokio::test]
    async fn test_fan_out_and_unsubscribe() {
        let broker = MemoryBroker::connected();
        let (h1, seen1) = collector();
        let (h2, seen2) = collector();
        let sub1 = broker
            .subscribe("orders", h1, SubscribeOptions::default())
            .await
            .unwrap();
        let _sub2 = broker
            .subscribe("orders", h2, SubscribeOptions::default())
            .await
            .unwrap();
        assert_eq!(broker.subscriber_count("orders"), 2);

        broker.publish("orders", BrokerMessage::new("a")).await.unwrap();
        sub1.unsubscribe().await.unwrap();
        broker.publish("orders", BrokerMessage::new("b")).await.unwrap();

        assert_eq!(*seen1.lock(), vec!["a"]);
        assert_eq!(*seen2.lock(), vec!["a", "b"]);
        assert!(matches!(
            sub1.unsubscribe().await,
            Err(BrokerError::UnknownSubscription { .. })
        ));
    }

    #[tokio::test]
    async fn test_group_round_robin() {
        let broker = MemoryBroker::connected();
        let (h1, seen1) = collector();
        let (h2, seen2) = collector();
        let opts = SubscribeOptions::default().with_group("workers");
        broker.subscribe("jobs", h1, opts.clone()).await.unwrap();
        broker.subscribe("jobs", h2, opts).await.unwrap();

        for i in 0..4 {
            broker
                .publish("jobs", BrokerMessage::new(i.to_string()))
                .await
                .unwrap();
        }
        assert_eq!(seen1.lock().len(), 2);
        assert_eq!(seen2.lock().len(), 2);
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_delivery() {
        let broker = MemoryBroker::connected();
        let failing: EventHandler = Arc::new(|event: &Event| {
            Err(BrokerError::Handler {
                topic: event.topic().to_string(),
                message: "nope".to_string(),
            })
        });
        let (ok, seen) = collector();
        broker
            .subscribe("t", failing, SubscribeOptions::default())
            .await
            .unwrap();
        broker.subscribe("t", ok, SubscribeOptions::default()).await.unwrap();

        broker.publish("t", BrokerMessage::new("z")).await.unwrap();
        assert_eq!(*seen.lock(), vec!["z"]);
        assert_eq!(broker.delivered_count(), 1);
    }
}
