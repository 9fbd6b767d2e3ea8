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

//! Integration tests for call and client middleware.

use async_trait::async_trait;
use microrpc::client::{
    self, CallOption, ClientOption, ClientOptions, ClientWrapper, Publication, PublishOption,
    RequestOption, Response, call_wrapper,
};
use microrpc::transport::{Invocation, MemoryDialer, TransportError};
use microrpc::{CallContext, CallError, Client, ClientExt, Payload, Request};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

type Log = Arc<Mutex<Vec<String>>>;

fn marker(name: &'static str, log: &Log) -> client::CallWrapper {
    let log = Arc::clone(log);
    call_wrapper(move |next, ctx, request, options| {
        let log = Arc::clone(&log);
        async move {
            log.lock().push(format!("{name}-pre"));
            let result = next.call(ctx, request, options).await;
            log.lock().push(format!("{name}-post"));
            result
        }
    })
}

fn logging_dialer(log: &Log) -> MemoryDialer {
    let log = Arc::clone(log);
    MemoryDialer::new(move |invocation: Invocation| {
        log.lock().push("call".to_string());
        async move { Ok(invocation.body) }
    })
}

/// A client wrapper that records each call before forwarding it.
struct Recording {
    name: &'static str,
    log: Log,
    inner: Arc<dyn Client>,
}

#[async_trait]
impl Client for Recording {
    fn init(&self, options: Vec<ClientOption>) -> Result<(), CallError> {
        self.inner.init(options)
    }

    fn options(&self) -> ClientOptions {
        self.inner.options()
    }

    fn new_request(
        &self,
        service: &str,
        method: &str,
        body: Arc<dyn Payload>,
        options: Vec<RequestOption>,
    ) -> Request {
        self.inner.new_request(service, method, body, options)
    }

    async fn call(
        &self,
        ctx: &CallContext,
        request: &Request,
        response: &mut dyn Payload,
        options: Vec<CallOption>,
    ) -> Result<(), CallError> {
        self.log.lock().push(self.name.to_string());
        self.inner.call(ctx, request, response, options).await
    }

    fn new_publication(
        &self,
        topic: &str,
        payload: Arc<dyn Payload>,
        options: Vec<RequestOption>,
    ) -> Publication {
        self.inner.new_publication(topic, payload, options)
    }

    async fn publish(
        &self,
        ctx: &CallContext,
        publication: &Publication,
        options: Vec<PublishOption>,
    ) -> Result<(), CallError> {
        self.inner.publish(ctx, publication, options).await
    }

    fn name(&self) -> &str {
        self.name
    }
}

fn recording(name: &'static str, log: &Log) -> ClientWrapper {
    let log = Arc::clone(log);
    Arc::new(move |inner| {
        Arc::new(Recording {
            name,
            log: Arc::clone(&log),
            inner,
        }) as Arc<dyn Client>
    })
}

/// Test that call wrappers nest with the first registered outermost.
#[tokio::test]
async fn test_call_wrappers_run_in_onion_order() {
    let log = Log::default();
    let options = ClientOptions::default()
        .with_address("memory://svc")
        .apply([client::wrap_call(marker("A", &log))]);
    let client = client::memory_client(logging_dialer(&log), options).unwrap();

    let request = client.new_request("svc", "Svc.Do", Arc::new(7u32), vec![]);
    let reply: u32 = client
        .call_as(
            &CallContext::new(),
            &request,
            vec![client::with_call_wrapper(marker("B", &log))],
        )
        .await
        .unwrap();

    assert_eq!(reply, 7);
    assert_eq!(*log.lock(), vec!["A-pre", "B-pre", "call", "B-post", "A-post"]);
}

/// Test that call wrappers run once per attempt.
#[tokio::test]
async fn test_call_wrappers_see_every_attempt() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let counting = call_wrapper(move |next, ctx, request, options| {
        counter.fetch_add(1, Ordering::SeqCst);
        next.call(ctx, request, options)
    });

    let dialer = MemoryDialer::new(|_invocation: Invocation| async {
        Err(TransportError::remote("unavailable"))
    });
    let options = ClientOptions::default()
        .with_address("memory://svc")
        .with_retries(2)
        .apply([client::wrap_call(counting)]);
    let client = client::memory_client(dialer, options).unwrap();

    let request = client.new_request("svc", "Svc.Do", Arc::new(()), vec![]);
    let err = client
        .call_as::<()>(&CallContext::new(), &request, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Transport(TransportError::Remote { .. })));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

/// Test that a call wrapper can answer without reaching the transport.
#[tokio::test]
async fn test_call_wrapper_can_answer_locally() {
    let cached = call_wrapper(|_next, _ctx, request, _options| async move {
        Ok(Response {
            content_type: request.content_type().to_string(),
            body: bytes::Bytes::from_static(b"\"cached\""),
            metadata: Default::default(),
        })
    });
    let dialer = MemoryDialer::echo();
    let options = ClientOptions::default().with_address("memory://svc");
    let client = client::memory_client(dialer.clone(), options).unwrap();

    let request = client.new_request("svc", "Svc.Do", Arc::new("live".to_string()), vec![]);
    let reply: String = client
        .call_as(
            &CallContext::new(),
            &request,
            vec![client::with_call_wrapper(cached)],
        )
        .await
        .unwrap();
    assert_eq!(reply, "cached");
    assert_eq!(dialer.dial_count(), 0);
}

/// Test that client wrappers apply with the first registered outermost.
#[tokio::test]
async fn test_client_wrappers_order() {
    let log = Log::default();
    let options = ClientOptions::default()
        .with_address("memory://svc")
        .apply([
            client::wrap(recording("outer", &log)),
            client::wrap(recording("inner", &log)),
        ]);
    let client = client::memory_client(logging_dialer(&log), options).unwrap();
    assert_eq!(client.name(), "outer");

    let request = client.new_request("svc", "Svc.Do", Arc::new(1u8), vec![]);
    client
        .call_as::<u8>(&CallContext::new(), &request, vec![])
        .await
        .unwrap();
    assert_eq!(*log.lock(), vec!["outer", "inner", "call"]);
}
