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

//! Integration tests for the call pipeline.
//!
//! These run a full client over the in-memory transport and check retry
//! counts, deadline and codec short-circuits, lease release and pool
//! bounds.

use bytes::Bytes;
use microrpc::client::{self, ClientOptions, RpcClient, StaticResolver};
use microrpc::pool::PoolConfig;
use microrpc::transport::{Invocation, MemoryDialer, TransportError};
use microrpc::{CallContext, CallError, Client, ClientExt, ErrorKind, Metadata};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

const ADDRESS: &str = "memory://greeter";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Greeting {
    name: String,
}

fn client_with(dialer: &MemoryDialer, options: ClientOptions) -> Arc<RpcClient> {
    Arc::new(RpcClient::new(Arc::new(dialer.clone()), options.with_address(ADDRESS)).unwrap())
}

/// Echo dialer that fails with a dropped connection until its `succeed_on`th
/// invocation.
fn flaky_dialer(succeed_on: u32, invocations: Arc<AtomicU32>) -> MemoryDialer {
    MemoryDialer::new(move |invocation: Invocation| {
        let n = invocations.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n >= succeed_on {
                Ok(invocation.body)
            } else {
                Err(TransportError::connection_lost("reset by peer"))
            }
        }
    })
}

fn greeting_request(client: &RpcClient) -> microrpc::Request {
    client.new_request(
        "greeter",
        "Say.Hello",
        Arc::new(Greeting {
            name: "ferris".to_string(),
        }),
        vec![],
    )
}

/// Test that a call succeeding on its Nth attempt needs `retries = N - 1`.
#[tokio::test]
async fn test_succeeds_with_exactly_enough_retries() {
    let invocations = Arc::new(AtomicU32::new(0));
    let dialer = flaky_dialer(3, Arc::clone(&invocations));
    let client = client_with(&dialer, ClientOptions::default().with_retries(2));

    let request = greeting_request(&client);
    let reply: Greeting = client
        .call_as(&CallContext::new(), &request, vec![])
        .await
        .unwrap();

    assert_eq!(reply.name, "ferris");
    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    assert_eq!(client.metrics().total_attempts(), 3);
    assert_eq!(client.metrics().total_successes(), 1);
}

/// Test that a call fails after `retries + 1` attempts when that is not enough.
#[tokio::test]
async fn test_fails_after_retry_budget() {
    let invocations = Arc::new(AtomicU32::new(0));
    let dialer = flaky_dialer(3, Arc::clone(&invocations));
    let client = client_with(&dialer, ClientOptions::default());

    let request = greeting_request(&client);
    let mut reply = Greeting::default();
    let err = client
        .call(&CallContext::new(), &request, &mut reply, vec![client::with_retries(1)])
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(invocations.load(Ordering::SeqCst), 2);
    assert_eq!(client.metrics().total_failures(), 1);
    assert_eq!(reply, Greeting::default());
}

/// Test that an expired context fails before any attempt or dial.
#[tokio::test]
async fn test_expired_context_short_circuits() {
    let invocations = Arc::new(AtomicU32::new(0));
    let dialer = flaky_dialer(1, Arc::clone(&invocations));
    let client = client_with(&dialer, ClientOptions::default());
    let request = greeting_request(&client);

    let expired = CallContext::new().with_timeout(Duration::ZERO);
    let err = client
        .call_as::<Greeting>(&expired, &request, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::DeadlineExceeded));

    let cancelled = CallContext::new();
    cancelled.cancel();
    let err = client
        .call_as::<Greeting>(&cancelled, &request, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::Cancelled));

    assert_eq!(invocations.load(Ordering::SeqCst), 0);
    assert_eq!(dialer.dial_count(), 0);
    assert_eq!(client.metrics().total_attempts(), 0);
    assert_eq!(client.metrics().total_deadlines(), 1);
    assert_eq!(client.metrics().total_cancellations(), 1);
}

/// Test that an unknown content type fails without leasing a connection.
#[tokio::test]
async fn test_unknown_content_type_never_leases() {
    let dialer = MemoryDialer::echo();
    let client = client_with(&dialer, ClientOptions::default());

    let request = client.new_request(
        "greeter",
        "Say.Hello",
        Arc::new(Greeting::default()),
        vec![client::with_content_type("text/yaml")],
    );
    assert_eq!(request.content_type(), "text/yaml");

    let err = client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CallError::UnsupportedContentType { ref content_type } if content_type == "text/yaml"
    ));
    assert_eq!(dialer.dial_count(), 0);
    assert!(client.pools().is_empty());
}

/// Test that an invalid request is rejected before any attempt.
#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let dialer = MemoryDialer::echo();
    let client = client_with(&dialer, ClientOptions::default());

    let request = client.new_request("", "Say.Hello", Arc::new(Greeting::default()), vec![]);
    let err = client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(dialer.dial_count(), 0);
}

/// Test that an undecodable reply is not retried.
#[tokio::test]
async fn test_unmarshal_failure_is_not_retried() {
    let invocations = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&invocations);
    let dialer = MemoryDialer::new(move |_invocation: Invocation| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok(Bytes::from_static(b"not json")) }
    });
    let client = client_with(&dialer, ClientOptions::default().with_retries(3));

    let request = greeting_request(&client);
    let err = client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Deserialization);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

/// Test that a failed dial is retried like any connection failure.
#[tokio::test]
async fn test_dial_failure_is_retried() {
    let dialer = MemoryDialer::echo();
    dialer.fail_next_dials(1);
    let client = client_with(&dialer, ClientOptions::default().with_retries(1));

    let request = greeting_request(&client);
    let reply: Greeting = client
        .call_as(&CallContext::new(), &request, vec![])
        .await
        .unwrap();
    assert_eq!(reply.name, "ferris");
    assert_eq!(dialer.failed_dial_count(), 1);
    assert_eq!(dialer.dial_count(), 1);
}

/// Test that an attempt abandoned at the deadline still releases its lease.
#[tokio::test(start_paused = true)]
async fn test_abandoned_attempt_releases_connection() {
    let dialer = MemoryDialer::new(|invocation: Invocation| async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(invocation.body)
    });
    let client = client_with(&dialer, ClientOptions::default().with_retries(0));
    let request = greeting_request(&client);

    let ctx = CallContext::new().with_timeout(Duration::from_millis(50));
    let err = client
        .call_as::<Greeting>(&ctx, &request, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::DeadlineExceeded));

    tokio::time::sleep(Duration::from_millis(500)).await;
    let pool = client.pools().find(ADDRESS).unwrap();
    assert_eq!(pool.leased_count(), 0);
    assert_eq!(dialer.live_connections(), 0);
}

/// Test that healthy connections are reused across calls.
#[tokio::test]
async fn test_connections_are_reused() {
    let dialer = MemoryDialer::echo();
    let client = client_with(&dialer, ClientOptions::default());
    let request = greeting_request(&client);

    for _ in 0..3 {
        client
            .call_as::<Greeting>(&CallContext::new(), &request, vec![])
            .await
            .unwrap();
    }
    assert_eq!(dialer.dial_count(), 1);
    let pool = client.pools().find(ADDRESS).unwrap();
    assert_eq!(pool.metrics().total_reuses(), 2);
    assert_eq!(pool.idle_count(), 1);
}

/// Test that a connection idle longer than the TTL is replaced.
#[tokio::test(start_paused = true)]
async fn test_idle_connection_past_ttl_is_redialed() {
    let dialer = MemoryDialer::echo();
    let options = ClientOptions::default()
        .with_pool(PoolConfig::default().with_ttl(Duration::from_millis(100)));
    let client = client_with(&dialer, options);
    let request = greeting_request(&client);

    client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap();

    assert_eq!(dialer.dial_count(), 2);
    let pool = client.pools().find(ADDRESS).unwrap();
    assert_eq!(pool.metrics().total_evictions(), 1);
}

/// Test that five concurrent callers share a pool of two connections.
#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_respect_capacity() {
    let dialer = MemoryDialer::new(|invocation: Invocation| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(invocation.body)
    });
    let options =
        ClientOptions::default().with_pool(PoolConfig::default().with_capacity(2));
    let client: Arc<dyn Client> =
        client::new_client(Arc::new(dialer.clone()), options.with_address(ADDRESS)).unwrap();

    let mut handles = Vec::new();
    for i in 0..5 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            let body = Greeting {
                name: format!("caller-{i}"),
            };
            let request = client.new_request("greeter", "Say.Hello", Arc::new(body), vec![]);
            client
                .call_as::<Greeting>(&CallContext::new(), &request, vec![])
                .await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let reply = handle.await.unwrap().unwrap();
        assert_eq!(reply.name, format!("caller-{i}"));
    }

    assert!(dialer.peak_connections() <= 2);
    assert!(dialer.dial_count() >= 2);
    assert!(dialer.dial_count() <= 5);
}

/// Test that the call override beats the resolver, which beats the static
/// address.
#[tokio::test]
async fn test_address_resolution_order() {
    let dialer = MemoryDialer::echo();
    let resolver = StaticResolver::new().with_route("greeter", "memory://resolved");
    let client = client_with(
        &dialer,
        ClientOptions::default().with_resolver(Arc::new(resolver)),
    );
    let request = greeting_request(&client);

    client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap();
    assert!(client.pools().find("memory://resolved").is_some());
    assert!(client.pools().find(ADDRESS).is_none());

    client
        .call_as::<Greeting>(
            &CallContext::new(),
            &request,
            vec![client::with_address("memory://override")],
        )
        .await
        .unwrap();
    assert!(client.pools().find("memory://override").is_some());
}

/// Test that a client without any address rejects calls.
#[tokio::test]
async fn test_missing_address_is_invalid() {
    let dialer = MemoryDialer::echo();
    let client = RpcClient::new(Arc::new(dialer.clone()), ClientOptions::default()).unwrap();
    let request = greeting_request(&client);

    let err = client
        .call_as::<Greeting>(&CallContext::new(), &request, vec![])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(dialer.dial_count(), 0);
}

/// Test that every attempt carries the endpoint and call headers.
#[tokio::test]
async fn test_invocation_carries_endpoint_and_headers() {
    let seen: Arc<Mutex<Option<(String, Metadata)>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    let dialer = MemoryDialer::new(move |invocation: Invocation| {
        *sink.lock() = Some((invocation.method.clone(), invocation.metadata.clone()));
        async move { Ok(invocation.body) }
    });
    let client = client_with(&dialer, ClientOptions::default());
    let request = greeting_request(&client);

    let ctx = CallContext::new()
        .with_timeout(Duration::from_secs(2))
        .with_metadata("x-request-id", "abc");
    client.call_as::<Greeting>(&ctx, &request, vec![]).await.unwrap();

    let (method, metadata) = seen.lock().clone().unwrap();
    assert_eq!(method, "/greeter.Say/Hello");
    assert_eq!(
        metadata.get(client::CONTENT_TYPE_HEADER).map(String::as_str),
        Some("application/json")
    );
    assert_eq!(metadata.get("x-request-id").map(String::as_str), Some("abc"));
    let timeout: u128 = metadata[client::TIMEOUT_HEADER].parse().unwrap();
    assert!(timeout > 0);
    assert!(timeout <= Duration::from_secs(2).as_nanos());
}

/// Test that `init` reconfigures the client and rejects invalid pools.
#[tokio::test]
async fn test_init_updates_options() {
    let dialer = MemoryDialer::echo();
    let client = client_with(&dialer, ClientOptions::default());

    client
        .init(vec![client::retries(4), client::content_type("application/postcard")])
        .unwrap();
    let options = client.options();
    assert_eq!(options.call_options.retries, 4);
    assert_eq!(options.content_type, "application/postcard");

    let request = greeting_request(&client);
    assert_eq!(request.content_type(), "application/postcard");
    let reply: Greeting = client
        .call_as(&CallContext::new(), &request, vec![])
        .await
        .unwrap();
    assert_eq!(reply.name, "ferris");

    let err = client.init(vec![client::pool_capacity(0)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(client.options().pool.capacity, PoolConfig::default().capacity);
}

/// Test that warm up pre-dials the configured number of connections.
#[tokio::test]
async fn test_warm_up_prefills_pool() {
    let dialer = MemoryDialer::echo();
    let options = ClientOptions::default()
        .with_pool(PoolConfig::default().with_capacity(4).with_initial(3));
    let client = client_with(&dialer, options);

    let dialed = client.warm_up(&CallContext::new()).await.unwrap();
    assert_eq!(dialed, 3);
    assert_eq!(client.pools().find(ADDRESS).unwrap().idle_count(), 3);

    client.close().await;
    assert!(client.pools().is_empty());
}
