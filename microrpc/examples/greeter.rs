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

//! # Greeter Example
//!
//! Runs a tiny server speaking the framed TCP protocol and calls it through a
//! pooled client with retries, a call wrapper and a TOML configuration.
//!
//! ## What This Example Shows
//!
//! - Loading client settings from TOML
//! - Adding a logging call wrapper
//! - Typed calls with `ClientExt::call_as`
//! - Reading pool and call counters afterwards
//!
//! ## Running This Example
//!
//! ```bash
//! RUST_LOG=microrpc=debug cargo run --example greeter
//! ```

use microrpc::client::{self, ClientSettings, RpcClient, call_wrapper, compose_client};
use microrpc::codec::framing::{read_envelope, write_envelope};
use microrpc::transport::{TcpDialer, WireReply, WireRequest};
use microrpc::{CallContext, Client, ClientExt};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HelloRequest {
    name: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HelloReply {
    message: String,
}

async fn run_server(listener: TcpListener) {
    while let Ok((mut stream, peer)) = listener.accept().await {
        tokio::spawn(async move {
            println!("server: accepted {peer}");
            while let Ok(request) = read_envelope::<_, WireRequest>(&mut stream).await {
                let reply = match serde_json::from_slice::<HelloRequest>(&request.body) {
                    Ok(hello) => {
                        let reply = HelloReply {
                            message: format!("Hello, {}!", hello.name),
                        };
                        match serde_json::to_vec(&reply) {
                            Ok(body) => WireReply::Ok(body),
                            Err(e) => WireReply::Err(e.to_string()),
                        }
                    }
                    Err(e) => WireReply::Err(format!("bad request: {e}")),
                };
                if write_envelope(&mut stream, &reply).await.is_err() {
                    break;
                }
            }
        });
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    tokio::spawn(run_server(listener));

    let settings = ClientSettings::from_toml_str(&format!(
        r#"
        address = "{address}"
        retries = 2
        request_timeout_ms = 2000

        [pool]
        capacity = 4
        initial = 1
        "#
    ))?;

    let timing = call_wrapper(|next, ctx, request, options| async move {
        let started = tokio::time::Instant::now();
        let endpoint = request.endpoint();
        let result = next.call(ctx, request, options).await;
        println!("client: {endpoint} took {:?}", started.elapsed());
        result
    });

    let options = settings.into_options().apply([client::wrap_call(timing)]);
    let rpc = Arc::new(RpcClient::new(Arc::new(TcpDialer::new()), options.clone())?);
    rpc.warm_up(&CallContext::new()).await?;
    let greeter: Arc<dyn Client> = compose_client(rpc.clone(), &options.wrappers);

    for name in ["Ferris", "Corro", "Clippy"] {
        let request = greeter.new_request(
            "greeter",
            "Say.Hello",
            Arc::new(HelloRequest {
                name: name.to_string(),
            }),
            vec![],
        );
        let ctx = CallContext::new().with_timeout(Duration::from_secs(1));
        let reply: HelloReply = greeter.call_as(&ctx, &request, vec![]).await?;
        println!("client: {}", reply.message);
    }

    let metrics = rpc.metrics();
    println!(
        "calls: {} succeeded, {} attempts, average latency {:?}",
        metrics.total_successes(),
        metrics.total_attempts(),
        metrics.average_latency()
    );
    if let Some(pool) = rpc.pools().find(&address.to_string()) {
        println!(
            "pool: {} dials, {} reuses",
            pool.metrics().total_dials(),
            pool.metrics().total_reuses()
        );
    }

    rpc.close().await;
    Ok(())
}
