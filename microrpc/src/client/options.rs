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

//! Client-level and call-level configuration.
//!
//! Both levels are plain structs with consuming `with_*` builders. The
//! boxed option functions ([`ClientOption`], [`CallOption`], ...) are pure
//! `Options -> Options` transformations applied in the order given, which is
//! how [`Client::init`](crate::Client::init) and
//! [`Client::call`](crate::Client::call) take their overrides.
//!
//! ```rust
//! use microrpc::client::{self, CallOptions, ClientOptions};
//! use std::time::Duration;
//!
//! let options = ClientOptions::default()
//!     .with_address("127.0.0.1:9000")
//!     .with_retries(3);
//!
//! let call = [client::with_retries(0), client::with_request_timeout(Duration::from_millis(250))]
//!     .into_iter()
//!     .fold(options.call_options.clone(), |opts, apply| apply(opts));
//! assert_eq!(call.retries, 0);
//! assert_eq!(call.request_timeout, Duration::from_millis(250));
//! ```

use crate::backoff::{Backoff, NoBackoff};
use crate::broker::{Broker, MemoryBroker};
use crate::client::{CallWrapper, ClientWrapper, Resolver};
use crate::codec::{CONTENT_TYPE_JSON, Codec, CodecRegistry};
use crate::context::Metadata;
use crate::pool::{DEFAULT_DIAL_TIMEOUT, PoolConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Extra attempts after the first one.
pub const DEFAULT_RETRIES: u32 = 1;

/// Deadline given to calls whose context has none.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client-level option function.
pub type ClientOption = Box<dyn FnOnce(ClientOptions) -> ClientOptions + Send>;

/// Call-level option function.
pub type CallOption = Box<dyn FnOnce(CallOptions) -> CallOptions + Send>;

/// Option function for requests and publications.
pub type RequestOption = Box<dyn FnOnce(RequestOptions) -> RequestOptions + Send>;

/// Option function for [`Client::publish`](crate::Client::publish).
pub type PublishOption = Box<dyn FnOnce(PublishOptions) -> PublishOptions + Send>;

/// Settings for a single call.
///
/// A client holds the defaults in [`ClientOptions::call_options`]; each call
/// starts from a copy and applies its own [`CallOption`]s.
#[derive(Clone)]
pub struct CallOptions {
    /// Extra attempts after the first. `1` means at most two attempts.
    pub retries: u32,
    /// Deadline for calls whose context carries none. For calls that do
    /// carry one, the controller overwrites this with the time remaining.
    pub request_timeout: Duration,
    /// Bound on dialing a new connection. Zero defers to the pool setting.
    pub dial_timeout: Duration,
    /// Target address, bypassing the resolver and the client address.
    pub address: Option<String>,
    /// Attempt-level middleware, outermost first.
    pub call_wrappers: Vec<CallWrapper>,
    /// Delay between attempts.
    pub backoff: Arc<dyn Backoff>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            dial_timeout: DEFAULT_DIAL_TIMEOUT,
            address: None,
            call_wrappers: Vec::new(),
            backoff: Arc::new(NoBackoff),
        }
    }
}

impl CallOptions {
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = timeout;
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Appends an attempt wrapper; it runs inside the ones added earlier.
    pub fn with_call_wrapper(mut self, wrapper: CallWrapper) -> Self {
        self.call_wrappers.push(wrapper);
        self
    }

    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Applies option functions in order.
    pub fn apply(self, options: impl IntoIterator<Item = CallOption>) -> Self {
        options.into_iter().fold(self, |opts, apply| apply(opts))
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("retries", &self.retries)
            .field("request_timeout", &self.request_timeout)
            .field("dial_timeout", &self.dial_timeout)
            .field("address", &self.address)
            .field("call_wrappers", &self.call_wrappers.len())
            .field("backoff", &self.backoff.name())
            .finish()
    }
}

/// Client configuration.
///
/// Built once at construction and changed afterwards only through
/// [`Client::init`](crate::Client::init). [`Client::options`](crate::Client::options)
/// hands out snapshots.
#[derive(Clone)]
pub struct ClientOptions {
    /// Address used when neither the call nor the resolver supplies one.
    pub address: String,
    /// Content type given to new requests and publications.
    pub content_type: String,
    /// Sizing of each per-address pool.
    pub pool: PoolConfig,
    /// Codecs by content type.
    pub codecs: CodecRegistry,
    /// Client-level middleware, outermost first. Applied at construction.
    pub wrappers: Vec<ClientWrapper>,
    /// Defaults for every call.
    pub call_options: CallOptions,
    /// Broker used by [`Client::publish`](crate::Client::publish).
    pub broker: Arc<dyn Broker>,
    /// Optional service-name to address resolution.
    pub resolver: Option<Arc<dyn Resolver>>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            address: String::new(),
            content_type: CONTENT_TYPE_JSON.to_string(),
            pool: PoolConfig::default(),
            codecs: CodecRegistry::with_defaults(),
            wrappers: Vec::new(),
            call_options: CallOptions::default(),
            broker: Arc::new(MemoryBroker::new()),
            resolver: None,
        }
    }
}

impl ClientOptions {
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Registers `codec` for `content_type`, replacing any earlier codec.
    pub fn with_codec(mut self, content_type: impl Into<String>, codec: Arc<dyn Codec>) -> Self {
        self.codecs.register(content_type, codec);
        self
    }

    /// Appends a client wrapper; it sits closer to the concrete client than
    /// the ones added earlier.
    pub fn with_wrapper(mut self, wrapper: ClientWrapper) -> Self {
        self.wrappers.push(wrapper);
        self
    }

    pub fn with_call_options(mut self, call_options: CallOptions) -> Self {
        self.call_options = call_options;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.call_options.retries = retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.call_options.request_timeout = timeout;
        self
    }

    pub fn with_broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.broker = broker;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Applies option functions in order.
    pub fn apply(self, options: impl IntoIterator<Item = ClientOption>) -> Self {
        options.into_iter().fold(self, |opts, apply| apply(opts))
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("address", &self.address)
            .field("content_type", &self.content_type)
            .field("pool", &self.pool)
            .field("codecs", &self.codecs)
            .field("wrappers", &self.wrappers.len())
            .field("call_options", &self.call_options)
            .field("broker", &self.broker.name())
            .field("resolver", &self.resolver)
            .finish()
    }
}

/// Settings applied when a request or publication is created.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client's default content type.
    pub content_type: Option<String>,
}

/// Settings for one publish.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Headers added to the broker message.
    pub headers: Metadata,
}

// Client-level option functions.

/// Sets the static target address.
pub fn address(address: impl Into<String>) -> ClientOption {
    let address = address.into();
    Box::new(move |opts| opts.with_address(address))
}

/// Sets the default content type.
pub fn content_type(content_type: impl Into<String>) -> ClientOption {
    let content_type = content_type.into();
    Box::new(move |opts| opts.with_content_type(content_type))
}

/// Registers a codec, overriding any built-in for the same content type.
pub fn codec(content_type: impl Into<String>, codec: Arc<dyn Codec>) -> ClientOption {
    let content_type = content_type.into();
    Box::new(move |opts| opts.with_codec(content_type, codec))
}

/// Sets how many connections are dialed on warm up.
pub fn pool_initial(initial: usize) -> ClientOption {
    Box::new(move |mut opts| {
        opts.pool = opts.pool.with_initial(initial);
        opts
    })
}

/// Sets the per-address connection bound.
pub fn pool_capacity(capacity: usize) -> ClientOption {
    Box::new(move |mut opts| {
        opts.pool = opts.pool.with_capacity(capacity);
        opts
    })
}

/// Sets how long idle connections stay reusable.
pub fn pool_ttl(ttl: Duration) -> ClientOption {
    Box::new(move |mut opts| {
        opts.pool = opts.pool.with_ttl(ttl);
        opts
    })
}

/// Adds a client wrapper.
pub fn wrap(wrapper: ClientWrapper) -> ClientOption {
    Box::new(move |opts| opts.with_wrapper(wrapper))
}

/// Adds a call wrapper to every call.
pub fn wrap_call(wrapper: CallWrapper) -> ClientOption {
    Box::new(move |mut opts| {
        opts.call_options.call_wrappers.push(wrapper);
        opts
    })
}

/// Sets the default retry count.
pub fn retries(retries: u32) -> ClientOption {
    Box::new(move |opts| opts.with_retries(retries))
}

/// Sets the default request timeout.
pub fn request_timeout(timeout: Duration) -> ClientOption {
    Box::new(move |opts| opts.with_request_timeout(timeout))
}

/// Sets the default retry backoff.
pub fn backoff(backoff: Arc<dyn Backoff>) -> ClientOption {
    Box::new(move |mut opts| {
        opts.call_options.backoff = backoff;
        opts
    })
}

/// Sets the broker used for publishing.
pub fn broker(broker: Arc<dyn Broker>) -> ClientOption {
    Box::new(move |opts| opts.with_broker(broker))
}

/// Sets the address resolver.
pub fn resolver(resolver: Arc<dyn Resolver>) -> ClientOption {
    Box::new(move |opts| opts.with_resolver(resolver))
}

// Call-level option functions.

/// Sends this call to `address`.
pub fn with_address(address: impl Into<String>) -> CallOption {
    let address = address.into();
    Box::new(move |opts| opts.with_address(address))
}

/// Overrides the retry count for this call.
pub fn with_retries(retries: u32) -> CallOption {
    Box::new(move |opts| opts.with_retries(retries))
}

/// Overrides the request timeout for this call.
pub fn with_request_timeout(timeout: Duration) -> CallOption {
    Box::new(move |opts| opts.with_request_timeout(timeout))
}

/// Overrides the dial timeout for this call.
pub fn with_dial_timeout(timeout: Duration) -> CallOption {
    Box::new(move |opts| opts.with_dial_timeout(timeout))
}

/// Adds an attempt wrapper for this call, inside the client's wrappers.
pub fn with_call_wrapper(wrapper: CallWrapper) -> CallOption {
    Box::new(move |opts| opts.with_call_wrapper(wrapper))
}

/// Overrides the backoff for this call.
pub fn with_backoff(backoff: Arc<dyn Backoff>) -> CallOption {
    Box::new(move |opts| opts.with_backoff(backoff))
}

// Request and publish option functions.

/// Overrides the content type of a request or publication.
pub fn with_content_type(content_type: impl Into<String>) -> RequestOption {
    let content_type = content_type.into();
    Box::new(move |mut opts| {
        opts.content_type = Some(content_type);
        opts
    })
}

/// Adds a header to the published broker message.
pub fn with_header(key: impl Into<String>, value: impl Into<String>) -> PublishOption {
    let (key, value) = (key.into(), value.into());
    Box::new(move |mut opts| {
        opts.headers.insert(key, value);
        opts
    })
}
