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

//! Requests and publications.

use crate::CallError;
use crate::codec::Payload;
use std::fmt;
use std::sync::Arc;

/// Formats `method` as an RPC path.
///
/// A `Type.Method` name becomes `/service.Type/Method`, or `/Type/Method`
/// when `service` is empty. Anything else, including names that already
/// start with `/`, is used verbatim.
///
/// ```rust
/// use microrpc::client::method_to_rpc;
///
/// assert_eq!(method_to_rpc("greeter", "Say.Hello"), "/greeter.Say/Hello");
/// assert_eq!(method_to_rpc("", "Say.Hello"), "/Say/Hello");
/// assert_eq!(method_to_rpc("greeter", "/pkg.Say/Hello"), "/pkg.Say/Hello");
/// assert_eq!(method_to_rpc("greeter", "a.b.c"), "a.b.c");
/// ```
pub fn method_to_rpc(service: &str, method: &str) -> String {
    if method.is_empty() || method.starts_with('/') {
        return method.to_string();
    }

    let parts: Vec<&str> = method.split('.').collect();
    let [kind, name] = parts.as_slice() else {
        return method.to_string();
    };

    if service.is_empty() {
        format!("/{kind}/{name}")
    } else {
        format!("/{service}.{kind}/{name}")
    }
}

/// One call's target and body.
///
/// Requests are immutable once built and cheap to clone: the body is shared,
/// so every attempt of a retried call sees the same value.
#[derive(Clone)]
pub struct Request {
    service: String,
    method: String,
    content_type: String,
    body: Arc<dyn Payload>,
}

impl Request {
    pub fn new(
        service: impl Into<String>,
        method: impl Into<String>,
        content_type: impl Into<String>,
        body: Arc<dyn Payload>,
    ) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
            content_type: content_type.into(),
            body,
        }
    }

    /// Logical name of the target service.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Method as given by the caller.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Method formatted for the wire, see [`method_to_rpc`].
    pub fn endpoint(&self) -> String {
        method_to_rpc(&self.service, &self.method)
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &Arc<dyn Payload> {
        &self.body
    }

    /// Rejects requests that cannot be routed.
    pub fn validate(&self) -> Result<(), CallError> {
        if self.service.is_empty() {
            return Err(CallError::invalid_argument("request service is empty"));
        }
        if self.method.is_empty() {
            return Err(CallError::invalid_argument("request method is empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("service", &self.service)
            .field("method", &self.method)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A message bound for a broker topic.
#[derive(Clone)]
pub struct Publication {
    topic: String,
    content_type: String,
    payload: Arc<dyn Payload>,
}

impl Publication {
    pub fn new(
        topic: impl Into<String>,
        content_type: impl Into<String>,
        payload: Arc<dyn Payload>,
    ) -> Self {
        Self {
            topic: topic.into(),
            content_type: content_type.into(),
            payload,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn payload(&self) -> &Arc<dyn Payload> {
        &self.payload
    }
}

impl fmt::Debug for Publication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publication")
            .field("topic", &self.topic)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
