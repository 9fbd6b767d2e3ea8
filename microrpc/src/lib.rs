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

#![doc = include_str!("../../README.md")]
#![allow(clippy::module_inception)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

//! ## Architecture
//!
//! The crate is organized leaf first:
//!
//! - **[`codec`]**: content-type keyed marshalling and the [`Payload`] trait
//! - **[`transport`]**: the [`Dialer`](transport::Dialer) and
//!   [`Connection`](transport::Connection) seam, with TCP and in-memory
//!   variants
//! - **[`pool`]**: bounded, TTL-aware connection pools per address
//! - **[`backoff`]**: delays between retried attempts
//! - **[`client`]**: requests, middleware, the call controller and the
//!   [`Client`] façade
//! - **[`broker`]**: publish/subscribe for [`Client::publish`]
//! - **[`observability`]**: logging helpers and counters
//!
//! ## Feature Flags
//!
//! - `observability` (default): `tracing` events and spans, and counters
//!   mirrored into the `metrics` facade

pub mod backoff;
pub mod broker;
pub mod client;
pub mod codec;
pub mod context;
mod error;
pub mod observability;
pub mod pool;
pub mod transport;

pub use client::{
    CallOptions, Client, ClientExt, ClientOptions, Publication, Request, RpcClient, new_client,
};
pub use codec::Payload;
pub use context::{CallContext, Metadata};
pub use error::{CallError, ErrorKind};
