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

//! Codecs: turning request and response payloads into bytes.
//!
//! A client picks the codec for each call from the request's content type.
//! The codec layer has three pieces:
//!
//! - [`Payload`]: the type-erased body. Any serde type is a payload.
//! - [`Codec`]: an object-safe marshal/unmarshal pair for one wire format.
//! - [`CodecRegistry`]: the content-type table consulted on every call.
//!
//! # Built-in codecs
//!
//! | Content type               | Codec             |
//! |----------------------------|-------------------|
//! | `application/json`         | [`JsonCodec`]     |
//! | `application/postcard`     | [`PostcardCodec`] |
//! | `application/x-postcard`   | [`PostcardCodec`] |
//! | `application/octet-stream` | [`RawCodec`]      |
//!
//! # Custom codecs
//!
//! ```rust
//! use bytes::Bytes;
//! use microrpc::codec::{
//!     Codec, CodecRegistry, DeserializationError, Format, Payload, SerializationError,
//! };
//! use std::sync::Arc;
//!
//! /// JSON with a trailing newline, for line-oriented peers.
//! struct NdJsonCodec;
//!
//! impl Codec for NdJsonCodec {
//!     fn marshal(&self, value: &dyn Payload) -> Result<Bytes, SerializationError> {
//!         let mut bytes = value.encode(Format::Json)?;
//!         bytes.push(b'\n');
//!         Ok(Bytes::from(bytes))
//!     }
//!
//!     fn unmarshal(
//!         &self,
//!         bytes: &[u8],
//!         target: &mut dyn Payload,
//!     ) -> Result<(), DeserializationError> {
//!         target.decode(Format::Json, bytes.strip_suffix(b"\n").unwrap_or(bytes))
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "ndjson"
//!     }
//! }
//!
//! let mut registry = CodecRegistry::with_defaults();
//! registry.register("application/x-ndjson", Arc::new(NdJsonCodec));
//! ```

mod error;
pub mod framing;
mod json;
mod postcard;
mod raw;
mod registry;
mod traits;

pub use self::error::{DeserializationError, SerializationError};
pub use self::json::JsonCodec;
pub use self::postcard::PostcardCodec;
pub use self::raw::RawCodec;
pub use self::registry::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM, CONTENT_TYPE_POSTCARD,
    CONTENT_TYPE_X_POSTCARD, CodecRegistry,
};
pub use self::traits::{Codec, Format, Payload};
