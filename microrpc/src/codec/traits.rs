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

//! Core codec traits.

use crate::codec::{DeserializationError, SerializationError};
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::Any;

/// Wire formats a [`Payload`] knows how to encode itself into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// `serde_json` text.
    Json,
    /// `postcard` compact binary.
    Postcard,
}

/// A type-erased request or response body.
///
/// Every `Serialize + DeserializeOwned` type that is `Send + Sync + 'static`
/// is a payload through the blanket implementation, so callers hand plain
/// structs to the client and codecs operate on `&dyn Payload` without knowing
/// the concrete type.
///
/// # Examples
///
/// ```rust
/// use microrpc::codec::{Format, Payload};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
/// struct Ping {
///     seq: u32,
/// }
///
/// let bytes = Ping { seq: 7 }.encode(Format::Json).unwrap();
/// let mut decoded = Ping::default();
/// decoded.decode(Format::Json, &bytes).unwrap();
/// assert_eq!(decoded, Ping { seq: 7 });
/// ```
pub trait Payload: Send + Sync + 'static {
    /// Encodes the value in the given format.
    fn encode(&self, format: Format) -> Result<Vec<u8>, SerializationError>;

    /// Replaces the value with one decoded from `bytes`.
    fn decode(&mut self, format: Format, bytes: &[u8]) -> Result<(), DeserializationError>;

    /// Access to the concrete value, for codecs that only handle specific types.
    fn as_any(&self) -> &dyn Any;

    /// Mutable access to the concrete value.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> Payload for T
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn encode(&self, format: Format) -> Result<Vec<u8>, SerializationError> {
        match format {
            Format::Json => serde_json::to_vec(self).map_err(Into::into),
            Format::Postcard => postcard::to_allocvec(self).map_err(Into::into),
        }
    }

    fn decode(&mut self, format: Format, bytes: &[u8]) -> Result<(), DeserializationError> {
        *self = match format {
            Format::Json => serde_json::from_slice(bytes)?,
            Format::Postcard => postcard::from_bytes(bytes)?,
        };
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Converts payloads to and from bytes for one content type.
///
/// Codecs are shared across concurrent calls, so implementations must be
/// stateless or internally synchronized.
pub trait Codec: Send + Sync + 'static {
    /// Marshals a payload into bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SerializationError`] if the payload cannot be represented in
    /// this codec's format.
    fn marshal(&self, value: &dyn Payload) -> Result<Bytes, SerializationError>;

    /// Unmarshals `bytes` into `target`, replacing its previous contents.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializationError`] if the bytes are malformed or do not
    /// match the target's type.
    fn unmarshal(&self, bytes: &[u8], target: &mut dyn Payload)
    -> Result<(), DeserializationError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
