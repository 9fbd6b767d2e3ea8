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

//! Pass-through codec for opaque byte bodies.

use crate::codec::{Codec, DeserializationError, Payload, SerializationError};
use bytes::Bytes;

/// Codec for `application/octet-stream`.
///
/// Accepts `Bytes`, `Vec<u8>` and `String` payloads and copies them to the
/// wire unchanged. Any other payload type is rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawCodec;

impl RawCodec {
    /// Creates a new raw codec.
    pub fn new() -> Self {
        Self
    }
}

impl Codec for RawCodec {
    fn marshal(&self, value: &dyn Payload) -> Result<Bytes, SerializationError> {
        let any = value.as_any();
        if let Some(bytes) = any.downcast_ref::<Bytes>() {
            Ok(bytes.clone())
        } else if let Some(bytes) = any.downcast_ref::<Vec<u8>>() {
            Ok(Bytes::copy_from_slice(bytes))
        } else if let Some(text) = any.downcast_ref::<String>() {
            Ok(Bytes::copy_from_slice(text.as_bytes()))
        } else {
            Err(SerializationError::new(
                "raw codec only accepts Bytes, Vec<u8> or String payloads",
            ))
        }
    }

    fn unmarshal(
        &self,
        bytes: &[u8],
        target: &mut dyn Payload,
    ) -> Result<(), DeserializationError> {
        let any = target.as_any_mut();
        if let Some(slot) = any.downcast_mut::<Bytes>() {
            *slot = Bytes::copy_from_slice(bytes);
        } else if let Some(slot) = any.downcast_mut::<Vec<u8>>() {
            slot.clear();
            slot.extend_from_slice(bytes);
        } else if let Some(slot) = any.downcast_mut::<String>() {
            *slot = String::from_utf8(bytes.to_vec())
                .map_err(|e| DeserializationError::with_source("body is not valid UTF-8", e))?;
        } else {
            return Err(DeserializationError::new(
                "raw codec only decodes into Bytes, Vec<u8> or String",
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "raw"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_passes_bytes_through() {
        let codec = RawCodec::new();
        assert_eq!(&codec.marshal(&vec![1u8, 2, 3]).unwrap()[..], &[1, 2, 3]);
        assert_eq!(&codec.marshal(&"abc".to_string()).unwrap()[..], b"abc");
        assert_eq!(
            codec.marshal(&Bytes::from_static(b"xyz")).unwrap(),
            Bytes::from_static(b"xyz")
        );
    }

    #[test]
    fn test_raw_rejects_structured_payloads() {
        let codec = RawCodec::new();
        assert!(codec.marshal(&42u32).is_err());
        let mut target = 0u32;
        assert!(codec.unmarshal(b"1", &mut target).is_err());
    }

    #[test]
    fn test_raw_unmarshal_into_string() {
        let codec = RawCodec::new();
        let mut text = String::from("old");
        codec.unmarshal(b"fresh", &mut text).unwrap();
        assert_eq!(text, "fresh");

        assert!(codec.unmarshal(&[0xff, 0xfe], &mut text).is_err());
    }

    #[test]
    fn test_raw_unmarshal_into_vec() {
        let codec = RawCodec::new();
        let mut buf = vec![9u8; 8];
        codec.unmarshal(&[1, 2], &mut buf).unwrap();
        assert_eq!(buf, vec![1, 2]);
    }
}
