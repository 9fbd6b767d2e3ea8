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

//! JSON codec.

use crate::codec::{Codec, DeserializationError, Format, Payload, SerializationError};
use bytes::Bytes;

/// Codec for `application/json`, backed by `serde_json`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Creates a new JSON codec.
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn marshal(&self, value: &dyn Payload) -> Result<Bytes, SerializationError> {
        value.encode(Format::Json).map(Bytes::from)
    }

    fn unmarshal(
        &self,
        bytes: &[u8],
        target: &mut dyn Payload,
    ) -> Result<(), DeserializationError> {
        target.decode(Format::Json, bytes)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    struct Greeting {
        id: u32,
        text: String,
    }

    #[test]
    fn test_json_marshal_is_readable() {
        let codec = JsonCodec::new();
        let bytes = codec
            .marshal(&Greeting {
                id: 1,
                text: "hi".to_string(),
            })
            .unwrap();
        assert_eq!(&bytes[..], br#"{"id":1,"text":"hi"}"#);
    }

    #[test]
    fn test_json_unmarshal_replaces_target() {
        let codec = JsonCodec::new();
        let mut target = Greeting {
            id: 9,
            text: "old".to_string(),
        };
        codec
            .unmarshal(br#"{"id":2,"text":"new"}"#, &mut target)
            .unwrap();
        assert_eq!(
            target,
            Greeting {
                id: 2,
                text: "new".to_string()
            }
        );
    }

    #[test]
    fn test_json_unmarshal_rejects_wrong_shape() {
        let codec = JsonCodec::new();
        let mut target = Greeting::default();
        assert!(codec.unmarshal(b"[1, 2, 3]", &mut target).is_err());
        assert_eq!(target, Greeting::default());
    }

    #[test]
    fn test_json_name() {
        assert_eq!(JsonCodec::new().name(), "json");
    }
}
