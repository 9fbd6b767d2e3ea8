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

//! Postcard codec.
//!
//! Postcard is a compact, non self-describing binary format; both sides of a
//! call must agree on the payload types.

use crate::codec::{Codec, DeserializationError, Format, Payload, SerializationError};
use bytes::Bytes;

/// Codec for `application/postcard`.
///
/// Optionally caps body size, which is worth doing when the peer is not
/// trusted: postcard length prefixes are read before anything is validated.
#[derive(Clone, Debug, Default)]
pub struct PostcardCodec {
    limit: Option<usize>,
}

impl PostcardCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects bodies over `limit` bytes in either direction.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn over_limit(&self, len: usize) -> Option<String> {
        self.limit
            .filter(|limit| len > *limit)
            .map(|limit| format!("body of {len} bytes is over the {limit} byte limit"))
    }
}

impl Codec for PostcardCodec {
    fn marshal(&self, value: &dyn Payload) -> Result<Bytes, SerializationError> {
        let bytes = value.encode(Format::Postcard)?;
        match self.over_limit(bytes.len()) {
            Some(reason) => Err(SerializationError::new(reason)),
            None => Ok(Bytes::from(bytes)),
        }
    }

    fn unmarshal(
        &self,
        bytes: &[u8],
        target: &mut dyn Payload,
    ) -> Result<(), DeserializationError> {
        if let Some(reason) = self.over_limit(bytes.len()) {
            return Err(DeserializationError::new(reason));
        }
        target.decode(Format::Postcard, bytes)
    }

    fn name(&self) -> &'static str {
        "postcard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    struct Reading {
        sensor: u16,
        label: String,
        samples: Vec<i16>,
    }

    fn reading() -> Reading {
        Reading {
            sensor: 3,
            label: "temp".to_string(),
            samples: vec![-4, 0, 12],
        }
    }

    #[test]
    fn test_postcard_is_smaller_than_json() {
        let postcard = PostcardCodec::new().marshal(&reading()).unwrap();
        let json = serde_json::to_vec(&reading()).unwrap();
        assert!(postcard.len() < json.len() / 2);

        let mut decoded = Reading::default();
        PostcardCodec::new().unmarshal(&postcard, &mut decoded).unwrap();
        assert_eq!(decoded, reading());
    }

    #[test]
    fn test_truncated_body_fails() {
        let bytes = PostcardCodec::new().marshal(&reading()).unwrap();
        let mut decoded = Reading::default();
        assert!(
            PostcardCodec::new()
                .unmarshal(&bytes[..bytes.len() - 2], &mut decoded)
                .is_err()
        );
    }

    #[test]
    fn test_limit_applies_both_ways() {
        let bytes = PostcardCodec::new().marshal(&reading()).unwrap();
        let limited = PostcardCodec::new().with_limit(4);

        let err = limited.marshal(&reading()).unwrap_err();
        assert!(err.to_string().contains("byte limit"));

        let mut decoded = Reading::default();
        let err = limited.unmarshal(&bytes, &mut decoded).unwrap_err();
        assert!(err.to_string().contains("byte limit"));

        PostcardCodec::new()
            .with_limit(bytes.len())
            .unmarshal(&bytes, &mut decoded)
            .unwrap();
    }
}
