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

//! Content-type to codec mapping.

use crate::codec::{Codec, JsonCodec, PostcardCodec, RawCodec};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Content type for JSON bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Content type for postcard bodies.
pub const CONTENT_TYPE_POSTCARD: &str = "application/postcard";

/// Legacy alias for postcard bodies.
pub const CONTENT_TYPE_X_POSTCARD: &str = "application/x-postcard";

/// Content type for opaque byte bodies.
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Maps content-type strings to the codec that handles them.
///
/// A registry is built once per client and then shared read-only between
/// calls. Registering a content type that already exists replaces the
/// earlier codec, which is how user supplied codecs override the built-ins.
///
/// # Examples
///
/// ```rust
/// use microrpc::codec::{CodecRegistry, JsonCodec};
/// use std::sync::Arc;
///
/// let mut registry = CodecRegistry::with_defaults();
/// registry.register("application/vnd.api+json", Arc::new(JsonCodec::new()));
///
/// assert!(registry.lookup("application/vnd.api+json").is_some());
/// assert!(registry.lookup("text/html").is_none());
/// ```
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in codecs.
    ///
    /// Each content type gets its own codec instance.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CONTENT_TYPE_JSON, Arc::new(JsonCodec::new()));
        registry.register(CONTENT_TYPE_POSTCARD, Arc::new(PostcardCodec::new()));
        registry.register(CONTENT_TYPE_X_POSTCARD, Arc::new(PostcardCodec::new()));
        registry.register(CONTENT_TYPE_OCTET_STREAM, Arc::new(RawCodec::new()));
        registry
    }

    /// Registers `codec` for `content_type`, returning the codec it replaced.
    pub fn register(
        &mut self,
        content_type: impl Into<String>,
        codec: Arc<dyn Codec>,
    ) -> Option<Arc<dyn Codec>> {
        self.codecs.insert(content_type.into(), codec)
    }

    /// Removes the codec for `content_type`.
    pub fn remove(&mut self, content_type: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.remove(content_type)
    }

    /// Looks up the codec for `content_type`.
    pub fn lookup(&self, content_type: &str) -> Option<Arc<dyn Codec>> {
        self.codecs.get(content_type).cloned()
    }

    /// Returns `true` if a codec is registered for `content_type`.
    pub fn contains(&self, content_type: &str) -> bool {
        self.codecs.contains_key(content_type)
    }

    /// Registered content types, in no particular order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Number of registered content types.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (content_type, codec) in &self.codecs {
            map.entry(content_type, &codec.name());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{DeserializationError, Payload, SerializationError};
    use bytes::Bytes;

    struct ShoutCodec;

    impl Codec for ShoutCodec {
        fn marshal(&self, _value: &dyn Payload) -> Result<Bytes, SerializationError> {
            Ok(Bytes::from_static(b"SHOUT"))
        }

        fn unmarshal(
            &self,
            _bytes: &[u8],
            _target: &mut dyn Payload,
        ) -> Result<(), DeserializationError> {
            Ok(())
        }

        fn name(&self) -> &'static str {
            "shout"
        }
    }

    #[test]
    fn test_defaults_cover_builtin_content_types() {
        let registry = CodecRegistry::with_defaults();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.lookup(CONTENT_TYPE_JSON).unwrap().name(), "json");
        assert_eq!(
            registry.lookup(CONTENT_TYPE_X_POSTCARD).unwrap().name(),
            "postcard"
        );
        assert_eq!(
            registry.lookup(CONTENT_TYPE_OCTET_STREAM).unwrap().name(),
            "raw"
        );
    }

    #[test]
    fn test_aliases_do_not_share_instances() {
        let registry = CodecRegistry::with_defaults();
        let a = registry.lookup(CONTENT_TYPE_POSTCARD).unwrap();
        let b = registry.lookup(CONTENT_TYPE_X_POSTCARD).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_override_replaces_builtin() {
        let mut registry = CodecRegistry::with_defaults();
        let replaced = registry.register(CONTENT_TYPE_JSON, Arc::new(ShoutCodec));
        assert_eq!(replaced.unwrap().name(), "json");

        let codec = registry.lookup(CONTENT_TYPE_JSON).unwrap();
        assert_eq!(&codec.marshal(&1u8).unwrap()[..], b"SHOUT");
    }

    #[test]
    fn test_unknown_content_type() {
        let mut registry = CodecRegistry::with_defaults();
        assert!(registry.lookup("application/grpc+proto").is_none());
        assert!(!registry.contains("application/grpc+proto"));

        registry.remove(CONTENT_TYPE_JSON);
        assert!(registry.lookup(CONTENT_TYPE_JSON).is_none());
    }
}
