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

//! Codec error types.
//!
//! Both directions carry a message plus the underlying format error, if
//! there is one. They stay separate types so [`CallError`](crate::CallError)
//! can tell a bad request body from a bad response body.

use thiserror::Error;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Error produced while marshalling a payload into bytes.
///
/// ```rust
/// use microrpc::codec::SerializationError;
///
/// let error = SerializationError::new("payload type not supported");
/// assert_eq!(error.to_string(), "marshal failed: payload type not supported");
/// ```
#[derive(Debug, Error)]
#[error("marshal failed: {message}")]
pub struct SerializationError {
    message: String,
    #[source]
    source: Option<Cause>,
}

/// Error produced while unmarshalling bytes into a payload.
#[derive(Debug, Error)]
#[error("unmarshal failed: {message}")]
pub struct DeserializationError {
    message: String,
    #[source]
    source: Option<Cause>,
}

macro_rules! codec_error_ctors {
    ($ty:ident) => {
        impl $ty {
            pub fn new(message: impl Into<String>) -> Self {
                Self {
                    message: message.into(),
                    source: None,
                }
            }

            /// Wraps the format error that caused the failure.
            pub fn with_source(
                message: impl Into<String>,
                source: impl std::error::Error + Send + Sync + 'static,
            ) -> Self {
                Self {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }

            pub fn message(&self) -> &str {
                &self.message
            }
        }
    };
}

codec_error_ctors!(SerializationError);
codec_error_ctors!(DeserializationError);

impl From<postcard::Error> for SerializationError {
    fn from(err: postcard::Error) -> Self {
        Self::with_source("postcard", err)
    }
}

impl From<postcard::Error> for DeserializationError {
    fn from(err: postcard::Error) -> Self {
        Self::with_source("postcard", err)
    }
}

impl From<serde_json::Error> for SerializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(format!("json: {err}"), err)
    }
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(format!("json: {err}"), err)
    }
}
