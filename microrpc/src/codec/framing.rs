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

//! Length-prefixed envelopes for stream transports.
//!
//! A frame is a big-endian `u32` length followed by that many bytes. An
//! envelope is a postcard-encoded value carried in one frame. The TCP
//! transport exchanges [`WireRequest`](crate::transport::WireRequest) and
//! [`WireReply`](crate::transport::WireReply) envelopes; servers speaking to
//! the client use the same two functions.
//!
//! ```rust
//! use microrpc::codec::framing::{read_envelope, write_envelope};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut wire = Vec::new();
//! write_envelope(&mut wire, &("greet", 7u8)).await?;
//!
//! let (method, n): (String, u8) = read_envelope(&mut &wire[..]).await?;
//! assert_eq!((method.as_str(), n), ("greet", 7));
//! # Ok(())
//! # }
//! ```

use crate::codec::{DeserializationError, SerializationError};
use bytes::{BufMut, BytesMut};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame either side accepts (16 MiB).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Writes `payload` as one frame and flushes.
///
/// # Errors
///
/// Fails if the payload is larger than [`MAX_FRAME_SIZE`] or the writer
/// fails.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), SerializationError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_FRAME_SIZE {
        return Err(SerializationError::new(format!(
            "frame of {} bytes is over the {MAX_FRAME_SIZE} byte limit",
            payload.len()
        )));
    }

    let mut frame = BytesMut::with_capacity(4 + payload.len());
    frame.put_u32(payload.len() as u32);
    frame.put_slice(payload);

    writer
        .write_all(&frame)
        .await
        .map_err(|e| SerializationError::with_source("write frame", e))?;
    writer
        .flush()
        .await
        .map_err(|e| SerializationError::with_source("flush frame", e))
}

/// Reads one frame.
///
/// # Errors
///
/// Fails if the declared length is over [`MAX_FRAME_SIZE`] or the stream
/// ends early.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, DeserializationError>
where
    R: AsyncRead + Unpin,
{
    let len = reader
        .read_u32()
        .await
        .map_err(|e| DeserializationError::with_source("read frame length", e))?
        as usize;
    if len > MAX_FRAME_SIZE {
        return Err(DeserializationError::new(format!(
            "frame of {len} bytes is over the {MAX_FRAME_SIZE} byte limit"
        )));
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| DeserializationError::with_source("read frame body", e))?;
    Ok(payload)
}

/// Postcard-encodes `value` and writes it as one frame.
pub async fn write_envelope<W, T>(writer: &mut W, value: &T) -> Result<(), SerializationError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let payload = postcard::to_allocvec(value)?;
    write_frame(writer, &payload).await
}

/// Reads one frame and postcard-decodes it.
pub async fn read_envelope<R, T>(reader: &mut R) -> Result<T, DeserializationError>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    let payload = read_frame(reader).await?;
    Ok(postcard::from_bytes(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{WireReply, WireRequest};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_frame_layout() {
        let mut wire = Vec::new();
        write_frame(&mut wire, b"ping").await.unwrap();
        assert_eq!(wire, [0, 0, 0, 4, b'p', b'i', b'n', b'g']);
        assert_eq!(read_frame(&mut &wire[..]).await.unwrap(), b"ping");
    }

    #[tokio::test]
    async fn test_oversized_length_is_rejected_before_reading() {
        let wire = ((MAX_FRAME_SIZE + 1) as u32).to_be_bytes();
        let err = read_frame(&mut &wire[..]).await.unwrap_err();
        assert!(err.to_string().contains("byte limit"));
    }

    #[tokio::test]
    async fn test_truncated_frame() {
        let mut wire = 10u32.to_be_bytes().to_vec();
        wire.extend_from_slice(b"short");
        assert!(read_frame(&mut &wire[..]).await.is_err());
    }

    #[tokio::test]
    async fn test_request_then_reply_on_one_stream() {
        let request = WireRequest {
            method: "/greeter.Greeter/Hello".to_string(),
            content_type: "application/json".to_string(),
            metadata: HashMap::from([("timeout".to_string(), "1000".to_string())]),
            body: b"{}".to_vec(),
        };
        let mut wire = Vec::new();
        write_envelope(&mut wire, &request).await.unwrap();
        write_envelope(&mut wire, &WireReply::Err("boom".to_string()))
            .await
            .unwrap();

        let mut reader = &wire[..];
        let decoded: WireRequest = read_envelope(&mut reader).await.unwrap();
        assert_eq!(decoded.method, request.method);
        assert_eq!(decoded.metadata["timeout"], "1000");
        let reply: WireReply = read_envelope(&mut reader).await.unwrap();
        assert!(matches!(reply, WireReply::Err(message) if message == "boom"));
        assert!(reader.is_empty());
    }
}
