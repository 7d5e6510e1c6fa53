//! Length-prefixed frame codec (spec §4.1).
//!
//! Every inter-service and client-to-service link speaks one wire format:
//! a 4-byte big-endian length prefix followed by exactly that many bytes of
//! UTF-8 payload. The payload is JSON whenever the caller sends JSON; a
//! reader always attempts JSON decode first and falls back to the raw
//! string on failure, so callers that just want a string never need a
//! separate "text frame" variant.
//!
//! Two transport modes share the same socket: framed mode (this module) for
//! all request/response traffic, and a raw byte-stream pass-through used
//! only for bundle upload/download payloads immediately after a controlling
//! framed message. [`read_raw`]/[`write_raw`] implement the latter.

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default cap on a single frame's payload length, per spec §4.1.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// A decoded frame payload: JSON is preferred, with a raw-string fallback
/// for peers (or tests) that send plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    Json(Value),
    Text(String),
}

impl FramePayload {
    /// Deserialize the JSON variant into `T`, or fail if this frame didn't
    /// parse as JSON at all.
    pub fn into_json<T: serde::de::DeserializeOwned>(self) -> anyhow::Result<T> {
        match self {
            Self::Json(value) => Ok(serde_json::from_value(value)?),
            Self::Text(text) => Err(anyhow::anyhow!("expected JSON frame, got raw text: {text}")),
        }
    }
}

/// Sentinel returned by [`read_frame`] when the peer closed the connection
/// cleanly at a frame boundary (a zero-length read of the length prefix).
/// Per spec §4.1 this is not an error; it signals graceful disconnect.
pub async fn read_frame<R>(
    reader: &mut R,
    max_frame_size: usize,
) -> anyhow::Result<Option<FramePayload>>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    match read_prefix(reader, &mut len_buf).await? {
        PrefixRead::Disconnected => return Ok(None),
        PrefixRead::Ok => {}
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > max_frame_size {
        anyhow::bail!("frame length {len} exceeds max_frame_size {max_frame_size}");
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|e| anyhow::anyhow!("short read while filling frame body: {e}"))?;

    let text = String::from_utf8(payload)?;
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(Some(FramePayload::Json(value))),
        Err(_) => Ok(Some(FramePayload::Text(text))),
    }
}

enum PrefixRead {
    Ok,
    Disconnected,
}

/// Read exactly 4 bytes, distinguishing "peer closed before sending
/// anything" (graceful disconnect) from a genuine short read mid-prefix
/// (protocol violation).
async fn read_prefix<R>(reader: &mut R, buf: &mut [u8; 4]) -> anyhow::Result<PrefixRead>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    loop {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(PrefixRead::Disconnected);
            }
            anyhow::bail!("connection closed mid-length-prefix ({filled}/4 bytes read)");
        }
        filled += n;
        if filled == 4 {
            return Ok(PrefixRead::Ok);
        }
    }
}

/// Encode `value` as JSON and write it as one length-prefixed frame.
pub async fn write_frame<W, T>(writer: &mut W, value: &T) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let body = serde_json::to_vec(value)?;
    write_frame_bytes(writer, &body).await
}

/// Write a raw string as one length-prefixed frame, bypassing JSON
/// serialization (used for payloads that are already plain text).
pub async fn write_text_frame<W>(writer: &mut W, text: &str) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    write_frame_bytes(writer, text.as_bytes()).await
}

async fn write_frame_bytes<W>(writer: &mut W, body: &[u8]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let len: u32 = body
        .len()
        .try_into()
        .map_err(|_| anyhow::anyhow!("frame body of {} bytes exceeds u32 range", body.len()))?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    Ok(())
}

/// Read exactly `size` raw bytes, for the bundle-transfer pass-through mode.
pub async fn read_raw<R>(reader: &mut R, size: u64) -> anyhow::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; size as usize];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write raw bytes, for the bundle-transfer pass-through mode.
pub async fn write_raw<W>(writer: &mut W, data: &[u8]) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn round_trips_json_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &serde_json::json!({"type": "LOGIN"})).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await.unwrap().unwrap();
        match frame {
            FramePayload::Json(value) => assert_eq!(value["type"], "LOGIN"),
            FramePayload::Text(_) => panic!("expected JSON payload"),
        }
    }

    #[tokio::test]
    async fn falls_back_to_raw_text_on_non_json_payload() {
        let mut buf = Vec::new();
        write_text_frame(&mut buf, "not json at all").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await.unwrap().unwrap();
        assert_eq!(frame, FramePayload::Text("not json at all".to_string()));
    }

    #[tokio::test]
    async fn accepts_frame_at_exactly_max_size() {
        let payload = "x".repeat(16);
        let mut buf = Vec::new();
        write_text_frame(&mut buf, &payload).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let frame = read_frame(&mut cursor, payload.len()).await.unwrap();
        assert!(frame.is_some());
    }

    #[tokio::test]
    async fn rejects_frame_one_byte_over_max_size() {
        let payload = "x".repeat(17);
        let mut buf = Vec::new();
        write_text_frame(&mut buf, &payload).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let result = read_frame(&mut cursor, 16).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn zero_length_prefix_read_is_graceful_disconnect() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let frame = read_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn raw_byte_pass_through_round_trips() {
        let mut buf = Vec::new();
        write_raw(&mut buf, b"archive-bytes").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let data = read_raw(&mut cursor, 13).await.unwrap();
        assert_eq!(data, b"archive-bytes");
    }
}
