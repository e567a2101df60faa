//! Response body decoding for the socket transport
//!
//! The payload is first decompressed according to `Content-Encoding`, then
//! reinterpreted according to `Content-Type`: JSON is parsed (falling back to
//! the raw text when it does not parse), `text/*` is decoded as UTF-8, and
//! everything else is returned as bytes.

use crate::config::DeflateMode;
use crate::error::HttpError;
use crate::response::Body;
use bytes::Bytes;
use flate2::Compression;
use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder, ZlibEncoder};
use http::HeaderMap;
use http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use std::io::Read;

/// Decode a fully buffered payload
///
/// # Errors
/// Returns `HttpError::Decompression` if a compressed payload is corrupt.
pub fn decode_body(
    headers: &HeaderMap,
    raw: Bytes,
    deflate: DeflateMode,
) -> Result<Body, HttpError> {
    let payload = decompress(headers, raw, deflate)?;
    Ok(interpret(header_str(headers, &CONTENT_TYPE), payload))
}

/// Try to parse JSON, returning the text unchanged when it is not valid JSON
#[must_use]
pub fn parse_json_or_text(text: String) -> Body {
    match serde_json::from_str(&text) {
        Ok(value) => Body::Json(value),
        Err(_) => Body::Text(text),
    }
}

fn decompress(headers: &HeaderMap, raw: Bytes, deflate: DeflateMode) -> Result<Bytes, HttpError> {
    if raw.is_empty() {
        return Ok(raw);
    }

    let Some(encoding) = header_str(headers, &CONTENT_ENCODING) else {
        return Ok(raw);
    };

    let result = if encoding.eq_ignore_ascii_case("gzip") {
        read_all(GzDecoder::new(raw.as_ref()))
    } else if encoding.eq_ignore_ascii_case("deflate") {
        match deflate {
            DeflateMode::Inflate => inflate(&raw),
            DeflateMode::Recompress => {
                read_all(ZlibEncoder::new(raw.as_ref(), Compression::default()))
            }
        }
    } else {
        return Ok(raw);
    };

    result
        .map(Bytes::from)
        .map_err(|source| HttpError::Decompression {
            encoding: encoding.to_owned(),
            source,
        })
}

/// `deflate` on the wire is usually zlib-wrapped, but some servers send a
/// raw deflate stream
fn inflate(raw: &[u8]) -> std::io::Result<Vec<u8>> {
    read_all(ZlibDecoder::new(raw)).or_else(|zlib_err| {
        tracing::debug!(error = %zlib_err, "zlib inflate failed; retrying as raw deflate");
        read_all(DeflateDecoder::new(raw))
    })
}

fn read_all(mut reader: impl Read) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

fn interpret(content_type: Option<&str>, payload: Bytes) -> Body {
    let Some(content_type) = content_type.map(str::to_ascii_lowercase) else {
        return Body::Bytes(payload);
    };

    if content_type.contains("/json") {
        return parse_json_or_text(String::from_utf8_lossy(&payload).into_owned());
    }

    if content_type.trim_start().starts_with("text/") {
        return Body::Text(String::from_utf8_lossy(&payload).into_owned());
    }

    Body::Bytes(payload)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &http::header::HeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
}
