use crate::error::HttpError;
use bytes::Bytes;
use http::HeaderMap;
use serde::de::DeserializeOwned;

/// Decoded response payload
///
/// Exactly one representation is chosen per response, from its content type
/// (socket transport) or from the host's own response typing (host transport).
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Parsed JSON document
    Json(serde_json::Value),
    /// UTF-8 decoded text (also the fallback for malformed JSON)
    Text(String),
    /// Raw bytes, after decompression
    Bytes(Bytes),
}

impl Body {
    /// The parsed JSON value, if the body was decoded as JSON
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The decoded text, if the body was decoded as text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The raw bytes, if the body was left undecoded
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Whether the body carries no data at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Json(_) => false,
            Body::Text(text) => text.is_empty(),
            Body::Bytes(bytes) => bytes.is_empty(),
        }
    }
}

/// Response of a completed request
///
/// Header names are lower-cased by [`HeaderMap`] regardless of the transport
/// that delivered them.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: u16,
    status_message: String,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub(crate) fn new(
        status_code: u16,
        status_message: String,
        headers: HeaderMap,
        body: Body,
    ) -> Self {
        Self {
            status_code,
            status_message,
            headers,
            body,
        }
    }

    /// Numeric status code
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Reason phrase as delivered by the transport
    #[must_use]
    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    /// Response headers
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Decoded response body
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Consume the response and return the decoded body
    #[must_use]
    pub fn into_body(self) -> Body {
        self.body
    }

    /// Deserialize the body into `T`
    ///
    /// JSON bodies are converted directly; text bodies are parsed as JSON.
    ///
    /// # Errors
    /// Returns `HttpError::Json` if the body does not deserialize into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        let value = match &self.body {
            Body::Json(value) => T::deserialize(value)?,
            Body::Text(text) => serde_json::from_str(text)?,
            Body::Bytes(bytes) => serde_json::from_slice(bytes)?,
        };
        Ok(value)
    }

    /// Set the status code and message, used when rewriting a redirect overflow
    pub(crate) fn with_status(mut self, status_code: u16, status_message: &str) -> Self {
        self.status_code = status_code;
        status_message.clone_into(&mut self.status_message);
        self
    }
}
