use crate::response::Response;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A failed response from the server.
///
/// Produced for any status outside 2xx that is not followed as a redirect,
/// and for redirect chains that exceed the hop ceiling (reported as 310).
/// The full decoded response is kept so callers can inspect the error body.
#[derive(Debug)]
pub struct ResponseError {
    message: String,
    response: Response,
}

impl ResponseError {
    pub(crate) fn new(message: impl Into<String>, response: Response) -> Self {
        Self {
            message: message.into(),
            response,
        }
    }

    /// Human-readable message, e.g. `404 Not Found Request Failed`
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status code of the failing response
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.response.status_code()
    }

    /// Status message of the failing response
    #[must_use]
    pub fn status_message(&self) -> &str {
        self.response.status_message()
    }

    /// The failing response (headers and decoded body)
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Consume the error and return the failing response
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResponseError {}

/// HTTP client error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// Request URL (or a redirect target) could not be parsed
    ///
    /// The `reason` field is a diagnostic message for logging only; its
    /// format is unstable.
    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl {
        /// The URL that failed to parse
        url: String,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },

    /// URL scheme is neither `http` nor `https`
    #[error("URL scheme '{scheme}' not supported: only http and https are allowed")]
    UnsupportedScheme {
        /// The URL scheme that was rejected
        scheme: String,
    },

    /// The transport cannot issue this HTTP method
    #[error("HTTP method {method} is not supported by the {transport} transport")]
    UnsupportedMethod {
        /// The rejected method
        method: http::Method,
        /// Name of the transport that rejected it
        transport: &'static str,
    },

    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Request hop timed out
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport error (network, connection, DNS, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS error
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a failing status, or the redirect ceiling was hit
    #[error("{0}")]
    Response(Box<ResponseError>),

    /// Compressed response payload could not be decoded
    #[error("Failed to decode {encoding} response body: {source}")]
    Decompression {
        /// The `Content-Encoding` that was being undone
        encoding: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (request body)
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Form URL encoding error
    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),
}

impl HttpError {
    /// Whether the error came from the transport layer (no response received)
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            HttpError::Transport(_) | HttpError::Tls(_) | HttpError::Timeout(_)
        )
    }

    /// Status code of the failing response, if one was received
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(Response::status_code)
    }

    /// The failing response, if one was received
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        match self {
            HttpError::Response(err) => Some(err.response()),
            _ => None,
        }
    }
}

impl From<ResponseError> for HttpError {
    fn from(err: ResponseError) -> Self {
        HttpError::Response(Box::new(err))
    }
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}
