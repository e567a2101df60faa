//! Per-request options and their normalization
//!
//! [`RequestOptions`] is the caller-facing value. Every field remembers whether
//! the caller specified it, so merging can tell "not given" (keep the default)
//! apart from "given as absent" (override the default with nothing, e.g. an
//! explicit [`RequestOptions::clear_timeout`]). The merge is shallow: a
//! caller header list replaces the default header list as a whole.

use crate::error::HttpError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Download progress reported to a [`ProgressCallback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes of the response body received so far
    pub loaded: u64,
    /// Total body size, when the server announced it
    pub total: Option<u64>,
}

/// Callback invoked as response body data arrives
pub type ProgressCallback = Arc<dyn Fn(Progress) + Send + Sync>;

/// Hint for how a host-native transport should type the response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResponseType {
    /// Let the host decide (`''`)
    #[default]
    Default,
    /// Binary buffer (`arraybuffer`)
    ArrayBuffer,
    /// Binary large object (`blob`)
    Blob,
    /// Parsed markup document (`document`)
    Document,
    /// Parsed JSON (`json`)
    Json,
    /// Text (`text`)
    Text,
}

impl ResponseType {
    /// Token used by hosts for this response type
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseType::Default => "",
            ResponseType::ArrayBuffer => "arraybuffer",
            ResponseType::Blob => "blob",
            ResponseType::Document => "document",
            ResponseType::Json => "json",
            ResponseType::Text => "text",
        }
    }

    /// Whether the host decodes the body itself for this response type
    #[must_use]
    pub fn is_host_decoded(self) -> bool {
        !matches!(self, ResponseType::Default)
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic-auth credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Credentials from a username/password pair, if both are non-empty
    #[must_use]
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        match (username, password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Some(Self {
                    username: username.to_owned(),
                    password: password.to_owned(),
                })
            }
            _ => None,
        }
    }

    /// `Authorization` header value: `Basic base64(username:password)`
    #[must_use]
    pub fn basic_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Caller-supplied request options
///
/// Unspecified fields fall back to the client's default options.
///
/// # Example
///
/// ```ignore
/// let options = RequestOptions::new()
///     .header("x-request-id", "abc123")
///     .basic_auth("alice", "secret")
///     .timeout(Duration::from_secs(5));
/// let resp = client.get("https://example.com/api", options).await?;
/// ```
#[derive(Clone, Default)]
#[must_use]
pub struct RequestOptions {
    body: Option<Option<Bytes>>,
    headers: Option<Vec<(String, String)>>,
    username: Option<Option<String>>,
    password: Option<Option<String>>,
    timeout: Option<Option<Duration>>,
    is_async: Option<bool>,
    on_progress: Option<Option<ProgressCallback>>,
    response_type: Option<ResponseType>,
    with_credentials: Option<Option<bool>>,
}

impl RequestOptions {
    /// Options with nothing specified
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(Some(body.into()));
        self
    }

    /// Send no body, even if the defaults carry one
    pub fn clear_body(mut self) -> Self {
        self.body = Some(None);
        self
    }

    /// Set the request body as JSON
    ///
    /// Adds `Content-Type: application/json` unless a Content-Type header
    /// was already provided.
    ///
    /// # Errors
    /// Returns `HttpError::Json` if serialization fails.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Self, HttpError> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self
            .default_content_type("application/json")
            .body(bytes))
    }

    /// Set the request body as form URL-encoded
    ///
    /// Adds `Content-Type: application/x-www-form-urlencoded` unless a
    /// Content-Type header was already provided.
    ///
    /// # Errors
    /// Returns `HttpError::FormEncode` if serialization fails.
    pub fn form<T: Serialize>(self, body: &T) -> Result<Self, HttpError> {
        let encoded = serde_urlencoded::to_string(body)?;
        Ok(self
            .default_content_type("application/x-www-form-urlencoded")
            .body(encoded))
    }

    /// Add a single header
    ///
    /// Names and values are stored as supplied and validated when the
    /// request is built.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((name.into(), value.into()));
        self
    }

    /// Add multiple headers
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let list = self.headers.get_or_insert_with(Vec::new);
        list.extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the basic-auth username
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(Some(username.into()));
        self
    }

    /// Set the basic-auth password
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Some(password.into()));
        self
    }

    /// Set both basic-auth credentials
    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username(username).password(password)
    }

    /// Drop any default credentials
    pub fn clear_auth(mut self) -> Self {
        self.username = Some(None);
        self.password = Some(None);
        self
    }

    /// Set the timeout; a zero duration means no timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(Some(timeout));
        self
    }

    /// Disable any default timeout
    pub fn clear_timeout(mut self) -> Self {
        self.timeout = Some(None);
        self
    }

    /// Asynchronous hint for host-native transports (default: true)
    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = Some(is_async);
        self
    }

    /// Register a download progress callback
    pub fn on_progress(mut self, callback: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Some(Arc::new(callback)));
        self
    }

    /// Response typing hint for host-native transports
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Credentialed cross-origin hint for host-native transports
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = Some(Some(with_credentials));
        self
    }

    /// Leave the credentialed-request hint to the host default
    pub fn clear_with_credentials(mut self) -> Self {
        self.with_credentials = Some(None);
        self
    }

    /// Merge these options over the library defaults
    #[must_use]
    pub fn merge_over_defaults(self) -> MergedOptions {
        MergedOptions::default().apply(self)
    }

    fn default_content_type(self, content_type: &str) -> Self {
        let has_content_type = self.headers.as_ref().is_some_and(|headers| {
            headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        });
        if has_content_type {
            self
        } else {
            self.header("content-type", content_type)
        }
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("body", &self.body.as_ref().map(|b| b.as_ref().map(Bytes::len)))
            .field("headers", &self.headers)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|p| p.as_ref().map(|_| "[REDACTED]")))
            .field("timeout", &self.timeout)
            .field("is_async", &self.is_async)
            .field("on_progress", &self.on_progress.as_ref().map(Option::is_some))
            .field("response_type", &self.response_type)
            .field("with_credentials", &self.with_credentials)
            .finish()
    }
}

/// Fully merged options: every key has a value
///
/// Built once per call and reused, unchanged, for every redirect hop.
#[derive(Clone)]
#[non_exhaustive]
pub struct MergedOptions {
    pub body: Option<Bytes>,
    pub headers: Vec<(String, String)>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<Duration>,
    pub is_async: bool,
    pub on_progress: Option<ProgressCallback>,
    pub response_type: ResponseType,
    pub with_credentials: Option<bool>,
}

impl Default for MergedOptions {
    fn default() -> Self {
        Self {
            body: None,
            headers: Vec::new(),
            username: None,
            password: None,
            timeout: None,
            is_async: true,
            on_progress: None,
            response_type: ResponseType::Default,
            with_credentials: None,
        }
    }
}

impl MergedOptions {
    /// Overlay every field the caller specified
    #[must_use]
    pub fn apply(self, options: RequestOptions) -> Self {
        Self {
            body: options.body.unwrap_or(self.body),
            headers: options.headers.unwrap_or(self.headers),
            username: options.username.unwrap_or(self.username),
            password: options.password.unwrap_or(self.password),
            timeout: options.timeout.unwrap_or(self.timeout),
            is_async: options.is_async.unwrap_or(self.is_async),
            on_progress: options.on_progress.unwrap_or(self.on_progress),
            response_type: options.response_type.unwrap_or(self.response_type),
            with_credentials: options.with_credentials.unwrap_or(self.with_credentials),
        }
    }

    /// Basic-auth credentials from the options, if both parts are non-empty
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(self.username.as_deref(), self.password.as_deref())
    }

    /// Effective timeout: `None` when absent or zero
    #[must_use]
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|t| !t.is_zero())
    }
}

impl fmt::Debug for MergedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedOptions")
            .field("body", &self.body.as_ref().map(Bytes::len))
            .field("headers", &self.headers)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("is_async", &self.is_async)
            .field("on_progress", &self.on_progress.is_some())
            .field("response_type", &self.response_type)
            .field("with_credentials", &self.with_credentials)
            .finish()
    }
}

/// Merge caller options over a set of default options
///
/// Both are layered over the library defaults: first `defaults`, then
/// `options`, with caller values winning.
#[must_use]
pub fn merge(defaults: &RequestOptions, options: RequestOptions) -> MergedOptions {
    MergedOptions::default()
        .apply(defaults.clone())
        .apply(options)
}
