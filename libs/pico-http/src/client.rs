use crate::builder::HttpClientBuilder;
use crate::error::HttpError;
use crate::options::{self, RequestOptions};
use crate::response::Response;
use crate::transport::Transport;
use http::Method;
use std::sync::Arc;

/// Verb-keyed HTTP client
///
/// Every verb method merges the caller's options over the client's default
/// options and hands the call to the transport chosen at construction: the
/// socket transport unless the builder was given a host or a custom
/// [`Transport`].
///
/// # Thread Safety
///
/// `HttpClient` is `Clone + Send + Sync`; clones share the transport.
/// Calls keep no state between each other and may run concurrently.
///
/// # Example
///
/// ```ignore
/// let client = HttpClient::new()?;
/// let resp = client
///     .post(
///         "https://api.example.com/users",
///         RequestOptions::new().json(&json!({"name": "alice"}))?,
///     )
///     .await?;
/// println!("{} {:?}", resp.status_code(), resp.body());
/// ```
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) default_options: RequestOptions,
}

impl HttpClient {
    /// Create a client with the socket transport and default configuration
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    /// Create a builder for configuring the HTTP client
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Name of the transport serving this client (`socket`, `host`, ...)
    #[must_use]
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Default options every call starts from
    #[must_use]
    pub fn default_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Issue a request with an arbitrary method
    ///
    /// # Errors
    /// Returns `HttpError::UnsupportedMethod` if the transport cannot issue
    /// `method`; otherwise whatever the transport reports.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, HttpError> {
        if !self.transport.supports(&method) {
            return Err(HttpError::UnsupportedMethod {
                method,
                transport: self.transport.name(),
            });
        }

        let merged = options::merge(&self.default_options, options);
        self.transport.perform_request(method, url, merged).await
    }

    /// Send a GET request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn get(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::GET, url, options).await
    }

    /// Send a POST request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn post(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::POST, url, options).await
    }

    /// Send a PUT request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn put(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::PUT, url, options).await
    }

    /// Send a DELETE request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn delete(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::DELETE, url, options).await
    }

    /// Send a HEAD request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn head(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::HEAD, url, options).await
    }

    /// Send a PATCH request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn patch(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::PATCH, url, options).await
    }

    /// Send an OPTIONS request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn options(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::OPTIONS, url, options).await
    }

    /// Send a CONNECT request
    ///
    /// # Errors
    /// See [`HttpClient::request`].
    pub async fn connect(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::CONNECT, url, options).await
    }

    /// Send a TRACE request
    ///
    /// # Errors
    /// Fails with `HttpError::UnsupportedMethod` on the host transport.
    pub async fn trace(&self, url: &str, options: RequestOptions) -> Result<Response, HttpError> {
        self.request(Method::TRACE, url, options).await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("transport", &self.transport.name())
            .field("default_options", &self.default_options)
            .finish()
    }
}
