use crate::config::{DeflateMode, HttpClientConfig, TlsRootConfig};
use crate::error::HttpError;
use crate::options::RequestOptions;
use crate::transport::{HostTransport, RequestHost, SocketTransport, Transport};
use std::sync::Arc;
use std::time::Duration;

/// How the built client reaches the network
enum TransportChoice {
    Socket,
    Host(Arc<dyn RequestHost>),
    Custom(Arc<dyn Transport>),
}

/// Builder for constructing an [`HttpClient`](crate::HttpClient)
///
/// The transport is fixed when the client is built: the socket transport by
/// default, the host transport after [`host`](Self::host), or any custom
/// [`Transport`] after [`transport`](Self::transport).
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    transport: TransportChoice,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a builder with a specific configuration
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self {
            config,
            transport: TransportChoice::Socket,
        }
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the Accept-Encoding header advertised by the socket transport
    #[must_use]
    pub fn accept_encoding(mut self, accept_encoding: impl Into<String>) -> Self {
        self.config.accept_encoding = accept_encoding.into();
        self
    }

    /// Choose how `deflate`-encoded responses are handled
    #[must_use]
    pub fn deflate(mut self, deflate: DeflateMode) -> Self {
        self.config.deflate = deflate;
        self
    }

    /// Choose the TLS root certificate store
    #[must_use]
    pub fn tls_roots(mut self, tls_roots: TlsRootConfig) -> Self {
        self.config.tls_roots = tls_roots;
        self
    }

    /// Replace the options every call starts from
    #[must_use]
    pub fn default_options(mut self, options: RequestOptions) -> Self {
        self.config.default_options = options;
        self
    }

    /// Set a default timeout for every call
    ///
    /// The socket transport applies it to each redirect hop; callers can
    /// override it per call or remove it with
    /// [`RequestOptions::clear_timeout`].
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let defaults = std::mem::take(&mut self.config.default_options);
        self.config.default_options = defaults.timeout(timeout);
        self
    }

    /// Issue requests through a host-native request object
    #[must_use]
    pub fn host(mut self, host: impl RequestHost + 'static) -> Self {
        self.transport = TransportChoice::Host(Arc::new(host));
        self
    }

    /// Issue requests through a custom transport
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = TransportChoice::Custom(transport);
        self
    }

    /// Build the HTTP client
    ///
    /// # Errors
    /// Returns an error if the socket transport cannot be initialized (TLS
    /// root store, invalid default header values).
    pub fn build(self) -> Result<crate::HttpClient, HttpError> {
        let transport: Arc<dyn Transport> = match self.transport {
            TransportChoice::Socket => Arc::new(SocketTransport::new(&self.config)?),
            TransportChoice::Host(host) => Arc::new(HostTransport::new(host)),
            TransportChoice::Custom(transport) => transport,
        };

        tracing::debug!(transport = transport.name(), "built HTTP client");

        Ok(crate::HttpClient {
            transport,
            default_options: self.config.default_options,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
