use crate::options::RequestOptions;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("pico-http/", env!("CARGO_PKG_VERSION"));

/// Default `Accept` header value
pub const DEFAULT_ACCEPT: &str = "*/*";

/// Default `Accept-Encoding` header value; matches what the decoder can undo
pub const DEFAULT_ACCEPT_ENCODING: &str = "gzip, deflate, identity";

/// Number of redirect hops that may be followed before a chain is abandoned
///
/// A 3xx response received after this many hops fails with status 310.
pub const MAX_REDIRECTS: usize = 21;

/// Status code reported when the redirect ceiling is exceeded
pub const TOO_MANY_REDIRECTS_STATUS: u16 = 310;

/// Message reported when the redirect ceiling is exceeded
pub const TOO_MANY_REDIRECTS_MESSAGE: &str = "Too many redirects";

/// How a `Content-Encoding: deflate` payload is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeflateMode {
    /// Inflate the payload (zlib-wrapped, with a raw deflate fallback)
    #[default]
    Inflate,
    /// Run the payload through the deflate *compressor*
    ///
    /// Reproduces legacy clients that zlib-compressed the payload instead of
    /// decompressing it.
    /// Only useful for byte-for-byte compatibility with such clients.
    Recompress,
}

/// TLS root certificate configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Use Mozilla's root certificates (webpki-roots, no OS dependency)
    #[default]
    WebPki,
    /// Use OS native root certificate store
    Native,
}

/// Overall HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User-Agent header value (default: "pico-http/<version>")
    ///
    /// Sent unless the caller supplies its own `User-Agent` header.
    pub user_agent: String,

    /// `Accept` header value (default: `*/*`)
    pub accept: String,

    /// `Accept-Encoding` header value (default: `gzip, deflate, identity`)
    pub accept_encoding: String,

    /// Treatment of `deflate`-encoded responses (default: inflate)
    pub deflate: DeflateMode,

    /// TLS root certificate strategy (default: `WebPki`)
    pub tls_roots: TlsRootConfig,

    /// Options every request starts from before caller options are merged in
    ///
    /// Defaults to the library defaults: no body, no headers, no credentials,
    /// no timeout, `async = true`, empty response type.
    pub default_options: RequestOptions,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            accept: DEFAULT_ACCEPT.to_owned(),
            accept_encoding: DEFAULT_ACCEPT_ENCODING.to_owned(),
            deflate: DeflateMode::default(),
            tls_roots: TlsRootConfig::default(),
            default_options: RequestOptions::default(),
        }
    }
}

impl HttpClientConfig {
    /// Create minimal configuration (identity encoding only)
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            accept_encoding: "identity".to_owned(),
            ..Self::default()
        }
    }

    /// Create configuration for testing with mock servers
    ///
    /// Every request gets a 10 second timeout so a stuck mock cannot hang a test.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            default_options: RequestOptions::new().timeout(std::time::Duration::from_secs(10)),
            ..Self::default()
        }
    }

    /// Create configuration that mirrors legacy deflate handling
    #[must_use]
    pub fn legacy_deflate() -> Self {
        Self {
            deflate: DeflateMode::Recompress,
            ..Self::default()
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.accept, "*/*");
        assert_eq!(config.accept_encoding, "gzip, deflate, identity");
        assert_eq!(config.deflate, DeflateMode::Inflate);
        assert_eq!(config.tls_roots, TlsRootConfig::WebPki);
        assert_eq!(config.default_options.merge_over_defaults().timeout, None);
    }

    #[test]
    fn test_config_for_testing_sets_timeout() {
        let config = HttpClientConfig::for_testing();
        assert_eq!(
            config.default_options.merge_over_defaults().timeout,
            Some(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(HttpClientConfig::minimal().accept_encoding, "identity");
        assert_eq!(
            HttpClientConfig::legacy_deflate().deflate,
            DeflateMode::Recompress
        );
    }

    #[test]
    fn test_default_user_agent_has_version() {
        assert!(DEFAULT_USER_AGENT.starts_with("pico-http/"));
        assert!(DEFAULT_USER_AGENT.len() > "pico-http/".len());
    }
}
