//! TLS setup for the socket transport

use crate::config::TlsRootConfig;
use crate::error::HttpError;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;

fn tls_error(err: rustls::Error) -> HttpError {
    HttpError::Tls(Box::new(err))
}

/// Installed process default, else aws-lc-rs
fn crypto_provider() -> Arc<CryptoProvider> {
    CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// OS trust store; an empty or unparsable store is an error
fn native_roots() -> Result<RootCertStore, HttpError> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "error loading native root certificate");
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
    if ignored > 0 {
        tracing::warn!(added, ignored, "skipped unparsable native root certificates");
    }
    if added == 0 {
        return Err(HttpError::Tls("no usable root certificates in the OS store".into()));
    }

    Ok(roots)
}

/// Connector for `https` targets, speaking HTTP/1.1 only
///
/// Plain `http` URIs are refused by this connector; the socket transport
/// routes them to a separate plain-TCP client.
///
/// # Errors
/// Returns `HttpError::Tls` if the selected root store cannot be set up.
pub fn build_https_connector(
    tls_roots: TlsRootConfig,
) -> Result<HttpsConnector<HttpConnector>, HttpError> {
    let provider = crypto_provider();
    let builder = match tls_roots {
        TlsRootConfig::WebPki => HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(provider)
            .map_err(tls_error)?,
        TlsRootConfig::Native => {
            let config = ClientConfig::builder_with_provider(provider)
                .with_safe_default_protocol_versions()
                .map_err(tls_error)?
                .with_root_certificates(native_roots()?)
                .with_no_client_auth();
            HttpsConnectorBuilder::new().with_tls_config(config)
        }
    };

    Ok(builder.https_only().enable_http1().build())
}
