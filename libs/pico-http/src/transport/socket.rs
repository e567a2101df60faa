//! Socket transport: direct HTTP/1.1 connections through hyper
//!
//! Each call walks a small state machine. A hop is dispatched for the
//! current URL from the original merged options, its body is buffered in
//! full, and the status decides what happens next: 2xx resolves, 3xx loops
//! back with the `Location` target, anything else fails. Redirects are
//! followed here rather than by a tower layer so the hop ceiling and the
//! 310 rewrite can be reported with the decoded body of the last hop.

use super::Transport;
use crate::config::{
    DeflateMode, HttpClientConfig, MAX_REDIRECTS, TOO_MANY_REDIRECTS_MESSAGE,
    TOO_MANY_REDIRECTS_STATUS,
};
use crate::decoder;
use crate::error::{HttpError, ResponseError};
use crate::options::{MergedOptions, Progress, ProgressCallback};
use crate::request::{self, ResolvedRequest};
use crate::response::Response;
use crate::target::RequestTarget;
use crate::tls;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, LOCATION};
use http::{HeaderMap, Method, Request};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::{Connect, HttpConnector};
use hyper_util::rt::TokioExecutor;
use tower::ServiceExt;
use tower::util::BoxCloneSyncService;
use tracing::Instrument;

/// Type-erased service that performs a single hop
type HopService = BoxCloneSyncService<Request<Full<Bytes>>, http::Response<Incoming>, HttpError>;

/// What the status of a received hop means for the call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Success,
    Redirect,
    Failure,
}

impl Disposition {
    fn classify(status_code: u16) -> Self {
        match status_code {
            200..=299 => Disposition::Success,
            300..=399 => Disposition::Redirect,
            _ => Disposition::Failure,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Disposition::Success => "success",
            Disposition::Redirect => "redirect",
            Disposition::Failure => "failure",
        }
    }
}

/// Transport that opens its own connections
///
/// `http` targets go through a plain TCP client and `https` targets through
/// a rustls client. Idle connections are never pooled, so every hop of every
/// call opens a fresh connection.
#[derive(Clone)]
pub struct SocketTransport {
    http: HopService,
    https: HopService,
    default_headers: HeaderMap,
    deflate: DeflateMode,
}

impl SocketTransport {
    /// Build the transport from client configuration
    ///
    /// # Errors
    /// Returns `HttpError::Tls` if the TLS root store cannot be set up and
    /// `HttpError::InvalidHeaderValue` if a configured default header is
    /// not a valid header value.
    pub fn new(config: &HttpClientConfig) -> Result<Self, HttpError> {
        let default_headers = request::default_headers(config)?;
        let https = tls::build_https_connector(config.tls_roots)?;

        Ok(Self {
            http: hop_service(HttpConnector::new()),
            https: hop_service(https),
            default_headers,
            deflate: config.deflate,
        })
    }

    /// Dispatch one hop and receive its response, bounded by the timeout
    async fn exchange(
        &self,
        resolved: ResolvedRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Response, HttpError> {
        let timeout = resolved.timeout;
        let service = if resolved.target.scheme().is_secure() {
            self.https.clone()
        } else {
            self.http.clone()
        };

        let request = resolved.into_http()?;
        tracing::debug!("dispatching request");

        let pending = receive(service, request, on_progress, self.deflate);
        match timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| HttpError::Timeout(limit))?,
            None => pending.await,
        }
    }
}

fn hop_service<C>(connector: C) -> HopService
where
    C: Connect + Clone + Send + Sync + 'static,
{
    let client = Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build::<_, Full<Bytes>>(connector);

    BoxCloneSyncService::new(client.map_err(HttpError::from))
}

/// Send the request and buffer every body frame, reporting progress
async fn receive(
    service: HopService,
    request: Request<Full<Bytes>>,
    on_progress: Option<&ProgressCallback>,
    deflate: DeflateMode,
) -> Result<Response, HttpError> {
    let response = service.oneshot(request).await?;
    let (parts, mut body) = response.into_parts();

    let total = parts
        .headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let mut payload = BytesMut::new();
    while let Some(frame) = body.frame().await {
        if let Ok(data) = frame?.into_data() {
            payload.extend_from_slice(&data);
            if let Some(callback) = on_progress {
                callback(Progress {
                    loaded: u64::try_from(payload.len()).unwrap_or(u64::MAX),
                    total,
                });
            }
        }
    }

    let status_message = parts
        .extensions
        .get::<hyper::ext::ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| parts.status.canonical_reason())
        .unwrap_or_default()
        .to_owned();

    let body = decoder::decode_body(&parts.headers, payload.freeze(), deflate)?;
    Ok(Response::new(
        parts.status.as_u16(),
        status_message,
        parts.headers,
        body,
    ))
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl Transport for SocketTransport {
    fn name(&self) -> &'static str {
        "socket"
    }

    async fn perform_request(
        &self,
        method: Method,
        url: &str,
        options: MergedOptions,
    ) -> Result<Response, HttpError> {
        let mut target = RequestTarget::parse(url)?;
        let mut redirects = 0usize;

        loop {
            let span = tracing::debug_span!(
                "http_hop",
                http.method = %method,
                http.url = %target.sanitized(),
                http.hop = redirects,
                otel.kind = "client",
                http.status_code = tracing::field::Empty,
                disposition = tracing::field::Empty,
                location = tracing::field::Empty,
            );

            let resolved =
                ResolvedRequest::build(&method, target.clone(), &options, &self.default_headers)?;
            let response = match self
                .exchange(resolved, options.on_progress.as_ref())
                .instrument(span.clone())
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    span.record("disposition", "error");
                    return Err(err);
                }
            };

            let disposition = Disposition::classify(response.status_code());
            span.record("http.status_code", response.status_code());
            span.record("disposition", disposition.as_str());

            match disposition {
                Disposition::Success => return Ok(response),
                Disposition::Redirect => {
                    if redirects > MAX_REDIRECTS {
                        tracing::warn!(
                            parent: &span,
                            method = %method,
                            url = %target.sanitized(),
                            redirects,
                            "redirect ceiling exceeded"
                        );
                        let response = response
                            .with_status(TOO_MANY_REDIRECTS_STATUS, TOO_MANY_REDIRECTS_MESSAGE);
                        return Err(ResponseError::new(TOO_MANY_REDIRECTS_MESSAGE, response).into());
                    }

                    let Some(next) = location(&response).map(|loc| target.join(loc)) else {
                        let message = format!(
                            "{} {} Missing Location header",
                            response.status_code(),
                            response.status_message()
                        );
                        return Err(ResponseError::new(message, response).into());
                    };

                    target = next?;
                    redirects += 1;
                    span.record("location", target.sanitized().as_str());
                    tracing::debug!(
                        parent: &span,
                        status = response.status_code(),
                        location = %target.sanitized(),
                        redirects,
                        "following redirect"
                    );
                }
                Disposition::Failure => {
                    let message = format!(
                        "{} {} Request Failed",
                        response.status_code(),
                        response.status_message()
                    );
                    return Err(ResponseError::new(message, response).into());
                }
            }
        }
    }
}
