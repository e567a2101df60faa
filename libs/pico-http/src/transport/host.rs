//! Host-native transport
//!
//! Delegates a call to a request object provided by the embedding host (an
//! XHR-like object in a browser runtime). The host follows redirects and
//! decodes bodies itself, so this adapter only translates options onto the
//! host object and its completion back into a [`Response`].
//!
//! The host side is abstracted by [`RequestHost`] and [`HostRequest`];
//! applications supply the binding for their runtime.

use super::Transport;
use crate::decoder::parse_json_or_text;
use crate::error::{HttpError, ResponseError};
use crate::options::{MergedOptions, ProgressCallback, ResponseType};
use crate::response::{Body, Response};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use std::sync::Arc;
use std::time::Duration;

/// Factory for host request objects, one per call
pub trait RequestHost: Send + Sync {
    fn create_request(&self) -> Box<dyn HostRequest>;
}

/// A single host-native request object
///
/// Setters mirror the host object's own API and are only invoked for
/// options the caller actually specified.
#[async_trait]
pub trait HostRequest: Send {
    /// Initialize the request
    ///
    /// # Errors
    /// Implementations report a host refusal (bad URL, forbidden method) as
    /// an [`HttpError`].
    fn open(&mut self, method: &Method, url: &str, is_async: bool) -> Result<(), HttpError>;

    fn set_response_type(&mut self, response_type: ResponseType);

    fn set_timeout(&mut self, timeout: Duration);

    fn set_with_credentials(&mut self, with_credentials: bool);

    /// # Errors
    /// Implementations report headers the host refuses as an [`HttpError`].
    fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), HttpError>;

    fn set_progress_callback(&mut self, callback: ProgressCallback);

    /// Send the request and wait for it to complete
    ///
    /// # Errors
    /// Host network errors, aborts and host timeouts must be reported as
    /// transport-class errors (`HttpError::Transport` / `HttpError::Timeout`)
    /// rather than leaving the future pending.
    async fn send(self: Box<Self>, body: Option<Bytes>) -> Result<HostResponse, HttpError>;
}

/// Completed state of a host request object
#[derive(Debug, Clone, PartialEq)]
pub struct HostResponse {
    pub status: u16,
    pub status_text: String,
    /// Header block as the host reports it: `name: value` lines
    pub raw_headers: String,
    /// Response type the host decoded the body as
    pub response_type: ResponseType,
    /// Host-decoded body; `None` when the host produced no value
    pub response: Option<Body>,
    /// Body as text
    pub response_text: String,
}

/// Parse a raw `name: value` header block into a header map
///
/// Lines are split at the first `:` and both sides trimmed, so values that
/// themselves contain colons (dates, URLs) are kept whole. Lines without a
/// colon, or that are not representable as headers, are skipped.
#[must_use]
pub fn parse_raw_headers(raw: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for line in raw.split(['\r', '\n']) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.trim()),
            HeaderValue::try_from(value.trim()),
        ) else {
            tracing::debug!(line, "skipping unparsable host header line");
            continue;
        };
        headers.append(name, value);
    }
    headers
}

/// Transport backed by a host-native request object
///
/// `TRACE` is not available: hosts of this kind refuse to issue it.
#[derive(Clone)]
pub struct HostTransport {
    host: Arc<dyn RequestHost>,
}

impl HostTransport {
    #[must_use]
    pub fn new(host: Arc<dyn RequestHost>) -> Self {
        Self { host }
    }

    fn prepare(
        &self,
        method: &Method,
        url: &str,
        options: &MergedOptions,
    ) -> Result<Box<dyn HostRequest>, HttpError> {
        let mut request = self.host.create_request();
        request.open(method, url, options.is_async)?;

        if options.response_type.is_host_decoded() {
            request.set_response_type(options.response_type);
        }
        if let Some(timeout) = options.effective_timeout() {
            request.set_timeout(timeout);
        }
        if let Some(with_credentials) = options.with_credentials {
            request.set_with_credentials(with_credentials);
        }
        if let Some(credentials) = options.credentials() {
            request.set_request_header("Authorization", &credentials.basic_header())?;
        }
        for (name, value) in &options.headers {
            request.set_request_header(name, value)?;
        }
        if let Some(callback) = &options.on_progress {
            request.set_progress_callback(Arc::clone(callback));
        }

        Ok(request)
    }
}

impl std::fmt::Debug for HostTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostTransport").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HostTransport {
    fn name(&self) -> &'static str {
        "host"
    }

    fn supports(&self, method: &Method) -> bool {
        *method != Method::TRACE
    }

    async fn perform_request(
        &self,
        method: Method,
        url: &str,
        options: MergedOptions,
    ) -> Result<Response, HttpError> {
        if !self.supports(&method) {
            return Err(HttpError::UnsupportedMethod {
                method,
                transport: self.name(),
            });
        }

        let request = self.prepare(&method, url, &options)?;
        tracing::debug!(method = %method, "sending host request");
        let completed = request.send(options.body.clone()).await?;

        let headers = parse_raw_headers(&completed.raw_headers);
        let body = if completed.response_type.is_host_decoded() {
            completed.response.unwrap_or(Body::Json(serde_json::Value::Null))
        } else {
            parse_json_or_text(completed.response_text.clone())
        };

        let response = Response::new(completed.status, completed.status_text, headers, body);
        if (200..300).contains(&completed.status) {
            Ok(response)
        } else {
            let message = format!("[{}] {}", completed.status, completed.response_text);
            Err(ResponseError::new(message, response).into())
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::options::{Progress, RequestOptions};
    use serde_json::json;
    use std::sync::Mutex;

    /// Calls observed by the fake host, in order
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open(Method, String, bool),
        ResponseType(ResponseType),
        Timeout(Duration),
        WithCredentials(bool),
        Header(String, String),
        Progress,
        Send(Option<Bytes>),
    }

    type Outcome = Result<HostResponse, String>;

    /// In-memory host answering every request with a scripted outcome
    struct FakeHost {
        calls: Arc<Mutex<Vec<Call>>>,
        outcome: Outcome,
    }

    impl FakeHost {
        fn answering(outcome: Outcome) -> (Arc<Self>, Arc<Mutex<Vec<Call>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            let host = Arc::new(Self {
                calls: Arc::clone(&calls),
                outcome,
            });
            (host, calls)
        }
    }

    impl RequestHost for FakeHost {
        fn create_request(&self) -> Box<dyn HostRequest> {
            Box::new(FakeRequest {
                calls: Arc::clone(&self.calls),
                outcome: self.outcome.clone(),
                progress: None,
            })
        }
    }

    struct FakeRequest {
        calls: Arc<Mutex<Vec<Call>>>,
        outcome: Outcome,
        progress: Option<ProgressCallback>,
    }

    impl FakeRequest {
        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl HostRequest for FakeRequest {
        fn open(&mut self, method: &Method, url: &str, is_async: bool) -> Result<(), HttpError> {
            self.record(Call::Open(method.clone(), url.to_owned(), is_async));
            Ok(())
        }

        fn set_response_type(&mut self, response_type: ResponseType) {
            self.record(Call::ResponseType(response_type));
        }

        fn set_timeout(&mut self, timeout: Duration) {
            self.record(Call::Timeout(timeout));
        }

        fn set_with_credentials(&mut self, with_credentials: bool) {
            self.record(Call::WithCredentials(with_credentials));
        }

        fn set_request_header(&mut self, name: &str, value: &str) -> Result<(), HttpError> {
            self.record(Call::Header(name.to_owned(), value.to_owned()));
            Ok(())
        }

        fn set_progress_callback(&mut self, callback: ProgressCallback) {
            self.record(Call::Progress);
            self.progress = Some(callback);
        }

        async fn send(self: Box<Self>, body: Option<Bytes>) -> Result<HostResponse, HttpError> {
            self.record(Call::Send(body));
            let response = self
                .outcome
                .clone()
                .map_err(|msg| HttpError::Transport(msg.into()))?;
            if let Some(progress) = &self.progress {
                let len = response.response_text.len() as u64;
                progress(Progress {
                    loaded: len,
                    total: Some(len),
                });
            }
            Ok(response)
        }
    }

    fn ok_text(text: &str) -> HostResponse {
        HostResponse {
            status: 200,
            status_text: "OK".to_owned(),
            raw_headers: "content-type: application/json\r\nx-request-id: r1\r\n".to_owned(),
            response_type: ResponseType::Default,
            response: None,
            response_text: text.to_owned(),
        }
    }

    async fn call(
        outcome: Outcome,
        method: Method,
        options: RequestOptions,
    ) -> (Result<Response, HttpError>, Vec<Call>) {
        let (host, calls) = FakeHost::answering(outcome);
        let transport = HostTransport::new(host);
        let result = transport
            .perform_request(method, "https://api.example.com/v1", options.merge_over_defaults())
            .await;
        let calls = calls.lock().unwrap().clone();
        (result, calls)
    }

    #[tokio::test]
    async fn test_only_open_and_send_without_options() {
        let (result, calls) = call(Ok(ok_text("{}")), Method::GET, RequestOptions::new()).await;

        assert!(result.is_ok());
        assert_eq!(
            calls,
            vec![
                Call::Open(Method::GET, "https://api.example.com/v1".to_owned(), true),
                Call::Send(None),
            ]
        );
    }

    #[tokio::test]
    async fn test_specified_options_are_applied() {
        let options = RequestOptions::new()
            .asynchronous(false)
            .response_type(ResponseType::Text)
            .timeout(Duration::from_secs(3))
            .with_credentials(true)
            .basic_auth("alice", "secret")
            .header("x-one", "1")
            .on_progress(|_| {})
            .body("payload");

        let (_, calls) = call(Ok(ok_text("")), Method::POST, options).await;

        assert_eq!(
            calls,
            vec![
                Call::Open(Method::POST, "https://api.example.com/v1".to_owned(), false),
                Call::ResponseType(ResponseType::Text),
                Call::Timeout(Duration::from_secs(3)),
                Call::WithCredentials(true),
                Call::Header("Authorization".to_owned(), "Basic YWxpY2U6c2VjcmV0".to_owned()),
                Call::Header("x-one".to_owned(), "1".to_owned()),
                Call::Progress,
                Call::Send(Some(Bytes::from_static(b"payload"))),
            ]
        );
    }

    #[tokio::test]
    async fn test_partial_credentials_set_no_auth_header() {
        let (_, calls) = call(
            Ok(ok_text("")),
            Method::GET,
            RequestOptions::new().username("alice"),
        )
        .await;
        assert!(!calls.iter().any(|c| matches!(c, Call::Header(..))));
    }

    #[tokio::test]
    async fn test_text_is_json_parsed_best_effort() {
        let (result, _) = call(
            Ok(ok_text(r#"{"id": 7}"#)),
            Method::GET,
            RequestOptions::new(),
        )
        .await;
        let resp = result.unwrap();
        assert_eq!(resp.body(), &Body::Json(json!({"id": 7})));
        assert_eq!(resp.headers()["x-request-id"], "r1");

        let (result, _) = call(
            Ok(ok_text("plain words")),
            Method::GET,
            RequestOptions::new(),
        )
        .await;
        assert_eq!(result.unwrap().body().as_text(), Some("plain words"));
    }

    #[tokio::test]
    async fn test_host_decoded_body_is_used_as_is() {
        let mut completed = ok_text("ignored");
        completed.response_type = ResponseType::ArrayBuffer;
        completed.response = Some(Body::Bytes(Bytes::from_static(b"\x00\x01")));

        let (result, _) = call(Ok(completed), Method::GET, RequestOptions::new()).await;
        assert_eq!(
            result.unwrap().body(),
            &Body::Bytes(Bytes::from_static(b"\x00\x01"))
        );
    }

    #[tokio::test]
    async fn test_host_decoded_without_value_is_null() {
        let mut completed = ok_text("");
        completed.response_type = ResponseType::Json;

        let (result, _) = call(Ok(completed), Method::GET, RequestOptions::new()).await;
        assert_eq!(result.unwrap().body(), &Body::Json(serde_json::Value::Null));
    }

    #[tokio::test]
    async fn test_non_2xx_rejects_with_status_and_text() {
        let completed = HostResponse {
            status: 403,
            status_text: "Forbidden".to_owned(),
            raw_headers: "content-type: text/plain\r\n".to_owned(),
            response_type: ResponseType::Default,
            response: None,
            response_text: "denied".to_owned(),
        };

        let (result, _) = call(Ok(completed), Method::DELETE, RequestOptions::new()).await;
        let err = result.unwrap_err();

        assert_eq!(err.to_string(), "[403] denied");
        assert_eq!(err.status_code(), Some(403));
        let resp = err.response().unwrap();
        assert_eq!(resp.status_message(), "Forbidden");
        assert_eq!(resp.headers()["content-type"], "text/plain");
        assert_eq!(resp.body().as_text(), Some("denied"));
    }

    #[tokio::test]
    async fn test_created_status_resolves() {
        let mut completed = ok_text("");
        completed.status = 201;
        let (result, _) = call(Ok(completed), Method::POST, RequestOptions::new()).await;
        assert_eq!(result.unwrap().status_code(), 201);
    }

    #[tokio::test]
    async fn test_host_error_is_transport_error() {
        let (result, _) = call(
            Err("network down".to_owned()),
            Method::GET,
            RequestOptions::new(),
        )
        .await;
        let err = result.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_trace_is_rejected_before_touching_host() {
        let (result, calls) = call(Ok(ok_text("")), Method::TRACE, RequestOptions::new()).await;

        assert!(matches!(
            result,
            Err(HttpError::UnsupportedMethod { transport: "host", .. })
        ));
        assert!(calls.is_empty());
    }

    #[test]
    fn test_parse_raw_headers() {
        let headers = parse_raw_headers(
            "Date: Mon, 01 Jan 2024 10:00:00 GMT\r\n\
             Location :  https://example.com:8443/next \r\n\
             not a header line\r\n\
             set-cookie: a=1\n\
             set-cookie: b=2\r\n\r\n",
        );

        assert_eq!(headers["date"], "Mon, 01 Jan 2024 10:00:00 GMT");
        assert_eq!(headers["location"], "https://example.com:8443/next");
        assert_eq!(headers.get_all("set-cookie").iter().count(), 2);
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_parse_raw_headers_skips_invalid_names() {
        let headers = parse_raw_headers("bad name: x\r\nok: y");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["ok"], "y");
    }
}
