//! Transport adapters
//!
//! A [`Transport`] performs one logical call: it receives the method, the
//! raw URL and the fully merged options, and resolves to a decoded
//! [`Response`] or an [`HttpError`]. The client picks one transport at
//! construction time and delegates every verb to it.
//!
//! - [`SocketTransport`] - direct connections through hyper, follows redirects itself
//! - [`HostTransport`] - delegates to a host-native request object

use crate::error::HttpError;
use crate::options::MergedOptions;
use crate::response::Response;
use async_trait::async_trait;
use http::Method;

pub mod host;
pub mod socket;

pub use host::{HostRequest, HostResponse, HostTransport, RequestHost, parse_raw_headers};
pub use socket::SocketTransport;

/// A request backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs and `UnsupportedMethod` errors
    fn name(&self) -> &'static str;

    /// Whether this transport can issue `method`
    fn supports(&self, _method: &Method) -> bool {
        true
    }

    /// Perform one logical call
    ///
    /// # Errors
    /// Transport failures, failing statuses and request construction errors
    /// are all reported as [`HttpError`].
    async fn perform_request(
        &self,
        method: Method,
        url: &str,
        options: MergedOptions,
    ) -> Result<Response, HttpError>;
}
