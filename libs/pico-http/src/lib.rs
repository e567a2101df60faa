#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Verb-keyed HTTP client with interchangeable transports
//!
//! One API (`get`, `post`, `put`, `delete`, `head`, `patch`, `options`,
//! `connect`, `trace`) over two backends:
//! - **Socket transport** (default): hyper over plain TCP or rustls, with
//!   redirect following (up to 21 hops), gzip/deflate decoding and
//!   content-type driven body interpretation
//! - **Host transport**: delegates to a host-native request object supplied
//!   through [`RequestHost`]; the host follows redirects and decodes bodies
//!
//! Every call resolves to a [`Response`] whose body is exactly one of parsed
//! JSON, text or bytes. Non-2xx statuses reject with
//! [`HttpError::Response`], which keeps the decoded failing response.
//!
//! # Example
//!
//! ```ignore
//! use pico_http::{HttpClient, RequestOptions};
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("my-app/1.0")
//!     .build()?;
//!
//! let resp = client
//!     .get(
//!         "https://example.com/api/users",
//!         RequestOptions::new().basic_auth("alice", "secret"),
//!     )
//!     .await?;
//! let users: Vec<User> = resp.json()?;
//! ```

mod builder;
mod client;
mod config;
mod decoder;
mod error;
mod options;
mod request;
mod response;
mod target;
mod tls;
pub mod transport;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_ACCEPT, DEFAULT_ACCEPT_ENCODING, DEFAULT_USER_AGENT, DeflateMode, HttpClientConfig,
    MAX_REDIRECTS, TOO_MANY_REDIRECTS_MESSAGE, TOO_MANY_REDIRECTS_STATUS, TlsRootConfig,
};
pub use decoder::{decode_body, parse_json_or_text};
pub use error::{HttpError, ResponseError};
pub use options::{
    Credentials, MergedOptions, Progress, ProgressCallback, RequestOptions, ResponseType, merge,
};
pub use response::{Body, Response};
pub use target::{RequestTarget, Scheme};
pub use transport::{
    HostRequest, HostResponse, HostTransport, RequestHost, SocketTransport, Transport,
};
