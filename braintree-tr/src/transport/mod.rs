//! Transport abstraction.
//!
//! The gateway client never talks to the network directly. It hands a
//! [`RequestContext`] and the merchant [`Credentials`] to a [`Transport`],
//! which authenticates and sends the request and returns the raw response.
//! Status interpretation stays with the caller (see
//! [`check_http_status`](crate::status::check_http_status)), so a transport
//! returns a [`TransportResponse`] for every HTTP status and only fails when
//! no response was received.
//!
//! # Examples
//!
//! ```rust,no_run
//! use braintree_tr::{
//!     config::Credentials,
//!     transport::{HttpTransport, RequestContext, Transport},
//! };
//!
//! # async fn example() -> braintree_tr::Result<()> {
//! let transport = HttpTransport::new()?;
//! let credentials = Credentials::new(
//!     "integration_merchant_id",
//!     "integration_public_key",
//!     "integration_private_key",
//! )?;
//!
//! let ctx = RequestContext {
//!     base_url: "https://sandbox.braintreegateway.com:443",
//!     path: "/merchants/integration_merchant_id/payment_methods/abc",
//!     headers: vec![],
//!     content_type: None,
//! };
//!
//! let response = transport.get(&credentials, ctx).await?;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::{config::Credentials, error::Result};

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// Parameters of one gateway request.
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Gateway base URL, e.g. <https://sandbox.braintreegateway.com:443>.
    pub base_url: &'a str,
    /// Request path, e.g. `/merchants/<id>/payment_methods`.
    pub path: &'a str,
    /// Additional HTTP headers.
    pub headers: Vec<(&'a str, &'a str)>,
    /// Content-Type of the body, if any.
    pub content_type: Option<&'a str>,
}

/// Raw gateway response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Response headers.
    pub headers: Vec<(String, String)>,
}

/// Sends authenticated requests to the gateway.
///
/// Implementations must return `Ok` for every HTTP status they receive.
pub trait Transport: Send + Sync {
    /// Executes a GET request.
    ///
    /// # Errors
    ///
    /// Returns error if the request is rejected locally or no response arrives.
    fn get<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a POST request with body.
    ///
    /// # Errors
    ///
    /// Returns error if the request is rejected locally or no response arrives.
    fn post<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a PUT request with body.
    ///
    /// # Errors
    ///
    /// Returns error if the request is rejected locally or no response arrives.
    fn put<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Executes a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns error if the request is rejected locally or no response arrives.
    fn delete<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
    ) -> impl Future<Output = Result<TransportResponse>> + Send + 'a;

    /// Protocol name for logging, e.g. `http/1.1`.
    fn protocol_name(&self) -> &'static str;
}
