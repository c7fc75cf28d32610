//! Braintree Transparent Redirect client
//!
//! Card data submitted through a Transparent Redirect never touches the
//! merchant's servers: the browser posts the payment form straight to the
//! gateway, and the gateway redirects back with a signed query string the
//! merchant confirms server-side. This crate implements the merchant half of
//! that protocol.
//!
//! # Protocol
//!
//! ```text
//! ┌──────────────┐  tr_data + form action   ┌──────────────┐
//! │   Merchant   │─────────────────────────►│   Browser    │
//! │   (server)   │                          └──────┬───────┘
//! └──────┬───────┘                                 │ POST form fields + tr_data
//!        │                                         ▼
//!        │          302 redirect_url?      ┌──────────────┐
//!        │   http_status=..&id=..&hash=..  │   Gateway    │
//!        │◄────────────────────────────────│              │
//!        │                                 └──────▲───────┘
//!        │   POST .../confirm_transparent_redirect_request {"id": ..}
//!        └────────────────────────────────────────┘
//! ```
//!
//! Both directions are authenticated with HMAC-SHA1 over a canonical,
//! key-sorted query string, keyed with the merchant's private key.
//!
//! # Quick Start
//!
//! ## 1. Build the payment form
//!
//! ```rust
//! use braintree_tr::{
//!     config::{Environment, GatewayConfig},
//!     gateway::BraintreeGateway,
//!     models::{CreditCardOptionsRequest, CreditCardRequest},
//! };
//!
//! # fn example() -> braintree_tr::Result<()> {
//! let gateway = BraintreeGateway::new(GatewayConfig::new(
//!     Environment::Sandbox,
//!     "integration_merchant_id",
//!     "integration_public_key",
//!     "integration_private_key",
//! ))?;
//!
//! // Fields the merchant fixes; the browser adds number, cvv and expiration
//! let request = CreditCardRequest {
//!     customer_id: Some("customer-1".to_owned()),
//!     options: Some(CreditCardOptionsRequest { verify_card: Some(true), ..Default::default() }),
//!     ..Default::default()
//! };
//!
//! let action = gateway.credit_card().transparent_redirect_url_for_create();
//! let tr_data = gateway.tr_data(&request, "https://shop.example.com/cards/return")?;
//!
//! assert!(action.ends_with("/payment_methods/all/create_via_transparent_redirect_request"));
//! assert!(gateway.transparent_redirect().is_tr_data_valid(&tr_data));
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Confirm the redirect
//!
//! ```rust,no_run
//! use braintree_tr::{GatewayError, gateway::BraintreeGateway};
//!
//! # async fn example(gateway: BraintreeGateway, query_string: &str) -> braintree_tr::Result<()> {
//! match gateway.credit_card().confirm_transparent_redirect(query_string).await {
//!     Ok(result) if result.is_success() => {
//!         let card = result.into_target().expect("success carries a card");
//!         println!("stored {} expiring {}", card.masked_number(), card.expiration_date());
//!     }
//!     Ok(result) => {
//!         let failure = result.failure().expect("not a success");
//!         for error in failure.errors().deep_all() {
//!             println!("{}: {}", error.attribute, error.message);
//!         }
//!     }
//!     Err(GatewayError::AuthenticationError(msg)) => {
//!         eprintln!("query string rejected: {msg}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`tr`]: the redirect protocol (field trees, signing, query strings, confirmation)
//! - [`gateway`]: configured client and per-resource operations
//! - [`models`]: request payloads and resources
//! - [`result`]: typed success/failure outcomes and validation errors
//! - [`status`]: HTTP status classification
//! - [`config`]: environments, credentials and TOML configuration
//! - [`transport`]: transport abstraction and the reqwest implementation
//! - [`error`]: error types
//!
//! # Error Handling
//!
//! Operations return [`Result<T, GatewayError>`](error::Result). Validation
//! failures and processor declines are business outcomes and come back as
//! [`GatewayResult::Failure`](result::GatewayResult::Failure) instead. Nothing
//! in this crate retries.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest"
)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod result;
pub mod status;
pub mod tr;
pub mod transport;

pub use error::{GatewayError, Result};
pub use gateway::BraintreeGateway;
pub use result::GatewayResult;

/// Gateway API version sent in `X-ApiVersion` and the `api_version` trData field.
pub const API_VERSION: &str = "2";
