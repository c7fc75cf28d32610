//! Configured gateway client.
//!
//! [`BraintreeGateway`] owns the configuration, the credentials, the keyed
//! signer and the transport. Per-resource operations are reached through
//! short-lived borrowed views:
//!
//! ```rust,no_run
//! use braintree_tr::{
//!     config::{Environment, GatewayConfig},
//!     gateway::BraintreeGateway,
//!     models::CreditCardRequest,
//! };
//!
//! # async fn example() -> braintree_tr::Result<()> {
//! let gateway = BraintreeGateway::new(GatewayConfig::new(
//!     Environment::Sandbox,
//!     "integration_merchant_id",
//!     "integration_public_key",
//!     "integration_private_key",
//! ))?;
//!
//! // Render into the payment form
//! let action = gateway.credit_card().transparent_redirect_url_for_create();
//! let tr_data = gateway.tr_data(&CreditCardRequest::default(), "https://shop.example.com/return")?;
//!
//! // Later, with the query string the browser came back with
//! # let query_string = "";
//! let result = gateway.credit_card().confirm_transparent_redirect(query_string).await?;
//! if let Some(card) = result.target() {
//!     println!("stored {}", card.masked_number());
//! }
//! # Ok(())
//! # }
//! ```

mod credit_card;
mod customer;

use std::path::Path;

use tracing::{debug, instrument};

pub use self::{credit_card::CreditCardGateway, customer::CustomerGateway};
use crate::{
    config::{Credentials, GatewayConfig},
    error::{GatewayError, Result},
    models::TrRequest,
    tr::{TransparentRedirect, TrSigner},
    transport::{HttpTransport, RequestContext, Transport, TransportResponse},
};

/// HTTP method of a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// Gateway client bound to one merchant.
///
/// `Send + Sync` whenever the transport is; all state is read-only after
/// construction.
#[derive(Debug)]
pub struct BraintreeGateway<T: Transport = HttpTransport> {
    config: GatewayConfig,
    credentials: Credentials,
    signer: TrSigner,
    base_url: String,
    base_merchant_url: String,
    merchant_path: String,
    transport: T,
}

impl BraintreeGateway<HttpTransport> {
    /// Creates a gateway with the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if the configuration is
    /// invalid or the private key cannot be resolved, and
    /// [`GatewayError::HttpError`] if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(&config.http, config.environment.requires_https())?;
        Self::with_transport(config, transport)
    }

    /// Creates a gateway from TOML configuration.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_toml`] and [`BraintreeGateway::new`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Self::new(GatewayConfig::from_toml(toml_str)?)
    }

    /// Creates a gateway from a TOML file.
    ///
    /// # Errors
    ///
    /// See [`GatewayConfig::from_file`] and [`BraintreeGateway::new`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(GatewayConfig::from_file(path)?)
    }
}

impl<T: Transport> BraintreeGateway<T> {
    /// Creates a gateway with a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if the configuration is
    /// invalid or the private key cannot be resolved.
    pub fn with_transport(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let credentials = config.credentials()?;
        let signer = TrSigner::new(credentials.private_key())?;
        let base_url = config.base_url()?;
        let merchant_path = format!("/merchants/{}", credentials.merchant_id());
        let base_merchant_url = format!("{base_url}{merchant_path}");

        debug!(
            environment = ?config.environment,
            base_url = %base_url,
            protocol = transport.protocol_name(),
            "gateway configured"
        );

        Ok(Self { config, credentials, signer, base_url, base_merchant_url, merchant_path, transport })
    }

    /// Configuration the gateway was built from.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Resolved credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Gateway base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `<base>/merchants/<merchant_id>`.
    #[must_use]
    pub fn base_merchant_url(&self) -> &str {
        &self.base_merchant_url
    }

    /// `/merchants/<merchant_id>`.
    #[must_use]
    pub fn merchant_path(&self) -> &str {
        &self.merchant_path
    }

    pub(crate) const fn signer(&self) -> &TrSigner {
        &self.signer
    }

    /// Transparent Redirect operations.
    #[must_use]
    pub const fn transparent_redirect(&self) -> TransparentRedirect<'_, T> {
        TransparentRedirect::new(self)
    }

    /// Credit card operations.
    #[must_use]
    pub const fn credit_card(&self) -> CreditCardGateway<'_, T> {
        CreditCardGateway::new(self)
    }

    /// Customer operations.
    #[must_use]
    pub const fn customer(&self) -> CustomerGateway<'_, T> {
        CustomerGateway::new(self)
    }

    /// Builds trData for `request`.
    ///
    /// The kind is derived from the request: an update when it names an
    /// existing resource, a create otherwise.
    ///
    /// # Errors
    ///
    /// See [`build_tr_data`](crate::tr::build_tr_data).
    pub fn tr_data<R: TrRequest>(&self, request: &R, redirect_url: &str) -> Result<String> {
        self.transparent_redirect().tr_data_for(request, redirect_url)
    }

    /// Sends one request below the gateway base URL.
    #[instrument(skip(self, body), fields(protocol = self.transport.protocol_name()))]
    pub(crate) async fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse> {
        let ctx = RequestContext {
            base_url: &self.base_url,
            path,
            headers: vec![],
            content_type: body.map(|_| "application/json"),
        };
        let body = body.unwrap_or_default();

        let response = match method {
            HttpMethod::Get => self.transport.get(&self.credentials, ctx).await?,
            HttpMethod::Post => self.transport.post(&self.credentials, ctx, body).await?,
            HttpMethod::Put => self.transport.put(&self.credentials, ctx, body).await?,
            HttpMethod::Delete => self.transport.delete(&self.credentials, ctx).await?,
        };

        debug!(status = response.status, "gateway call completed");
        Ok(response)
    }
}

/// Checks an id used as a URL path segment.
pub(crate) fn validate_path_id<'a>(name: &str, id: &'a str) -> Result<&'a str> {
    if id.is_empty() {
        return Err(GatewayError::InvalidInput(format!("{name} must not be empty")));
    }
    if !id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-') {
        return Err(GatewayError::InvalidInput(format!("{name} contains invalid characters: {id}")));
    }
    Ok(id)
}
