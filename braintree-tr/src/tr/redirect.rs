//! Transparent Redirect coordinator.
//!
//! Builds the signed trData a merchant embeds in its payment form, the URL
//! the form posts to, and confirms the signed query string the gateway
//! redirects the browser back with.
//!
//! ```text
//! merchant ── tr_data ──► browser ── POST form ──► gateway
//!                                                    │
//! merchant ◄── redirect_url?http_status=..&id=..&hash=..
//!    │
//!    └── confirm(query) ── POST {"id": ..} ──► gateway ──► GatewayResult
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    API_VERSION,
    error::{GatewayError, Result},
    gateway::{BraintreeGateway, HttpMethod},
    models::{CreditCard, Customer, TrRequest},
    result::GatewayResult,
    tr::{
        codec::{RedirectQueryString, SignedPayload, decode},
        kind::{OperationKind, ResourceKind, TrKind},
        node::Node,
        signer::TrSigner,
    },
    transport::{Transport, TransportResponse},
};

/// Control fields appended to every trData payload.
pub const CONTROL_FIELDS: [&str; 5] = ["api_version", "kind", "public_key", "redirect_url", "time"];

/// URL the merchant's form posts to.
///
/// # Examples
///
/// ```
/// use braintree_tr::tr::{OperationKind, ResourceKind, transparent_redirect_url};
///
/// let url = transparent_redirect_url(
///     "https://example.braintreegateway.com/merchants/integration_merchant_id",
///     ResourceKind::CreditCard,
///     OperationKind::Create,
/// );
/// assert_eq!(
///     url,
///     "https://example.braintreegateway.com/merchants/integration_merchant_id\
///      /payment_methods/all/create_via_transparent_redirect_request"
/// );
/// ```
#[must_use]
pub fn transparent_redirect_url(
    base_merchant_url: &str,
    resource: ResourceKind,
    operation: OperationKind,
) -> String {
    let action = match operation {
        OperationKind::Create => "create_via_transparent_redirect_request",
        OperationKind::Update => "update_via_transparent_redirect_request",
    };
    format!("{}/{}/all/{action}", base_merchant_url.trim_end_matches('/'), resource.path_segment())
}

/// Path the confirmation id is posted to.
#[must_use]
pub fn confirmation_path(merchant_path: &str, resource: ResourceKind) -> String {
    format!("{merchant_path}/{}/all/confirm_transparent_redirect_request", resource.path_segment())
}

/// Flattens `tr_params`, appends the control fields and signs the result.
///
/// `time` is rendered as `YYYYMMDDHHMMSS` in UTC.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] if `tr_params` is not a map, uses a
/// control field name at its top level, or `redirect_url` is not an absolute URL.
pub fn build_tr_data(
    signer: &TrSigner,
    public_key: &str,
    kind: TrKind,
    tr_params: &Node,
    redirect_url: &str,
    time: DateTime<Utc>,
) -> Result<SignedPayload> {
    Url::parse(redirect_url)
        .map_err(|e| GatewayError::InvalidInput(format!("invalid redirect_url '{redirect_url}': {e}")))?;

    let Node::Map(entries) = tr_params else {
        return Err(GatewayError::InvalidInput("trData parameters must be a map".to_owned()));
    };
    if let Some((reserved, _)) = entries.iter().find(|(key, _)| CONTROL_FIELDS.contains(&key.as_str())) {
        return Err(GatewayError::InvalidInput(format!("'{reserved}' is reserved for trData control fields")));
    }

    let mut data = tr_params.flatten();
    data.extend([
        ("api_version".to_owned(), API_VERSION.to_owned()),
        ("kind".to_owned(), kind.as_str().to_owned()),
        ("public_key".to_owned(), public_key.to_owned()),
        ("redirect_url".to_owned(), redirect_url.to_owned()),
        ("time".to_owned(), time.format("%Y%m%d%H%M%S").to_string()),
    ]);

    Ok(SignedPayload::sign(data, signer))
}

/// Result of a confirmation whose resource kind was read from the query string.
#[derive(Debug, Clone)]
pub enum ConfirmedResource {
    /// A created or updated credit card.
    CreditCard(CreditCard),
    /// A created or updated customer.
    Customer(Customer),
}

impl ConfirmedResource {
    /// Kind of the contained resource.
    #[must_use]
    pub const fn resource_kind(&self) -> ResourceKind {
        match self {
            Self::CreditCard(_) => ResourceKind::CreditCard,
            Self::Customer(_) => ResourceKind::Customer,
        }
    }
}

type ConfirmParser = fn(u16, &[u8]) -> Result<GatewayResult<ConfirmedResource>>;

/// Entry of the confirmation dispatch table.
struct ConfirmHandler {
    resource: ResourceKind,
    parse: ConfirmParser,
}

fn parse_credit_card(status: u16, body: &[u8]) -> Result<GatewayResult<ConfirmedResource>> {
    Ok(GatewayResult::<CreditCard>::from_response(status, body, ResourceKind::CreditCard.root())?
        .map(ConfirmedResource::CreditCard))
}

fn parse_customer(status: u16, body: &[u8]) -> Result<GatewayResult<ConfirmedResource>> {
    Ok(GatewayResult::<Customer>::from_response(status, body, ResourceKind::Customer.root())?
        .map(ConfirmedResource::Customer))
}

static CONFIRM_HANDLERS: [ConfirmHandler; 2] = [
    ConfirmHandler { resource: ResourceKind::CreditCard, parse: parse_credit_card },
    ConfirmHandler { resource: ResourceKind::Customer, parse: parse_customer },
];

fn confirm_handler(resource: ResourceKind) -> Result<&'static ConfirmHandler> {
    CONFIRM_HANDLERS
        .iter()
        .find(|handler| handler.resource == resource)
        .ok_or_else(|| GatewayError::InvalidInput(format!("no confirm handler for {resource:?}")))
}

/// Transparent Redirect operations bound to a configured gateway.
///
/// Obtained from [`BraintreeGateway::transparent_redirect`].
#[derive(Debug)]
pub struct TransparentRedirect<'g, T: Transport> {
    gateway: &'g BraintreeGateway<T>,
}

impl<'g, T: Transport> TransparentRedirect<'g, T> {
    pub(crate) const fn new(gateway: &'g BraintreeGateway<T>) -> Self {
        Self { gateway }
    }

    /// Form action URL for a resource and operation.
    #[must_use]
    pub fn url_for(&self, resource: ResourceKind, operation: OperationKind) -> String {
        transparent_redirect_url(self.gateway.base_merchant_url(), resource, operation)
    }

    /// Builds an encoded trData string timestamped now.
    ///
    /// # Errors
    ///
    /// See [`build_tr_data`].
    pub fn tr_data(&self, kind: TrKind, tr_params: &Node, redirect_url: &str) -> Result<String> {
        self.tr_data_at(kind, tr_params, redirect_url, Utc::now())
    }

    pub(crate) fn tr_data_at(
        &self,
        kind: TrKind,
        tr_params: &Node,
        redirect_url: &str,
        time: DateTime<Utc>,
    ) -> Result<String> {
        let payload = build_tr_data(
            self.gateway.signer(),
            self.gateway.credentials().public_key(),
            kind,
            tr_params,
            redirect_url,
            time,
        )?;
        debug!(kind = %kind, fields = payload.data().len(), "trData built");
        Ok(payload.encode())
    }

    /// Builds trData for a request, deriving the kind from it.
    ///
    /// # Errors
    ///
    /// See [`build_tr_data`] and [`TrRequest::to_node`].
    pub fn tr_data_for<R: TrRequest>(&self, request: &R, redirect_url: &str) -> Result<String> {
        self.tr_data(request.tr_kind(), &request.to_node()?, redirect_url)
    }

    /// Returns true if `tr_data` carries a valid signature from this merchant.
    #[must_use]
    pub fn is_tr_data_valid(&self, tr_data: &str) -> bool {
        decode(tr_data, self.gateway.signer()).is_ok()
    }

    /// Verifies and decodes a redirect query string without confirming it.
    ///
    /// # Errors
    ///
    /// See [`RedirectQueryString::parse`].
    pub fn parse_query_string(&self, query_string: &str) -> Result<RedirectQueryString> {
        RedirectQueryString::parse(query_string, self.gateway.signer())
    }

    /// Confirms a redirect, dispatching on its `kind`.
    ///
    /// # Errors
    ///
    /// - everything [`parse_query_string`](Self::parse_query_string) raises
    /// - [`GatewayError::MalformedQuery`] if the query carries no `kind`
    /// - transport errors and the errors mapped from the confirmation status
    #[instrument(skip_all)]
    pub async fn confirm(&self, query_string: &str) -> Result<GatewayResult<ConfirmedResource>> {
        let redirect = self.parse_query_string(query_string)?;
        let kind = redirect
            .kind()
            .ok_or_else(|| GatewayError::MalformedQuery("redirect carries no kind".to_owned()))?;
        let handler = confirm_handler(kind.resource)?;

        let response = self.post_confirmation(kind.resource, &redirect).await?;
        let result = (handler.parse)(response.status, &response.body)?;
        log_outcome(&result, kind.resource);
        Ok(result)
    }

    /// Confirms a redirect expected to concern `expected`.
    ///
    /// A `kind` naming another resource is rejected before any request.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::InvalidInput`] for a resource mismatch
    /// - everything [`confirm`](Self::confirm) raises once the kind is known
    pub async fn confirm_as<R: DeserializeOwned>(
        &self,
        expected: ResourceKind,
        query_string: &str,
    ) -> Result<GatewayResult<R>> {
        let redirect = self.parse_query_string(query_string)?;
        if let Some(kind) = redirect.kind()
            && kind.resource != expected
        {
            return Err(GatewayError::InvalidInput(format!(
                "redirect kind '{kind}' does not confirm a {}",
                expected.root()
            )));
        }

        let response = self.post_confirmation(expected, &redirect).await?;
        let result = GatewayResult::from_response(response.status, &response.body, expected.root())?;
        log_outcome(&result, expected);
        Ok(result)
    }

    #[instrument(skip(self, redirect), fields(http_status = redirect.http_status()))]
    async fn post_confirmation(
        &self,
        resource: ResourceKind,
        redirect: &RedirectQueryString,
    ) -> Result<TransportResponse> {
        let path = confirmation_path(self.gateway.merchant_path(), resource);
        let body = serde_json::to_vec(&serde_json::json!({ "id": redirect.id() }))
            .map_err(|e| GatewayError::InvalidInput(format!("cannot encode confirmation: {e}")))?;
        self.gateway.execute(HttpMethod::Post, &path, Some(&body)).await
    }
}

fn log_outcome<R>(result: &GatewayResult<R>, resource: ResourceKind) {
    match result.failure() {
        None => debug!(?resource, "redirect confirmed"),
        Some(failure) => warn!(
            ?resource,
            failure_message = failure.message(),
            errors = failure.errors().deep_size(),
            declined = failure.credit_card_verification().is_some_and(|v| v.is_declined()),
            "redirect confirmation returned a failure"
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::tr::codec::HASH_FIELD;

    const BASE: &str = "https://example.braintreegateway.com/merchants/integration_merchant_id";

    fn signer() -> TrSigner {
        TrSigner::new("integration_private_key").unwrap()
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2010, 2, 3, 4, 5, 6).unwrap()
    }

    #[test]
    fn test_transparent_redirect_urls() {
        let cases = [
            (ResourceKind::CreditCard, OperationKind::Create, "/payment_methods/all/create_via_transparent_redirect_request"),
            (ResourceKind::CreditCard, OperationKind::Update, "/payment_methods/all/update_via_transparent_redirect_request"),
            (ResourceKind::Customer, OperationKind::Create, "/customers/all/create_via_transparent_redirect_request"),
            (ResourceKind::Customer, OperationKind::Update, "/customers/all/update_via_transparent_redirect_request"),
        ];
        for (resource, operation, suffix) in cases {
            assert_eq!(transparent_redirect_url(BASE, resource, operation), format!("{BASE}{suffix}"));
        }
    }

    #[test]
    fn test_transparent_redirect_url_trailing_slash() {
        let url = transparent_redirect_url(&format!("{BASE}/"), ResourceKind::CreditCard, OperationKind::Create);
        assert!(!url.contains("//payment_methods"));
    }

    #[test]
    fn test_confirmation_path() {
        assert_eq!(
            confirmation_path("/merchants/m", ResourceKind::CreditCard),
            "/merchants/m/payment_methods/all/confirm_transparent_redirect_request"
        );
    }

    #[test]
    fn test_build_tr_data_control_fields() {
        let params = Node::map().with("credit_card", Node::map().with("cardholder_name", "John Doe"));
        let kind = TrKind::new(ResourceKind::CreditCard, OperationKind::Create);
        let payload =
            build_tr_data(&signer(), "integration_public_key", kind, &params, "http://example.com", fixed_time())
                .unwrap();

        let keys: Vec<&str> = payload.data().iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(
            keys,
            ["credit_card.cardholder_name", "api_version", "kind", "public_key", "redirect_url", "time"]
        );
        assert!(payload.data().contains(&("time".to_owned(), "20100203040506".to_owned())));
        assert!(payload.data().contains(&("kind".to_owned(), "create_payment_method".to_owned())));
        assert!(payload.data().contains(&("api_version".to_owned(), "2".to_owned())));
        assert!(payload.is_valid(&signer()));

        let encoded = payload.encode();
        let decoded = decode(&encoded, &signer()).unwrap();
        assert_eq!(decoded.get("redirect_url"), Some("http://example.com"));
        assert!(decoded.get(HASH_FIELD).is_none());
    }

    #[test]
    fn test_build_tr_data_is_deterministic_for_fixed_time() {
        let kind = TrKind::new(ResourceKind::Customer, OperationKind::Create);
        let first = build_tr_data(&signer(), "pub", kind, &Node::map(), "http://example.com", fixed_time()).unwrap();
        let second = build_tr_data(&signer(), "pub", kind, &Node::map(), "http://example.com", fixed_time()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_tr_data_rejects_reserved_field() {
        let params = Node::map().with("kind", "update_customer");
        let kind = TrKind::new(ResourceKind::Customer, OperationKind::Create);
        let result = build_tr_data(&signer(), "pub", kind, &params, "http://example.com", fixed_time());
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_build_tr_data_rejects_relative_redirect() {
        let kind = TrKind::new(ResourceKind::Customer, OperationKind::Create);
        let result = build_tr_data(&signer(), "pub", kind, &Node::map(), "/return", fixed_time());
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_build_tr_data_rejects_non_map_params() {
        let kind = TrKind::new(ResourceKind::Customer, OperationKind::Create);
        let result = build_tr_data(&signer(), "pub", kind, &Node::from("x"), "http://example.com", fixed_time());
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_dispatch_table_covers_every_resource() {
        for resource in [ResourceKind::CreditCard, ResourceKind::Customer] {
            assert_eq!(confirm_handler(resource).unwrap().resource, resource);
        }
    }

    #[test]
    fn test_handlers_parse_their_resource() {
        let card = (confirm_handler(ResourceKind::CreditCard).unwrap().parse)(
            201,
            br#"{"credit_card": {"token": "t1", "bin": "510510", "last_4": "5100"}}"#,
        )
        .unwrap();
        assert_eq!(card.target().map(ConfirmedResource::resource_kind), Some(ResourceKind::CreditCard));

        let customer =
            (confirm_handler(ResourceKind::Customer).unwrap().parse)(200, br#"{"customer": {"id": "c-1"}}"#).unwrap();
        assert_eq!(customer.target().map(ConfirmedResource::resource_kind), Some(ResourceKind::Customer));
    }
}
