//! Credit card operations.

use serde::Serialize;
use tracing::{instrument, warn};

use super::{BraintreeGateway, HttpMethod, validate_path_id};
use crate::{
    error::{GatewayError, Result},
    models::{CreditCard, CreditCardRequest},
    result::{Failure, GatewayResult},
    status::{StatusClass, check_http_status},
    tr::{OperationKind, ResourceKind},
    transport::Transport,
};

#[derive(Serialize)]
struct CreditCardEnvelope<'r> {
    credit_card: &'r CreditCardRequest,
}

/// Credit card operations of a [`BraintreeGateway`].
#[derive(Debug)]
pub struct CreditCardGateway<'g, T: Transport> {
    gateway: &'g BraintreeGateway<T>,
}

impl<'g, T: Transport> CreditCardGateway<'g, T> {
    pub(crate) const fn new(gateway: &'g BraintreeGateway<T>) -> Self {
        Self { gateway }
    }

    /// Form action URL for creating a card through a redirect.
    #[must_use]
    pub fn transparent_redirect_url_for_create(&self) -> String {
        self.gateway.transparent_redirect().url_for(ResourceKind::CreditCard, OperationKind::Create)
    }

    /// Form action URL for updating a card through a redirect.
    #[must_use]
    pub fn transparent_redirect_url_for_update(&self) -> String {
        self.gateway.transparent_redirect().url_for(ResourceKind::CreditCard, OperationKind::Update)
    }

    /// Stores a new card.
    ///
    /// With `options.verify_card` set, a declined card comes back as a
    /// [`GatewayResult::Failure`] carrying the verification.
    ///
    /// # Errors
    ///
    /// Transport errors and the errors mapped from the response status.
    #[instrument(skip_all)]
    pub async fn create(&self, request: &CreditCardRequest) -> Result<GatewayResult<CreditCard>> {
        let path = format!("{}/payment_methods", self.gateway.merchant_path());
        let body = encode(request)?;
        let response = self.gateway.execute(HttpMethod::Post, &path, Some(&body)).await?;
        let result =
            GatewayResult::<CreditCard>::from_response(response.status, &response.body, ResourceKind::CreditCard.root())?;
        if let Some(verification) = result.failure().and_then(|failure| failure.credit_card_verification()) {
            warn!(status = ?verification.status, "card verification failed");
        }
        Ok(result)
    }

    /// Fetches a card by token.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFoundError`] for an unknown token, plus transport
    /// errors and the errors mapped from the response status.
    #[instrument(skip(self))]
    pub async fn find(&self, token: &str) -> Result<CreditCard> {
        let path = self.card_path(token)?;
        let response = self.gateway.execute(HttpMethod::Get, &path, None).await?;
        match GatewayResult::from_response(response.status, &response.body, ResourceKind::CreditCard.root()) {
            Ok(GatewayResult::Success(card)) => Ok(card),
            Ok(GatewayResult::Failure(failure)) => Err(GatewayError::InvalidResponse(format!(
                "find returned a validation failure: {}",
                failure.message()
            ))),
            Err(GatewayError::NotFoundError(_)) => {
                Err(GatewayError::NotFoundError(format!("credit card with token '{token}' not found")))
            }
            Err(e) => Err(e),
        }
    }

    /// Updates the card identified by `token`.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFoundError`] for an unknown token, plus transport
    /// errors and the errors mapped from the response status.
    #[instrument(skip(self, request))]
    pub async fn update(&self, token: &str, request: &CreditCardRequest) -> Result<GatewayResult<CreditCard>> {
        let path = self.card_path(token)?;
        let body = encode(request)?;
        let response = self.gateway.execute(HttpMethod::Put, &path, Some(&body)).await?;
        GatewayResult::from_response(response.status, &response.body, ResourceKind::CreditCard.root())
    }

    /// Deletes the card identified by `token`.
    ///
    /// A deletion the gateway refuses comes back as a
    /// [`GatewayResult::Failure`].
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFoundError`] for an unknown token, plus transport
    /// errors and the errors mapped from the response status.
    #[instrument(skip(self))]
    pub async fn delete(&self, token: &str) -> Result<GatewayResult<()>> {
        let path = self.card_path(token)?;
        let response = self.gateway.execute(HttpMethod::Delete, &path, None).await?;
        match check_http_status(response.status)? {
            StatusClass::Success => Ok(GatewayResult::Success(())),
            StatusClass::ValidationFailure => {
                let failure = Failure::from_body(&response.body)?;
                warn!(failure_message = failure.message(), "card deletion refused");
                Ok(GatewayResult::Failure(failure))
            }
        }
    }

    /// Confirms a credit card redirect.
    ///
    /// # Errors
    ///
    /// See [`TransparentRedirect::confirm_as`](crate::tr::TransparentRedirect::confirm_as).
    pub async fn confirm_transparent_redirect(&self, query_string: &str) -> Result<GatewayResult<CreditCard>> {
        self.gateway.transparent_redirect().confirm_as(ResourceKind::CreditCard, query_string).await
    }

    fn card_path(&self, token: &str) -> Result<String> {
        let token = validate_path_id("token", token)?;
        Ok(format!("{}/payment_methods/{token}", self.gateway.merchant_path()))
    }
}

fn encode(request: &CreditCardRequest) -> Result<Vec<u8>> {
    serde_json::to_vec(&CreditCardEnvelope { credit_card: request })
        .map_err(|e| GatewayError::InvalidInput(format!("cannot encode credit card request: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_wraps_request() {
        let request = CreditCardRequest {
            cardholder_name: Some("John Doe".to_owned()),
            payment_method_token: Some("tok".to_owned()),
            ..Default::default()
        };
        let body: serde_json::Value = serde_json::from_slice(&encode(&request).unwrap()).unwrap();

        assert_eq!(body["credit_card"]["cardholder_name"], "John Doe");
        assert!(body["credit_card"].get("payment_method_token").is_none());
        assert!(body["credit_card"].get("number").is_none());
    }
}
