//! Customer operations.

use serde::Serialize;
use tracing::instrument;

use super::{BraintreeGateway, HttpMethod, validate_path_id};
use crate::{
    error::{GatewayError, Result},
    models::{Customer, CustomerRequest},
    result::GatewayResult,
    tr::{OperationKind, ResourceKind},
    transport::Transport,
};

#[derive(Serialize)]
struct CustomerEnvelope<'r> {
    customer: &'r CustomerRequest,
}

/// Customer operations of a [`BraintreeGateway`].
#[derive(Debug)]
pub struct CustomerGateway<'g, T: Transport> {
    gateway: &'g BraintreeGateway<T>,
}

impl<'g, T: Transport> CustomerGateway<'g, T> {
    pub(crate) const fn new(gateway: &'g BraintreeGateway<T>) -> Self {
        Self { gateway }
    }

    /// Form action URL for creating a customer through a redirect.
    #[must_use]
    pub fn transparent_redirect_url_for_create(&self) -> String {
        self.gateway.transparent_redirect().url_for(ResourceKind::Customer, OperationKind::Create)
    }

    /// Form action URL for updating a customer through a redirect.
    #[must_use]
    pub fn transparent_redirect_url_for_update(&self) -> String {
        self.gateway.transparent_redirect().url_for(ResourceKind::Customer, OperationKind::Update)
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Transport errors and the errors mapped from the response status.
    #[instrument(skip_all)]
    pub async fn create(&self, request: &CustomerRequest) -> Result<GatewayResult<Customer>> {
        let path = format!("{}/customers", self.gateway.merchant_path());
        let body = serde_json::to_vec(&CustomerEnvelope { customer: request })
            .map_err(|e| GatewayError::InvalidInput(format!("cannot encode customer request: {e}")))?;
        let response = self.gateway.execute(HttpMethod::Post, &path, Some(&body)).await?;
        GatewayResult::from_response(response.status, &response.body, ResourceKind::Customer.root())
    }

    /// Fetches a customer by id.
    ///
    /// # Errors
    ///
    /// [`GatewayError::NotFoundError`] for an unknown id, plus transport
    /// errors and the errors mapped from the response status.
    #[instrument(skip(self))]
    pub async fn find(&self, id: &str) -> Result<Customer> {
        let id = validate_path_id("customer id", id)?;
        let path = format!("{}/customers/{id}", self.gateway.merchant_path());
        let response = self.gateway.execute(HttpMethod::Get, &path, None).await?;
        match GatewayResult::from_response(response.status, &response.body, ResourceKind::Customer.root()) {
            Ok(GatewayResult::Success(customer)) => Ok(customer),
            Ok(GatewayResult::Failure(failure)) => Err(GatewayError::InvalidResponse(format!(
                "find returned a validation failure: {}",
                failure.message()
            ))),
            Err(GatewayError::NotFoundError(_)) => {
                Err(GatewayError::NotFoundError(format!("customer with id '{id}' not found")))
            }
            Err(e) => Err(e),
        }
    }

    /// Confirms a customer redirect.
    ///
    /// # Errors
    ///
    /// See [`TransparentRedirect::confirm_as`](crate::tr::TransparentRedirect::confirm_as).
    pub async fn confirm_transparent_redirect(&self, query_string: &str) -> Result<GatewayResult<Customer>> {
        self.gateway.transparent_redirect().confirm_as(ResourceKind::Customer, query_string).await
    }
}
