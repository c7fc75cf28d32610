//! Request payloads.
//!
//! Requests serialize to the nested JSON the gateway accepts and, through
//! [`TrRequest`], to the field tree embedded in trData.

use std::fmt;

use serde::Serialize;

use crate::{
    error::{GatewayError, Result},
    tr::{Node, OperationKind, ResourceKind, TrKind},
};

/// A request that can be submitted through a transparent redirect.
pub trait TrRequest: Serialize {
    /// Resource the request creates or updates.
    const RESOURCE: ResourceKind;

    /// Top-level field naming the resource to update, with its value.
    ///
    /// `None` means the request creates a new resource.
    fn update_target(&self) -> Option<(&'static str, &str)>;

    /// The trData kind implied by the request.
    fn tr_kind(&self) -> TrKind {
        let operation = if self.update_target().is_some() { OperationKind::Update } else { OperationKind::Create };
        TrKind::new(Self::RESOURCE, operation)
    }

    /// Field tree: the serialized request under the resource root plus the
    /// update target at the top level.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] if the request cannot be serialized.
    fn to_node(&self) -> Result<Node> {
        let value = serde_json::to_value(self)
            .map_err(|e| GatewayError::InvalidInput(format!("cannot serialize request: {e}")))?;
        let mut node = Node::map();
        if let Some(fields) = Node::from_json(&value).filter(|fields| !fields.is_empty()) {
            node.insert(Self::RESOURCE.root(), fields);
        }
        if let Some((field, value)) = self.update_target() {
            node.insert(field, value);
        }
        Ok(node)
    }
}

/// Credit card create/update request.
#[derive(Clone, Default, Serialize)]
pub struct CreditCardRequest {
    /// Owning customer (create only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Name printed on the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder_name: Option<String>,
    /// Full card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Card verification value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvv: Option<String>,
    /// Expiration as `MM/YY` or `MM/YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    /// Expiration month, when not using `expiration_date`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_month: Option<String>,
    /// Expiration year, when not using `expiration_date`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_year: Option<String>,
    /// Token to assign to a new card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Billing address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<AddressRequest>,
    /// Processing options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<CreditCardOptionsRequest>,
    /// Token of the card to update. Sent outside the `credit_card` object.
    #[serde(skip)]
    pub payment_method_token: Option<String>,
}

impl fmt::Debug for CreditCardRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreditCardRequest")
            .field("customer_id", &self.customer_id)
            .field("cardholder_name", &self.cardholder_name)
            .field("number", &self.number.as_deref().map(mask_number))
            .field("cvv", &self.cvv.as_ref().map(|_| "[REDACTED]"))
            .field("expiration_date", &self.expiration_date)
            .field("expiration_month", &self.expiration_month)
            .field("expiration_year", &self.expiration_year)
            .field("token", &self.token)
            .field("billing_address", &self.billing_address)
            .field("options", &self.options)
            .field("payment_method_token", &self.payment_method_token)
            .finish()
    }
}

impl TrRequest for CreditCardRequest {
    const RESOURCE: ResourceKind = ResourceKind::CreditCard;

    fn update_target(&self) -> Option<(&'static str, &str)> {
        self.payment_method_token.as_deref().map(|token| ("payment_method_token", token))
    }
}

fn mask_number(number: &str) -> String {
    let digits = number.chars().count();
    if digits <= 4 {
        return "*".repeat(digits);
    }
    let last_four: String = number.chars().skip(digits - 4).collect();
    format!("{}{last_four}", "*".repeat(digits - 4))
}

/// Address attached to a card or customer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressRequest {
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Company.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Street line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    /// Apartment, suite, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_address: Option<String>,
    /// City.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    /// State or province.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Postal code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// Country name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
}

/// Card processing options.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreditCardOptionsRequest {
    /// Run a verification before storing the card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_card: Option<bool>,
    /// Make the card the customer's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_default: Option<bool>,
}

/// Customer create/update request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerRequest {
    /// Id to assign to a new customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// First name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Company.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Card to store with the customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCardRequest>,
    /// Id of the customer to update. Sent outside the `customer` object.
    #[serde(skip)]
    pub customer_id: Option<String>,
}

impl TrRequest for CustomerRequest {
    const RESOURCE: ResourceKind = ResourceKind::Customer;

    fn update_target(&self) -> Option<(&'static str, &str)> {
        self.customer_id.as_deref().map(|id| ("customer_id", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreditCardRequest {
        CreditCardRequest {
            customer_id: Some("c-1".to_owned()),
            cardholder_name: Some("John Doe".to_owned()),
            number: Some("5105105105105100".to_owned()),
            cvv: Some("123".to_owned()),
            expiration_date: Some("05/12".to_owned()),
            billing_address: Some(AddressRequest { postal_code: Some("44444".to_owned()), ..Default::default() }),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_request_kind_and_fields() {
        let request = create_request();
        assert_eq!(request.tr_kind().as_str(), "create_payment_method");

        let node = request.to_node().unwrap();
        assert_eq!(node.lookup("credit_card.number").and_then(Node::as_str), Some("5105105105105100"));
        assert_eq!(node.lookup("credit_card.billing_address.postal_code").and_then(Node::as_str), Some("44444"));
        assert!(node.get("payment_method_token").is_none());
        assert!(node.lookup("credit_card.token").is_none());
    }

    #[test]
    fn test_update_request_puts_token_at_top_level() {
        let request = CreditCardRequest {
            payment_method_token: Some("tok-1".to_owned()),
            cardholder_name: Some("Joe Cool".to_owned()),
            ..Default::default()
        };

        assert_eq!(request.tr_kind().as_str(), "update_payment_method");
        let node = request.to_node().unwrap();
        assert_eq!(node.get("payment_method_token").and_then(Node::as_str), Some("tok-1"));
        assert!(node.lookup("credit_card.payment_method_token").is_none());
        assert_eq!(node.lookup("credit_card.cardholder_name").and_then(Node::as_str), Some("Joe Cool"));
    }

    #[test]
    fn test_options_render_as_text() {
        let request = CreditCardRequest {
            options: Some(CreditCardOptionsRequest { verify_card: Some(true), make_default: None }),
            ..Default::default()
        };
        let node = request.to_node().unwrap();
        assert_eq!(node.lookup("credit_card.options.verify_card").and_then(Node::as_str), Some("true"));
        assert!(node.lookup("credit_card.options.make_default").is_none());
    }

    #[test]
    fn test_empty_request_has_no_root() {
        let node = CreditCardRequest::default().to_node().unwrap();
        assert!(node.is_empty());
    }

    #[test]
    fn test_customer_request_nests_card() {
        let request = CustomerRequest {
            first_name: Some("Dan".to_owned()),
            credit_card: Some(create_request()),
            ..Default::default()
        };

        assert_eq!(request.tr_kind().as_str(), "create_customer");
        let node = request.to_node().unwrap();
        assert_eq!(node.lookup("customer.credit_card.cardholder_name").and_then(Node::as_str), Some("John Doe"));

        let update = CustomerRequest { customer_id: Some("c-9".to_owned()), ..Default::default() };
        assert_eq!(update.tr_kind().as_str(), "update_customer");
        assert_eq!(update.to_node().unwrap().flatten(), vec![("customer_id".to_owned(), "c-9".to_owned())]);
    }

    #[test]
    fn test_debug_masks_number_and_cvv() {
        let debug = format!("{:?}", create_request());
        assert!(!debug.contains("5105105105105100"));
        assert!(debug.contains("************5100"));
        assert!(!debug.contains("\"123\""));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_mask_short_number() {
        assert_eq!(mask_number("123"), "***");
        assert_eq!(mask_number("41111"), "*1111");
    }
}
