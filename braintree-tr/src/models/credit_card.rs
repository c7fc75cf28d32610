//! Credit card, address and verification resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored credit card.
///
/// The gateway never returns the full number; only the BIN (first six digits)
/// and the last four digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Payment method token.
    pub token: String,
    /// Owning customer.
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Name printed on the card.
    #[serde(default)]
    pub cardholder_name: Option<String>,
    /// First six digits of the number.
    #[serde(default)]
    pub bin: String,
    /// Last four digits of the number.
    #[serde(default, rename = "last_4")]
    pub last_four: String,
    /// Two-digit expiration month.
    #[serde(default)]
    pub expiration_month: String,
    /// Four-digit expiration year.
    #[serde(default)]
    pub expiration_year: String,
    /// Card brand, e.g. `MasterCard`.
    #[serde(default)]
    pub card_type: Option<String>,
    /// Whether this is the customer's default payment method.
    #[serde(default)]
    pub default: bool,
    /// Billing address attached to the card.
    #[serde(default)]
    pub billing_address: Option<Address>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CreditCard {
    /// Expiration as `MM/YYYY`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use braintree_tr::models::CreditCard;
    /// # let card: CreditCard = serde_json::from_str(
    /// #     r#"{"token": "t", "bin": "510510", "last_4": "5100", "expiration_month": "05", "expiration_year": "2012"}"#,
    /// # ).unwrap();
    /// assert_eq!(card.expiration_date(), "05/2012");
    /// assert_eq!(card.masked_number(), "510510******5100");
    /// ```
    #[must_use]
    pub fn expiration_date(&self) -> String {
        format!("{}/{}", self.expiration_month, self.expiration_year)
    }

    /// Number with the middle digits masked.
    #[must_use]
    pub fn masked_number(&self) -> String {
        format!("{}******{}", self.bin, self.last_four)
    }
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// Address id.
    pub id: Option<String>,
    /// Owning customer.
    pub customer_id: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Company.
    pub company: Option<String>,
    /// Street line.
    pub street_address: Option<String>,
    /// Apartment, suite, etc.
    pub extended_address: Option<String>,
    /// City.
    pub locality: Option<String>,
    /// State or province.
    pub region: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Country name.
    pub country_name: Option<String>,
}

/// Outcome of a card verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// The processor approved the card.
    Verified,
    /// The processor declined the card.
    ProcessorDeclined,
    /// The gateway rejected the card (fraud rules, AVS or CVV checks).
    GatewayRejected,
    /// The verification could not be completed.
    Failed,
    /// A status this client does not know.
    #[serde(other)]
    Unrecognized,
}

/// Verification returned alongside a declined card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardVerification {
    /// Verification outcome.
    pub status: VerificationStatus,
    /// Processor response code, e.g. `2000`.
    #[serde(default)]
    pub processor_response_code: Option<String>,
    /// Processor response text, e.g. `Do Not Honor`.
    #[serde(default)]
    pub processor_response_text: Option<String>,
    /// CVV check result code.
    #[serde(default)]
    pub cvv_response_code: Option<String>,
    /// AVS postal code check result code.
    #[serde(default)]
    pub avs_postal_code_response_code: Option<String>,
    /// AVS street address check result code.
    #[serde(default)]
    pub avs_street_address_response_code: Option<String>,
    /// AVS error code.
    #[serde(default)]
    pub avs_error_response_code: Option<String>,
}

impl CreditCardVerification {
    /// Returns true if the processor or the gateway refused the card.
    #[must_use]
    pub const fn is_declined(&self) -> bool {
        matches!(self.status, VerificationStatus::ProcessorDeclined | VerificationStatus::GatewayRejected)
    }
}
