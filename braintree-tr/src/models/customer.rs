//! Customer resource.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::credit_card::CreditCard;

/// A customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer id.
    pub id: String,
    /// First name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Company.
    #[serde(default)]
    pub company: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Stored cards.
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// The default card, if one is stored.
    #[must_use]
    pub fn default_credit_card(&self) -> Option<&CreditCard> {
        self.credit_cards.iter().find(|card| card.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_with_cards() {
        let json = r#"{
            "id": "c-1",
            "first_name": "Dan",
            "credit_cards": [
                {"token": "t1", "last_4": "1111"},
                {"token": "t2", "last_4": "5100", "default": true}
            ]
        }"#;

        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.credit_cards.len(), 2);
        assert_eq!(customer.default_credit_card().map(|card| card.token.as_str()), Some("t2"));
    }

    #[test]
    fn test_customer_minimal() {
        let customer: Customer = serde_json::from_str(r#"{"id": "c-2"}"#).unwrap();
        assert!(customer.credit_cards.is_empty());
        assert!(customer.default_credit_card().is_none());
    }
}
