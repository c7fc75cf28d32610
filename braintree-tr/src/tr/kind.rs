//! Resource and operation identifiers.

use std::{fmt, str::FromStr};

use crate::error::GatewayError;

/// Resource addressed by a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Stored credit card (`payment_methods`).
    CreditCard,
    /// Customer record (`customers`).
    Customer,
}

impl ResourceKind {
    /// URL path segment of the resource collection.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::CreditCard => "payment_methods",
            Self::Customer => "customers",
        }
    }

    /// Root key of the resource in request and response bodies.
    #[must_use]
    pub const fn root(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::Customer => "customer",
        }
    }
}

/// Operation performed through a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Creates a new resource.
    Create,
    /// Updates an existing resource.
    Update,
}

/// The `kind` control field of a trData payload.
///
/// # Examples
///
/// ```
/// use braintree_tr::tr::{OperationKind, ResourceKind, TrKind};
///
/// let kind: TrKind = "update_payment_method".parse().unwrap();
/// assert_eq!(kind.resource, ResourceKind::CreditCard);
/// assert_eq!(kind.operation, OperationKind::Update);
/// assert_eq!(kind.to_string(), "update_payment_method");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrKind {
    /// Addressed resource.
    pub resource: ResourceKind,
    /// Performed operation.
    pub operation: OperationKind,
}

impl TrKind {
    /// Creates a kind.
    #[must_use]
    pub const fn new(resource: ResourceKind, operation: OperationKind) -> Self {
        Self { resource, operation }
    }

    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match (self.resource, self.operation) {
            (ResourceKind::CreditCard, OperationKind::Create) => "create_payment_method",
            (ResourceKind::CreditCard, OperationKind::Update) => "update_payment_method",
            (ResourceKind::Customer, OperationKind::Create) => "create_customer",
            (ResourceKind::Customer, OperationKind::Update) => "update_customer",
        }
    }
}

impl fmt::Display for TrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (operation, resource) = match s {
            "create_payment_method" => (OperationKind::Create, ResourceKind::CreditCard),
            "update_payment_method" => (OperationKind::Update, ResourceKind::CreditCard),
            "create_customer" => (OperationKind::Create, ResourceKind::Customer),
            "update_customer" => (OperationKind::Update, ResourceKind::Customer),
            other => return Err(GatewayError::InvalidInput(format!("unknown redirect kind '{other}'"))),
        };
        Ok(Self::new(resource, operation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_parse_back() {
        for resource in [ResourceKind::CreditCard, ResourceKind::Customer] {
            for operation in [OperationKind::Create, OperationKind::Update] {
                let kind = TrKind::new(resource, operation);
                assert_eq!(kind.as_str().parse::<TrKind>().unwrap(), kind);
            }
        }
    }

    #[test]
    fn test_unknown_kind() {
        let result = "delete_payment_method".parse::<TrKind>();
        assert!(matches!(result, Err(GatewayError::InvalidInput(_))));
    }

    #[test]
    fn test_resource_segments() {
        assert_eq!(ResourceKind::CreditCard.path_segment(), "payment_methods");
        assert_eq!(ResourceKind::Customer.path_segment(), "customers");
        assert_eq!(ResourceKind::CreditCard.root(), "credit_card");
        assert_eq!(ResourceKind::Customer.root(), "customer");
    }
}
