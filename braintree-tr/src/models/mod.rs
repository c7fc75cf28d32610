//! Gateway resources and request payloads.
//!
//! Resources are deserialized from the gateway's JSON bodies; requests are
//! serialized into them and, for transparent redirects, into trData fields.

mod credit_card;
mod customer;
mod request;

pub use credit_card::{Address, CreditCard, CreditCardVerification, VerificationStatus};
pub use customer::Customer;
pub use request::{AddressRequest, CreditCardOptionsRequest, CreditCardRequest, CustomerRequest, TrRequest};
