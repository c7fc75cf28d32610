//! Typed success/failure outcomes.
//!
//! The gateway reports business outcomes (validation errors, processor
//! declines) with HTTP 422 and an `api_error_response` body. Those are
//! returned as [`GatewayResult::Failure`], never as errors.
//!
//! # Examples
//!
//! ```
//! use braintree_tr::{models::CreditCard, result::GatewayResult};
//!
//! let body = br#"{"api_error_response": {
//!     "message": "Credit card number is invalid.",
//!     "errors": {"credit_card": {"errors": [
//!         {"attribute": "number", "code": "81715", "message": "Credit card number is invalid."}
//!     ]}}
//! }}"#;
//!
//! let result = GatewayResult::<CreditCard>::from_response(422, body, "credit_card").unwrap();
//! assert!(!result.is_success());
//!
//! let failure = result.failure().unwrap();
//! let errors = failure.errors().for_object("credit_card").unwrap();
//! assert_eq!(errors.on("number")[0].code, "81715");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{GatewayError, Result},
    models::CreditCardVerification,
    status::{StatusClass, check_http_status},
};

/// Outcome of a gateway operation.
#[must_use = "a gateway result may be a failure that should be inspected"]
#[derive(Debug, Clone)]
pub enum GatewayResult<T> {
    /// The operation succeeded and produced a resource.
    Success(T),
    /// The gateway rejected the operation.
    Failure(Failure),
}

impl<T> GatewayResult<T> {
    /// Returns true iff this is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The produced resource, if any.
    #[must_use]
    pub const fn target(&self) -> Option<&T> {
        match self {
            Self::Success(target) => Some(target),
            Self::Failure(_) => None,
        }
    }

    /// Consumes the result, returning the produced resource, if any.
    #[must_use]
    pub fn into_target(self) -> Option<T> {
        match self {
            Self::Success(target) => Some(target),
            Self::Failure(_) => None,
        }
    }

    /// The failure details, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Maps the success value, leaving a failure untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GatewayResult<U> {
        match self {
            Self::Success(target) => GatewayResult::Success(f(target)),
            Self::Failure(failure) => GatewayResult::Failure(failure),
        }
    }
}

impl<T: DeserializeOwned> GatewayResult<T> {
    /// Builds a result from a gateway response.
    ///
    /// A 2xx body must hold the resource under `root`; a 422 body must hold an
    /// `api_error_response`.
    ///
    /// # Errors
    ///
    /// - the error mapped by [`check_http_status`] for any other status
    /// - [`GatewayError::InvalidResponse`] if the body does not match
    pub fn from_response(status: u16, body: &[u8], root: &str) -> Result<Self> {
        match check_http_status(status)? {
            StatusClass::Success => {
                let mut envelope: serde_json::Map<String, Value> = serde_json::from_slice(body)
                    .map_err(|e| GatewayError::InvalidResponse(format!("success body is not a JSON object: {e}")))?;
                let target = envelope
                    .remove(root)
                    .ok_or_else(|| GatewayError::InvalidResponse(format!("success body has no '{root}'")))?;
                serde_json::from_value(target)
                    .map(Self::Success)
                    .map_err(|e| GatewayError::InvalidResponse(format!("cannot parse '{root}': {e}")))
            }
            StatusClass::ValidationFailure => Failure::from_body(body).map(Self::Failure),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    api_error_response: ErrorResponse,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Option<Value>,
    #[serde(default)]
    verification: Option<CreditCardVerification>,
}

/// Details of a rejected operation.
#[derive(Debug, Clone, Default)]
pub struct Failure {
    message: String,
    errors: ValidationErrors,
    credit_card_verification: Option<CreditCardVerification>,
}

impl Failure {
    /// Parses an `api_error_response` body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`] if the body has no
    /// `api_error_response` object.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        let envelope: ErrorEnvelope = serde_json::from_slice(body)
            .map_err(|e| GatewayError::InvalidResponse(format!("cannot parse error response: {e}")))?;
        let response = envelope.api_error_response;
        Ok(Self {
            message: response.message,
            errors: response.errors.as_ref().map(ValidationErrors::from_json).unwrap_or_default(),
            credit_card_verification: response.verification,
        })
    }

    /// Human-readable summary.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Validation-error tree.
    #[must_use]
    pub const fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Verification attached to a processor decline.
    #[must_use]
    pub const fn credit_card_verification(&self) -> Option<&CreditCardVerification> {
        self.credit_card_verification.as_ref()
    }
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationError {
    /// Offending attribute, e.g. `number`.
    pub attribute: String,
    /// Gateway error code, e.g. `81715`.
    pub code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Validation errors for one object plus its nested objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
    nested: BTreeMap<String, ValidationErrors>,
}

impl ValidationErrors {
    /// Builds the tree from the `errors` object of an error response.
    ///
    /// Entries that are not valid error objects are skipped.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let Value::Object(object) = value else {
            return Self::default();
        };
        let mut tree = Self::default();
        for (key, child) in object {
            match (key.as_str(), child) {
                ("errors", Value::Array(items)) => {
                    tree.errors = items
                        .iter()
                        .filter_map(|item| serde_json::from_value(item.clone()).ok())
                        .collect();
                }
                (_, Value::Object(_)) => {
                    tree.nested.insert(key.clone(), Self::from_json(child));
                }
                _ => {}
            }
        }
        tree
    }

    /// Errors of the nested object `key`.
    #[must_use]
    pub fn for_object(&self, key: &str) -> Option<&Self> {
        self.nested.get(key)
    }

    /// Errors on `attribute` at this level.
    #[must_use]
    pub fn on(&self, attribute: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|error| error.attribute == attribute).collect()
    }

    /// Number of errors at this level.
    #[must_use]
    pub fn size(&self) -> usize {
        self.errors.len()
    }

    /// Number of errors at this level and below.
    #[must_use]
    pub fn deep_size(&self) -> usize {
        self.errors.len() + self.nested.values().map(Self::deep_size).sum::<usize>()
    }

    /// Errors at this level.
    #[must_use]
    pub fn all(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Errors at this level followed by nested errors, depth first.
    #[must_use]
    pub fn deep_all(&self) -> Vec<&ValidationError> {
        let mut all: Vec<&ValidationError> = self.errors.iter().collect();
        for child in self.nested.values() {
            all.extend(child.deep_all());
        }
        all
    }

    /// Returns true if there are no errors at any level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deep_size() == 0
    }
}
