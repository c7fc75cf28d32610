//! Error types for the Transparent Redirect client.
//!
//! This module defines every error a gateway operation can raise. All errors
//! implement [`std::error::Error`] via [`thiserror::Error`].
//!
//! Business outcomes reported by the gateway (validation errors, processor
//! declines) are **not** errors: they come back as
//! [`GatewayResult::Failure`](crate::result::GatewayResult::Failure) so callers
//! can branch on them programmatically. The variants below cover local
//! misconfiguration, tampered redirects and infrastructure failures.
//!
//! # Error Categories
//!
//! - **Configuration** ([`GatewayError::ConfigurationError`]): missing or invalid credentials
//! - **Authenticity** ([`GatewayError::AuthenticationError`]): bad keys or a tampered query string
//! - **Lookup** ([`GatewayError::NotFoundError`]): the referenced resource does not exist
//! - **Infrastructure** ([`GatewayError::ServerError`], [`GatewayError::DownForMaintenance`],
//!   [`GatewayError::TransportError`], [`GatewayError::HttpError`])
//! - **Input** ([`GatewayError::MalformedQuery`], [`GatewayError::InvalidInput`])
//!
//! # Examples
//!
//! ```
//! use braintree_tr::error::{GatewayError, Result};
//!
//! fn require_key(key: &str) -> Result<&str> {
//!     if key.trim().is_empty() {
//!         return Err(GatewayError::ConfigurationError("private key is empty".to_owned()));
//!     }
//!     Ok(key)
//! }
//!
//! assert!(require_key("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for gateway operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur while talking to the gateway.
///
/// None of these are retried by this crate. Retrying belongs to the caller or
/// to the transport.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Credentials or configuration are missing or invalid.
    ///
    /// Raised before any network traffic: an empty private key, an unknown
    /// environment, a non-HTTPS production URL.
    ///
    /// # Recovery
    ///
    /// Fix the configuration. Retrying cannot succeed.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Authentication failed.
    ///
    /// Either the redirect query string failed signature verification (it was
    /// tampered with or signed with other keys) or the gateway answered 401.
    ///
    /// # Recovery
    ///
    /// Check that the public/private key pair belongs to the merchant. A
    /// tampered query string must be discarded.
    #[error("authentication failed: {0}")]
    AuthenticationError(String),

    /// The credentials are valid but not allowed to perform the operation (HTTP 403).
    #[error("not authorized to perform this operation")]
    AuthorizationError,

    /// The referenced resource does not exist (HTTP 404).
    ///
    /// # Examples
    ///
    /// ```
    /// use braintree_tr::error::GatewayError;
    ///
    /// let err = GatewayError::NotFoundError("credit card 'abc' not found".to_owned());
    /// assert!(err.to_string().contains("not found"));
    /// ```
    #[error("resource not found: {0}")]
    NotFoundError(String),

    /// The gateway no longer supports this client's API version (HTTP 426).
    #[error("client library must be upgraded")]
    UpgradeRequired,

    /// The gateway failed while processing the request (HTTP 500).
    #[error("gateway server error")]
    ServerError,

    /// The gateway is down for maintenance (HTTP 503).
    #[error("gateway is down for maintenance")]
    DownForMaintenance,

    /// Transport-level failure or an HTTP status with no defined meaning.
    #[error("transport error: {0}")]
    TransportError(String),

    /// HTTP request failed.
    ///
    /// Wraps [`reqwest::Error`]: timeouts, refused connections, DNS and TLS failures.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// A query string could not be decoded.
    ///
    /// Raised for a missing `=` in a signed pair, a duplicated `hash` field,
    /// conflicting field paths or a missing `http_status`/`id`.
    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    /// The gateway returned a body that could not be parsed.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    /// A caller-supplied argument was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = GatewayError::ConfigurationError("private key is empty".into());
        assert_eq!(error.to_string(), "configuration error: private key is empty");
    }

    #[test]
    fn test_authentication_error_display() {
        let error = GatewayError::AuthenticationError("signature mismatch".into());
        assert!(error.to_string().contains("authentication failed"));
    }

    #[test]
    fn test_not_found_error_display() {
        let error = GatewayError::NotFoundError("customer 'c-1'".to_owned());
        assert_eq!(error.to_string(), "resource not found: customer 'c-1'");
    }

    #[test]
    fn test_malformed_query_display() {
        let error = GatewayError::MalformedQuery("duplicate hash field".to_owned());
        assert_eq!(error.to_string(), "malformed query string: duplicate hash field");
    }

    #[test]
    fn test_unit_variants_display() {
        assert_eq!(GatewayError::DownForMaintenance.to_string(), "gateway is down for maintenance");
        assert_eq!(GatewayError::ServerError.to_string(), "gateway server error");
        assert!(GatewayError::UpgradeRequired.to_string().contains("upgraded"));
        assert!(GatewayError::AuthorizationError.to_string().contains("not authorized"));
    }
}
