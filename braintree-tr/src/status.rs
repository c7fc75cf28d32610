//! HTTP status classification.
//!
//! The same table governs the `http_status` embedded in a redirect query
//! string and the status of every response the transport returns.

use crate::error::{GatewayError, Result};

/// Outcome class of a status the gateway is allowed to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: the body carries the resource.
    Success,
    /// 422: the body carries a validation-error tree.
    ValidationFailure,
}

/// Classifies an HTTP status code.
///
/// Business outcomes map to a [`StatusClass`]; infrastructure outcomes map
/// to the matching [`GatewayError`]. Codes outside the table are reported as
/// [`GatewayError::TransportError`] rather than guessed at.
///
/// # Errors
///
/// Returns the error associated with any status that is not 2xx or 422.
///
/// # Examples
///
/// ```
/// use braintree_tr::status::{StatusClass, check_http_status};
///
/// assert_eq!(check_http_status(201).unwrap(), StatusClass::Success);
/// assert_eq!(check_http_status(422).unwrap(), StatusClass::ValidationFailure);
/// assert!(check_http_status(503).is_err());
/// ```
pub fn check_http_status(status: u16) -> Result<StatusClass> {
    match status {
        200..=299 => Ok(StatusClass::Success),
        422 => Ok(StatusClass::ValidationFailure),
        401 => Err(GatewayError::AuthenticationError(
            "gateway rejected the API credentials".to_owned(),
        )),
        403 => Err(GatewayError::AuthorizationError),
        404 => Err(GatewayError::NotFoundError("gateway returned 404".to_owned())),
        426 => Err(GatewayError::UpgradeRequired),
        500 => Err(GatewayError::ServerError),
        503 => Err(GatewayError::DownForMaintenance),
        other => Err(GatewayError::TransportError(format!("unexpected HTTP status {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        for status in [200, 201, 204, 299] {
            assert_eq!(check_http_status(status).unwrap(), StatusClass::Success);
        }
    }

    #[test]
    fn test_validation_failure() {
        assert_eq!(check_http_status(422).unwrap(), StatusClass::ValidationFailure);
    }

    #[test]
    fn test_known_error_codes() {
        assert!(matches!(check_http_status(401), Err(GatewayError::AuthenticationError(_))));
        assert!(matches!(check_http_status(403), Err(GatewayError::AuthorizationError)));
        assert!(matches!(check_http_status(404), Err(GatewayError::NotFoundError(_))));
        assert!(matches!(check_http_status(426), Err(GatewayError::UpgradeRequired)));
        assert!(matches!(check_http_status(500), Err(GatewayError::ServerError)));
        assert!(matches!(check_http_status(503), Err(GatewayError::DownForMaintenance)));
    }

    #[test]
    fn test_unrecognized_codes_are_transport_errors() {
        for status in [0, 100, 302, 400, 418, 502, 504] {
            assert!(
                matches!(check_http_status(status), Err(GatewayError::TransportError(_))),
                "status {status} should be a transport error"
            );
        }
    }
}
