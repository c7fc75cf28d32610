//! HMAC-SHA1 signing of canonical strings.
//!
//! Both directions of the redirect protocol are authenticated by the same
//! primitive: an HMAC-SHA1 over the canonical string (see
//! [`canonicalize`](crate::tr::codec::canonicalize)) keyed with the merchant's
//! private key, rendered as 40 lowercase hex characters.
//!
//! # Examples
//!
//! ```
//! use braintree_tr::tr::TrSigner;
//!
//! # fn example() -> braintree_tr::Result<()> {
//! let signer = TrSigner::new("integration_private_key")?;
//! let signature = signer.sign("id=abc&kind=create_payment_method");
//!
//! assert_eq!(signature.len(), 40);
//! assert!(signer.verify("id=abc&kind=create_payment_method", &signature));
//! assert!(!signer.verify("id=abd&kind=create_payment_method", &signature));
//! # Ok(())
//! # }
//! ```

use std::fmt;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::instrument;

use crate::error::{GatewayError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Keyed signer for canonical strings.
///
/// Holds the initialised HMAC state so the key is processed once and cloned
/// per signature.
#[derive(Clone)]
pub struct TrSigner {
    mac: HmacSha1,
}

impl TrSigner {
    /// Creates a signer keyed with the merchant's private key.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if the key is empty or
    /// whitespace only.
    pub fn new(private_key: &str) -> Result<Self> {
        if private_key.trim().is_empty() {
            return Err(GatewayError::ConfigurationError("private key must not be empty".to_owned()));
        }
        let mac = HmacSha1::new_from_slice(private_key.as_bytes())
            .map_err(|e| GatewayError::ConfigurationError(format!("invalid private key: {e}")))?;
        Ok(Self { mac })
    }

    /// Signs a canonical string, returning lowercase hex.
    #[must_use]
    #[instrument(skip_all, fields(canonical_len = canonical.len()))]
    pub fn sign(&self, canonical: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies a hex signature in constant time.
    ///
    /// A signature that is not valid hex fails verification.
    #[must_use]
    pub fn verify(&self, canonical: &str, signature_hex: &str) -> bool {
        let Ok(expected) = hex::decode(signature_hex) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(canonical.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}

impl fmt::Debug for TrSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrSigner").field("algorithm", &"hmac-sha1").finish_non_exhaustive()
    }
}

/// Signs `canonical` with `secret_key`.
///
/// # Errors
///
/// Returns [`GatewayError::ConfigurationError`] if the key is empty.
pub fn sign(secret_key: &str, canonical: &str) -> Result<String> {
    Ok(TrSigner::new(secret_key)?.sign(canonical))
}

/// Checks `signature_hex` against `canonical` signed with `secret_key`.
///
/// # Errors
///
/// Returns [`GatewayError::ConfigurationError`] if the key is empty.
pub fn verify(secret_key: &str, canonical: &str, signature_hex: &str) -> Result<bool> {
    Ok(TrSigner::new(secret_key)?.verify(canonical, signature_hex))
}
