//! Transparent Redirect protocol.
//!
//! - [`node`]: field tree and dotted/bracket path flattening
//! - [`signer`]: HMAC-SHA1 over canonical strings
//! - [`codec`]: signed and redirect query strings
//! - [`kind`]: resource, operation and trData kind identifiers
//! - [`redirect`]: trData building and redirect confirmation

pub mod codec;
pub mod kind;
pub mod node;
pub mod redirect;
pub mod signer;

pub use codec::{DecodedQuery, RedirectQueryString, SignedPayload};
pub use kind::{OperationKind, ResourceKind, TrKind};
pub use node::Node;
pub use redirect::{ConfirmedResource, TransparentRedirect, build_tr_data, transparent_redirect_url};
pub use signer::TrSigner;
