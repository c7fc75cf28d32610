//! Signed query strings.
//!
//! Wire format: `key1=value1&key2=value2&...&hash=<hex40>`, both sides of
//! every pair form-urlencoded. The `hash` field is the HMAC of the canonical
//! string of the other pairs and may appear anywhere in the query.

use tracing::{debug, instrument, warn};
use url::form_urlencoded;

use crate::{
    error::{GatewayError, Result},
    status::{StatusClass, check_http_status},
    tr::{kind::TrKind, node::Node, signer::TrSigner},
};

/// Name of the signature field.
pub const HASH_FIELD: &str = "hash";

/// Form-urlencodes one key or value.
#[must_use]
pub fn encode_component(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// Builds the canonical string signed by both parties.
///
/// Pairs are encoded as `key=value`, stably sorted by encoded key and joined
/// with `&`, so the result does not depend on the order fields were added.
///
/// # Examples
///
/// ```
/// use braintree_tr::tr::codec::canonicalize;
///
/// let pairs = vec![
///     ("redirect_url".to_owned(), "http://example.com".to_owned()),
///     ("kind".to_owned(), "create_payment_method".to_owned()),
/// ];
/// assert_eq!(
///     canonicalize(&pairs),
///     "kind=create_payment_method&redirect_url=http%3A%2F%2Fexample.com"
/// );
/// ```
#[must_use]
pub fn canonicalize(pairs: &[(String, String)]) -> String {
    let segments: Vec<String> = pairs.iter().map(|(key, value)| encode_pair(key, value)).collect();
    canonical_string(segments.iter().map(String::as_str))
}

fn encode_pair(key: &str, value: &str) -> String {
    format!("{}={}", encode_component(key), encode_component(value))
}

fn canonical_string<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut segments: Vec<&str> = segments.into_iter().collect();
    segments.sort_by(|a, b| segment_key(a).cmp(segment_key(b)));
    segments.join("&")
}

fn segment_key(segment: &str) -> &str {
    segment.split_once('=').map_or(segment, |(key, _)| key)
}

/// Ordered field pairs together with their signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    data: Vec<(String, String)>,
    signature: String,
}

impl SignedPayload {
    /// Signs `data` with `signer`.
    #[must_use]
    pub fn sign(data: Vec<(String, String)>, signer: &TrSigner) -> Self {
        let signature = signer.sign(&canonicalize(&data));
        Self { data, signature }
    }

    /// Field pairs in insertion order.
    #[must_use]
    pub fn data(&self) -> &[(String, String)] {
        &self.data
    }

    /// Hex signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Recomputes the signature with `signer` and compares in constant time.
    #[must_use]
    pub fn is_valid(&self, signer: &TrSigner) -> bool {
        signer.verify(&canonicalize(&self.data), &self.signature)
    }

    /// Encodes the payload as a query string with `hash` appended last.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut segments: Vec<String> = self.data.iter().map(|(key, value)| encode_pair(key, value)).collect();
        segments.push(encode_pair(HASH_FIELD, &self.signature));
        segments.join("&")
    }
}

/// A verified query string.
#[derive(Debug, Clone)]
pub struct DecodedQuery {
    pairs: Vec<(String, String)>,
    fields: Node,
    signature: String,
}

impl DecodedQuery {
    /// Decoded pairs in wire order, without `hash`.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Pairs unflattened into a tree.
    #[must_use]
    pub const fn fields(&self) -> &Node {
        &self.fields
    }

    /// The verified signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Looks up a scalar by dotted/bracket path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.fields.lookup(path).and_then(Node::as_str)
    }
}

/// Verifies and decodes a signed query string.
///
/// The signature is checked against the raw wire segments before anything is
/// decoded, so a tampered query is always reported as an authentication
/// failure rather than a shape error.
///
/// # Errors
///
/// - [`GatewayError::MalformedQuery`] for an empty query, a segment without
///   `=`, a signed key that decodes to `hash` or conflicting field paths
/// - [`GatewayError::AuthenticationError`] if `hash` is missing, repeated or
///   does not match
#[instrument(skip_all, fields(query_len = query.len()))]
pub fn decode(query: &str, signer: &TrSigner) -> Result<DecodedQuery> {
    // 1. Strip the optional leading '?'
    let query = query.strip_prefix('?').unwrap_or(query);
    if query.is_empty() {
        return Err(GatewayError::MalformedQuery("query string is empty".to_owned()));
    }

    // 2. Separate the signature from the signed segments
    let mut signature = None;
    let mut segments = Vec::new();
    for segment in query.split('&') {
        if segment_key(segment) == HASH_FIELD {
            let value = segment.split_once('=').map_or("", |(_, value)| value);
            if signature.replace(value).is_some() {
                warn!("query string carries more than one signature");
                return Err(GatewayError::AuthenticationError("hash field appears more than once".to_owned()));
            }
        } else {
            segments.push(segment);
        }
    }
    let Some(signature) = signature else {
        warn!("query string carries no signature");
        return Err(GatewayError::AuthenticationError("query string is not signed".to_owned()));
    };

    // 3. Verify over the raw segments
    let canonical = canonical_string(segments.iter().copied());
    if !signer.verify(&canonical, signature) {
        warn!(segments = segments.len(), "query string signature mismatch");
        return Err(GatewayError::AuthenticationError(
            "query string signature does not match".to_owned(),
        ));
    }

    // 4. Decode pairs and rebuild the field tree
    let mut pairs = Vec::with_capacity(segments.len());
    for segment in &segments {
        if !segment.contains('=') {
            return Err(GatewayError::MalformedQuery(format!("segment '{segment}' has no '='")));
        }
        let (key, value) = form_urlencoded::parse(segment.as_bytes())
            .next()
            .ok_or_else(|| GatewayError::MalformedQuery(format!("segment '{segment}' is empty")))?;
        if key == HASH_FIELD {
            return Err(GatewayError::MalformedQuery(format!("segment '{segment}' decodes to the hash field")));
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    let fields = Node::unflatten(pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())))?;

    debug!(fields = pairs.len(), "query string verified");
    Ok(DecodedQuery { pairs, fields, signature: signature.to_owned() })
}

/// The query string the gateway appends to the merchant's redirect URL.
#[derive(Debug, Clone)]
pub struct RedirectQueryString {
    http_status: u16,
    status_class: StatusClass,
    id: String,
    kind: Option<TrKind>,
    query: DecodedQuery,
}

impl RedirectQueryString {
    /// Verifies and decodes a redirect query string.
    ///
    /// # Errors
    ///
    /// Everything [`decode`] raises, plus:
    /// - [`GatewayError::MalformedQuery`] if `http_status` is missing or not
    ///   numeric, `id` is missing, or `kind` is not a known kind
    /// - the error mapped from `http_status` by
    ///   [`check_http_status`] for anything other than 2xx and 422
    pub fn parse(query: &str, signer: &TrSigner) -> Result<Self> {
        let query = decode(query, signer)?;

        let raw_status = query
            .get("http_status")
            .ok_or_else(|| GatewayError::MalformedQuery("missing http_status".to_owned()))?;
        let http_status = raw_status
            .parse::<u16>()
            .map_err(|_| GatewayError::MalformedQuery(format!("http_status '{raw_status}' is not numeric")))?;
        let status_class = check_http_status(http_status)?;

        let id = query
            .get("id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::MalformedQuery("missing id".to_owned()))?
            .to_owned();

        let kind = query
            .get("kind")
            .map(str::parse::<TrKind>)
            .transpose()
            .map_err(|e| GatewayError::MalformedQuery(e.to_string()))?;

        debug!(http_status, ?kind, "redirect query string parsed");
        Ok(Self { http_status, status_class, id, kind, query })
    }

    /// Status the gateway reported for the browser post.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Classification of [`http_status`](Self::http_status).
    #[must_use]
    pub const fn status_class(&self) -> StatusClass {
        self.status_class
    }

    /// Opaque confirmation id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Redirect kind, when the gateway included one.
    #[must_use]
    pub const fn kind(&self) -> Option<TrKind> {
        self.kind
    }

    /// Full decoded query.
    #[must_use]
    pub const fn query(&self) -> &DecodedQuery {
        &self.query
    }
}
