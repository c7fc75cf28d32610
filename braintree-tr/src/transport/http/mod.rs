//! HTTP transport implementation.
//!
//! HTTP/1.1 and HTTP/2 via reqwest. Every request carries HTTP basic
//! authentication (public key as user, private key as password) and the
//! gateway API version header.

use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};
use url::Url;

use super::config::{HttpConfig, HttpVersion};
use crate::{
    API_VERSION,
    config::Credentials,
    error::{GatewayError, Result},
    transport::{RequestContext, Transport, TransportResponse},
};

const USER_AGENT: &str = concat!("braintree-tr/", env!("CARGO_PKG_VERSION"));

/// Checks the base URL scheme.
///
/// HTTPS is mandatory unless the transport was built for a development
/// gateway.
fn validate_url(url: &Url, require_https: bool) -> Result<()> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if !require_https => Ok(()),
        scheme => Err(GatewayError::TransportError(format!("URL scheme '{scheme}' is not allowed"))),
    }
}

/// Rejects paths containing traversal sequences.
fn sanitize_path(path: &str) -> Result<&str> {
    if path.contains("..") || path.contains("//") {
        return Err(GatewayError::TransportError(
            "Invalid path: traversal sequences not allowed".to_owned(),
        ));
    }
    if !path.starts_with('/') {
        return Err(GatewayError::TransportError("Path must start with '/'".to_owned()));
    }
    Ok(path)
}

/// Validates header name and value for CRLF injection prevention.
fn validate_header(name: &str, value: &str) -> Result<()> {
    let has_control = |s: &str| s.contains(['\r', '\n', '\0']);
    if has_control(name) {
        return Err(GatewayError::TransportError(
            "Invalid header name: control characters not allowed".to_owned(),
        ));
    }
    if has_control(value) {
        return Err(GatewayError::TransportError(
            "Invalid header value: control characters not allowed".to_owned(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// reqwest-based [`Transport`].
///
/// # Examples
///
/// ```
/// use braintree_tr::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { http_version: HttpVersion::Http1, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config, true).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
    require_https: bool,
}

impl HttpTransport {
    /// Creates an HTTPS-only transport with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default(), true)
    }

    /// Creates a transport from configuration.
    ///
    /// `require_https` is false only for a development gateway on localhost.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] for out-of-range timeouts
    /// and [`GatewayError::HttpError`] if the HTTP client cannot be built.
    pub fn with_config(config: &HttpConfig, require_https: bool) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(USER_AGENT)
            .https_only(require_https);

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder.build().map_err(GatewayError::HttpError)?;

        Ok(Self { client, http_version: config.http_version, require_https })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
    }

    #[instrument(
        skip(self, credentials, ctx, body),
        fields(method = ?method, base_url = ctx.base_url, path = ctx.path)
    )]
    async fn execute_request(
        &self,
        credentials: &Credentials,
        ctx: RequestContext<'_>,
        method: Method,
        body: Option<&[u8]>,
    ) -> Result<TransportResponse> {
        let url = Url::parse(ctx.base_url)
            .map_err(|e| GatewayError::TransportError(format!("invalid base_url: {e}")))?;
        validate_url(&url, self.require_https)?;

        let path = sanitize_path(ctx.path)?;
        for (key, value) in &ctx.headers {
            validate_header(key, value)?;
        }

        let full_url = format!("{}{path}", ctx.base_url.trim_end_matches('/'));

        let mut request = self
            .request(method, &full_url)
            .basic_auth(credentials.public_key(), Some(credentials.private_key()))
            .header("Accept", "application/json")
            .header("X-ApiVersion", API_VERSION);

        if let Some(content_type) = ctx.content_type {
            request = request.header("Content-Type", content_type);
        }

        for (key, value) in ctx.headers {
            request = request.header(key, value);
        }

        if let Some(body) = body.filter(|body| !body.is_empty()) {
            request = request.body(body.to_vec());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        let body = response.bytes().await.map_err(GatewayError::HttpError)?.to_vec();
        debug!(status, body_len = body.len(), "gateway response received");

        Ok(TransportResponse { status, body, headers })
    }
}

impl Transport for HttpTransport {
    async fn get<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
    ) -> Result<TransportResponse> {
        self.execute_request(credentials, ctx, Method::Get, None).await
    }

    async fn post<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.execute_request(credentials, ctx, Method::Post, Some(body)).await
    }

    async fn put<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
        body: &'a [u8],
    ) -> Result<TransportResponse> {
        self.execute_request(credentials, ctx, Method::Put, Some(body)).await
    }

    async fn delete<'a>(
        &'a self,
        credentials: &'a Credentials,
        ctx: RequestContext<'a>,
    ) -> Result<TransportResponse> {
        self.execute_request(credentials, ctx, Method::Delete, None).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
