//! Gateway configuration.
//!
//! Configuration is an explicit value handed to
//! [`BraintreeGateway`](crate::gateway::BraintreeGateway) at construction.
//! It is usually loaded from TOML:
//!
//! ```toml
//! environment = "sandbox"
//! merchant_id = "integration_merchant_id"
//! public_key = "integration_public_key"
//! private_key_env = "BRAINTREE_PRIVATE_KEY"
//!
//! [http]
//! timeout_secs = 60
//! ```

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;
use zeroize::{Zeroize, Zeroizing};

use crate::{
    error::{GatewayError, Result},
    transport::HttpConfig,
};

/// Gateway environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Local gateway on `http://localhost:<development_port>`.
    Development,
    /// Public sandbox.
    #[default]
    Sandbox,
    /// Live gateway.
    Production,
    /// Any other gateway; `base_url` is required.
    Custom,
}

impl Environment {
    /// Built-in base URL, if the environment has one.
    #[must_use]
    pub fn default_base_url(self, development_port: u16) -> Option<String> {
        match self {
            Self::Development => Some(format!("http://localhost:{development_port}")),
            Self::Sandbox => Some("https://sandbox.braintreegateway.com:443".to_owned()),
            Self::Production => Some("https://www.braintreegateway.com:443".to_owned()),
            Self::Custom => None,
        }
    }

    /// Whether plain HTTP is refused.
    #[must_use]
    pub const fn requires_https(self) -> bool {
        !matches!(self, Self::Development)
    }
}

/// Merchant API credentials.
///
/// Immutable once built. The private key is wiped on drop and never printed.
#[derive(Clone)]
pub struct Credentials {
    merchant_id: String,
    public_key: String,
    private_key: String,
}

impl Credentials {
    /// Creates credentials.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if any part is empty.
    pub fn new(
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<Self> {
        let credentials =
            Self { merchant_id: merchant_id.into(), public_key: public_key.into(), private_key: private_key.into() };
        for (name, value) in [
            ("merchant_id", &credentials.merchant_id),
            ("public_key", &credentials.public_key),
            ("private_key", &credentials.private_key),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::ConfigurationError(format!("{name} must not be empty")));
            }
        }
        Ok(credentials)
    }

    /// Merchant id.
    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Public key, sent as the basic-auth user and in trData.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Private key, used for HMAC and as the basic-auth password.
    #[must_use]
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// Root gateway configuration.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Target environment.
    #[serde(default)]
    pub environment: Environment,

    /// Base URL override; required for [`Environment::Custom`].
    #[serde(default)]
    pub base_url: Option<String>,

    /// Port of the development gateway.
    #[serde(default = "default_development_port")]
    pub development_port: u16,

    /// Merchant id.
    pub merchant_id: String,

    /// Public key.
    pub public_key: String,

    /// Private key given inline. Wiped when the configuration is dropped.
    #[serde(default)]
    pub private_key: Option<Zeroizing<String>>,

    /// Environment variable holding the private key.
    #[serde(default)]
    pub private_key_env: Option<String>,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

const fn default_development_port() -> u16 {
    3000
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("development_port", &self.development_port)
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("private_key_env", &self.private_key_env)
            .field("http", &self.http)
            .finish()
    }
}

impl GatewayConfig {
    /// Creates a configuration with an inline private key and default HTTP settings.
    #[must_use]
    pub fn new(
        environment: Environment,
        merchant_id: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            environment,
            base_url: None,
            development_port: default_development_port(),
            merchant_id: merchant_id.into(),
            public_key: public_key.into(),
            private_key: Some(Zeroizing::new(private_key.into())),
            private_key_env: None,
            http: HttpConfig::default(),
        }
    }

    /// Parses and validates TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if parsing or validation fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use braintree_tr::config::{Environment, GatewayConfig};
    ///
    /// let config = GatewayConfig::from_toml(r#"
    ///     environment = "development"
    ///     development_port = 3001
    ///     merchant_id = "integration_merchant_id"
    ///     public_key = "integration_public_key"
    ///     private_key = "integration_private_key"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.environment, Environment::Development);
    /// assert_eq!(
    ///     config.base_merchant_url().unwrap(),
    ///     "http://localhost:3001/merchants/integration_merchant_id"
    /// );
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| GatewayError::ConfigurationError(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if the file cannot be read
    /// or its contents are invalid.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GatewayError::ConfigurationError(format!("cannot read config file {}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml(&content)
    }

    /// Validates the configuration without resolving the private key.
    ///
    /// Checks for:
    /// - non-empty `merchant_id` and `public_key`
    /// - exactly one of `private_key` and `private_key_env`
    /// - a well-formed environment variable name
    /// - a resolvable base URL, HTTPS outside development
    /// - HTTP timeouts within bounds
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] on the first failed check.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.trim().is_empty() {
            return Err(GatewayError::ConfigurationError("merchant_id must not be empty".to_owned()));
        }
        if self.merchant_id.contains(['/', '?', '#']) {
            return Err(GatewayError::ConfigurationError(format!(
                "merchant_id contains invalid characters: {}",
                self.merchant_id
            )));
        }
        if self.public_key.trim().is_empty() {
            return Err(GatewayError::ConfigurationError("public_key must not be empty".to_owned()));
        }

        match (&self.private_key, &self.private_key_env) {
            (Some(_), Some(_)) => {
                return Err(GatewayError::ConfigurationError(
                    "set either private_key or private_key_env, not both".to_owned(),
                ));
            }
            (None, None) => {
                return Err(GatewayError::ConfigurationError(
                    "one of private_key or private_key_env is required".to_owned(),
                ));
            }
            (Some(key), None) if key.trim().is_empty() => {
                return Err(GatewayError::ConfigurationError("private_key must not be empty".to_owned()));
            }
            (None, Some(env_var)) => validate_env_var_name(env_var)?,
            (Some(_), None) => {}
        }

        self.base_url()?;
        self.http.validate()
    }

    /// Resolves the gateway base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if no URL is available, it
    /// does not parse, or it is not HTTPS outside development.
    pub fn base_url(&self) -> Result<String> {
        let raw = match (&self.base_url, self.environment.default_base_url(self.development_port)) {
            (Some(url), _) => url.clone(),
            (None, Some(url)) => url,
            (None, None) => {
                return Err(GatewayError::ConfigurationError(
                    "base_url is required for the custom environment".to_owned(),
                ));
            }
        };

        let url = Url::parse(&raw)
            .map_err(|e| GatewayError::ConfigurationError(format!("invalid base_url '{raw}': {e}")))?;
        if self.environment.requires_https() && url.scheme() != "https" {
            return Err(GatewayError::ConfigurationError(format!(
                "base_url must use HTTPS outside development, got: {}",
                url.scheme()
            )));
        }

        Ok(raw.trim_end_matches('/').to_owned())
    }

    /// Base URL of the merchant's API: `<base>/merchants/<merchant_id>`.
    ///
    /// # Errors
    ///
    /// Same as [`base_url`](Self::base_url).
    pub fn base_merchant_url(&self) -> Result<String> {
        Ok(format!("{}/merchants/{}", self.base_url()?, self.merchant_id))
    }

    /// Builds credentials, reading the private key from the environment if configured.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::ConfigurationError`] if the key variable is
    /// unset or any credential is empty.
    pub fn credentials(&self) -> Result<Credentials> {
        let private_key = match (&self.private_key, &self.private_key_env) {
            (Some(key), _) => key.as_str().to_owned(),
            (None, Some(env_var)) => std::env::var(env_var).map_err(|_| {
                GatewayError::ConfigurationError(format!("environment variable {env_var} is not set"))
            })?,
            (None, None) => {
                return Err(GatewayError::ConfigurationError("no private key configured".to_owned()));
            }
        };
        Credentials::new(self.merchant_id.clone(), self.public_key.clone(), private_key)
    }
}

/// Validates an environment variable name.
fn validate_env_var_name(name: &str) -> Result<()> {
    let Some(first_char) = name.chars().next() else {
        return Err(GatewayError::ConfigurationError(
            "environment variable name cannot be empty".to_owned(),
        ));
    };

    if !first_char.is_ascii_alphabetic() && first_char != '_' {
        return Err(GatewayError::ConfigurationError(format!(
            "environment variable name must start with letter or underscore: {name}"
        )));
    }

    if let Some(ch) = name.chars().find(|ch| !ch.is_ascii_alphanumeric() && *ch != '_') {
        return Err(GatewayError::ConfigurationError(format!(
            "environment variable name contains invalid character '{ch}': {name}"
        )));
    }

    Ok(())
}
