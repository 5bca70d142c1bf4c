//! SDK Configuration

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Scopes requested by the client-credentials grant unless overridden
pub const DEFAULT_SCOPES: &[&str] = &[
    "internal_application_mgt_view",
    "internal_application_mgt_create",
    "internal_application_mgt_update",
    "internal_application_mgt_delete",
    "internal_api_resource_view",
    "internal_api_resource_create",
    "internal_api_resource_update",
    "internal_api_resource_delete",
];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How the SDK authenticates against the management API
#[derive(Clone)]
pub enum Credentials {
    /// OAuth2 client-credentials grant against the tenant token endpoint
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    /// Pre-issued bearer token, used as-is
    BearerToken(String),
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Credentials::BearerToken(_) => f.debug_tuple("BearerToken").field(&"<redacted>").finish(),
        }
    }
}

/// Configuration for the Asgardeo SDK
#[derive(Debug, Clone)]
pub struct Config {
    /// Tenant base URL, e.g. `https://api.asgardeo.io/t/<tenant>`
    pub base_url: String,

    /// Credentials used to obtain bearer tokens
    pub credentials: Option<Credentials>,

    /// OAuth2 scopes requested with client credentials
    pub scopes: Vec<String>,

    /// OAuth2 token endpoint (defaults to {base_url}/oauth2/token)
    pub token_url: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Config {
    /// Fresh configuration with defaults applied and no base URL or credentials
    pub fn default_config() -> Self {
        Self {
            base_url: String::new(),
            credentials: None,
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            token_url: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("Asgardeo-Rust-SDK/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default_config().with_base_url(base_url)
    }

    /// Build a configuration from `ASGARDEO_*` environment variables
    pub fn from_env() -> Self {
        Self::default_config().with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from a key lookup.
    ///
    /// Recognized keys: `ASGARDEO_BASE_URL`, `ASGARDEO_CLIENT_ID`, `ASGARDEO_CLIENT_SECRET`,
    /// `ASGARDEO_ACCESS_TOKEN`, `ASGARDEO_SCOPES`, `ASGARDEO_TOKEN_URL`, `ASGARDEO_TIMEOUT_SECS`.
    /// Client credentials win over an access token when both are present.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ASGARDEO_BASE_URL") {
            self.base_url = val;
        }
        if let Some(val) = lookup("ASGARDEO_ACCESS_TOKEN") {
            self.credentials = Some(Credentials::BearerToken(val));
        }
        if let (Some(id), Some(secret)) = (
            lookup("ASGARDEO_CLIENT_ID"),
            lookup("ASGARDEO_CLIENT_SECRET"),
        ) {
            self = self.with_client_credentials(id, secret);
        }
        if let Some(val) = lookup("ASGARDEO_SCOPES") {
            self.scopes = val
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect();
        }
        if let Some(val) = lookup("ASGARDEO_TOKEN_URL") {
            self.token_url = Some(val);
        }
        if let Some(val) = lookup("ASGARDEO_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.timeout = Duration::from_secs(secs);
            }
        }
        self
    }

    /// Set the tenant base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set OAuth2 client credentials
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        });
        self
    }

    /// Authenticate with a pre-issued bearer token instead of client credentials
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::BearerToken(token.into()));
        self
    }

    /// Replace the requested OAuth2 scopes
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set custom token URL
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = Some(token_url.into());
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Get the token URL (defaults to {base_url}/oauth2/token)
    pub fn get_token_url(&self) -> String {
        self.token_url
            .clone()
            .unwrap_or_else(|| format!("{}/oauth2/token", self.normalized_base_url()))
    }

    /// Check that the configuration can build a client.
    pub fn validate(&self) -> Result<()> {
        let base_url = self.normalized_base_url();
        if base_url.is_empty() {
            return Err(Error::Config("base URL is required".into()));
        }
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(Error::Config(format!(
                "base URL {:?} must be an absolute http(s) URL",
                base_url
            )));
        }

        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".into()));
        }

        match &self.credentials {
            None => Err(Error::Config("credentials are required".into())),
            Some(Credentials::ClientCredentials {
                client_id,
                client_secret,
            }) => {
                if client_id.trim().is_empty() || client_secret.trim().is_empty() {
                    return Err(Error::Config(
                        "client id and client secret must not be empty".into(),
                    ));
                }
                if let Some(token_url) = &self.token_url {
                    reqwest::Url::parse(token_url).map_err(|e| {
                        Error::Config(format!("invalid token URL {:?}: {}", token_url, e))
                    })?;
                }
                Ok(())
            }
            Some(Credentials::BearerToken(token)) => {
                if token.trim().is_empty() {
                    return Err(Error::Config("bearer token must not be empty".into()));
                }
                Ok(())
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
