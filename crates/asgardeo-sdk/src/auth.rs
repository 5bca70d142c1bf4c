//! Authentication support for the Asgardeo SDK
//!
//! Provides the OAuth2 client credentials flow with cached tokens, and a
//! static bearer-token provider for callers that manage tokens themselves.

use crate::error::{Error, Result};
use crate::transport::HttpTransport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Supplies the bearer credential attached to every API request
#[async_trait]
pub trait CredentialProvider: Send + Sync + std::fmt::Debug {
    /// Get a valid access token
    async fn bearer_token(&self) -> Result<String>;

    /// Drop any cached token so the next call fetches a fresh one
    async fn invalidate(&self);
}

/// Token response from the OAuth2 token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Token request for client credentials grant
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a str>,
}

/// Refresh this long before expiry, or at half the lifetime for short-lived tokens
const EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Upper bound on how long a token is cached, whatever `expires_in` claims
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

const DEFAULT_TOKEN_LIFETIME: u64 = 3600;

/// Cached token with expiration tracking
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(access_token: String, expires_in: u64, now: Instant) -> Self {
        let lifetime = Duration::from_secs(expires_in).min(MAX_TOKEN_LIFETIME);
        let buffer = EXPIRY_BUFFER.min(lifetime / 2);
        Self {
            access_token,
            refresh_at: now.checked_add(lifetime - buffer).unwrap_or(now),
        }
    }

    fn is_valid(&self) -> bool {
        self.refresh_at > Instant::now()
    }
}

/// Token manager for the client credentials grant
#[derive(Debug)]
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    token_url: String,
    scope: Option<String>,
    http_client: reqwest::Client,
    transport: Arc<dyn HttpTransport>,
    cached_token: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    /// Create a new token manager
    pub fn new(
        client_id: String,
        client_secret: String,
        token_url: String,
        scopes: &[String],
        http_client: reqwest::Client,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let scope = if scopes.is_empty() {
            None
        } else {
            Some(scopes.join(" "))
        };

        Self {
            client_id,
            client_secret,
            token_url,
            scope,
            http_client,
            transport,
            cached_token: RwLock::new(None),
        }
    }

    /// Fetch a new token from the token endpoint
    async fn fetch_token(&self) -> Result<TokenResponse> {
        let request = TokenRequest {
            grant_type: "client_credentials",
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            scope: self.scope.as_deref(),
        };

        let request = self
            .http_client
            .post(&self.token_url)
            .form(&request)
            .build()?;

        debug!(token_url = %self.token_url, "Requesting client credentials token");
        let response = self.transport.execute(request).await?;

        if !response.status.is_success() {
            warn!(status = %response.status, "Token request rejected");
            return Err(Error::Authentication(format!(
                "Token request failed with status {}: {}",
                response.status,
                response.text()
            )));
        }

        let token_response: TokenResponse = serde_json::from_slice(&response.body)?;
        Ok(token_response)
    }
}

#[async_trait]
impl CredentialProvider for TokenManager {
    async fn bearer_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(ref token) = *cached {
                if token.is_valid() {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(ref token) = *cached {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }

        let new_token = self.fetch_token().await?;
        let access_token = new_token.access_token.clone();
        let expires_in = new_token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME);

        *cached = Some(CachedToken::new(
            new_token.access_token,
            expires_in,
            Instant::now(),
        ));

        Ok(access_token)
    }

    async fn invalidate(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }
}

/// Pre-issued bearer token
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    async fn invalidate(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpResponse;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingTransport {
        calls: AtomicUsize,
        bodies: Mutex<Vec<String>>,
        status: Option<StatusCode>,
        expires_in: Option<u64>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn execute(&self, request: reqwest::Request) -> Result<HttpResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let body = request
                .body()
                .and_then(|b| b.as_bytes())
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            self.bodies.lock().unwrap().push(body);

            let status = self.status.unwrap_or(StatusCode::OK);
            let payload = format!(
                r#"{{"access_token":"token-{}","token_type":"Bearer","expires_in":{}}}"#,
                n,
                self.expires_in.unwrap_or(3600)
            );
            Ok(HttpResponse {
                status,
                headers: HeaderMap::new(),
                body: Bytes::from(payload),
            })
        }
    }

    fn manager(transport: Arc<RecordingTransport>) -> TokenManager {
        TokenManager::new(
            "my-client".into(),
            "my-secret".into(),
            "https://api.asgardeo.io/t/acme/oauth2/token".into(),
            &["internal_api_resource_view".to_string(), "internal_application_mgt_view".to_string()],
            reqwest::Client::new(),
            transport,
        )
    }

    #[tokio::test]
    async fn test_token_is_cached() {
        let transport = Arc::new(RecordingTransport::default());
        let manager = manager(transport.clone());

        assert_eq!(manager.bearer_token().await.unwrap(), "token-0");
        assert_eq!(manager.bearer_token().await.unwrap(), "token-0");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let transport = Arc::new(RecordingTransport::default());
        let manager = manager(transport.clone());

        manager.bearer_token().await.unwrap();
        manager.invalidate().await;

        assert_eq!(manager.bearer_token().await.unwrap(), "token-1");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_token_request_form() {
        let transport = Arc::new(RecordingTransport::default());
        let manager = manager(transport.clone());

        manager.bearer_token().await.unwrap();

        let bodies = transport.bodies.lock().unwrap();
        assert!(bodies[0].contains("grant_type=client_credentials"));
        assert!(bodies[0].contains("client_id=my-client"));
        assert!(bodies[0].contains("scope=internal_api_resource_view+internal_application_mgt_view"));
    }

    #[tokio::test]
    async fn test_rejected_token_request() {
        let transport = Arc::new(RecordingTransport {
            status: Some(StatusCode::BAD_REQUEST),
            ..Default::default()
        });
        let manager = manager(transport);

        let err = manager.bearer_token().await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_huge_expires_in_is_capped() {
        let transport = Arc::new(RecordingTransport {
            expires_in: Some(u64::MAX),
            ..Default::default()
        });
        let manager = manager(transport.clone());

        assert_eq!(manager.bearer_token().await.unwrap(), "token-0");
        assert_eq!(manager.bearer_token().await.unwrap(), "token-0");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_lived_token_is_cached_for_half_its_lifetime() {
        let transport = Arc::new(RecordingTransport {
            expires_in: Some(30),
            ..Default::default()
        });
        let manager = manager(transport.clone());

        assert_eq!(manager.bearer_token().await.unwrap(), "token-0");
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(manager.bearer_token().await.unwrap(), "token-0");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(manager.bearer_token().await.unwrap(), "token-1");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_refresh_deadline() {
        let now = Instant::now();

        let token = CachedToken::new("t".into(), 3600, now);
        assert_eq!(token.refresh_at, now + Duration::from_secs(3540));

        let token = CachedToken::new("t".into(), 0, now);
        assert_eq!(token.refresh_at, now);
    }

    #[tokio::test]
    async fn test_static_token() {
        let token = StaticToken::new("abc");
        assert_eq!(token.bearer_token().await.unwrap(), "abc");
        assert_eq!(format!("{:?}", token), "StaticToken(<redacted>)");
    }
}
