//! High-level Asgardeo client

use crate::api_resource::ApiResourceClient;
use crate::application::ApplicationClient;
use crate::auth::{CredentialProvider, StaticToken, TokenManager};
use crate::config::{Config, Credentials};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path of the management REST API below the tenant base URL
const API_PREFIX: &[&str] = &["api", "server", "v1"];

/// Asgardeo management API client
///
/// Cheap to clone; clones share the HTTP connection pool and token cache.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ApiClient>,
}

impl Client {
    /// Create a new client from the given configuration.
    ///
    /// Validates the configuration up front; nothing is sent over the network.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http_client = build_http_client(&config)?;
        let transport = Arc::new(ReqwestTransport::new(http_client.clone()));
        Self::assemble(config, http_client, transport)
    }

    /// Create a client that sends requests through a custom transport
    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let http_client = build_http_client(&config)?;
        Self::assemble(config, http_client, transport)
    }

    fn assemble(
        config: Config,
        http_client: reqwest::Client,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self> {
        let base_url = Url::parse(config.normalized_base_url())
            .map_err(|e| Error::Config(format!("invalid base URL: {}", e)))?;

        let credentials: Arc<dyn CredentialProvider> = match &config.credentials {
            Some(Credentials::ClientCredentials {
                client_id,
                client_secret,
            }) => Arc::new(TokenManager::new(
                client_id.clone(),
                client_secret.clone(),
                config.get_token_url(),
                &config.scopes,
                http_client.clone(),
                transport.clone(),
            )),
            Some(Credentials::BearerToken(token)) => Arc::new(StaticToken::new(token.clone())),
            None => return Err(Error::Config("credentials are required".into())),
        };

        Ok(Self {
            inner: Arc::new(ApiClient {
                base_url,
                http_client,
                transport,
                credentials,
            }),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Application management
    pub fn applications(&self) -> ApplicationClient {
        ApplicationClient::new(self.inner.clone())
    }

    /// API resource management
    pub fn api_resources(&self) -> ApiResourceClient {
        ApiResourceClient::new(self.inner.clone())
    }
}

fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))
}

/// Request plumbing shared by the resource clients
#[derive(Debug)]
pub(crate) struct ApiClient {
    base_url: Url,
    http_client: reqwest::Client,
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialProvider>,
}

/// One API request before authentication is attached
pub(crate) struct ApiRequest<'a> {
    method: Method,
    segments: &'a [&'a str],
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

impl<'a> ApiRequest<'a> {
    pub(crate) fn new(method: Method, segments: &'a [&'a str]) -> Self {
        Self {
            method,
            segments,
            query: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn get(segments: &'a [&'a str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub(crate) fn query(mut self, key: &'static str, value: Option<impl ToString>) -> Self {
        if let Some(value) = value {
            self.query.push((key, value.to_string()));
        }
        self
    }

    pub(crate) fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

impl ApiClient {
    /// Resolve `segments` below the management API prefix, percent-encoding each one
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the successful response.
    ///
    /// A 401 invalidates the cached token and the request is retried once.
    /// Non-2xx statuses become typed errors.
    pub(crate) async fn send(
        &self,
        ctx: &RequestContext,
        request: ApiRequest<'_>,
    ) -> Result<HttpResponse> {
        let url = self.endpoint(request.segments)?;
        let path = url.path().to_string();

        ctx.run(async {
            for attempt in 0..2 {
                let token = self.credentials.bearer_token().await?;

                let mut builder = self
                    .http_client
                    .request(request.method.clone(), url.clone())
                    .bearer_auth(token)
                    .header(reqwest::header::ACCEPT, "application/json");
                if !request.query.is_empty() {
                    builder = builder.query(&request.query);
                }
                if let Some(body) = &request.body {
                    builder = builder.json(body);
                }

                debug!(method = %request.method, path = %path, attempt, "Sending API request");
                let response = self.transport.execute(builder.build()?).await?;
                let status = response.status;

                if status.is_success() {
                    return Ok(response);
                }

                if status == StatusCode::UNAUTHORIZED && attempt == 0 {
                    warn!(path = %path, "API rejected bearer token, refreshing");
                    self.credentials.invalidate().await;
                    continue;
                }

                debug!(method = %request.method, path = %path, status = %status, "API request failed");
                return Err(Error::from_status(status, response.text()));
            }

            Err(Error::Authentication(format!(
                "{} rejected a freshly issued token",
                path
            )))
        })
        .await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        request: ApiRequest<'_>,
    ) -> Result<T> {
        let response = self.send(ctx, request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        segments: &[&str],
    ) -> Result<T> {
        self.send_json(ctx, ApiRequest::get(segments)).await
    }
}

/// Reduce a filtered listing to the single expected match
pub(crate) fn unique_match<T>(resource: &'static str, key: String, mut items: Vec<T>) -> Result<T> {
    match items.len() {
        0 => Err(Error::NotFound(format!("no {} matches {}", resource, key))),
        1 => Ok(items.remove(0)),
        matches => Err(Error::Ambiguous {
            resource,
            key,
            matches,
        }),
    }
}
