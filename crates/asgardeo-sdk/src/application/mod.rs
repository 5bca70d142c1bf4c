//! Application management
//!
//! ## Example
//!
//! ```rust,no_run
//! use asgardeo_sdk::application::{ApplicationBasicInfoUpdate, ApplicationCreate, AppType};
//! use asgardeo_sdk::{Client, Config, RequestContext};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(
//!     Config::new("https://api.asgardeo.io/t/acme").with_client_credentials("id", "secret"),
//! )?;
//! let ctx = RequestContext::background();
//!
//! let app = client
//!     .applications()
//!     .create(
//!         &ctx,
//!         ApplicationCreate::new("Portal", AppType::Spa).with_redirect_url("https://portal.example.com"),
//!     )
//!     .await?;
//!
//! client
//!     .applications()
//!     .update_basic_info(
//!         &ctx,
//!         &app.id,
//!         ApplicationBasicInfoUpdate {
//!             description: Some("Customer portal".into()),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod convert;
pub mod internal;
pub mod models;

pub use internal::{
    Application, ApplicationListItem, ApplicationListResponse, AuthorizedApi,
    AuthorizedApiCreate, AuthorizedScope, LoginFlowGenerateRequest, LoginFlowGenerateResponse,
    LoginFlowStatusResponse, OidcConfiguration, UserClaim,
};
pub use models::*;

use std::sync::Arc;

use reqwest::header::LOCATION;
use reqwest::Method;
use tracing::{debug, info};

use crate::client::{unique_match, ApiClient, ApiRequest};
use crate::context::RequestContext;
use crate::error::{DecodeError, Error, Result};
use internal::{
    ApplicationCreateRequest, ApplicationPatchRequest, InboundProtocols, LoginFlowResultResponse,
    PkceConfiguration,
};

const APPLICATIONS: &str = "applications";

/// Query options for [`ApplicationClient::list`]
#[derive(Debug, Clone, Default)]
pub struct ApplicationListParams {
    /// SCIM-style filter, e.g. `name sw Portal`
    pub filter: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Comma-separated extra attributes to include, e.g. `clientId,templateId`
    pub attributes: Option<String>,
}

impl ApplicationListParams {
    pub fn filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Default::default()
        }
    }
}

/// Operations on `/applications`
#[derive(Debug, Clone)]
pub struct ApplicationClient {
    api: Arc<ApiClient>,
}

impl ApplicationClient {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// List applications. An empty page is not an error.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        params: Option<&ApplicationListParams>,
    ) -> Result<ApplicationListResponse> {
        let mut request = ApiRequest::get(&[APPLICATIONS]);
        if let Some(params) = params {
            request = request
                .query("filter", params.filter.as_ref())
                .query("limit", params.limit)
                .query("offset", params.offset)
                .query("attributes", params.attributes.as_ref());
        }
        self.api.send_json(ctx, request).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<Application> {
        self.api.get_json(ctx, &[APPLICATIONS, id]).await
    }

    /// Get the single application with this exact name
    pub async fn get_by_name(&self, ctx: &RequestContext, name: &str) -> Result<Application> {
        self.get_unique(ctx, format!("name eq {}", name)).await
    }

    /// Get the application that owns an OAuth client id
    pub async fn get_by_client_id(
        &self,
        ctx: &RequestContext,
        client_id: &str,
    ) -> Result<Application> {
        self.get_unique(ctx, format!("clientId eq {}", client_id)).await
    }

    async fn get_unique(&self, ctx: &RequestContext, filter: String) -> Result<Application> {
        let listing = self
            .list(ctx, Some(&ApplicationListParams::filter(filter.clone())))
            .await?;
        let item = unique_match("application", filter, listing.applications)?;
        self.get(ctx, &item.id).await
    }

    pub async fn get_oauth_config(&self, ctx: &RequestContext, id: &str) -> Result<OidcConfiguration> {
        self.api
            .get_json(ctx, &[APPLICATIONS, id, "inbound-protocols", "oidc"])
            .await
    }

    /// Create an application from the template matching its type.
    ///
    /// The new application id is read from the `Location` header, then its
    /// OIDC settings are fetched to return the issued client credentials.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        model: ApplicationCreate,
    ) -> Result<ApplicationBasicInfo> {
        let request = create_request(&model)?;

        let response = self
            .api
            .send(ctx, ApiRequest::new(Method::POST, &[APPLICATIONS]).json(&request)?)
            .await?;

        let location = response
            .headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(DecodeError::MissingHeader("Location"))?;
        let id = location
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or(DecodeError::MissingHeader("Location"))?
            .to_string();

        info!(application_id = %id, app_type = ?model.app_type, "Created application");

        let application = self.get(ctx, &id).await?;
        let oidc = self.get_oauth_config(ctx, &id).await?;
        Ok(convert::basic_info(&application, &oidc, model.app_type))
    }

    /// Update name, description, image, access URL or logout return URL
    pub async fn update_basic_info(
        &self,
        ctx: &RequestContext,
        id: &str,
        update: ApplicationBasicInfoUpdate,
    ) -> Result<()> {
        self.patch(ctx, id, update.into()).await
    }

    /// Replace the requested claims. An update without a claim list changes nothing.
    pub async fn update_claim_config(
        &self,
        ctx: &RequestContext,
        id: &str,
        update: ApplicationClaimConfigurationUpdate,
    ) -> Result<()> {
        self.patch(ctx, id, update.into()).await
    }

    /// Replace the application's authentication sequence
    pub async fn update_login_flow(
        &self,
        ctx: &RequestContext,
        id: &str,
        flow: LoginFlow,
    ) -> Result<()> {
        self.patch(ctx, id, flow.into()).await
    }

    async fn patch(&self, ctx: &RequestContext, id: &str, body: ApplicationPatchRequest) -> Result<()> {
        if body.is_empty() {
            debug!(application_id = %id, "Skipping empty application patch");
            return Ok(());
        }

        self.api
            .send(ctx, ApiRequest::new(Method::PATCH, &[APPLICATIONS, id]).json(&body)?)
            .await?;
        info!(application_id = %id, "Patched application");
        Ok(())
    }

    /// Apply `update` on top of the stored OIDC configuration and write it back.
    ///
    /// Returns the configuration as written. An empty update returns the
    /// stored configuration without writing.
    pub async fn update_oauth_config(
        &self,
        ctx: &RequestContext,
        id: &str,
        update: ApplicationOAuthConfigUpdate,
    ) -> Result<OidcConfiguration> {
        let current = self.get_oauth_config(ctx, id).await?;
        if update.is_empty() {
            return Ok(current);
        }

        let merged = convert::merge_oauth_config(current, update);
        self.api
            .send(
                ctx,
                ApiRequest::new(Method::PUT, &[APPLICATIONS, id, "inbound-protocols", "oidc"])
                    .json(&merged)?,
            )
            .await?;
        info!(application_id = %id, "Updated OAuth configuration");
        Ok(merged)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        self.api
            .send(ctx, ApiRequest::new(Method::DELETE, &[APPLICATIONS, id]))
            .await?;
        info!(application_id = %id, "Deleted application");
        Ok(())
    }

    /// Grant the application access to scopes of an API resource
    pub async fn authorize_api(
        &self,
        ctx: &RequestContext,
        application_id: &str,
        model: AuthorizedApiCreate,
    ) -> Result<()> {
        self.api
            .send(
                ctx,
                ApiRequest::new(Method::POST, &[APPLICATIONS, application_id, "authorized-apis"])
                    .json(&model)?,
            )
            .await?;
        info!(application_id = %application_id, api_resource_id = %model.id, "Authorized API");
        Ok(())
    }

    pub async fn list_authorized_apis(
        &self,
        ctx: &RequestContext,
        application_id: &str,
    ) -> Result<Vec<AuthorizedApi>> {
        self.api
            .get_json(ctx, &[APPLICATIONS, application_id, "authorized-apis"])
            .await
    }

    /// Start generating a login flow from a natural-language description
    pub async fn generate_login_flow(
        &self,
        ctx: &RequestContext,
        request: LoginFlowGenerateRequest,
    ) -> Result<LoginFlowGenerateResponse> {
        self.api
            .send_json(
                ctx,
                ApiRequest::new(Method::POST, &[APPLICATIONS, "login-flow", "generate"])
                    .json(&request)?,
            )
            .await
    }

    pub async fn login_flow_status(
        &self,
        ctx: &RequestContext,
        operation_id: &str,
    ) -> Result<LoginFlowStatusResponse> {
        self.api
            .get_json(ctx, &[APPLICATIONS, "login-flow", "status", operation_id])
            .await
    }

    /// Fetch and decode the generated login flow
    pub async fn login_flow_result(
        &self,
        ctx: &RequestContext,
        operation_id: &str,
    ) -> Result<LoginFlowResult> {
        let response: LoginFlowResultResponse = self
            .api
            .get_json(ctx, &[APPLICATIONS, "login-flow", "result", operation_id])
            .await?;
        Ok(convert::login_flow_result(response)?)
    }
}

/// Build the creation request for an application type
fn create_request(model: &ApplicationCreate) -> Result<ApplicationCreateRequest> {
    if model.name.trim().is_empty() {
        return Err(Error::InvalidInput("application name must not be empty".into()));
    }

    let redirect_url = model.redirect_url.clone().filter(|url| !url.trim().is_empty());
    if model.app_type.requires_redirect_url() && redirect_url.is_none() {
        return Err(Error::InvalidInput(format!(
            "{:?} applications require a redirect URL",
            model.app_type
        )));
    }

    let public_client = model.app_type.is_public_client();
    let oidc = OidcConfiguration {
        grant_types: model.app_type.grant_types(),
        callback_urls: redirect_url.iter().cloned().collect(),
        allowed_origins: match model.app_type {
            AppType::Spa => redirect_url.iter().filter_map(|url| origin_of(url)).collect(),
            _ => Vec::new(),
        },
        public_client: Some(public_client),
        pkce: public_client.then(|| PkceConfiguration {
            mandatory: Some(true),
            support_plain_transform_algorithm: Some(false),
            ..Default::default()
        }),
        ..Default::default()
    };

    Ok(ApplicationCreateRequest {
        name: model.name.clone(),
        description: model.description.clone(),
        template_id: Some(model.app_type.template_id().to_string()),
        access_url: match model.app_type {
            AppType::Spa | AppType::SsrWeb => redirect_url,
            _ => None,
        },
        inbound_protocol_configuration: Some(InboundProtocols { oidc: Some(oidc) }),
    })
}

/// `scheme://host[:port]` of a URL
fn origin_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}
