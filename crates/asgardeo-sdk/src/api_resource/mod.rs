//! API resource management

mod models;

pub use models::{ApiResource, ApiResourceCreate, ApiResourceListParams, ApiResourceListResponse, Scope};

use std::sync::Arc;

use reqwest::Method;
use tracing::info;

use crate::client::{unique_match, ApiClient, ApiRequest};
use crate::context::RequestContext;
use crate::error::Result;

const API_RESOURCES: &str = "api-resources";

/// Operations on `/api-resources`
#[derive(Debug, Clone)]
pub struct ApiResourceClient {
    api: Arc<ApiClient>,
}

impl ApiResourceClient {
    pub(crate) fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// List API resources. An empty page is not an error.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        params: Option<&ApiResourceListParams>,
    ) -> Result<ApiResourceListResponse> {
        let mut request = ApiRequest::get(&[API_RESOURCES]);
        if let Some(params) = params {
            request = request
                .query("filter", params.filter.as_ref())
                .query("limit", params.limit)
                .query("before", params.before.as_ref())
                .query("after", params.after.as_ref())
                .query("attributes", params.attributes.as_ref());
        }
        self.api.send_json(ctx, request).await
    }

    pub async fn get(&self, ctx: &RequestContext, id: &str) -> Result<ApiResource> {
        self.api.get_json(ctx, &[API_RESOURCES, id]).await
    }

    /// Get the single API resource with this exact name
    pub async fn get_by_name(&self, ctx: &RequestContext, name: &str) -> Result<ApiResource> {
        self.get_unique(ctx, format!("name eq {}", name)).await
    }

    /// Get the API resource registered under an identifier (audience)
    pub async fn get_by_identifier(
        &self,
        ctx: &RequestContext,
        identifier: &str,
    ) -> Result<ApiResource> {
        self.get_unique(ctx, format!("identifier eq {}", identifier))
            .await
    }

    async fn get_unique(&self, ctx: &RequestContext, filter: String) -> Result<ApiResource> {
        let listing = self
            .list(ctx, Some(&ApiResourceListParams::filter(filter.clone())))
            .await?;
        unique_match("API", filter, listing.api_resources)
    }

    pub async fn create(&self, ctx: &RequestContext, model: ApiResourceCreate) -> Result<ApiResource> {
        let created: ApiResource = self
            .api
            .send_json(
                ctx,
                ApiRequest::new(Method::POST, &[API_RESOURCES]).json(&model)?,
            )
            .await?;
        info!(api_resource_id = %created.id, identifier = %created.identifier, "Created API resource");
        Ok(created)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: &str) -> Result<()> {
        self.api
            .send(ctx, ApiRequest::new(Method::DELETE, &[API_RESOURCES, id]))
            .await?;
        info!(api_resource_id = %id, "Deleted API resource");
        Ok(())
    }
}
