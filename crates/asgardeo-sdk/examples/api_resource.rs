//! List and look up API resources.
//!
//! Credentials come from `ASGARDEO_*` environment variables when set:
//!
//! ```text
//! ASGARDEO_BASE_URL=https://api.asgardeo.io/t/acme \
//! ASGARDEO_CLIENT_ID=... ASGARDEO_CLIENT_SECRET=... \
//! RUST_LOG=info,asgardeo_sdk=debug cargo run --example api_resource
//! ```

use std::time::Duration;

use asgardeo_sdk::{Client, Config, RequestContext};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = Config::default_config()
        .with_base_url("https://api.asgardeo.io/t/<tenant-domain>")
        .with_timeout(Duration::from_secs(10))
        .with_client_credentials("client_id", "client_secret")
        .with_overrides(|key| std::env::var(key).ok());

    let client = match Client::new(config) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to create SDK client");
            std::process::exit(1);
        }
    };

    let ctx = RequestContext::background().with_timeout(Duration::from_secs(30));
    let resources = client.api_resources();

    match resources.list(&ctx, None).await {
        Ok(listing) => info!(count = listing.api_resources.len(), "Listed API resources"),
        Err(e) => error!(error = %e, "Error listing API resources"),
    }

    match resources.get(&ctx, "api_resource_uuid").await {
        Ok(resource) => info!(name = %resource.name, "Found API resource"),
        Err(e) => error!(error = %e, "Error getting API resource"),
    }

    match resources.get_by_name(&ctx, "api_resource_name").await {
        Ok(resource) => info!(id = %resource.id, "Found API resource by name"),
        Err(e) => error!(error = %e, "Error getting API resource by name"),
    }

    match resources
        .get_by_identifier(&ctx, "api_resource_identifier")
        .await
    {
        Ok(resource) => info!(name = %resource.name, "Found API resource by identifier"),
        Err(e) => error!(error = %e, "Error getting API resource by identifier"),
    }
}
