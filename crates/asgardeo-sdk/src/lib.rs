//! # Asgardeo SDK for Rust
//!
//! Typed client for the Asgardeo management REST API: applications, API
//! resources and AI-assisted login-flow generation.
//!
//! ## Features
//!
//! - **Typed models**: request and response payloads as serde structs, with
//!   update models that only send the fields you set
//! - **Authentication**: OAuth2 client credentials flow with token caching and
//!   refresh on 401, or a caller-supplied bearer token
//! - **Cancellation**: every call takes a [`RequestContext`] carrying a
//!   cancellation token and optional deadline
//! - **Pluggable transport**: requests go through an [`HttpTransport`],
//!   reqwest-backed by default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use asgardeo_sdk::{Client, Config, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default_config()
//!         .with_base_url("https://api.asgardeo.io/t/acme")
//!         .with_timeout(Duration::from_secs(10))
//!         .with_client_credentials("client_id", "client_secret");
//!
//!     let client = Client::new(config)?;
//!     let ctx = RequestContext::background();
//!
//!     let resources = client.api_resources().list(&ctx, None).await?;
//!     println!("Found {} API resources", resources.api_resources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api_resource;
pub mod application;
pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod transport;

// Re-export main types
pub use api_resource::ApiResourceClient;
pub use application::ApplicationClient;
pub use auth::{CredentialProvider, StaticToken, TokenManager};
pub use client::Client;
pub use config::{Config, Credentials};
pub use context::RequestContext;
pub use error::{DecodeError, Error, Result};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

pub use tokio_util::sync::CancellationToken;
