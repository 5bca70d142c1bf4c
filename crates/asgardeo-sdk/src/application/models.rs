//! Consumer-facing application models
//!
//! Update models carry only optional fields: `None` leaves the stored value
//! untouched. Wire types that consumers work with directly (login flows,
//! logout configuration) are re-exported from [`super::internal`] rather than
//! duplicated.

use serde::{Deserialize, Serialize};

pub use super::internal::{
    Authenticator, LoginFlow, LoginFlowStatus, LoginFlowStep, LoginFlowType,
    OidcLogoutConfiguration,
};

/// Kind of application, which decides its template and OAuth grant settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppType {
    #[serde(rename = "spa")]
    Spa,
    #[serde(rename = "mobile")]
    Mobile,
    #[serde(rename = "m2m")]
    M2m,
    #[serde(rename = "ssr_web")]
    SsrWeb,
}

impl AppType {
    /// Template the console uses for this kind of application
    pub fn template_id(&self) -> &'static str {
        match self {
            AppType::Spa => "6a90e4b0-fbff-42d7-bfde-1efd98f07cd7",
            AppType::Mobile => "mobile-application",
            AppType::M2m => "m2m-application",
            AppType::SsrWeb => "b9c5e11e-fc78-484b-9bec-015d247561b8",
        }
    }

    /// Whether the application authenticates users through a browser redirect
    pub fn requires_redirect_url(&self) -> bool {
        !matches!(self, AppType::M2m)
    }

    pub fn grant_types(&self) -> Vec<String> {
        match self {
            AppType::M2m => vec!["client_credentials".to_string()],
            _ => vec![
                "authorization_code".to_string(),
                "refresh_token".to_string(),
            ],
        }
    }

    /// Space-separated scopes a user-facing application requests at sign-in.
    ///
    /// M2M applications have none until API scopes are authorized for them.
    pub fn default_scopes(&self) -> Option<&'static str> {
        match self {
            AppType::M2m => None,
            _ => Some("openid profile"),
        }
    }

    /// Public clients hold no secret and must use PKCE
    pub fn is_public_client(&self) -> bool {
        matches!(self, AppType::Spa | AppType::Mobile)
    }
}

/// Summary of a created or fetched application with its OAuth client credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationBasicInfo {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Scopes the application requests, see [`AppType::default_scopes`]
    #[serde(rename = "scope", default, skip_serializing_if = "Option::is_none")]
    pub authorized_scopes: Option<String>,
    #[serde(rename = "application_type")]
    pub app_type: AppType,
}

/// Input to [`ApplicationClient::create`](super::ApplicationClient::create)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationCreate {
    pub name: String,
    pub app_type: AppType,
    pub redirect_url: Option<String>,
    pub description: Option<String>,
}

impl ApplicationCreate {
    pub fn new(name: impl Into<String>, app_type: AppType) -> Self {
        Self {
            name: name.into(),
            app_type,
            redirect_url: None,
            description: None,
        }
    }

    pub fn with_redirect_url(mut self, redirect_url: impl Into<String>) -> Self {
        self.redirect_url = Some(redirect_url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Simplified model for updating basic application information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBasicInfoUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_return_url: Option<String>,
}

/// Updatable subset of an application's OAuth configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationOAuthConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_attributes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_access_token_expiry_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_access_token_expiry_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(rename = "callbackURLs", default, skip_serializing_if = "Option::is_none")]
    pub callback_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout: Option<OidcLogoutConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_expiry_in_seconds: Option<i64>,
}

impl ApplicationOAuthConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationClaimConfigurationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_claims: Option<Vec<RequestedClaim>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedClaim {
    pub claim: ClaimRef,
    #[serde(default)]
    pub mandatory: Option<bool>,
}

impl RequestedClaim {
    pub fn new(uri: impl Into<String>, mandatory: bool) -> Self {
        Self {
            claim: ClaimRef {
                uri: uri.into(),
                ..Default::default()
            },
            mandatory: Some(mandatory),
        }
    }
}

/// Reference to a local claim by URI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub uri: String,
}

/// Decoded result of a login-flow generation operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoginFlowResult {
    /// Generated flow; all fields unset when the operation returned no data
    pub data: LoginFlow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoginFlowStatus>,
}
