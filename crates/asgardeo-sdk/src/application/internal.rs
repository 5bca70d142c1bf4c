//! Wire models for the application management endpoints
//!
//! Field names follow the REST API's JSON schema. Every optional field is
//! omitted when unset so that PATCH bodies only carry what the caller set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Pagination link returned by list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
}

/// Paged application listing
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default)]
    pub applications: Vec<ApplicationListItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Full application as returned by `GET /applications/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_return_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_configuration: Option<ClaimConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_sequence: Option<LoginFlow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inbound_protocols: Vec<InboundProtocolListItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InboundProtocolListItem {
    #[serde(rename = "type")]
    pub protocol_type: String,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

/// Body of `POST /applications`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCreateRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_protocol_configuration: Option<InboundProtocols>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InboundProtocols {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<OidcConfiguration>,
}

/// Body of `PATCH /applications/{id}`. Only set fields are sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatchRequest {
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_configuration: Option<ClaimConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_sequence: Option<LoginFlow>,
}

impl ApplicationPatchRequest {
    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ClaimConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_claims: Option<Vec<RequestedClaimConfiguration>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedClaimConfiguration {
    pub claim: Claim,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// OIDC inbound protocol configuration of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OidcConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub grant_types: Vec<String>,
    #[serde(rename = "callbackURLs", default, skip_serializing_if = "Vec::is_empty")]
    pub callback_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_origins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_client: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkce: Option<PkceConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessTokenConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<RefreshTokenConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout: Option<OidcLogoutConfiguration>,
    /// Settings this SDK does not model, kept so a read-modify-write preserves them
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PkceConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_plain_transform_algorithm: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenConfiguration {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_access_token_expiry_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_access_token_expiry_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_attributes: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_in_seconds: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renew_refresh_token: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OidcLogoutConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_channel_logout_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_channel_logout_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authentication sequence of an application, a.k.a. its login flow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginFlow {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub flow_type: Option<LoginFlowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<LoginFlowStep>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_step_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_step_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoginFlowStep {
    pub id: i32,
    #[serde(default)]
    pub options: Vec<Authenticator>,
}

/// One authenticator option within a login-flow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Authenticator {
    pub authenticator: String,
    pub idp: String,
}

impl Authenticator {
    pub fn new(authenticator: impl Into<String>, idp: impl Into<String>) -> Self {
        Self {
            authenticator: authenticator.into(),
            idp: idp.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginFlowType {
    Default,
    UserDefined,
}

impl LoginFlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginFlowType::Default => "DEFAULT",
            LoginFlowType::UserDefined => "USER_DEFINED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DEFAULT" => Some(LoginFlowType::Default),
            "USER_DEFINED" => Some(LoginFlowType::UserDefined),
            _ => None,
        }
    }
}

/// Body of `POST /applications/{id}/authorized-apis`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedApiCreate {
    /// API resource id
    pub id: String,
    pub policy_identifier: String,
    pub scopes: Vec<String>,
}

impl AuthorizedApiCreate {
    /// Authorize `scopes` of an API resource under role-based access control
    pub fn rbac(api_resource_id: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            id: api_resource_id.into(),
            policy_identifier: "RBAC".to_string(),
            scopes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedApi {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(default)]
    pub authorized_scopes: Vec<AuthorizedScope>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Body of `POST /applications/login-flow/generate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginFlowGenerateRequest {
    /// Natural-language description of the desired login flow
    pub user_query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_claims: Vec<UserClaim>,
}

impl LoginFlowGenerateRequest {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            user_claims: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserClaim {
    #[serde(rename = "claimURI")]
    pub claim_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginFlowGenerateResponse {
    pub operation_id: String,
}

/// Progress of a login-flow generation operation, keyed by stage name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginFlowStatusResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub status: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoginFlowStatus {
    InProgress,
    Completed,
    Failed,
}

/// Raw result of a login-flow generation operation.
///
/// `data` is left untyped here and decoded by
/// [`convert::login_flow_result`](super::convert::login_flow_result).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginFlowResultResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LoginFlowStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
