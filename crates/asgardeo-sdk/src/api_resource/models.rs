//! API resource models

use serde::{Deserialize, Serialize};

use crate::application::internal::Link;

/// A protected API registered with the tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResource {
    pub id: String,
    pub name: String,
    pub identifier: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_authorization: Option<bool>,
    /// Only populated by single-resource reads
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<Scope>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Scope {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: Some(display_name.into()),
            ..Default::default()
        }
    }
}

/// Cursor-paged API resource listing
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceListResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<i64>,
    #[serde(rename = "APIResources", alias = "apiResources", default)]
    pub api_resources: Vec<ApiResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
}

/// Query options for [`ApiResourceClient::list`](super::ApiResourceClient::list)
#[derive(Debug, Clone, Default)]
pub struct ApiResourceListParams {
    /// Filter expression, e.g. `name eq Orders`
    pub filter: Option<String>,
    pub limit: Option<u32>,
    /// Cursor for the previous page
    pub before: Option<String>,
    /// Cursor for the next page
    pub after: Option<String>,
    pub attributes: Option<String>,
}

impl ApiResourceListParams {
    pub fn filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Default::default()
        }
    }
}

/// Body of `POST /api-resources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceCreate {
    pub name: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_authorization: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<Scope>,
}

impl ApiResourceCreate {
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: identifier.into(),
            requires_authorization: Some(true),
            scopes: Vec::new(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_response_accepts_both_collection_keys() {
        let upper: ApiResourceListResponse = serde_json::from_value(json!({
            "totalResults": 1,
            "APIResources": [{"id": "r1", "name": "Orders", "identifier": "https://orders"}]
        }))
        .unwrap();
        assert_eq!(upper.api_resources.len(), 1);

        let lower: ApiResourceListResponse = serde_json::from_value(json!({
            "apiResources": [{"id": "r1", "name": "Orders", "identifier": "https://orders"}]
        }))
        .unwrap();
        assert_eq!(lower.api_resources[0].name, "Orders");

        let empty: ApiResourceListResponse = serde_json::from_value(json!({"totalResults": 0})).unwrap();
        assert!(empty.api_resources.is_empty());
    }

    #[test]
    fn test_resource_without_id_is_rejected() {
        let result: Result<ApiResource, _> =
            serde_json::from_value(json!({"name": "Orders", "identifier": "https://orders"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_body() {
        let body = ApiResourceCreate::new("Orders", "https://orders.example.com")
            .with_scope(Scope::new("orders:read", "Read orders"));

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "Orders",
                "identifier": "https://orders.example.com",
                "requiresAuthorization": true,
                "scopes": [{"name": "orders:read", "displayName": "Read orders"}]
            })
        );
    }
}
