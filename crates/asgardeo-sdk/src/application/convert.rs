//! Conversions between consumer models and wire models
//!
//! Everything here is pure. Update models convert into patch bodies without
//! inventing values: a field the caller left unset stays unset. The login-flow
//! decoder checks every key it reads and reports the JSON path of the first
//! mismatch.

use serde_json::{Map, Value};

use super::internal::{
    AccessTokenConfiguration, Application, ApplicationPatchRequest, Authenticator, Claim,
    ClaimConfiguration, LoginFlow, LoginFlowResultResponse, LoginFlowStep, LoginFlowType,
    OidcConfiguration, OidcLogoutConfiguration, RefreshTokenConfiguration,
    RequestedClaimConfiguration,
};
use super::models::{
    AppType, ApplicationBasicInfo, ApplicationBasicInfoUpdate,
    ApplicationClaimConfigurationUpdate, ApplicationOAuthConfigUpdate, LoginFlowResult,
};
use crate::error::DecodeError;

impl From<ApplicationBasicInfoUpdate> for ApplicationPatchRequest {
    fn from(update: ApplicationBasicInfoUpdate) -> Self {
        Self {
            name: update.name,
            description: update.description,
            image_url: update.image_url,
            access_url: update.access_url,
            logout_return_url: update.logout_return_url,
            ..Default::default()
        }
    }
}

impl From<&ApplicationPatchRequest> for ApplicationBasicInfoUpdate {
    fn from(patch: &ApplicationPatchRequest) -> Self {
        Self {
            name: patch.name.clone(),
            description: patch.description.clone(),
            image_url: patch.image_url.clone(),
            access_url: patch.access_url.clone(),
            logout_return_url: patch.logout_return_url.clone(),
        }
    }
}

impl From<ApplicationClaimConfigurationUpdate> for ApplicationPatchRequest {
    fn from(update: ApplicationClaimConfigurationUpdate) -> Self {
        let Some(claims) = update.requested_claims else {
            return Self::default();
        };

        let requested_claims = claims
            .into_iter()
            .map(|requested| RequestedClaimConfiguration {
                claim: Claim {
                    uri: requested.claim.uri,
                    ..Default::default()
                },
                mandatory: requested.mandatory,
            })
            .collect();

        Self {
            claim_configuration: Some(ClaimConfiguration {
                requested_claims: Some(requested_claims),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl From<LoginFlow> for ApplicationPatchRequest {
    fn from(flow: LoginFlow) -> Self {
        Self {
            authentication_sequence: Some(flow),
            ..Default::default()
        }
    }
}

/// Overlay the set fields of `update` onto the stored OIDC configuration
pub fn merge_oauth_config(
    mut current: OidcConfiguration,
    update: ApplicationOAuthConfigUpdate,
) -> OidcConfiguration {
    if update.access_token_attributes.is_some()
        || update.application_access_token_expiry_in_seconds.is_some()
        || update.user_access_token_expiry_in_seconds.is_some()
    {
        let access_token = current
            .access_token
            .get_or_insert_with(AccessTokenConfiguration::default);
        if let Some(attributes) = update.access_token_attributes {
            access_token.access_token_attributes = Some(attributes);
        }
        if let Some(expiry) = update.application_access_token_expiry_in_seconds {
            access_token.application_access_token_expiry_in_seconds = Some(expiry);
        }
        if let Some(expiry) = update.user_access_token_expiry_in_seconds {
            access_token.user_access_token_expiry_in_seconds = Some(expiry);
        }
    }

    if let Some(origins) = update.allowed_origins {
        current.allowed_origins = origins;
    }
    if let Some(callbacks) = update.callback_urls {
        current.callback_urls = callbacks;
    }
    if let Some(update) = update.logout {
        let logout = current
            .logout
            .get_or_insert_with(OidcLogoutConfiguration::default);
        if update.back_channel_logout_url.is_some() {
            logout.back_channel_logout_url = update.back_channel_logout_url;
        }
        if update.front_channel_logout_url.is_some() {
            logout.front_channel_logout_url = update.front_channel_logout_url;
        }
        logout.extra.extend(update.extra);
    }
    if let Some(expiry) = update.refresh_token_expiry_in_seconds {
        current
            .refresh_token
            .get_or_insert_with(RefreshTokenConfiguration::default)
            .expiry_in_seconds = Some(expiry);
    }

    current
}

/// Combine an application with its OIDC settings into the consumer summary
pub fn basic_info(
    application: &Application,
    oidc: &OidcConfiguration,
    app_type: AppType,
) -> ApplicationBasicInfo {
    ApplicationBasicInfo {
        id: application.id.clone(),
        name: application.name.clone(),
        client_id: oidc
            .client_id
            .clone()
            .or_else(|| application.client_id.clone()),
        client_secret: oidc.client_secret.clone(),
        redirect_url: oidc.callback_urls.first().cloned(),
        authorized_scopes: app_type.default_scopes().map(str::to_string),
        app_type,
    }
}

/// Decode the untyped payload of a login-flow generation result
pub fn login_flow_result(response: LoginFlowResultResponse) -> Result<LoginFlowResult, DecodeError> {
    Ok(LoginFlowResult {
        data: decode_login_flow(response.data.as_ref(), "data")?,
        status: response.status,
    })
}

/// Decode a login flow from an untyped JSON value.
///
/// An absent or `null` value yields an empty flow. `path` prefixes the paths
/// reported in errors.
pub fn decode_login_flow(value: Option<&Value>, path: &str) -> Result<LoginFlow, DecodeError> {
    let map = match value {
        None | Some(Value::Null) => return Ok(LoginFlow::default()),
        Some(value) => as_object(value, path)?,
    };

    let attribute_step_id = as_i32(required(map, "attributeStepId", path)?, &join(path, "attributeStepId"))?;
    let subject_step_id = as_i32(required(map, "subjectStepId", path)?, &join(path, "subjectStepId"))?;

    let steps_path = join(path, "steps");
    let steps = as_array(required(map, "steps", path)?, &steps_path)?
        .iter()
        .enumerate()
        .map(|(i, step)| decode_step(step, &format!("{}[{}]", steps_path, i)))
        .collect::<Result<Vec<_>, _>>()?;

    let type_path = join(path, "type");
    let raw_type = as_str(required(map, "type", path)?, &type_path)?;
    let flow_type = LoginFlowType::parse(raw_type).ok_or_else(|| DecodeError::UnknownVariant {
        path: type_path,
        value: raw_type.to_string(),
    })?;

    let script = match map.get("script") {
        None | Some(Value::Null) => None,
        Some(value) => Some(as_str(value, &join(path, "script"))?.to_string()),
    };

    Ok(LoginFlow {
        flow_type: Some(flow_type),
        steps: Some(steps),
        subject_step_id: Some(subject_step_id),
        attribute_step_id: Some(attribute_step_id),
        script,
    })
}

fn decode_step(value: &Value, path: &str) -> Result<LoginFlowStep, DecodeError> {
    let map = as_object(value, path)?;
    let id = as_i32(required(map, "id", path)?, &join(path, "id"))?;

    let options_path = join(path, "options");
    let options = as_array(required(map, "options", path)?, &options_path)?
        .iter()
        .enumerate()
        .map(|(i, option)| decode_authenticator(option, &format!("{}[{}]", options_path, i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LoginFlowStep { id, options })
}

fn decode_authenticator(value: &Value, path: &str) -> Result<Authenticator, DecodeError> {
    let map = as_object(value, path)?;
    Ok(Authenticator {
        authenticator: as_str(required(map, "authenticator", path)?, &join(path, "authenticator"))?
            .to_string(),
        idp: as_str(required(map, "idp", path)?, &join(path, "idp"))?.to_string(),
    })
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn required<'a>(map: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value, DecodeError> {
    map.get(key).ok_or_else(|| DecodeError::MissingField {
        path: join(path, key),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(value: &Value, path: &str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidType {
        path: path.to_string(),
        expected,
        found: kind(value),
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, DecodeError> {
    value.as_object().ok_or_else(|| invalid_type(value, path, "object"))
}

fn as_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>, DecodeError> {
    value.as_array().ok_or_else(|| invalid_type(value, path, "array"))
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, DecodeError> {
    value.as_str().ok_or_else(|| invalid_type(value, path, "string"))
}

/// Integers may arrive as `1` or `1.0`; anything fractional or out of range is rejected
fn as_i32(value: &Value, path: &str) -> Result<i32, DecodeError> {
    let integer = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    };

    integer
        .and_then(|i| i32::try_from(i).ok())
        .ok_or_else(|| invalid_type(value, path, "32-bit integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::internal::LoginFlowStatus;
    use crate::application::models::{ClaimRef, RequestedClaim};
    use serde_json::json;

    fn sample_flow() -> Value {
        json!({
            "attributeStepId": 1,
            "subjectStepId": 1,
            "type": "USER_DEFINED",
            "steps": [
                {"id": 1, "options": [
                    {"authenticator": "BasicAuthenticator", "idp": "LOCAL"},
                    {"authenticator": "GoogleOIDCAuthenticator", "idp": "Google"}
                ]},
                {"id": 2.0, "options": [
                    {"authenticator": "totp", "idp": "LOCAL"}
                ]}
            ]
        })
    }

    #[test]
    fn test_basic_info_update_copies_only_set_fields() {
        let update = ApplicationBasicInfoUpdate {
            name: Some("Portal".into()),
            logout_return_url: Some("https://portal.example.com".into()),
            ..Default::default()
        };

        let patch = ApplicationPatchRequest::from(update.clone());
        assert_eq!(patch.name.as_deref(), Some("Portal"));
        assert!(patch.description.is_none());
        assert!(patch.claim_configuration.is_none());

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            json!({"name": "Portal", "logoutReturnUrl": "https://portal.example.com"})
        );

        assert_eq!(ApplicationBasicInfoUpdate::from(&patch), update);
    }

    #[test]
    fn test_empty_basic_info_update_is_empty_patch() {
        let patch = ApplicationPatchRequest::from(ApplicationBasicInfoUpdate::default());
        assert!(patch.is_empty());
        assert_eq!(serde_json::to_string(&patch).unwrap(), "{}");
    }

    #[test]
    fn test_absent_claim_list_is_empty_patch() {
        let patch = ApplicationPatchRequest::from(ApplicationClaimConfigurationUpdate::default());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_claim_update_preserves_count_and_order() {
        for n in [0usize, 1, 2, 7] {
            let claims: Vec<RequestedClaim> = (0..n)
                .map(|i| RequestedClaim {
                    claim: ClaimRef {
                        uri: format!("http://wso2.org/claims/c{}", i),
                        display_name: Some(format!("Claim {}", i)),
                        id: Some(format!("id-{}", i)),
                    },
                    mandatory: if i % 2 == 0 { Some(true) } else { None },
                })
                .collect();

            let patch = ApplicationPatchRequest::from(ApplicationClaimConfigurationUpdate {
                requested_claims: Some(claims.clone()),
            });

            let produced = patch
                .claim_configuration
                .and_then(|c| c.requested_claims)
                .unwrap();
            assert_eq!(produced.len(), n);
            for (input, output) in claims.iter().zip(&produced) {
                assert_eq!(output.claim.uri, input.claim.uri);
                assert_eq!(output.mandatory, input.mandatory);
                assert!(output.claim.id.is_none());
                assert!(output.claim.display_name.is_none());
            }
        }
    }

    #[test]
    fn test_explicitly_empty_claim_list_is_sent() {
        let patch = ApplicationPatchRequest::from(ApplicationClaimConfigurationUpdate {
            requested_claims: Some(Vec::new()),
        });

        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"claimConfiguration": {"requestedClaims": []}})
        );
    }

    #[test]
    fn test_decode_login_flow() {
        let flow = decode_login_flow(Some(&sample_flow()), "data").unwrap();

        assert_eq!(flow.flow_type, Some(LoginFlowType::UserDefined));
        assert_eq!(flow.attribute_step_id, Some(1));
        assert_eq!(flow.subject_step_id, Some(1));
        let steps = flow.steps.unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].options[1], Authenticator::new("GoogleOIDCAuthenticator", "Google"));
        assert_eq!(steps[1].id, 2);
        assert!(flow.script.is_none());
    }

    #[test]
    fn test_decode_absent_payload_is_zero_value() {
        assert_eq!(decode_login_flow(None, "data").unwrap(), LoginFlow::default());
        assert_eq!(
            decode_login_flow(Some(&Value::Null), "data").unwrap(),
            LoginFlow::default()
        );
    }

    #[test]
    fn test_decode_missing_key() {
        let mut payload = sample_flow();
        payload["steps"][1]["options"][0]
            .as_object_mut()
            .unwrap()
            .remove("idp");

        let err = decode_login_flow(Some(&payload), "data").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::MissingField { ref path } if path == "data.steps[1].options[0].idp"
        ));
    }

    #[test]
    fn test_decode_wrong_types() {
        let mut payload = sample_flow();
        payload["subjectStepId"] = json!("1");
        let err = decode_login_flow(Some(&payload), "data").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidType { ref path, found: "string", .. } if path == "data.subjectStepId"
        ));

        let mut payload = sample_flow();
        payload["steps"] = json!({"id": 1});
        let err = decode_login_flow(Some(&payload), "data").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { expected: "array", .. }));

        let err = decode_login_flow(Some(&json!([1, 2])), "data").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { expected: "object", .. }));
    }

    #[test]
    fn test_decode_rejects_fractional_ids() {
        let mut payload = sample_flow();
        payload["attributeStepId"] = json!(1.5);
        let err = decode_login_flow(Some(&payload), "data").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { ref path, .. } if path == "data.attributeStepId"));

        let mut payload = sample_flow();
        payload["steps"][0]["id"] = json!(i64::from(i32::MAX) + 1);
        assert!(decode_login_flow(Some(&payload), "data").is_err());
    }

    #[test]
    fn test_decode_unknown_flow_type() {
        let mut payload = sample_flow();
        payload["type"] = json!("SCRIPTED");
        let err = decode_login_flow(Some(&payload), "data").unwrap_err();
        assert!(matches!(err, DecodeError::UnknownVariant { ref value, .. } if value == "SCRIPTED"));
    }

    #[test]
    fn test_decode_script() {
        let mut payload = sample_flow();
        payload["script"] = json!("var onLoginRequest = function(context) {};");
        let flow = decode_login_flow(Some(&payload), "").unwrap();
        assert!(flow.script.unwrap().starts_with("var onLoginRequest"));

        payload["script"] = json!(42);
        let err = decode_login_flow(Some(&payload), "").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidType { ref path, .. } if path == "script"));
    }

    #[test]
    fn test_login_flow_result_conversion() {
        let response = LoginFlowResultResponse {
            operation_id: Some("op-1".into()),
            status: Some(LoginFlowStatus::Completed),
            data: Some(sample_flow()),
        };

        let result = login_flow_result(response).unwrap();
        assert_eq!(result.status, Some(LoginFlowStatus::Completed));
        assert_eq!(result.data.steps.map(|s| s.len()), Some(2));

        let empty = login_flow_result(LoginFlowResultResponse {
            status: Some(LoginFlowStatus::InProgress),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(empty.data, LoginFlow::default());
    }

    #[test]
    fn test_decoded_flow_round_trips_through_patch() {
        let flow = decode_login_flow(Some(&sample_flow()), "data").unwrap();
        let patch = ApplicationPatchRequest::from(flow.clone());
        let body = serde_json::to_value(&patch).unwrap();

        let redecoded = decode_login_flow(body.get("authenticationSequence"), "").unwrap();
        assert_eq!(redecoded, flow);
    }

    #[test]
    fn test_merge_oauth_config_keeps_unset_fields() {
        let current = OidcConfiguration {
            client_id: Some("cid".into()),
            grant_types: vec!["authorization_code".into()],
            callback_urls: vec!["https://old.example.com/cb".into()],
            allowed_origins: vec!["https://old.example.com".into()],
            access_token: Some(AccessTokenConfiguration {
                token_type: Some("JWT".into()),
                user_access_token_expiry_in_seconds: Some(3600),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = merge_oauth_config(
            current.clone(),
            ApplicationOAuthConfigUpdate {
                callback_urls: Some(vec!["https://new.example.com/cb".into()]),
                application_access_token_expiry_in_seconds: Some(600),
                refresh_token_expiry_in_seconds: Some(86400),
                logout: Some(OidcLogoutConfiguration {
                    back_channel_logout_url: Some("https://new.example.com/logout".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        assert_eq!(merged.callback_urls, vec!["https://new.example.com/cb"]);
        assert_eq!(merged.allowed_origins, current.allowed_origins);
        assert_eq!(merged.grant_types, current.grant_types);

        let access_token = merged.access_token.unwrap();
        assert_eq!(access_token.token_type.as_deref(), Some("JWT"));
        assert_eq!(access_token.user_access_token_expiry_in_seconds, Some(3600));
        assert_eq!(access_token.application_access_token_expiry_in_seconds, Some(600));
        assert_eq!(merged.refresh_token.unwrap().expiry_in_seconds, Some(86400));
        assert!(merged.logout.is_some());
    }

    #[test]
    fn test_merge_preserves_unmodelled_settings() {
        let current: OidcConfiguration = serde_json::from_value(json!({
            "clientId": "cid",
            "grantTypes": ["authorization_code"],
            "callbackURLs": ["https://old.example.com/cb"],
            "validateRequestObjectSignature": false,
            "idToken": {"expiryInSeconds": 3600, "audience": ["cid"]},
            "accessToken": {"type": "JWT", "bindingType": "sso-session"},
            "logout": {
                "backChannelLogoutUrl": "https://old.example.com/bcl",
                "frontChannelLogoutUrl": "https://old.example.com/fcl"
            }
        }))
        .unwrap();

        let merged = merge_oauth_config(
            current,
            ApplicationOAuthConfigUpdate {
                callback_urls: Some(vec!["https://new.example.com/cb".into()]),
                user_access_token_expiry_in_seconds: Some(900),
                logout: Some(OidcLogoutConfiguration {
                    back_channel_logout_url: Some("https://new.example.com/bcl".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );

        let body = serde_json::to_value(&merged).unwrap();
        assert_eq!(body["validateRequestObjectSignature"], json!(false));
        assert_eq!(body["idToken"], json!({"expiryInSeconds": 3600, "audience": ["cid"]}));
        assert_eq!(body["accessToken"]["bindingType"], "sso-session");
        assert_eq!(body["accessToken"]["userAccessTokenExpiryInSeconds"], 900);
        assert_eq!(body["callbackURLs"], json!(["https://new.example.com/cb"]));
        assert_eq!(body["logout"]["backChannelLogoutUrl"], "https://new.example.com/bcl");
        assert_eq!(body["logout"]["frontChannelLogoutUrl"], "https://old.example.com/fcl");
    }

    #[test]
    fn test_merge_empty_update_is_identity() {
        let current = OidcConfiguration {
            client_id: Some("cid".into()),
            callback_urls: vec!["https://app.example.com/cb".into()],
            ..Default::default()
        };
        assert_eq!(
            merge_oauth_config(current.clone(), ApplicationOAuthConfigUpdate::default()),
            current
        );
    }
}
